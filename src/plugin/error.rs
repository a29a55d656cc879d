use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure kinds surfaced by the plugin. Argument and execution failures are
/// folded into an `ExecutionResult`; structure failures are returned as errors
/// from `trigger`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PluginError {
    #[error("Invalid argument for plugin execution: {0}")]
    ExecuteArgument(String),
    #[error("Error while executing the action: {0}")]
    Execute(String),
    #[error("Failed to fetch the datasource structure: {0}")]
    GetStructure(String),
}

impl PluginError {
    pub fn code(&self) -> &'static str {
        match self {
            PluginError::ExecuteArgument(_) => "PE-ARG-5000",
            PluginError::Execute(_) => "PE-RST-5000",
            PluginError::GetStructure(_) => "PE-DSE-5004",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PluginError::ExecuteArgument(_) => "Query configuration is invalid",
            PluginError::Execute(_) => "Query execution error",
            PluginError::GetStructure(_) => "Failed to get datasource structure",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorInfo {
    pub code: String,
    pub title: String,
    pub message: String,
}

impl From<&PluginError> for ErrorInfo {
    fn from(error: &PluginError) -> Self {
        ErrorInfo {
            code: error.code().to_string(),
            title: error.title().to_string(),
            message: error.to_string(),
        }
    }
}
