use crate::http::ReqParam;
use crate::plugin::error::{ErrorInfo, PluginError};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Debug, Formatter};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Chat,
    Embeddings,
}

impl Command {
    pub fn path(&self) -> &'static str {
        match self {
            Command::Chat => "chat/completions",
            Command::Embeddings => "embeddings",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Builder)]
pub struct BearerTokenAuth {
    #[builder(into)]
    pub bearer_token: String,
}

impl Debug for BearerTokenAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuth")
            .field("bearer_token", &"****")
            .finish()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
pub struct DatasourceConfiguration {
    #[builder(into)]
    pub url: Option<String>,
    pub authentication: Option<BearerTokenAuth>,
}

impl DatasourceConfiguration {
    pub fn bearer_token(&self) -> Option<&str> {
        self.authentication
            .as_ref()
            .map(|auth| auth.bearer_token.as_str())
            .filter(|token| !token.trim().is_empty())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
pub struct ActionConfiguration {
    pub command: Command,
    #[serde(default)]
    #[builder(default)]
    pub headers: Vec<ReqParam>,
    #[serde(default)]
    #[builder(default)]
    pub auto_generated_headers: Vec<ReqParam>,
    #[serde(default)]
    #[builder(default)]
    pub form_data: Map<String, Value>,
}

/// What was sent, captured before dispatch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExecutionRequest {
    pub url: String,
    pub http_method: String,
    pub headers: Vec<ReqParam>,
    pub body: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExecutionResult {
    pub is_execution_success: bool,
    pub status_code: Option<u16>,
    pub body: Option<String>,
    pub error_info: Option<ErrorInfo>,
    pub request: ExecutionRequest,
}

impl ExecutionResult {
    pub fn success(request: ExecutionRequest, status_code: u16, body: String) -> Self {
        ExecutionResult {
            is_execution_success: true,
            status_code: Some(status_code),
            body: Some(body),
            error_info: None,
            request,
        }
    }

    pub fn failed_status(request: ExecutionRequest, status_code: u16) -> Self {
        ExecutionResult {
            is_execution_success: false,
            status_code: Some(status_code),
            body: None,
            error_info: None,
            request,
        }
    }

    pub fn error(request: ExecutionRequest, error: &PluginError) -> Self {
        ExecutionResult {
            is_execution_success: false,
            status_code: None,
            body: None,
            error_info: Some(ErrorInfo::from(error)),
            request,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn same(value: &str) -> Self {
        SelectOption {
            label: value.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct TriggerResult {
    pub trigger: Vec<SelectOption>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
}

/// Provider request document sent as the POST body.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum CompletionRequest {
    Chat(ChatRequest),
    Embeddings(EmbeddingsRequest),
}
