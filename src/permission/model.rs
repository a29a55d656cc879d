use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Capability tokens checked by the access-control layer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AclPermission {
    #[serde(rename = "read:datasources")]
    ReadDatasources,
    #[serde(rename = "manage:datasources")]
    ManageDatasources,
    #[serde(rename = "execute:datasources")]
    ExecuteDatasources,
}

impl AclPermission {
    pub fn value(&self) -> &'static str {
        match self {
            AclPermission::ReadDatasources => "read:datasources",
            AclPermission::ManageDatasources => "manage:datasources",
            AclPermission::ExecuteDatasources => "execute:datasources",
        }
    }
}

impl Display for AclPermission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Edit,
    Delete,
    Execute,
}

impl FromStr for Operation {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Operation::Read),
            "edit" => Ok(Operation::Edit),
            "delete" => Ok(Operation::Delete),
            "execute" => Ok(Operation::Execute),
            _ => Err(PermissionError::InvalidParameter("operation")),
        }
    }
}

/// Why an application is being serialised.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SerialiseObjective {
    VersionControl,
    Share,
    KnowledgeBaseGeneration,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Please enter a valid parameter {0}.")]
    InvalidParameter(&'static str),
}
