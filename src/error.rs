//! Error types for graph construction and manifest handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::connections::ConnectionRole;

/// Main error type for workflow definition operations
#[derive(Error, Debug)]
pub enum Error {
    /// A task id was registered twice within one DAG
    #[error("task '{0}' is already registered in this dag")]
    DuplicateTask(String),

    /// An edge referenced a task id that was never registered
    #[error("task '{0}' not found in this dag")]
    TaskNotFound(String),

    /// The edge set does not form a DAG
    #[error("cycle detected in dag '{0}'")]
    Cycle(String),

    /// Lookup of an unregistered workflow definition
    #[error("unknown dag: '{0}'")]
    UnknownDag(String),

    /// No connection settings configured for a role
    #[error("no connection configured for role '{0}'")]
    UnknownConnection(ConnectionRole),

    /// Referenced SQL/HQL files missing under the search root
    #[error("{} referenced script file(s) missing", .0.len())]
    MissingScripts(Vec<PathBuf>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for workflow definition operations
pub type Result<T> = std::result::Result<T, Error>;
