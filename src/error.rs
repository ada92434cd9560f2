// src/error.rs - Error handling for catalog queries and their collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed caller input, rejected before any filtering runs.
    Validation {
        field: Option<String>,
        rules: Vec<String>,
    },
    Configuration {
        key: Option<String>,
        validation_errors: Vec<String>,
    },
    /// A catalog source could not produce a snapshot.
    Catalog {
        source_name: Option<String>,
    },
    Application,
    Io,
    Serialization,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub message: String,
    pub severity: ErrorSeverity,
    pub source: String,
    pub correlation_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub metadata: crate::types::Metadata,
    pub causes: Vec<String>,
}

impl Error {
    /// Creates a new error with the specified kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            severity: ErrorSeverity::Medium,
            source: "unknown".to_string(),
            correlation_id: None,
            timestamp: Utc::now(),
            metadata: std::collections::HashMap::new(),
            causes: Vec::new(),
        }
    }

    /// Sets the error severity
    pub fn severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the error source
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the correlation ID
    pub fn correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Adds metadata to the error
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Adds a cause to the error chain
    pub fn caused_by(mut self, cause: impl fmt::Display) -> Self {
        self.causes.push(cause.to_string());
        self
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }

    /// Name of the offending input field, for validation errors
    pub fn field(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Validation { field, .. } => field.as_deref(),
            ErrorKind::Configuration { key, .. } => key.as_deref(),
            _ => None,
        }
    }

    /// Creates a validation error for a single input field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorKind::Validation {
                field: Some(field.into()),
                rules: vec![message.clone()],
            },
            message,
        )
        .severity(ErrorSeverity::Low)
        .source("validation")
    }

    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Configuration {
                key: None,
                validation_errors: Vec::new(),
            },
            message,
        )
        .severity(ErrorSeverity::High)
    }

    /// Creates a configuration error listing every failed check
    pub fn invalid_config(validation_errors: Vec<String>) -> Self {
        let message = format!(
            "Configuration validation failed: {}",
            validation_errors.join("; ")
        );
        Self::new(
            ErrorKind::Configuration {
                key: None,
                validation_errors,
            },
            message,
        )
        .severity(ErrorSeverity::High)
    }

    /// Creates a catalog source error
    pub fn catalog(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        let source_name = source_name.into();
        Self::new(
            ErrorKind::Catalog {
                source_name: Some(source_name.clone()),
            },
            message,
        )
        .severity(ErrorSeverity::High)
        .source(source_name)
    }

    /// Creates a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.source, self.id, self.message
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let msg = err.to_string();

        let mut error = Error::new(ErrorKind::Io, msg);
        error.source = "std::io::Error".to_string();
        error.severity = ErrorSeverity::High;

        error
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorKind::Serialization, err.to_string()).source("serde_json")
    }
}

/// Extension trait for Results to add context
pub trait ResultExt<T> {
    /// Adds context to an error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::new(ErrorKind::Application, f()).caused_by(e))
    }
}
