//! Unified error types for generation and runtime data access.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all daogen layers.
///
/// Generation errors identify the offending schema and table so that a
/// failed run can be traced back to the metadata that broke it.
#[derive(Error, Debug)]
pub enum DaogenError {
    // ============ Metadata / Generation Errors ============
    /// Structural metadata violation that makes key resolution undefined.
    #[error("Malformed metadata in {schema}.{table}: {message}")]
    MalformedMetadata {
        schema: String,
        table: String,
        message: String,
    },

    /// Binding generation was asked to handle a table without a resolved key.
    #[error("No resolved primary key for table {table}; keyless tables must be skipped before binding")]
    MissingKey { table: String },

    /// Schema metadata could not be loaded.
    #[error("Schema load error: {0}")]
    SchemaLoad(String),

    /// Source artifact could not be written.
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    // ============ Configuration Errors ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Runtime Data Access Errors ============
    /// Failure reported by the underlying relational mapping layer.
    #[error("Data access error on {table}: {message}")]
    DataAccess {
        table: String,
        message: String,
        transient: bool,
    },

    /// A value was passed to an operation that needs its key, but the key is unset.
    #[error("Primary key not set on value for table {0}")]
    KeyNotSet(String),

    /// The blocking call could not be dispatched or its completion was lost.
    #[error("Worker dispatch failed for {operation}: {message}")]
    Dispatch {
        operation: String,
        message: String,
    },

    // ============ Injection Errors ============
    /// A module was built without supplying a component this call needs.
    #[error("No binding registered for {0}")]
    Unbound(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DaogenError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedMetadata { .. } => "MALFORMED_METADATA",
            Self::MissingKey { .. } => "MISSING_KEY",
            Self::SchemaLoad(_) => "SCHEMA_LOAD_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::DataAccess { .. } => "DATA_ACCESS_ERROR",
            Self::KeyNotSet(_) => "KEY_NOT_SET",
            Self::Dispatch { .. } => "DISPATCH_ERROR",
            Self::Unbound(_) => "UNBOUND_INTERFACE",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a malformed-metadata error for a table.
    #[must_use]
    pub fn malformed<S, T, M>(schema: S, table: T, message: M) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        M: Into<String>,
    {
        Self::MalformedMetadata {
            schema: schema.into(),
            table: table.into(),
            message: message.into(),
        }
    }

    /// Creates a non-transient data access error.
    #[must_use]
    pub fn data_access<T: Into<String>, M: Into<String>>(table: T, message: M) -> Self {
        Self::DataAccess {
            table: table.into(),
            message: message.into(),
            transient: false,
        }
    }

    /// Creates a transient data access error (connection lost, lock timeout, ...).
    #[must_use]
    pub fn transient<T: Into<String>, M: Into<String>>(table: T, message: M) -> Self {
        Self::DataAccess {
            table: table.into(),
            message: message.into(),
            transient: true,
        }
    }

    /// Creates a dispatch error for an operation.
    #[must_use]
    pub fn dispatch<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::Dispatch {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error for a path.
    #[must_use]
    pub fn io<P: Into<String>, M: ToString>(path: P, err: M) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error must abort a generation run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MalformedMetadata { .. }
                | Self::MissingKey { .. }
                | Self::SchemaLoad(_)
                | Self::Io { .. }
                | Self::Configuration(_)
        )
    }

    /// Checks if a caller may reasonably retry the failed operation.
    ///
    /// Nothing in daogen retries on its own.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::DataAccess { transient: true, .. })
    }
}

impl From<serde_json::Error> for DaogenError {
    fn from(err: serde_json::Error) -> Self {
        Self::SchemaLoad(format!("JSON error: {err}"))
    }
}

/// Serializable error summary, used by the CLI's machine-readable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Whether the error aborted the run
    pub fatal: bool,
}

impl From<&DaogenError> for ErrorReport {
    fn from(error: &DaogenError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            fatal: error.is_fatal(),
        }
    }
}
