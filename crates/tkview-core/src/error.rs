//! Error types for TKView operations.
//!
//! This module defines [`TkviewError`], the single error enum shared by the
//! resource tree, the navigation engine, the API client and the terminal UI.
//! Errors are values: nothing in the session path panics, every failure is
//! either recovered from or surfaced in the dashboard's status line.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`TkviewError`].
pub type Result<T> = std::result::Result<T, TkviewError>;

/// Error type for all TKView operations.
#[derive(Debug, Error)]
pub enum TkviewError {
    // =========================================================================
    // Session Errors
    // =========================================================================
    /// No data source has been wired into the session
    #[error("No API client configured")]
    NoClient,

    /// The organisation or workflow tree has not been populated yet
    #[error("Resource tree is not populated")]
    NoTreeLoaded,

    /// Nothing is currently selected at the level required by the operation
    #[error("No organisation or environment is currently selected")]
    NoSelection,

    /// Environment is not present in the current organisation tree
    #[error("Environment {id:?} not currently known")]
    EnvironmentNotFound { id: String },

    /// Workflow is not present in the current workflow tree
    #[error("Workflow {id:?} not currently known")]
    WorkflowNotFound { id: String },

    /// A fetch result arrived for a scope that is no longer selected
    #[error("Result for {scope} no longer matches the current selection")]
    StaleResult { scope: String },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a usable HTTP response
    #[error("Transport error during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// The remote side answered with a request timeout; no data is available yet
    #[error("Request timed out during {operation}")]
    RequestTimeout { operation: String },

    /// The remote side answered with an unexpected status code
    #[error("{operation} returned HTTP {status}")]
    UnexpectedStatus { operation: String, status: u16 },

    /// The response body could not be decoded
    #[error("Decode error in {context}: {message}")]
    Decode { context: String, message: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file exists but is not valid
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Missing required configuration field
    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // TUI Errors
    // =========================================================================
    /// Terminal initialization failed
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    /// Internal error (bug in TKView)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TkviewError {
    /// Create an EnvironmentNotFound error
    pub fn environment_not_found(id: impl ToString) -> Self {
        Self::EnvironmentNotFound { id: id.to_string() }
    }

    /// Create a WorkflowNotFound error
    pub fn workflow_not_found(id: impl ToString) -> Self {
        Self::WorkflowNotFound { id: id.to_string() }
    }

    /// Create a transport error
    pub fn transport(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Create a decode error
    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a terminal initialization error
    pub fn terminal_init(message: impl ToString) -> Self {
        Self::TerminalInit {
            message: message.to_string(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Error classification helpers
    // =========================================================================

    /// Returns true if this failure means "no data yet" rather than a hard error.
    ///
    /// Such results leave the trees untouched and are not shown to the user.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns true if a previously valid selection has vanished from its tree.
    pub fn is_stale_selection(&self) -> bool {
        matches!(
            self,
            Self::EnvironmentNotFound { .. } | Self::WorkflowNotFound { .. }
        )
    }

    /// Returns true if this error came from talking to the remote API.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::RequestTimeout { .. }
                | Self::UnexpectedStatus { .. }
                | Self::Decode { .. }
        )
    }

    /// Returns true if this error should stop the application.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TerminalInit { .. })
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::NoClient => Some("Restart tkview with --token and --url"),
            Self::UnexpectedStatus { status: 401 | 403, .. } => {
                Some("Check that the API token is valid for this organisation")
            }
            Self::Transport { .. } => Some("Check the API URL and your network, then press r"),
            Self::ConfigMissingField { .. } => {
                Some("Pass --token, set TKVIEW_TOKEN or add token to ~/.tkview/config.yaml")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the configuration file"),
            Self::TerminalInit { .. } => Some("Try running in a different terminal"),
            _ => None,
        }
    }
}
