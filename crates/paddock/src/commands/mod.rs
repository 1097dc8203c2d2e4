//! Command implementations

pub mod prune;

use miette::Diagnostic;
use thiserror::Error;

/// Exit code for success
pub const EXIT_OK: i32 = 0;
/// Exit code for runtime failures
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for usage errors
pub const EXIT_USAGE: i32 = 2;

/// Errors surfaced by command implementations
#[derive(Error, Debug, Diagnostic)]
pub enum CommandError {
    /// Invalid combination of command-line arguments
    #[error("{message}")]
    #[diagnostic(code(paddock::cli::usage))]
    Usage {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },

    /// Eviction engine failure
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] paddock_cache::Error),

    /// Cache backend failure
    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] paddock_storage::Error),
}

impl CommandError {
    /// Create a usage error with help text
    #[must_use]
    pub fn usage(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } => EXIT_USAGE,
            Self::Cache(_) | Self::Storage(_) => EXIT_FAILURE,
        }
    }
}
