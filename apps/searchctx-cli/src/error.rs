//! CLI error types and exit codes

use searchctx_client::ClientError;
use searchctx_core::{ContextError, TemplateError};
use searchctx_reconcile::ConfigError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication or authorization failure
/// - 3: Search backend unreachable
/// - 4: Lookup or validation error
/// - 5: Backend rejected a change
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Role templates are unusable: {0}")]
    Template(#[from] TemplateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Template(_) => 1,
            CliError::NotFound(_) => 4,
            CliError::Client(err) => match err {
                ClientError::Auth(_) => 2,
                ClientError::Unreachable { .. } => 3,
                ClientError::InvalidConfig(_) => 1,
                _ => 5,
            },
            CliError::Context(err) => match err {
                ContextError::InsufficientRights | ContextError::Auth(_) => 2,
                ContextError::BackendUnreachable { .. } => 3,
                ContextError::LookupFailed { .. } | ContextError::DirectoryLookupFailed(_) => 4,
                ContextError::ResourceCreateFailed { .. }
                | ContextError::ResourceDeleteFailed { .. } => 5,
            },
        }
    }

    /// Print the error to stderr
    pub fn print(&self) {
        eprintln!("Error: {self}");
        if let CliError::Context(err) = self {
            eprintln!("  code: {}", err.error_code());
        }
    }
}
