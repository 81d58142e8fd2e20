//! CLI error types.

use tfviz_config::ConfigError;
use tfviz_extract::ExtractError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Extract(#[from] ExtractError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Render(String),

    #[error("{0}")]
    Validation(String),
}
