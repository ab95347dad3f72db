//! View engine error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    /// Template missing, invalid or failing to render
    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
