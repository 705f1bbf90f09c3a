//! Core shared errors (renderer-agnostic).

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("Invalid color '{0}': expected #rgb, #rrggbb or a CSS color name")]
    InvalidColor(String),
    #[error("Palette must contain at least one color")]
    EmptyPalette,
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
