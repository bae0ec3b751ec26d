use thiserror::Error;

/// Errors shared by every canvas crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommonError {
    #[error("Invalid id: {0:?}")]
    InvalidId(String),
}
