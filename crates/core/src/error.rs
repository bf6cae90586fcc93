use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("invalid job id: {0}")]
    InvalidJobId(String),

    #[error("invalid source id '{0}': expected 1-64 characters of [A-Za-z0-9_-]")]
    InvalidSourceId(String),
}
