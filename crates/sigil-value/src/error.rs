use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("cannot represent function `{0}` as JSON")]
    FunctionNotSupported(String),

    #[error("cannot represent {0} as a JSON number")]
    NonFiniteNumber(f64),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}
