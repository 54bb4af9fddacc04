use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Host bridge error: {0}")]
    Bridge(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
