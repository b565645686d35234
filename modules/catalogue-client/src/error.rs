use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectorClientError>;

#[derive(Debug, Error)]
pub enum ConnectorClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for ConnectorClientError {
    fn from(err: reqwest::Error) -> Self {
        ConnectorClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ConnectorClientError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorClientError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for ConnectorClientError {
    fn from(err: url::ParseError) -> Self {
        ConnectorClientError::InvalidEndpoint(err.to_string())
    }
}
