use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unusable base url: {0}")]
    BaseUrl(String),

    #[error("Server responded with {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Request rejected")]
    Rejected { message: Option<String> },

    #[error("Response carried no data")]
    MissingData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    Fallback,
    ServerMessage,
    // "<fallback>: <reason phrase>" on a failed status.
    Authentication,
}

impl ClientError {
    pub fn user_message(&self, fallback: &str, rendering: Rendering) -> String {
        match (self, rendering) {
            (
                ClientError::Rejected {
                    message: Some(message),
                },
                Rendering::ServerMessage | Rendering::Authentication,
            ) => message.clone(),
            (ClientError::Status { status, .. }, Rendering::Authentication) => format!(
                "{}: {}",
                fallback,
                status.canonical_reason().unwrap_or(status.as_str())
            ),
            (
                ClientError::Status { .. } | ClientError::Rejected { .. } | ClientError::MissingData,
                _,
            ) => fallback.to_string(),
            (other, _) => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed session file: {0}")]
    Decode(#[from] ron::error::SpannedError),

    #[error("Failed to encode session: {0}")]
    Encode(#[from] ron::Error),
}
