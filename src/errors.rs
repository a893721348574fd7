use reqwest::StatusCode;
use serde::Deserialize;

/// Generic message shown for failures the user cannot act on.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Error body shape used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Option<String>,
}

/// Error type for all admin client and workflow operations.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token error: {0}")]
    Token(String),
}

impl From<validator::ValidationErrors> for AdminError {
    fn from(err: validator::ValidationErrors) -> Self {
        AdminError::Validation(err.to_string())
    }
}

impl AdminError {
    /// Builds the error for a non-2xx response, preferring the backend's
    /// `detail` field over the raw body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            StatusCode::NOT_FOUND => AdminError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdminError::Unauthorized(message),
            _ => AdminError::Api { status, message },
        }
    }

    /// Returns true when the failure means "the resource does not exist",
    /// which list views render as an empty state rather than an error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdminError::NotFound(_))
    }

    /// Returns the message suitable for the user-visible error surface.
    /// Validation and not-found failures keep their text; transport and
    /// server failures collapse to a generic retry-suggesting message.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Validation(msg) => msg.clone(),
            AdminError::NotFound(msg) => msg.clone(),
            AdminError::Unauthorized(_) | AdminError::Token(_) => {
                "Your session has expired. Please log in again.".into()
            }
            AdminError::Api { .. }
            | AdminError::Transport(_)
            | AdminError::Serialization(_)
            | AdminError::Config(_) => GENERIC_FAILURE_MESSAGE.into(),
        }
    }
}

/// Standard result type for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;
