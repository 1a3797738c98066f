use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_SURFACED_MESSAGE_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("education level or interest is required")]
    EmptyCriteria,
}

/// Failure reported by a recommendation backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend error {code}: {message}")]
    Backend { code: u16, message: String },
    #[error("backend request timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum NormalizationError {
    #[error("backend returned no results")]
    EmptyResult,
    #[error("malformed backend payload: {0}")]
    Malformed(String),
}

/// Classified failure carried by `RequestState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("validation failed")]
    ValidationFailed,
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("backend error {code}: {message}")]
    BackendError { code: u16, message: String },
    #[error("request timed out")]
    TimeoutError,
    #[error("normalization error: {0}")]
    NormalizationError(NormalizationError),
}

impl ErrorKind {
    /// Whether resubmitting the same query might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ErrorKind::NetworkError(_) | ErrorKind::TimeoutError => true,
            ErrorKind::BackendError { code, .. } => *code == 429 || *code >= 500,
            ErrorKind::ValidationFailed | ErrorKind::NormalizationError(_) => false,
        }
    }

    pub fn backend_code(&self) -> Option<u16> {
        match self {
            ErrorKind::BackendError { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ErrorKind::ValidationFailed => {
                "Please enter your course details or interests.".to_string()
            }
            ErrorKind::NetworkError(_) | ErrorKind::TimeoutError => {
                "Could not reach the recommendation service. Check your connection and try again."
                    .to_string()
            }
            ErrorKind::BackendError { code, message } => {
                let message = sanitize_backend_message(message);
                if message.is_empty() {
                    format!("The recommendation service returned an error ({code}).")
                } else {
                    format!("The recommendation service returned an error ({code}): {message}")
                }
            }
            ErrorKind::NormalizationError(_) => {
                "No results found. Try adjusting your details.".to_string()
            }
        }
    }
}

impl From<ClientError> for ErrorKind {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Network(message) => ErrorKind::NetworkError(message),
            ClientError::Backend { code, message } => ErrorKind::BackendError { code, message },
            ClientError::Timeout => ErrorKind::TimeoutError,
        }
    }
}

impl From<ValidationError> for ErrorKind {
    fn from(_: ValidationError) -> Self {
        ErrorKind::ValidationFailed
    }
}

impl From<NormalizationError> for ErrorKind {
    fn from(value: NormalizationError) -> Self {
        ErrorKind::NormalizationError(value)
    }
}

fn sanitize_backend_message(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= MAX_SURFACED_MESSAGE_CHARS {
        return cleaned;
    }
    let mut truncated: String = cleaned.chars().take(MAX_SURFACED_MESSAGE_CHARS).collect();
    truncated.push('…');
    truncated
}
