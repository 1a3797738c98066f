use serde::{Deserialize, Serialize};

use crate::domain::{QueryCriteria, QueryKind};

/// Body posted to a recommendation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub kind: QueryKind,
    pub prompt: String,
    pub criteria: QueryCriteria,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Optional success envelope. Backends that answer with a bare body are
/// passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendErrorDetail {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendErrorBody {
    Nested { error: BackendErrorDetail },
    Flat { message: String },
}

impl BackendErrorBody {
    pub fn message(&self) -> &str {
        match self {
            BackendErrorBody::Nested { error } => &error.message,
            BackendErrorBody::Flat { message } => message,
        }
    }
}
