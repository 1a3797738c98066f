//! JSON-over-HTTP recommendation backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use shared::{
    domain::{QueryCriteria, QueryKind},
    error::ClientError,
    protocol::{BackendErrorBody, RecommendationRequest, RecommendationResponse},
};
use tracing::{debug, warn};
use url::Url;

use crate::{prompt::build_prompt, RecommendationClient};

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/recommendations".to_string(),
            api_key: None,
            model: None,
            timeout_secs: 30,
        }
    }
}

pub struct HttpRecommendationClient {
    http: Client,
    endpoint: Url,
    model: Option<String>,
}

impl HttpRecommendationClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let endpoint = Url::parse(config.endpoint.trim())
            .with_context(|| format!("invalid recommendation endpoint '{}'", config.endpoint))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .context("api key contains characters not allowed in a header")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build recommendation http client")?;

        Ok(Self {
            http,
            endpoint,
            model: config.model,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RecommendationClient for HttpRecommendationClient {
    async fn query(
        &self,
        criteria: &QueryCriteria,
        kind: QueryKind,
    ) -> Result<String, ClientError> {
        let body = RecommendationRequest {
            kind,
            prompt: build_prompt(criteria, kind),
            criteria: criteria.clone(),
            model: self.model.clone(),
        };

        debug!(endpoint = %self.endpoint, kind = %kind, "http: posting recommendation request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<BackendErrorBody>(&text)
                .map(|body| body.message().to_string())
                .unwrap_or_else(|_| text.trim().to_string());
            warn!(status = status.as_u16(), kind = %kind, "http: backend rejected request");
            return Err(ClientError::Backend {
                code: status.as_u16(),
                message,
            });
        }

        Ok(match serde_json::from_str::<RecommendationResponse>(&text) {
            Ok(envelope) => envelope.text,
            Err(_) => text,
        })
    }
}

fn classify_transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::Timeout;
    }
    if let Some(status) = err.status() {
        return ClientError::Backend {
            code: status.as_u16(),
            message: err.to_string(),
        };
    }
    ClientError::Network(err.to_string())
}

#[cfg(test)]
#[path = "tests/http_client_tests.rs"]
mod tests;
