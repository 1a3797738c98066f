use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use query_core::HttpClientConfig;

pub const DEFAULT_CONFIG_FILE: &str = "gyaan.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub request_timeout_secs: u64,
    pub offline: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: None,
            api_key: None,
            model: None,
            request_timeout_secs: 30,
            offline: false,
        }
    }
}

impl Settings {
    pub fn http_client_config(&self) -> Option<HttpClientConfig> {
        let endpoint = self.backend_url.clone()?;
        Some(HttpClientConfig {
            endpoint,
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout_secs: self.request_timeout_secs,
        })
    }

    /// Applies command-line flags on top of file and environment values. A
    /// zero timeout is ignored, as it is for the other sources.
    pub fn apply_overrides(&mut self, offline: bool, endpoint: Option<String>, timeout: Option<u64>) {
        if offline {
            self.offline = true;
        }
        if let Some(endpoint) = endpoint.as_deref().and_then(non_empty) {
            self.backend_url = Some(endpoint);
        }
        if let Some(timeout) = timeout.filter(|secs| *secs > 0) {
            self.request_timeout_secs = timeout;
        }
    }
}

pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then the environment. A missing file is
/// fine; an unreadable or invalid one is an error.
pub fn load_settings_with(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if config_path.exists() {
        let raw = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config '{}'", config_path.display()))?;
        let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(&raw)
            .with_context(|| format!("failed to parse config '{}'", config_path.display()))?;

        if let Some(v) = file_cfg.get("backend_url").and_then(toml::Value::as_str) {
            settings.backend_url = non_empty(v);
        }
        if let Some(v) = file_cfg.get("api_key").and_then(toml::Value::as_str) {
            settings.api_key = non_empty(v);
        }
        if let Some(v) = file_cfg.get("model").and_then(toml::Value::as_str) {
            settings.model = non_empty(v);
        }
        if let Some(v) = file_cfg
            .get("request_timeout_secs")
            .and_then(toml::Value::as_integer)
        {
            if v > 0 {
                settings.request_timeout_secs = v as u64;
            }
        }
        if let Some(v) = file_cfg.get("offline").and_then(toml::Value::as_bool) {
            settings.offline = v;
        }
    }

    if let Some(v) = env("GYAAN_BACKEND_URL") {
        settings.backend_url = non_empty(&v);
    }
    if let Some(v) = env("APP__BACKEND_URL") {
        settings.backend_url = non_empty(&v);
    }

    if let Some(v) = env("GEMINI_API_KEY") {
        settings.api_key = non_empty(&v);
    }
    if let Some(v) = env("APP__API_KEY") {
        settings.api_key = non_empty(&v);
    }

    if let Some(v) = env("APP__MODEL") {
        settings.model = non_empty(&v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            if parsed > 0 {
                settings.request_timeout_secs = parsed;
            }
        }
    }

    if let Some(v) = env("APP__OFFLINE") {
        settings.offline = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }

    Ok(settings)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
