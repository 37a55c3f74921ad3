//! Translation via a LibreTranslate server.

use crate::error::{ParloError, Result};
use crate::translate::translator::Translator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Configuration for the LibreTranslate translator.
#[derive(Debug, Clone)]
pub struct LibreConfig {
    /// Base URL of the LibreTranslate instance.
    pub endpoint: String,
    /// Optional API key for hosted instances.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LibreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: crate::defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Translator backed by the LibreTranslate HTTP API.
pub struct LibreTranslator {
    client: Client,
    config: LibreConfig,
}

impl LibreTranslator {
    pub fn new(config: LibreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ParloError::Translation {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Translator for LibreTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let request_body = TranslateRequest {
            q: text,
            source: source_lang,
            target: target_lang,
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.config.endpoint))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ParloError::Translation {
                message: format!("libre request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(ParloError::Translation {
                message: format!("libre server returned {}", response.status()),
            });
        }

        let parsed: TranslateResponse =
            response.json().await.map_err(|e| ParloError::Translation {
                message: format!("libre response was not valid JSON: {}", e),
            })?;

        Ok(parsed.translated_text.trim().to_string())
    }

    fn name(&self) -> &str {
        "libre"
    }
}
