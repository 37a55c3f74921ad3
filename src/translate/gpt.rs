//! Translation via an OpenAI-compatible chat completions endpoint.

use crate::error::{ParloError, Result};
use crate::translate::translator::Translator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the GPT translator.
#[derive(Debug, Clone)]
pub struct GptConfig {
    /// Base URL of an OpenAI-compatible API.
    pub endpoint: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Chat model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GptConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            model: DEFAULT_CHAT_MODEL.to_string(),
            timeout_secs: crate::defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Translator backed by a chat completions API.
pub struct GptTranslator {
    client: Client,
    config: GptConfig,
}

impl GptTranslator {
    /// Create a new GPT translator.
    ///
    /// Fails at construction when the API key is empty, so a misconfigured
    /// engine is rejected at startup rather than on the first cycle.
    pub fn new(config: GptConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ParloError::ConfigInvalidValue {
                key: "translation.api_key".to_string(),
                message: "the gpt engine requires an API key (set OPENAI_API_KEY)".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ParloError::Translation {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    fn prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
        format!(
            "Translate the following text from {} to {}. \
             Reply with the translation only, no explanations.\n\n{}",
            source_lang, target_lang, text
        )
    }
}

#[async_trait]
impl Translator for GptTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let request_body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::prompt(text, source_lang, target_lang),
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.endpoint))
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ParloError::Translation {
                message: format!("gpt request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(ParloError::Translation {
                message: format!("gpt server returned {}", response.status()),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| ParloError::Translation {
            message: format!("gpt response was not valid JSON: {}", e),
        })?;

        let translated = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ParloError::Translation {
                message: "gpt response contained no choices".to_string(),
            })?;

        Ok(translated)
    }

    fn name(&self) -> &str {
        "gpt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GptConfig::new("sk-test".to_string());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        let config = GptConfig::new(String::new());
        match GptTranslator::new(config) {
            Err(ParloError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "translation.api_key");
            }
            _ => panic!("Expected ConfigInvalidValue error"),
        }
    }

    #[test]
    fn test_new_accepts_key_and_reports_name() {
        let translator = GptTranslator::new(GptConfig::new("sk-test".to_string())).unwrap();
        assert_eq!(translator.name(), "gpt");
    }

    #[test]
    fn test_prompt_mentions_languages_and_text() {
        let prompt = GptTranslator::prompt("good morning", "en", "pt");
        assert!(prompt.contains("from en to pt"));
        assert!(prompt.ends_with("good morning"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_translation_error() {
        let mut config = GptConfig::new("sk-test".to_string());
        config.endpoint = "http://127.0.0.1:1".to_string();
        config.timeout_secs = 1;

        let translator = GptTranslator::new(config).unwrap();
        match translator.translate("hello", "en", "pt").await {
            Err(ParloError::Translation { message }) => {
                assert!(message.contains("gpt request failed"));
            }
            _ => panic!("Expected Translation error"),
        }
    }
}
