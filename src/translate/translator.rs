use crate::error::{ParloError, Result};
use async_trait::async_trait;

/// Trait for text translation engines.
///
/// This trait allows swapping implementations (HTTP services, a local model,
/// or a mock). Translation is async because most engines go over the network.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source_lang` to `target_lang`.
    ///
    /// Language codes are ISO 639-1 ("en", "pt", "es").
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;

    /// Engine identifier for status output.
    fn name(&self) -> &str;
}

/// Mock translator for testing.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    response: Option<String>,
    should_fail: bool,
    error_message: String,
}

impl MockTranslator {
    /// Create a mock that echoes its input prefixed with the target language.
    pub fn new() -> Self {
        Self {
            response: None,
            should_fail: false,
            error_message: "mock translation failure".to_string(),
        }
    }

    /// Configure the mock to return a fixed response.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    /// Configure the mock to fail on translate.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, _source_lang: &str, target_lang: &str) -> Result<String> {
        if self.should_fail {
            return Err(ParloError::Translation {
                message: self.error_message.clone(),
            });
        }
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Ok(format!("[{}] {}", target_lang, text)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
