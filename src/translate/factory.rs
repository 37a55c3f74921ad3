//! Translator construction from configuration.

use crate::config::TranslationConfig;
use crate::error::{ParloError, Result};
use crate::translate::gpt::{GptConfig, GptTranslator};
use crate::translate::libre::{LibreConfig, LibreTranslator};
use crate::translate::marian::MarianTranslator;
use crate::translate::translator::Translator;

/// Engine identifiers accepted in configuration.
pub const SUPPORTED_ENGINES: &[&str] = &["gpt", "libre", "marian"];

/// Build the translator named by `config.engine`.
///
/// An unknown identifier is a configuration error that enumerates the
/// supported engines, so a typo is caught at startup.
pub fn create_translator(config: &TranslationConfig) -> Result<Box<dyn Translator>> {
    match config.engine.as_str() {
        "gpt" => {
            let mut gpt_config = GptConfig::new(config.api_key.clone().unwrap_or_default());
            if let Some(endpoint) = &config.endpoint {
                gpt_config.endpoint = endpoint.clone();
            }
            gpt_config.timeout_secs = config.request_timeout_secs;
            Ok(Box::new(GptTranslator::new(gpt_config)?))
        }
        "libre" => {
            let mut libre_config = LibreConfig {
                api_key: config.api_key.clone(),
                timeout_secs: config.request_timeout_secs,
                ..LibreConfig::default()
            };
            if let Some(endpoint) = &config.endpoint {
                libre_config.endpoint = endpoint.clone();
            }
            Ok(Box::new(LibreTranslator::new(libre_config)?))
        }
        "marian" => Ok(Box::new(MarianTranslator::load(
            &config.source_language,
            &config.target_language,
        )?)),
        unknown => Err(ParloError::ConfigInvalidValue {
            key: "translation.engine".to_string(),
            message: format!(
                "unknown engine '{}', supported engines: {}",
                unknown,
                SUPPORTED_ENGINES.join(", ")
            ),
        }),
    }
}
