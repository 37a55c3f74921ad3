//! Local translation using candle MarianMT models.
//!
//! Downloads Helsinki-NLP opus-mt artifacts from HuggingFace on first use,
//! then runs greedy decoding fully offline.
//!
//! # Feature Gate
//!
//! This module requires the `local-translation` feature:
//!
//! ```bash
//! cargo build --features local-translation
//! ```

use crate::error::{ParloError, Result};
use crate::translate::translator::Translator;
use async_trait::async_trait;

#[cfg(feature = "local-translation")]
use candle_core::{DType, Device, Tensor};
#[cfg(feature = "local-translation")]
use candle_nn::VarBuilder;
#[cfg(feature = "local-translation")]
use candle_transformers::generation::LogitsProcessor;
#[cfg(feature = "local-translation")]
use candle_transformers::models::marian;
#[cfg(feature = "local-translation")]
use hf_hub::api::sync::Api;
#[cfg(feature = "local-translation")]
use std::sync::Mutex;
#[cfg(feature = "local-translation")]
use tokenizers::Tokenizer;

/// Maximum number of tokens to generate per translation.
#[cfg(feature = "local-translation")]
const MAX_DECODE_TOKENS: usize = 512;

/// Marian translator that runs opus-mt inference via candle.
#[cfg(feature = "local-translation")]
pub struct MarianTranslator {
    model: Mutex<marian::MTModel>,
    config: marian::Config,
    tokenizer: Tokenizer,
    device: Device,
    pair: String,
}

/// Marian translator placeholder (without the local-translation feature).
#[cfg(not(feature = "local-translation"))]
#[derive(Debug)]
pub struct MarianTranslator {
    pair: String,
}

#[cfg(feature = "local-translation")]
impl MarianTranslator {
    /// Load an opus-mt model for the given language pair.
    ///
    /// Resolves `Helsinki-NLP/opus-mt-{source}-{target}` from the HuggingFace
    /// cache, downloading on first use. The repo must carry a `tokenizer.json`;
    /// pairs that only ship SentencePiece files are rejected with a clear error.
    pub fn load(source_lang: &str, target_lang: &str) -> Result<Self> {
        let pair = format!("{}-{}", source_lang, target_lang);
        let repo_id = format!("Helsinki-NLP/opus-mt-{}", pair);

        let device = Device::Cpu;
        let api =
            Api::new().map_err(|e| ParloError::Translation {
                message: format!("HF Hub API init: {e}"),
            })?;
        let repo = api.model(repo_id.clone());

        let config_path = repo.get("config.json").map_err(|e| ParloError::Translation {
            message: format!("Download config for {repo_id}: {e}"),
        })?;
        let tokenizer_path = repo.get("tokenizer.json").map_err(|e| ParloError::Translation {
            message: format!(
                "Download tokenizer for {repo_id}: {e}. \
                 The marian engine needs a repo with tokenizer.json; \
                 use the gpt or libre engine for this language pair."
            ),
        })?;
        let model_path = repo
            .get("model.safetensors")
            .map_err(|e| ParloError::Translation {
                message: format!("Download weights for {repo_id}: {e}"),
            })?;

        let config_bytes = std::fs::read(&config_path).map_err(|e| ParloError::Translation {
            message: format!("Read config {}: {e}", config_path.display()),
        })?;
        let config: marian::Config =
            serde_json::from_slice(&config_bytes).map_err(|e| ParloError::Translation {
                message: format!("Parse marian config: {e}"),
            })?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            ParloError::Translation {
                message: format!("Load tokenizer {}: {e}", tokenizer_path.display()),
            }
        })?;

        // SAFETY: candle mmaps the weight file; the path came from hf-hub and
        // is not modified while the model is alive.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[model_path], DType::F32, &device).map_err(
                |e| ParloError::Translation {
                    message: format!("Load marian weights: {e}"),
                },
            )?
        };
        let model = marian::MTModel::new(&config, vb).map_err(|e| ParloError::Translation {
            message: format!("Init marian model: {e}"),
        })?;

        Ok(Self {
            model: Mutex::new(model),
            config,
            tokenizer,
            device,
            pair,
        })
    }

    /// Encode the input, then greedy-decode until EOS.
    fn generate(&self, text: &str) -> Result<String> {
        let mut model = self.model.lock().map_err(|e| ParloError::Translation {
            message: format!("marian model lock poisoned: {e}"),
        })?;
        model.reset_kv_cache();

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ParloError::Translation {
                message: format!("Tokenize: {e}"),
            })?;
        let input_ids: Vec<u32> = encoding.get_ids().to_vec();
        let input_tensor = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| ParloError::Translation {
                message: format!("Create input tensor: {e}"),
            })?;

        let encoder_xs = model
            .encoder()
            .forward(&input_tensor, 0)
            .map_err(|e| ParloError::Translation {
                message: format!("Encoder forward: {e}"),
            })?;

        // Greedy sampling; a fixed seed keeps output deterministic.
        let mut logits_processor = LogitsProcessor::new(0, None, None);
        let mut token_ids = vec![self.config.decoder_start_token_id];

        for index in 0..MAX_DECODE_TOKENS {
            // After the first step only the newest token is fed; the KV cache
            // carries the rest.
            let context_size = if index >= 1 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);

            let decoder_input = Tensor::new(&token_ids[start_pos..], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| ParloError::Translation {
                    message: format!("Create decoder input: {e}"),
                })?;

            let logits = model
                .decode(&decoder_input, &encoder_xs, start_pos)
                .map_err(|e| ParloError::Translation {
                    message: format!("Decoder forward: {e}"),
                })?;
            let logits = logits
                .squeeze(0)
                .and_then(|l| {
                    let last = l.dim(0)? - 1;
                    l.get(last)
                })
                .map_err(|e| ParloError::Translation {
                    message: format!("Slice logits: {e}"),
                })?;

            let token = logits_processor
                .sample(&logits)
                .map_err(|e| ParloError::Translation {
                    message: format!("Sample token: {e}"),
                })?;
            if token == self.config.eos_token_id || token == self.config.forced_eos_token_id {
                break;
            }
            token_ids.push(token);
        }

        // Skip the decoder start token
        let output = self
            .tokenizer
            .decode(&token_ids[1..], true)
            .map_err(|e| ParloError::Translation {
                message: format!("Detokenize: {e}"),
            })?;

        Ok(output.trim().to_string())
    }
}

#[cfg(not(feature = "local-translation"))]
impl MarianTranslator {
    /// Create a marian translator (stub implementation).
    pub fn load(source_lang: &str, target_lang: &str) -> Result<Self> {
        Ok(Self {
            pair: format!("{}-{}", source_lang, target_lang),
        })
    }
}

#[cfg(feature = "local-translation")]
#[async_trait]
impl Translator for MarianTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let expected = format!("{}-{}", source_lang, target_lang);
        if expected != self.pair {
            return Err(ParloError::Translation {
                message: format!(
                    "marian model was loaded for {} but {} was requested",
                    self.pair, expected
                ),
            });
        }
        self.generate(text)
    }

    fn name(&self) -> &str {
        "marian"
    }
}

#[cfg(not(feature = "local-translation"))]
#[async_trait]
impl Translator for MarianTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String> {
        Err(ParloError::Translation {
            message: concat!(
                "Local translation feature not enabled. ",
                "Rebuild with: cargo build --release --features local-translation, ",
                "or pick the gpt or libre engine."
            )
            .to_string(),
        })
    }

    fn name(&self) -> &str {
        "marian"
    }
}
