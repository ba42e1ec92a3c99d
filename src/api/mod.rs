//! The interface to the external text-completion service that produces postage suggestions.
//!
//! `Completion` is the raw, fallible call to the service. `SuggestionGateway` wraps it, builds the
//! prompt and schema, and turns every failure into "no suggestion".

mod gateway;
mod gemini;
mod test_completion;

use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub use gateway::SuggestionGateway;
pub(crate) use gemini::GeminiCompletion;
pub(crate) use test_completion::TestCompletion;

/// When this environment variable is set and non-empty, `Mode::Test` is used.
pub const TEST_MODE_ENV: &str = "STAMPS_IN_TEST_MODE";

/// A single request/response exchange with a structured-output language model.
#[async_trait::async_trait]
pub trait Completion: Send + Sync {
    /// Sends `prompt` and asks for JSON conforming to `schema`.
    ///
    /// Returns `Ok(None)` when the service answered but produced no text.
    async fn complete(&self, prompt: &str, schema: &serde_json::Value) -> Result<Option<String>>;
}

/// Which completion backend to use.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Call the Gemini API over the network.
    #[default]
    Gemini,
    /// Answer from canned in-memory data.
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// This allows for running the program without hitting the network. When
    /// `STAMPS_IN_TEST_MODE` is set and non-zero in length, then the mode will be `Mode::Test`,
    /// otherwise it will be `Mode::Gemini`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Gemini,
        }
    }
}

/// Creates the completion backend for `mode`.
///
/// # Errors
/// In `Mode::Gemini`, returns an error if no API key is available or the HTTP client cannot be
/// built.
pub fn completion(
    config: &Config,
    api_key: Option<&str>,
    mode: Mode,
) -> Result<Arc<dyn Completion>> {
    debug!("Using {mode} completion backend");
    Ok(match mode {
        Mode::Gemini => Arc::new(GeminiCompletion::new(config, api_key)?),
        Mode::Test => Arc::new(TestCompletion::default()),
    })
}

/// Builds the gateway for `mode` from configuration.
pub fn gateway(config: &Config, api_key: Option<&str>, mode: Mode) -> Result<SuggestionGateway> {
    let completion = completion(config, api_key, mode)?;
    Ok(SuggestionGateway::new(completion, config))
}
