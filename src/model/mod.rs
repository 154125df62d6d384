//! Remote generative model abstraction for Lektor.
//!
//! The pipeline only sees the [`ModelClient`] trait, so tests can run
//! against a stub that returns canned text or simulated failures
//! without network access.

mod gemini;

pub use gemini::GeminiClient;

use crate::config::load_api_key;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for remote generative model sessions.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Hand an audio file to the model and return the generated
    /// transcript for the given instruction.
    ///
    /// Implementations own the remote-side file for the duration of the
    /// call and must release it on every exit path, success or failure.
    async fn transcribe_audio(&self, audio_path: &Path, instruction: &str) -> Result<String>;

    /// Issue a single text generation call for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Initialize a Gemini client from the environment.
///
/// Returns a configuration error (not a panic) when the API key is
/// absent, so adapters can surface a setup instruction and retry on a
/// later request.
pub fn init_client(model: &str) -> Result<GeminiClient> {
    let api_key = load_api_key()?;
    GeminiClient::new(api_key, model)
}
