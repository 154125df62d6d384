//! Configuration module for Lektor.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::Prompts;
pub use settings::{
    GeneralSettings, ModelSettings, PromptSettings, ServerSettings, Settings,
};

use crate::error::{Result, LektorError};

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Read the Gemini API key from the environment, seeding from a local
/// `.env` file if one is present.
///
/// Absence is a recoverable configuration error, not a crash; callers
/// surface the message and may retry on a later request.
pub fn load_api_key() -> Result<String> {
    // A .env created after startup should still be picked up on retry.
    let _ = dotenvy::dotenv();

    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(LektorError::Config(format!(
            "{} is not set. Add it to your environment or a .env file: {}='...'",
            API_KEY_VAR, API_KEY_VAR
        ))),
    }
}
