//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway through remote calls.

use crate::config::load_api_key;
use crate::error::Result;

/// Verify the API key is configured, without making a remote call.
///
/// Returns the configuration error with its setup instruction so the
/// caller can surface it verbatim.
pub fn check_api_key() -> Result<()> {
    load_api_key().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::API_KEY_VAR;
    use crate::error::LektorError;

    #[test]
    fn test_missing_key_is_config_error() {
        let saved = std::env::var(API_KEY_VAR).ok();
        std::env::remove_var(API_KEY_VAR);

        let result = check_api_key();
        assert!(matches!(result, Err(LektorError::Config(_))));

        if let Some(key) = saved {
            std::env::set_var(API_KEY_VAR, key);
        }
    }
}
