//! Environment-based configuration.

use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// The API key is deliberately optional: a missing key does not abort the
/// process, it puts the session features into their "initialization failed"
/// state while the static content browser keeps working.
#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub live_model: String,
    pub live_voice: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();

        let live_model = std::env::var("LIVE_MODEL")
            .unwrap_or_else(|_| "models/gemini-2.5-flash-native-audio-preview-09-2025".to_string());
        let live_voice = std::env::var("LIVE_VOICE").unwrap_or_else(|_| "Zephyr".to_string());

        let tts_model = std::env::var("TTS_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-flash-preview-tts".to_string());
        let tts_voice = std::env::var("TTS_VOICE").unwrap_or_else(|_| "Kore".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            gemini_api_key,
            live_model,
            live_voice,
            tts_model,
            tts_voice,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("GEMINI_API_KEY");
            env::remove_var("LIVE_MODEL");
            env::remove_var("LIVE_VOICE");
            env::remove_var("TTS_MODEL");
            env::remove_var("TTS_VOICE");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_with_an_empty_environment() {
        clear_env_vars();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.gemini_api_key, None);
        assert_eq!(
            config.live_model,
            "models/gemini-2.5-flash-native-audio-preview-09-2025"
        );
        assert_eq!(config.live_voice, "Zephyr");
        assert_eq!(config.tts_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.tts_voice, "Kore");
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn custom_values_override_defaults() {
        clear_env_vars();
        unsafe {
            env::set_var("GEMINI_API_KEY", "test-key");
            env::set_var("LIVE_MODEL", "models/custom-live");
            env::set_var("LIVE_VOICE", "Puck");
            env::set_var("TTS_MODEL", "custom-tts");
            env::set_var("TTS_VOICE", "Aoede");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.gemini_api_key, Some("test-key".to_string()));
        assert_eq!(config.live_model, "models/custom-live");
        assert_eq!(config.live_voice, "Puck");
        assert_eq!(config.tts_model, "custom-tts");
        assert_eq!(config.tts_voice, "Aoede");
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    #[serial]
    fn invalid_log_level_is_rejected() {
        clear_env_vars();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
        }
    }

    #[test]
    fn config_error_display() {
        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }
}
