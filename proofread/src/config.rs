//! Client configuration loaded from defaults and the environment.

use std::{fmt, time::Duration};

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ProofreadError, Result};

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

/// Deadline used when `TIMEOUT_MS` is not set.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Variables read verbatim as strings, and the fields they populate.
const STRING_ENV_KEYS: &[(&str, &str)] =
    &[("GEMINI_API_KEY", "api_key"), ("GEMINI_MODEL", "model")];

const TIMEOUT_ENV_KEY: &str = "TIMEOUT_MS";

/// Debug logging is on only when this variable is exactly `true`.
const DEBUG_ENV_KEY: &str = "DEBUG_GEMINI_LOGS";

/// Settings for the model client and the deadline around it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
    /// Logs raw responses and call timings at debug level.
    pub debug_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug_logs: false,
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("debug_logs", &self.debug_logs)
            .finish()
    }
}

impl Settings {
    /// Load settings from defaults overridden by environment variables.
    ///
    /// Reads `GEMINI_API_KEY`, `GEMINI_MODEL`, `TIMEOUT_MS` and
    /// `DEBUG_GEMINI_LOGS`.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::InvalidConfig`] if a variable has the wrong
    /// type or the resulting settings fail [`Settings::validate`].
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    /// The figment `load` extracts from. Exposed so callers can merge more
    /// providers on top.
    pub fn figment() -> Figment {
        let timeout = Env::raw().filter_map(|key| {
            key.as_str()
                .eq_ignore_ascii_case(TIMEOUT_ENV_KEY)
                .then(|| "timeout_ms".into())
        });
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(timeout);

        // `Env` would parse `12345` as a number and `true` as a bool, so
        // these go in untyped.
        for (var, field) in STRING_ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(field, value));
            }
        }
        if let Ok(value) = std::env::var(DEBUG_ENV_KEY) {
            figment = figment.merge(Serialized::default("debug_logs", value == "true"));
        }

        figment
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ProofreadError::InvalidConfig(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ProofreadError::InvalidConfig("model must not be blank".into()));
        }
        Ok(())
    }

    /// Returns the API key if one is configured and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings =
            Settings::from_figment(Figment::from(Serialized::defaults(Settings::default())))
                .unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.timeout(), Duration::from_secs(60));
        assert_eq!(settings.api_key(), None);
        assert!(!settings.debug_logs);
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("GEMINI_API_KEY", "secret");
            jail.set_env("GEMINI_MODEL", "gemini-2.5-flash");
            jail.set_env("TIMEOUT_MS", "1500");
            jail.set_env("DEBUG_GEMINI_LOGS", "true");

            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.api_key(), Some("secret"));
            assert_eq!(settings.model, "gemini-2.5-flash");
            assert_eq!(settings.timeout_ms, 1500);
            assert!(settings.debug_logs);
            Ok(())
        });
    }

    #[test]
    fn test_debug_flag_only_exact_true() {
        let cases = [
            ("true", true),
            ("1", false),
            ("yes", false),
            ("TRUE", false),
            ("", false),
        ];
        for (value, expected) in cases {
            Jail::expect_with(|jail| {
                jail.set_env("DEBUG_GEMINI_LOGS", value);
                let settings = Settings::load().map_err(|e| e.to_string())?;
                assert_eq!(settings.debug_logs, expected, "DEBUG_GEMINI_LOGS={value}");
                Ok(())
            });
        }
    }

    #[test]
    fn test_numeric_key_and_model_kept_verbatim() {
        Jail::expect_with(|jail| {
            jail.set_env("GEMINI_API_KEY", "00123");
            jail.set_env("GEMINI_MODEL", "2");
            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.api_key(), Some("00123"));
            assert_eq!(settings.model, "2");
            Ok(())
        });
    }

    #[test]
    fn test_boolean_looking_key_kept_verbatim() {
        Jail::expect_with(|jail| {
            jail.set_env("GEMINI_API_KEY", "true");
            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.api_key(), Some("true"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_timeout_type() {
        Jail::expect_with(|jail| {
            jail.set_env("TIMEOUT_MS", "soon");
            let err = Settings::load().unwrap_err();
            assert!(matches!(err, ProofreadError::InvalidConfig(_)));
            Ok(())
        });
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let settings = Settings {
            timeout_ms: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_blank_key_is_absent() {
        let settings = Settings::default().with_api_key("   ");
        assert_eq!(settings.api_key(), None);
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = Settings::default().with_api_key("secret");
        let printed = format!("{settings:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
