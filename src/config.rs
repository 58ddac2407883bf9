use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::api_connection::endpoints::{DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};

pub const PROVIDER_ENV_VAR: &str = "NOURISH_PROVIDER";
pub const STORE_DIR_ENV_VAR: &str = "NOURISH_STORE_DIR";
pub const TEXT_MODEL_ENV_VAR: &str = "NOURISH_TEXT_MODEL";
pub const IMAGE_MODEL_ENV_VAR: &str = "NOURISH_IMAGE_MODEL";
pub const API_BASE_ENV_VAR: &str = "GEMINI_API_BASE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    /// Canned offline replies, no network.
    Fake,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "fake" | "offline" => Ok(ProviderKind::Fake),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Process-wide settings, read once at start and passed to the services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub provider: ProviderKind,
    /// `None` means no durable storage is available.
    pub store_dir: Option<PathBuf>,
    pub image_attempts: usize,
    pub image_backoff_unit: Duration,
    pub intro_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            provider: ProviderKind::Gemini,
            store_dir: default_store_dir(),
            image_attempts: 2,
            image_backoff_unit: Duration::from_millis(1000),
            intro_delay: Duration::from_millis(2500),
        }
    }
}

impl AppConfig {
    /// Credential variables, checked in this order; the first non-empty wins.
    pub const API_KEY_VARS: &'static [&'static str] = &[
        "GEMINI_API_KEY",
        "GOOGLE_API_KEY",
        "VITE_API_KEY",
        "REACT_APP_API_KEY",
        "API_KEY",
        "APA_KEY",
    ];

    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let provider = match non_empty(PROVIDER_ENV_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!("{}: {}; using gemini", PROVIDER_ENV_VAR, err);
                ProviderKind::Gemini
            }),
            None => ProviderKind::Gemini,
        };

        let defaults = Self::default();
        Self {
            api_key: Self::API_KEY_VARS.iter().find_map(|key| non_empty(*key)),
            api_base: non_empty(API_BASE_ENV_VAR).unwrap_or(defaults.api_base),
            text_model: non_empty(TEXT_MODEL_ENV_VAR).unwrap_or(defaults.text_model),
            image_model: non_empty(IMAGE_MODEL_ENV_VAR).unwrap_or(defaults.image_model),
            provider,
            store_dir: non_empty(STORE_DIR_ENV_VAR)
                .map(PathBuf::from)
                .or(defaults.store_dir),
            ..defaults
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

fn default_store_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("nourish"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn no_credentials_when_nothing_is_set() {
        let config = config_from(&[]);
        assert!(config.api_key.is_none());
        assert!(!config.has_credentials());
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
    }

    #[test]
    fn credential_priority_follows_fixed_order() {
        let config = config_from(&[("API_KEY", "generic"), ("VITE_API_KEY", "vite")]);
        assert_eq!(config.api_key.as_deref(), Some("vite"));

        let config = config_from(&[("API_KEY", "generic"), ("GEMINI_API_KEY", "gemini")]);
        assert_eq!(config.api_key.as_deref(), Some("gemini"));
    }

    #[test]
    fn blank_credentials_are_skipped() {
        let config = config_from(&[("GEMINI_API_KEY", "   "), ("APA_KEY", "typo-key")]);
        assert_eq!(config.api_key.as_deref(), Some("typo-key"));
    }

    #[test]
    fn overrides_models_store_and_provider() {
        let config = config_from(&[
            (TEXT_MODEL_ENV_VAR, "gemini-x"),
            (IMAGE_MODEL_ENV_VAR, "gemini-x-image"),
            (STORE_DIR_ENV_VAR, "/tmp/nourish-test"),
            (PROVIDER_ENV_VAR, "Fake"),
        ]);
        assert_eq!(config.text_model, "gemini-x");
        assert_eq!(config.image_model, "gemini-x-image");
        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/nourish-test")));
        assert_eq!(config.provider, ProviderKind::Fake);
    }

    #[test]
    fn unknown_provider_falls_back_to_gemini() {
        let config = config_from(&[(PROVIDER_ENV_VAR, "openai")]);
        assert_eq!(config.provider, ProviderKind::Gemini);
    }
}
