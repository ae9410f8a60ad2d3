//! Process configuration
//!
//! Settings are read once at start-up from the environment (a `.env` file is
//! loaded first when present). Missing variables fall back to defaults;
//! malformed ones are reported instead of silently ignored.

use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

use crate::cart::models::CartLimits;

#[derive(Debug, Error)]
#[error("Invalid value for {var}: {message}")]
pub struct ConfigError {
    pub var: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_host: String,
    pub server_port: u16,
    pub api_prefix: String,
    pub api_version: String,

    pub ollama_base_url: String,
    pub ollama_model: String,
    pub ollama_temperature: f32,
    pub ollama_max_tokens: u32,
    pub ollama_timeout_secs: u64,
    pub ai_enabled: bool,

    pub max_cart_items: usize,
    pub max_item_quantity: u32,
    pub max_modifier_quantity: u32,
    pub max_conversation_age_secs: u64,
    pub cleanup_interval_secs: u64,

    pub log_level: String,
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let limits = CartLimits::default();
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            api_prefix: "/api".to_string(),
            api_version: "v1".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "qwen2.5:latest".to_string(),
            ollama_temperature: 0.7,
            ollama_max_tokens: 1000,
            ollama_timeout_secs: 30,
            ai_enabled: true,
            max_cart_items: limits.max_items,
            max_item_quantity: limits.max_item_quantity,
            max_modifier_quantity: limits.max_modifier_quantity,
            max_conversation_age_secs: 86_400,
            cleanup_interval_secs: 3_600,
            log_level: "info".to_string(),
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let string = |name: &str, default: String| lookup(name).unwrap_or(default);
        let raw = |name: &str| lookup(name).map(|v| v.trim().to_string());

        let settings = Self {
            server_host: string("SERVER_HOST", defaults.server_host),
            server_port: parse_or(raw("SERVER_PORT"), "SERVER_PORT", defaults.server_port)?,
            api_prefix: string("API_PREFIX", defaults.api_prefix),
            api_version: string("API_VERSION", defaults.api_version),
            ollama_base_url: string("OLLAMA_BASE_URL", defaults.ollama_base_url),
            ollama_model: string("OLLAMA_MODEL", defaults.ollama_model),
            ollama_temperature: parse_or(
                raw("OLLAMA_TEMPERATURE"),
                "OLLAMA_TEMPERATURE",
                defaults.ollama_temperature,
            )?,
            ollama_max_tokens: parse_or(
                raw("OLLAMA_MAX_TOKENS"),
                "OLLAMA_MAX_TOKENS",
                defaults.ollama_max_tokens,
            )?,
            ollama_timeout_secs: parse_or(
                raw("OLLAMA_TIMEOUT"),
                "OLLAMA_TIMEOUT",
                defaults.ollama_timeout_secs,
            )?,
            ai_enabled: parse_or(raw("AI_ENABLED"), "AI_ENABLED", defaults.ai_enabled)?,
            max_cart_items: parse_or(
                raw("MAX_CART_ITEMS"),
                "MAX_CART_ITEMS",
                defaults.max_cart_items,
            )?,
            max_item_quantity: parse_or(
                raw("MAX_ITEM_QUANTITY"),
                "MAX_ITEM_QUANTITY",
                defaults.max_item_quantity,
            )?,
            max_modifier_quantity: parse_or(
                raw("MAX_MODIFIER_QUANTITY"),
                "MAX_MODIFIER_QUANTITY",
                defaults.max_modifier_quantity,
            )?,
            max_conversation_age_secs: parse_or(
                raw("MAX_CONVERSATION_AGE"),
                "MAX_CONVERSATION_AGE",
                defaults.max_conversation_age_secs,
            )?,
            cleanup_interval_secs: parse_or(
                raw("STORAGE_CLEANUP_INTERVAL"),
                "STORAGE_CLEANUP_INTERVAL",
                defaults.cleanup_interval_secs,
            )?,
            log_level: string("LOG_LEVEL", defaults.log_level),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.cors_origins),
        };

        if settings.cleanup_interval_secs == 0 {
            return Err(ConfigError {
                var: "STORAGE_CLEANUP_INTERVAL".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        tracing::info!("Application configuration loaded successfully.");
        Ok(settings)
    }

    pub fn cart_limits(&self) -> CartLimits {
        CartLimits {
            max_items: self.max_cart_items,
            max_item_quantity: self.max_item_quantity,
            max_modifier_quantity: self.max_modifier_quantity,
            ..CartLimits::default()
        }
    }

    /// Path under which the cart routes are mounted, e.g. `/api/v1`.
    /// Always empty or starting with `/`, whatever slashes the settings carry.
    pub fn api_base_path(&self) -> String {
        [self.api_prefix.as_str(), self.api_version.as_str()]
            .iter()
            .map(|part| part.trim_matches('/'))
            .filter(|part| !part.is_empty())
            .map(|part| format!("/{}", part))
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama_timeout_secs)
    }

    pub fn max_conversation_age(&self) -> Duration {
        Duration::from_secs(self.max_conversation_age_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

fn parse_or<T>(raw: Option<String>, var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|e| ConfigError {
            var: var.to_string(),
            message: format!("'{}' ({})", value, e),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = Settings::from_lookup(|_| None).unwrap();

        assert_eq!(settings.server_port, 8000);
        assert_eq!(settings.max_cart_items, 50);
        assert_eq!(settings.max_conversation_age_secs, 86_400);
        assert_eq!(settings.ollama_model, "qwen2.5:latest");
        assert_eq!(settings.cors_origins, vec!["*".to_string()]);
        assert_eq!(settings.api_base_path(), "/api/v1");
    }

    #[test]
    fn test_overrides_are_applied() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("MAX_CART_ITEMS", "5"),
            ("OLLAMA_TIMEOUT", "3"),
            ("AI_ENABLED", "false"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("API_PREFIX", ""),
            ("API_VERSION", "v2"),
        ]))
        .unwrap();

        assert_eq!(settings.cart_limits().max_items, 5);
        assert_eq!(settings.ai_timeout(), Duration::from_secs(3));
        assert!(!settings.ai_enabled);
        assert_eq!(
            settings.cors_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(settings.api_base_path(), "/v2");
    }

    #[test]
    fn test_base_path_is_rooted_without_leading_slash() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("API_PREFIX", "api"),
            ("API_VERSION", "/v1/"),
        ]))
        .unwrap();
        assert_eq!(settings.api_base_path(), "/api/v1");

        let settings = Settings::from_lookup(lookup_from(&[
            ("API_PREFIX", "/"),
            ("API_VERSION", ""),
        ]))
        .unwrap();
        assert_eq!(settings.api_base_path(), "");
    }

    #[test]
    fn test_malformed_value_names_the_variable() {
        let err = Settings::from_lookup(lookup_from(&[("SERVER_PORT", "eighty")])).unwrap_err();
        assert_eq!(err.var, "SERVER_PORT");

        let err = Settings::from_lookup(lookup_from(&[("STORAGE_CLEANUP_INTERVAL", "0")]))
            .unwrap_err();
        assert_eq!(err.var, "STORAGE_CLEANUP_INTERVAL");
    }
}
