use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::reply::Locale;

const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";
const DEFAULT_LINE_DATA_API_BASE: &str = "https://api-data.line.me";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub line: LineConfig,
    pub recognizer: RecognizerConfig,
    pub reference_secret: String,
    pub locale: Locale,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public URL the bot is reachable at; thumbnail links are built from it.
    pub base_url: String,
    pub callback_path: String,
}

#[derive(Clone, Debug)]
pub struct LineConfig {
    pub channel_secret: String,
    pub channel_token: String,
    pub api_base: String,
    pub data_api_base: String,
}

#[derive(Clone, Debug)]
pub struct RecognizerConfig {
    pub endpoint: String,
    pub admin_email: String,
    pub admin_token: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let port = get("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;
        let timeout_secs = get("RECOGNIZER_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .context("RECOGNIZER_TIMEOUT_SECS must be a number of seconds")?;
        let locale = get("BOT_LOCALE", "en")
            .parse::<Locale>()
            .map_err(|e| anyhow!(e))?;

        let mut callback_path = get("CALLBACK_PATH", "/callback");
        if !callback_path.starts_with('/') {
            callback_path.insert(0, '/');
        }

        Ok(Self {
            server: ServerConfig {
                host: get("HOST", "0.0.0.0"),
                port,
                base_url: require("APP_URL")?.trim_end_matches('/').to_string(),
                callback_path,
            },
            line: LineConfig {
                channel_secret: require("CHANNEL_SECRET")?,
                channel_token: require("CHANNEL_TOKEN")?,
                api_base: get("LINE_API_BASE", DEFAULT_LINE_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
                data_api_base: get("LINE_DATA_API_BASE", DEFAULT_LINE_DATA_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
            },
            recognizer: RecognizerConfig {
                endpoint: require("RECOGNIZER_API_ENDPOINT")?,
                admin_email: require("RECOGNIZER_ADMIN_EMAIL")?,
                admin_token: require("RECOGNIZER_ADMIN_TOKEN")?,
                timeout: Duration::from_secs(timeout_secs),
            },
            reference_secret: require("REFERENCE_SECRET")?,
            locale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("APP_URL", "https://bot.example.com/"),
            ("CHANNEL_SECRET", "secret"),
            ("CHANNEL_TOKEN", "token"),
            ("RECOGNIZER_API_ENDPOINT", "https://face.example.com/api"),
            ("RECOGNIZER_ADMIN_EMAIL", "admin@example.com"),
            ("RECOGNIZER_ADMIN_TOKEN", "admin-token"),
            ("REFERENCE_SECRET", "correct horse battery staple"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig> {
        AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).expect("config");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.base_url, "https://bot.example.com");
        assert_eq!(config.server.callback_path, "/callback");
        assert_eq!(config.line.api_base, DEFAULT_LINE_API_BASE);
        assert_eq!(config.recognizer.timeout, Duration::from_secs(30));
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_callback_path_gets_leading_slash() {
        let mut env = base_env();
        env.insert("CALLBACK_PATH", "hook");
        let config = load(&env).expect("config");

        assert_eq!(config.server.callback_path, "/hook");
    }

    #[test]
    fn test_missing_secret_fails() {
        let mut env = base_env();
        env.remove("REFERENCE_SECRET");

        let err = load(&env).expect_err("missing secret must fail");
        assert!(err.to_string().contains("REFERENCE_SECRET"));
    }

    #[test]
    fn test_invalid_port_fails() {
        let mut env = base_env();
        env.insert("PORT", "not-a-port");

        assert!(load(&env).is_err());
    }

    #[test]
    fn test_locale_parsed() {
        let mut env = base_env();
        env.insert("BOT_LOCALE", "ja");

        assert_eq!(load(&env).expect("config").locale, Locale::Ja);
    }
}
