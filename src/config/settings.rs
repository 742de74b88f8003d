use crate::error::{EmailBotError, Result};
use crate::directory::DEFAULT_TTL;
use crate::lookup::{ClassifierPolicy, DEFAULT_DIRECTORY_TIMEOUT};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: SlackConfig,
    pub server: ServerConfig,
    pub lookup: LookupConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub signing_secret: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub events_path: String,
}

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub classifier: ClassifierPolicy,
    pub ignore_subtypes: bool,
    pub name_fragments: bool,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub directory_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierPolicy::default(),
            ignore_subtypes: true,
            name_fragments: false,
            cache_enabled: true,
            cache_ttl: DEFAULT_TTL,
            directory_timeout: DEFAULT_DIRECTORY_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = EmailBotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(EmailBotError::Config(format!(
                "Invalid LOG_FORMAT: {other}"
            ))),
        }
    }
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    Settings::from_lookup(|key| std::env::var(key).ok())
}

impl Settings {
    /// Build settings from an arbitrary key lookup (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let slack = SlackConfig {
            bot_token: required(&lookup, "SLACK_BOT_TOKEN")?,
            signing_secret: required(&lookup, "SLACK_SIGNING_SECRET")?,
        };

        let server = ServerConfig {
            listen_addr: parsed(&lookup, "LISTEN_ADDR", "0.0.0.0:3000")?,
            events_path: lookup("SLACK_EVENTS_PATH").unwrap_or_else(|| "/api/slack".to_string()),
        };
        if !server.events_path.starts_with('/') {
            return Err(EmailBotError::Config(
                "SLACK_EVENTS_PATH must start with '/'".to_string(),
            ));
        }

        let lookup_config = LookupConfig {
            classifier: parsed(&lookup, "CLASSIFIER_POLICY", "context")?,
            ignore_subtypes: parsed(&lookup, "IGNORE_SUBTYPED_MESSAGES", "true")?,
            name_fragments: parsed(&lookup, "NAME_FRAGMENT_MATCHING", "false")?,
            cache_enabled: parsed(&lookup, "LOOKUP_CACHE_ENABLED", "true")?,
            cache_ttl: Duration::from_secs(parsed(&lookup, "LOOKUP_CACHE_TTL_SECS", "300")?),
            directory_timeout: Duration::from_secs(parsed(
                &lookup,
                "DIRECTORY_TIMEOUT_SECS",
                "10",
            )?),
        };
        if lookup_config.directory_timeout.is_zero() {
            return Err(EmailBotError::Config(
                "DIRECTORY_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        let log_format = parsed(&lookup, "LOG_FORMAT", "pretty")?;

        Ok(Settings {
            slack,
            server,
            lookup: lookup_config,
            log_format,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| EmailBotError::Config(format!("{key} not set")))
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T> {
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| EmailBotError::Config(format!("Invalid {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRETS: [(&str, &str); 2] = [
        ("SLACK_BOT_TOKEN", "xoxb-test"),
        ("SLACK_SIGNING_SECRET", "test-secret"),
    ];

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(env(&SECRETS)).unwrap();

        assert_eq!(settings.slack.bot_token, "xoxb-test");
        assert_eq!(settings.server.listen_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(settings.server.events_path, "/api/slack");
        assert_eq!(settings.lookup.classifier, ClassifierPolicy::Context);
        assert!(settings.lookup.ignore_subtypes);
        assert!(!settings.lookup.name_fragments);
        assert!(settings.lookup.cache_enabled);
        assert_eq!(settings.lookup.cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.lookup.directory_timeout, Duration::from_secs(10));
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = Settings::from_lookup(env(&[("SLACK_BOT_TOKEN", "xoxb-test")])).unwrap_err();
        assert!(matches!(err, EmailBotError::Config(msg) if msg.contains("SLACK_SIGNING_SECRET")));
    }

    #[test]
    fn test_blank_secret_is_fatal() {
        let err = Settings::from_lookup(env(&[
            ("SLACK_BOT_TOKEN", "  "),
            ("SLACK_SIGNING_SECRET", "test-secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, EmailBotError::Config(msg) if msg.contains("SLACK_BOT_TOKEN")));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = SECRETS.to_vec();
        pairs.extend([
            ("CLASSIFIER_POLICY", "keyword"),
            ("NAME_FRAGMENT_MATCHING", "true"),
            ("LOOKUP_CACHE_TTL_SECS", "60"),
            ("LOG_FORMAT", "json"),
            ("LISTEN_ADDR", "127.0.0.1:8080"),
        ]);
        let settings = Settings::from_lookup(env(&pairs)).unwrap();

        assert_eq!(settings.lookup.classifier, ClassifierPolicy::Keyword);
        assert!(settings.lookup.name_fragments);
        assert_eq!(settings.lookup.cache_ttl, Duration::from_secs(60));
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.server.listen_addr.port(), 8080);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("CLASSIFIER_POLICY", "fuzzy"));
        assert!(Settings::from_lookup(env(&pairs)).is_err());

        let mut pairs = SECRETS.to_vec();
        pairs.push(("DIRECTORY_TIMEOUT_SECS", "0"));
        assert!(Settings::from_lookup(env(&pairs)).is_err());

        let mut pairs = SECRETS.to_vec();
        pairs.push(("SLACK_EVENTS_PATH", "api/slack"));
        assert!(Settings::from_lookup(env(&pairs)).is_err());
    }
}
