//! Configuration types.
//!
//! Everything is read from the environment once at startup and never
//! changes afterwards.

use chrono::NaiveTime;
use secrecy::SecretString;

use crate::error::ConfigError;

/// Keywords tracked when `DIGEST_KEYWORDS` is not set.
pub const DEFAULT_KEYWORDS: &[&str] = &["AI", "比特幣", "加密", "ETH", "BTC", "Layer2"];

/// Command that triggers a report on demand.
pub const DEFAULT_MANUAL_COMMAND: &str = "testsummary";

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token. `None` runs the bot on the CLI channel.
    pub telegram_token: Option<SecretString>,
    /// Telegram usernames or numeric ids allowed to talk to the bot (`*` = everyone).
    pub allowed_users: Vec<String>,
    /// Chat whose messages are collected.
    pub group_id: String,
    /// Chat that receives the daily report.
    pub report_chat_id: String,
    /// Tracked keywords, in tie-break order.
    pub keywords: Vec<String>,
    /// Local wall-clock time of the daily report.
    pub report_time: NaiveTime,
    /// Manual trigger command, without the leading slash.
    pub manual_command: String,
}

impl BotConfig {
    /// Load the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        let allowed_users = split_list(
            &std::env::var("TELEGRAM_ALLOWED_USERS").unwrap_or_else(|_| "*".to_string()),
        );

        let group_id = required("DIGEST_GROUP_ID")?;
        let report_chat_id = required("DIGEST_REPORT_CHAT_ID")?;

        let keywords = match std::env::var("DIGEST_KEYWORDS") {
            Ok(raw) => split_list(&raw),
            Err(_) => DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        };

        let report_time = match std::env::var("DIGEST_REPORT_TIME") {
            Ok(raw) => parse_report_time(&raw)?,
            Err(_) => default_report_time(),
        };

        let manual_command = std::env::var("DIGEST_MANUAL_COMMAND")
            .map(|c| c.trim().trim_start_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_MANUAL_COMMAND.to_string());

        let config = Self {
            telegram_token,
            allowed_users,
            group_id,
            report_chat_id,
            keywords,
            report_time,
            manual_command,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the rest of the bot relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_id == self.report_chat_id {
            return Err(ConfigError::InvalidValue {
                key: "DIGEST_REPORT_CHAT_ID".to_string(),
                message: "must differ from DIGEST_GROUP_ID".to_string(),
            });
        }
        if self.manual_command.is_empty() || self.manual_command.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                key: "DIGEST_MANUAL_COMMAND".to_string(),
                message: format!("'{}' is not a valid command name", self.manual_command),
            });
        }
        validate_keywords(&self.keywords)
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_report_time() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default()
}

/// Parse an `HH:MM` wall-clock time.
pub fn parse_report_time(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| ConfigError::InvalidValue {
        key: "DIGEST_REPORT_TIME".to_string(),
        message: format!("expected HH:MM, got '{raw}': {e}"),
    })
}

/// Keywords are matched against whitespace-separated tokens, so each one
/// must be a single non-empty token and appear once.
pub fn validate_keywords(keywords: &[String]) -> Result<(), ConfigError> {
    if keywords.is_empty() {
        return Err(ConfigError::InvalidVocabulary(
            "at least one keyword is required".to_string(),
        ));
    }
    for (i, keyword) in keywords.iter().enumerate() {
        if keyword.is_empty() || keyword.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidVocabulary(format!(
                "'{keyword}' must be a single token"
            )));
        }
        if keywords[..i].contains(keyword) {
            return Err(ConfigError::InvalidVocabulary(format!(
                "'{keyword}' is listed twice"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BotConfig {
        BotConfig {
            telegram_token: None,
            allowed_users: vec!["*".into()],
            group_id: "-100".into(),
            report_chat_id: "-200".into(),
            keywords: vec!["AI".into(), "BTC".into()],
            report_time: default_report_time(),
            manual_command: DEFAULT_MANUAL_COMMAND.into(),
        }
    }

    #[test]
    fn default_time_is_eight_pm() {
        assert_eq!(default_report_time(), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
    }

    #[test]
    fn parse_report_time_accepts_hh_mm() {
        let t = parse_report_time(" 07:30 ").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    }

    #[test]
    fn parse_report_time_rejects_garbage() {
        assert!(parse_report_time("8pm").is_err());
        assert!(parse_report_time("25:00").is_err());
    }

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(split_list(" AI, BTC ,,ETH"), vec!["AI", "BTC", "ETH"]);
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn group_and_report_chat_must_differ() {
        let mut c = config();
        c.report_chat_id = c.group_id.clone();
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "DIGEST_REPORT_CHAT_ID"
        ));
    }

    #[test]
    fn empty_vocabulary_rejected() {
        assert!(matches!(
            validate_keywords(&[]),
            Err(ConfigError::InvalidVocabulary(_))
        ));
    }

    #[test]
    fn multi_token_keyword_rejected() {
        let keywords = vec!["Layer 2".to_string()];
        assert!(validate_keywords(&keywords).is_err());
    }

    #[test]
    fn duplicate_keyword_rejected() {
        let keywords = vec!["BTC".to_string(), "ETH".to_string(), "BTC".to_string()];
        let err = validate_keywords(&keywords).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn default_keywords_are_valid() {
        let keywords: Vec<String> = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect();
        assert!(validate_keywords(&keywords).is_ok());
    }

    #[test]
    fn command_with_space_rejected() {
        let mut c = config();
        c.manual_command = "test summary".into();
        assert!(c.validate().is_err());
    }
}
