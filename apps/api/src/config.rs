use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_MODEL;
use crate::quiz::generator::{MAX_QUESTION_COUNT, MIN_QUESTION_COUNT};
use crate::quiz::session::TimerConfig;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a number does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Handoff entries live in Redis when set, in process memory otherwise.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub test_duration_minutes: u64,
    pub time_up_grace_secs: u64,
    pub role_question_count: usize,
    pub custom_question_count: usize,
    pub handoff_ttl_secs: u64,
    pub session_retention_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            redis_url: std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            test_duration_minutes: parse_env("TEST_DURATION_MINUTES", 15)?,
            time_up_grace_secs: parse_env("TIME_UP_GRACE_SECS", 3)?,
            role_question_count: parse_env("ROLE_QUESTION_COUNT", 20)?,
            custom_question_count: parse_env("CUSTOM_QUESTION_COUNT", 10)?,
            handoff_ttl_secs: parse_env("HANDOFF_TTL_SECS", 86_400)?,
            session_retention_secs: parse_env("SESSION_RETENTION_SECS", 600)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.test_duration_minutes == 0 {
            bail!("TEST_DURATION_MINUTES must be at least 1");
        }
        // Redis rejects `SET ... EX 0`.
        if self.handoff_ttl_secs == 0 {
            bail!("HANDOFF_TTL_SECS must be at least 1");
        }
        for (key, count) in [
            ("ROLE_QUESTION_COUNT", self.role_question_count),
            ("CUSTOM_QUESTION_COUNT", self.custom_question_count),
        ] {
            if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&count) {
                bail!("{key} must be between {MIN_QUESTION_COUNT} and {MAX_QUESTION_COUNT}");
            }
        }
        Ok(())
    }

    pub fn timer(&self) -> TimerConfig {
        TimerConfig {
            duration: Duration::from_secs(self.test_duration_minutes * 60),
            grace: Duration::from_secs(self.time_up_grace_secs),
            retention: Duration::from_secs(self.session_retention_secs),
        }
    }

    /// Defaults with a dummy key, for router tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: "test-key".to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            redis_url: None,
            port: 8080,
            rust_log: "info".to_string(),
            test_duration_minutes: 15,
            time_up_grace_secs: 3,
            role_question_count: 3,
            custom_question_count: 2,
            handoff_ttl_secs: 86_400,
            session_retention_secs: 600,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
