use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ollama_url: String,
    pub ai_model: String,
    pub ai_timeout: Duration,
    /// Hard ceiling on one generation run, all stages included.
    pub run_timeout: Duration,
    pub tmp_dir: String,
    pub smtp: Option<SmtpConfig>,
    pub port: u16,
    pub rust_log: String,
}

/// SMTP settings for email delivery. Absent when EMAIL delivery is not
/// configured; sending then fails with a configuration error instead of
/// panicking.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ai_model: std::env::var("AI_MODEL").unwrap_or_else(|_| "mistral".to_string()),
            ai_timeout: Duration::from_secs(parse_env_u64("AI_TIMEOUT", 60)?),
            run_timeout: Duration::from_secs(parse_env_u64("RUN_TIMEOUT", 180)?),
            tmp_dir: std::env::var("TMP_DIR").unwrap_or_else(|_| "tmp".to_string()),
            smtp: SmtpConfig::from_env()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl SmtpConfig {
    /// Returns `None` unless SMTP_SERVER is set; the remaining fields are
    /// then required.
    fn from_env() -> Result<Option<Self>> {
        let server = match std::env::var("SMTP_SERVER") {
            Ok(s) if !s.trim().is_empty() => s,
            _ => return Ok(None),
        };
        Ok(Some(SmtpConfig {
            server,
            port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse::<u16>()
                .context("SMTP_PORT must be a valid port number")?,
            username: require_env("SMTP_USERNAME")?,
            password: require_env("SMTP_PASSWORD")?,
            from_email: require_env("SMTP_FROM_EMAIL")?,
        }))
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .with_context(|| format!("{key} must be a number of seconds")),
        Err(_) => Ok(default),
    }
}
