// src/config.rs

use std::{env, net::SocketAddr, str::FromStr};

use dotenvy::dotenv;
use thiserror::Error;

/// What happens to a quiz's questions and results when the quiz is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizDeletePolicy {
    /// Questions and results are deleted together with the quiz.
    Cascade,
    /// Questions and results stay in storage, pointing at a missing quiz.
    Orphan,
}

impl FromStr for QuizDeletePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "orphan" => Ok(Self::Orphan),
            other => Err(ConfigError::Invalid {
                key: "QUIZ_DELETE_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub log_dir: String,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub quiz_delete_policy: QuizDeletePolicy,
    /// Minimum percentage of correct answers for a quiz attempt to count as passed.
    pub passing_score_percentage: u8,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiration = token_lifetime(parsed("JWT_EXPIRATION", 86_400)?)?;
        let bind_addr = parsed("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;
        let quiz_delete_policy = parsed("QUIZ_DELETE_POLICY", QuizDeletePolicy::Orphan)?;

        let passing_score_percentage: u8 = parsed("PASSING_SCORE_PERCENTAGE", 60)?;
        if passing_score_percentage > 100 {
            return Err(ConfigError::Invalid {
                key: "PASSING_SCORE_PERCENTAGE",
                value: passing_score_percentage.to_string(),
            });
        }

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            log_dir,
            bind_addr,
            cors_origins,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            quiz_delete_policy,
            passing_score_percentage,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

/// Longest accepted token lifetime: one year.
pub const MAX_JWT_EXPIRATION: u64 = 365 * 24 * 60 * 60;

fn token_lifetime(seconds: u64) -> Result<u64, ConfigError> {
    if seconds == 0 || seconds > MAX_JWT_EXPIRATION {
        return Err(ConfigError::Invalid {
            key: "JWT_EXPIRATION",
            value: seconds.to_string(),
        });
    }
    Ok(seconds)
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
