//! Configuration module for the bot.
//!
//! This module contains the configuration structure and environment variable handling
//! for the Twitter/X OAuth client, the OpenAI completion client and the schedulers.

use log::{debug, info, warn};
use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default HTTP port for the callback server.
pub const DEFAULT_PORT: u16 = 3000;
/// Default model used for completions.
pub const DEFAULT_MODEL: &str = "gpt-4";
/// Default interval between scheduled posts.
pub const DEFAULT_POST_INTERVAL_SECS: u64 = 3600;

/// Runtime configuration, read once at startup.
///
/// Secrets are held as plain strings; `Debug` is implemented by hand so they
/// never end up in log output.
#[derive(Clone)]
pub struct BotConfig {
    /// OAuth 2.0 client id of the Twitter app
    pub client_id: String,
    /// OAuth 2.0 client secret of the Twitter app
    pub client_secret: String,
    /// API key for the completion API
    pub openai_api_key: String,
    /// Model name sent with every completion request
    pub openai_model: String,
    /// Public base URL of this service, without trailing slash
    pub app_url: String,
    /// Port for the callback server
    pub port: u16,
    /// Interval between scheduled posts
    pub post_interval: Duration,
    /// Interval between mention polls; `None` leaves mention replies unscheduled
    pub mention_poll_interval: Option<Duration>,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("client_id", &mask_secret(&self.client_id))
            .field("client_secret", &"[REDACTED]")
            .field("openai_api_key", &"[REDACTED]")
            .field("openai_model", &self.openai_model)
            .field("app_url", &self.app_url)
            .field("port", &self.port)
            .field("post_interval", &self.post_interval)
            .field("mention_poll_interval", &self.mention_poll_interval)
            .finish()
    }
}

impl BotConfig {
    /// Loads the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Required Environment Variables
    ///
    /// - `TWITTER_CLIENT_ID`, `TWITTER_CLIENT_SECRET`: OAuth 2.0 app credentials
    /// - `OPENAI_API_KEY`: completion API key
    /// - `APP_URL`: public base URL, used to build the `/callback` redirect URI
    ///
    /// # Optional Environment Variables
    ///
    /// - `PORT` (default 3000)
    /// - `OPENAI_MODEL` (default `gpt-4`)
    /// - `POST_INTERVAL_SECS` (default 3600)
    /// - `MENTION_POLL_INTERVAL_SECS` (unset disables mention replies)
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => warn!("Failed to read .env file: {}", e),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("Loading bot configuration");

        let required = |key: &'static str| -> Result<String, ConfigError> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(ConfigError::Missing(key)),
            }
        };

        let client_id = required("TWITTER_CLIENT_ID")?;
        debug!("Client ID (masked): {}", mask_secret(&client_id));
        let client_secret = required("TWITTER_CLIENT_SECRET")?;
        let openai_api_key = required("OPENAI_API_KEY")?;
        let app_url = required("APP_URL")?.trim_end_matches('/').to_string();

        let port = match lookup("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw, "port number")?,
            None => DEFAULT_PORT,
        };

        let openai_model = lookup("OPENAI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let post_interval = match lookup("POST_INTERVAL_SECS") {
            Some(raw) => positive_secs("POST_INTERVAL_SECS", &raw)?,
            None => Duration::from_secs(DEFAULT_POST_INTERVAL_SECS),
        };

        let mention_poll_interval = match lookup("MENTION_POLL_INTERVAL_SECS") {
            Some(raw) if !raw.trim().is_empty() => {
                Some(positive_secs("MENTION_POLL_INTERVAL_SECS", &raw)?)
            }
            _ => {
                info!("MENTION_POLL_INTERVAL_SECS not set - mention replies are disabled");
                None
            }
        };

        let config = BotConfig {
            client_id,
            client_secret,
            openai_api_key,
            openai_model,
            app_url,
            port,
            post_interval,
            mention_poll_interval,
        };
        info!("Bot configuration loaded successfully");
        debug!("{:?}", config);
        Ok(config)
    }

    /// The OAuth redirect URI registered with the Twitter app.
    pub fn redirect_uri(&self) -> String {
        format!("{}/callback", self.app_url)
    }

    /// The URL an operator visits to start the OAuth flow.
    pub fn auth_url(&self) -> String {
        format!("{}/auth", self.app_url)
    }
}

/// Masks a secret for logging, keeping at most the first and last 8 characters.
pub(crate) fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let len = chars.len();
    if len > 16 {
        let prefix: String = chars[..8].iter().collect();
        let suffix: String = chars[len - 8..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        let prefix: String = chars.iter().take(len.min(8) / 2).collect();
        format!("{}...", prefix)
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    raw: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        expected,
        value: raw.to_string(),
    })
}

fn positive_secs(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_number(key, raw, "positive number of seconds")?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            expected: "positive number of seconds",
            value: raw.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
