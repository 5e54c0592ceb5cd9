use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub channel_id: i64,
    pub channel_username: String,
    pub daily_limit: u32,
    pub subscription_timeout_secs: u64,
    pub api_base_url: String,
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: 0,
            channel_username: String::new(),
            daily_limit: 10,
            subscription_timeout_secs: 5,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(token) = env::var("BOT_TOKEN") {
            cfg.bot_token = token;
        }
        if let Ok(id) = env::var("CHANNEL_ID") {
            cfg.channel_id = id.parse().context("CHANNEL_ID must be a valid integer")?;
        }
        if let Ok(username) = env::var("CHANNEL_USERNAME") {
            cfg.channel_username = username.trim_start_matches('@').to_string();
        }
        if let Ok(limit) = env::var("DAILY_LIMIT") {
            cfg.daily_limit = limit
                .parse()
                .context("DAILY_LIMIT must be a positive integer")?;
        }
        if let Ok(secs) = env::var("SUBSCRIPTION_TIMEOUT_SECS") {
            cfg.subscription_timeout_secs = secs
                .parse()
                .context("SUBSCRIPTION_TIMEOUT_SECS must be a positive integer")?;
        }
        if let Ok(url) = env::var("BOT_API_BASE_URL") {
            if !url.trim().is_empty() {
                cfg.api_base_url = url;
            }
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            cfg.log_level = level;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN must be set");
        }
        if self.channel_id == 0 {
            anyhow::bail!("CHANNEL_ID must be set");
        }
        if self.channel_username.trim().is_empty() {
            anyhow::bail!("CHANNEL_USERNAME must be set");
        }
        if self.daily_limit == 0 {
            anyhow::bail!("DAILY_LIMIT must be greater than zero");
        }
        if self.subscription_timeout_secs == 0 {
            anyhow::bail!("SUBSCRIPTION_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn subscription_timeout(&self) -> Duration {
        Duration::from_secs(self.subscription_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> BotConfig {
        BotConfig {
            bot_token: "123:abc".to_string(),
            channel_id: -1001234567890,
            channel_username: "my_channel".to_string(),
            ..BotConfig::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut cfg = valid();
        cfg.bot_token = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_missing_channel_rejected() {
        let mut cfg = valid();
        cfg.channel_id = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut cfg = valid();
        cfg.daily_limit = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut cfg = valid();
        cfg.subscription_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_default_timeout_is_five_seconds() {
        assert_eq!(valid().subscription_timeout(), Duration::from_secs(5));
    }
}
