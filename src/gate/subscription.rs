use std::future::Future;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use crate::config::BotConfig;

/// Membership statuses that count as subscribed.
const SUBSCRIBED_STATUSES: &[&str] = &["member", "administrator", "creator"];

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("membership request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("membership response has no usable status field")]
    UnexpectedPayload,
}

/// Answers "is this user subscribed to the required channel?". The gate
/// bounds every call with a timeout and treats any error as not subscribed,
/// so implementations report failures honestly rather than guessing.
pub trait SubscriptionChecker: Send + Sync {
    fn is_member(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<bool, SubscriptionError>> + Send;
}

/// Production checker backed by the bot platform's `getChatMember` query.
pub struct ChannelMembership {
    http: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    channel_id: i64,
}

impl ChannelMembership {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            channel_id: config.channel_id,
        }
    }

    fn member_url(&self) -> String {
        format!("{}/bot{}/getChatMember", self.api_base_url, self.bot_token)
    }
}

impl SubscriptionChecker for ChannelMembership {
    async fn is_member(&self, user_id: i64) -> Result<bool, SubscriptionError> {
        let response = self
            .http
            .get(self.member_url())
            .query(&[("chat_id", self.channel_id), ("user_id", user_id)])
            .send()
            .await?
            .error_for_status()?;

        let payload: JsonValue = response.json().await?;
        let status = payload
            .get("result")
            .and_then(|result| result.get("status"))
            .and_then(|status| status.as_str())
            .ok_or(SubscriptionError::UnexpectedPayload)?;

        debug!(user_id, status, "membership status resolved");
        Ok(SUBSCRIBED_STATUSES.contains(&status))
    }
}
