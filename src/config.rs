use std::env;

use teloxide::types::{ChatId, UserId};

use crate::errors::{BotError, BotResult};
use crate::gate::ChannelRef;

/// Runtime configuration, read once at startup and immutable afterwards.
///
/// The bot token itself is consumed by `Bot::from_env()` (TELOXIDE_TOKEN).
#[derive(Debug, Clone)]
pub struct Config {
    /// Account that bypasses the membership gate and owns the admin commands
    pub owner_id: UserId,
    pub owner_username: Option<String>,
    /// Channel users must join before using the bot; `None` disables the gate
    pub force_sub_channel: Option<ChannelRef>,
    /// Chat that receives mirrored event lines; `None` disables mirroring
    pub log_channel: Option<ChatId>,
    /// Optional picture shown with the join prompt
    pub force_sub_banner_url: Option<String>,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> BotResult<Self> {
        let owner_id = env::var("OWNER_ID")
            .map_err(|_| BotError::config("OWNER_ID is not set"))?
            .trim()
            .parse::<u64>()
            .map(UserId)
            .map_err(|e| BotError::config(format!("OWNER_ID is not a valid user id: {}", e)))?;

        let force_sub_channel = env::var("FORCE_SUB_CHANNEL")
            .ok()
            .and_then(|raw| ChannelRef::parse(&raw));

        let log_channel = match env::var("LOG_CHANNEL_ID") {
            Ok(raw) if !raw.trim().is_empty() => {
                let id = raw.trim().parse::<i64>().map_err(|e| {
                    BotError::config(format!("LOG_CHANNEL_ID is not a valid chat id: {}", e))
                })?;
                Some(ChatId(id))
            }
            _ => None,
        };

        Ok(Self {
            owner_id,
            owner_username: env::var("OWNER_USERNAME").ok().filter(|s| !s.is_empty()),
            force_sub_channel,
            log_channel,
            force_sub_banner_url: env::var("FORCE_SUB_BANNER_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:coverbot.db?mode=rwc".to_string()),
        })
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        user_id == self.owner_id
    }
}
