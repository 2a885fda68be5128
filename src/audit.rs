use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode, UserId};

/// Best-effort mirror of notable events to the configured log channel.
///
/// Delivery happens from a spawned task; failures only reach the process log
/// and never block the calling handler.
#[derive(Clone)]
pub struct AuditLog {
    bot: Bot,
    chat: Option<ChatId>,
}

impl AuditLog {
    pub fn new(bot: Bot, chat: Option<ChatId>) -> Self {
        Self { bot, chat }
    }

    pub fn send(&self, text: impl Into<String>) {
        let Some(chat) = self.chat else {
            log::debug!("Log channel not configured, dropping audit line");
            return;
        };

        let bot = self.bot.clone();
        let text = text.into();
        tokio::spawn(async move {
            if let Err(err) = bot.send_message(chat, text).parse_mode(ParseMode::Html).await {
                log::warn!("Failed to deliver audit line to log channel: {}", err);
            }
        });
    }

    /// Standard one-user event line
    pub fn user_event(&self, user_id: UserId, username: Option<&str>, action: &str) {
        self.send(format!(
            "👤 <b>{}</b>\nUser ID: <code>{}</code>\nUsername: @{}",
            action,
            user_id,
            username.unwrap_or("N/A")
        ));
    }
}
