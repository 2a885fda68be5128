mod ban;
mod broadcast;
mod cancel;
mod help;
mod settings;
mod start;
mod stats;

pub use ban::{ban, unban};
pub use broadcast::broadcast;
pub use cancel::cancel;
pub use help::{about, help};
pub use settings::{del_thumb, settings};
pub use start::{home_keyboard, home_text, start};
pub use stats::{stats, status};

use teloxide::prelude::*;

use crate::config::Config;
use crate::errors::BotResult;

/// Admin commands are owner-only; everyone else gets a refusal.
pub(crate) async fn require_owner(bot: &Bot, msg: &Message, config: &Config) -> BotResult<bool> {
    if msg.from.as_ref().is_some_and(|u| config.is_owner(u.id)) {
        return Ok(true);
    }
    bot.send_message(msg.chat.id, "❌ You are not authorized to use this command.")
        .await?;
    Ok(false)
}
