mod callback_received;
mod photo_received;
mod text_received;
mod video_received;

pub use callback_received::callback_received;
pub use photo_received::photo_received;
pub use text_received::text_received;
pub use video_received::video_received;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode},
};
use url::Url;

use crate::{
    config::Config,
    db::UserDb,
    errors::BotResult,
    gate::{Decision, JoinPrompt, MembershipGate},
};

/// Front door for every user-facing endpoint: drops banned users silently
/// and runs the membership gate, showing the join prompt when it blocks.
/// Returns false when the caller should stop handling the update.
pub async fn ensure_access(
    bot: &Bot,
    gate: &MembershipGate,
    db: &UserDb,
    config: &Config,
    msg: &Message,
) -> BotResult<bool> {
    let Some(user) = msg.from.as_ref() else {
        // Channel posts and service messages have no author to gate
        return Ok(false);
    };

    if db.is_banned(user.id.0 as i64).await {
        log::debug!("Ignoring update from banned user {}", user.id);
        return Ok(false);
    }

    match gate.authorize(user.id).await {
        Decision::Allowed => Ok(true),
        Decision::Blocked(prompt) => {
            log::info!("User {} blocked by the membership gate", user.id);
            send_join_prompt(bot, config, msg.chat.id, &prompt).await?;
            Ok(false)
        }
    }
}

pub async fn send_join_prompt(
    bot: &Bot,
    config: &Config,
    chat_id: ChatId,
    prompt: &JoinPrompt,
) -> BotResult<()> {
    let text = format!(
        "🔐 <b>Channel Verification Required</b>\n\n\
         To access all features of this bot, join our community channel:\n\n\
         <b>📢 {}</b>\n\n\
         👇 <b>Join the channel and verify to continue</b> 👇",
        prompt.channel_name
    );
    let keyboard = join_keyboard(prompt)?;

    let banner = config
        .force_sub_banner_url
        .as_deref()
        .and_then(|raw| Url::parse(raw).ok());
    if let Some(banner) = banner {
        let sent = bot
            .send_photo(chat_id, InputFile::url(banner))
            .caption(text.clone())
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard.clone())
            .await;
        match sent {
            Ok(_) => return Ok(()),
            Err(err) => {
                log::warn!("Could not send join banner, falling back to text: {}", err)
            }
        }
    }

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

fn join_keyboard(prompt: &JoinPrompt) -> BotResult<InlineKeyboardMarkup> {
    let join_url = prompt.invite_link.parse::<Url>()?;
    Ok(InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url("📢 Join Channel", join_url)],
        vec![
            InlineKeyboardButton::callback("✅ Verify", prompt.verify_action.to_string()),
            InlineKeyboardButton::callback("✖️ Close", prompt.dismiss_action.to_string()),
        ],
    ]))
}
