use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};
use tokio::fs;

use crate::{
    audit::AuditLog,
    config::Config,
    db::UserDb,
    errors::HandlerResult,
    gate::MembershipGate,
    handlers::ensure_access,
    utils::{MenuAction, thumbnail_path},
};

pub async fn settings(
    bot: Bot,
    msg: Message,
    config: Config,
    db: UserDb,
    gate: MembershipGate,
) -> HandlerResult {
    if !ensure_access(&bot, &gate, &db, &config, &msg).await? {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    let thumb_status = if db.has_thumbnail(user_id).await {
        "✅ Saved & Ready"
    } else {
        "❌ Not Saved Yet"
    };

    let text = format!(
        "⚙️ <b>Settings</b>\n\n\
         👤 <b>Your Account:</b>\n\
         User ID: <code>{}</code>\n\n\
         🖼️ <b>Thumbnail Status:</b>\n\
         <b>{}</b>",
        user_id, thumb_status
    );

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🏠 Back to Home",
        MenuAction::Home.to_string(),
    )]]);

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// /delthumb - remove the saved thumbnail from the store and from disk
pub async fn del_thumb(
    bot: Bot,
    msg: Message,
    config: Config,
    db: UserDb,
    gate: MembershipGate,
    audit: AuditLog,
) -> HandlerResult {
    if !ensure_access(&bot, &gate, &db, &config, &msg).await? {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    if db.remove_thumbnail(user_id).await? {
        let _ = fs::remove_file(thumbnail_path(user_id)).await;
        audit.user_event(user.id, user.username.as_deref(), "Thumbnail removed");

        bot.send_message(
            msg.chat.id,
            "✅ <b>Thumbnail Removed</b>\n\nUpload a new one anytime!",
        )
        .parse_mode(ParseMode::Html)
        .await?;
    } else {
        bot.send_message(
            msg.chat.id,
            "⚠️ <b>No Thumbnail to Remove</b>\n\nYou haven't saved one yet. Send a photo first!",
        )
        .parse_mode(ParseMode::Html)
        .await?;
    }
    Ok(())
}
