use teloxide::{prelude::*, types::ParseMode};

use crate::{
    audit::AuditLog, commands::require_owner, config::Config, db::UserDb, errors::HandlerResult,
};

/// /broadcast <message> - send an announcement to every known user.
/// Per-user delivery failures (blocked bot, deleted account) are counted,
/// logged and skipped.
pub async fn broadcast(
    bot: Bot,
    msg: Message,
    args: String,
    config: Config,
    db: UserDb,
    audit: AuditLog,
) -> HandlerResult {
    if !require_owner(&bot, &msg, &config).await? {
        return Ok(());
    }

    let message_text = args.trim();
    if message_text.is_empty() {
        bot.send_message(
            msg.chat.id,
            "❌ <b>Usage:</b> /broadcast &lt;message&gt;\n\n\
             The message is sent to every user; HTML formatting is supported.",
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    }

    let user_ids = db.user_ids().await?;
    if user_ids.is_empty() {
        bot.send_message(msg.chat.id, "❌ There are no users in the database yet.")
            .await?;
        return Ok(());
    }

    let status_msg = bot
        .send_message(
            msg.chat.id,
            format!("📢 Broadcasting to {} users...", user_ids.len()),
        )
        .await?;

    let mut sent = 0usize;
    let mut failed = 0usize;
    for user_id in user_ids {
        let result = bot
            .send_message(
                ChatId(user_id),
                format!("📢 <b>Announcement</b>\n\n{}", message_text),
            )
            .parse_mode(ParseMode::Html)
            .await;

        match result {
            Ok(_) => sent += 1,
            Err(err) => {
                log::warn!("Could not deliver broadcast to user {}: {}", user_id, err);
                failed += 1;
            }
        }
    }

    bot.edit_message_text(
        msg.chat.id,
        status_msg.id,
        format!(
            "✅ <b>Broadcast Completed</b>\n\n📤 Sent: <b>{}</b>\n❌ Failed: <b>{}</b>",
            sent, failed
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    audit.send(format!(
        "📢 <b>Broadcast Sent</b>\nSent: {}\nFailed: {}\nMessage:\n{}",
        sent, failed, message_text
    ));
    Ok(())
}
