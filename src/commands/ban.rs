use teloxide::{prelude::*, types::ParseMode};

use crate::{
    audit::AuditLog, commands::require_owner, config::Config, db::UserDb, errors::HandlerResult,
};

/// /ban <user_id> [reason]
pub async fn ban(
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

    let args = args.trim();
    let mut parts = args.splitn(2, char::is_whitespace);
    let user_id = match parts.next().unwrap_or("").parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            bot.send_message(
                msg.chat.id,
                "❌ Usage: /ban <user_id> [reason]\nExample: /ban 123456789 Spam",
            )
            .await?;
            return Ok(());
        }
    };
    let reason = parts.next().map(str::trim).filter(|r| !r.is_empty());

    db.ban(user_id, reason).await?;

    let reason_text = reason.unwrap_or("No reason");
    audit.send(format!(
        "🚫 <b>User Banned</b>\nUser ID: <code>{}</code>\nReason: {}",
        user_id, reason_text
    ));
    bot.send_message(
        msg.chat.id,
        format!("✅ <b>User {} Banned</b>\nReason: {}", user_id, reason_text),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

/// /unban <user_id>
pub async fn unban(
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

    let user_id = match args.trim().parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            bot.send_message(
                msg.chat.id,
                "❌ Usage: /unban <user_id>\nExample: /unban 123456789",
            )
            .await?;
            return Ok(());
        }
    };

    if db.unban(user_id).await? {
        audit.send(format!(
            "✅ <b>User Unbanned</b>\nUser ID: <code>{}</code>",
            user_id
        ));
        bot.send_message(msg.chat.id, format!("✅ User {} Unbanned", user_id))
            .await?;
    } else {
        bot.send_message(msg.chat.id, format!("❌ User {} was not banned", user_id))
            .await?;
    }
    Ok(())
}
