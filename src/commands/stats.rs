use teloxide::{prelude::*, types::ParseMode};

use crate::{
    commands::require_owner,
    config::Config,
    db::UserDb,
    errors::HandlerResult,
    utils::StartedAt,
};

pub async fn stats(bot: Bot, msg: Message, config: Config, db: UserDb) -> HandlerResult {
    if !require_owner(&bot, &msg, &config).await? {
        return Ok(());
    }

    let stats = db.stats().await?;
    let text = format!(
        "📊 <b>Bot Statistics</b>\n\n\
         👥 Total Users: <b>{}</b>\n\
         🚫 Banned Users: <b>{}</b>\n\
         🖼 Users with Thumbnail: <b>{}</b>",
        stats.total_users, stats.banned_users, stats.users_with_thumbnail
    );

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub async fn status(bot: Bot, msg: Message, config: Config, started: StartedAt) -> HandlerResult {
    if !require_owner(&bot, &msg, &config).await? {
        return Ok(());
    }

    let text = format!(
        "⏱️ <b>Bot Status</b>\n\n\
         🟢 Status: <b>Online</b>\n\
         ⏰ Uptime: <b>{}</b>",
        started.uptime_text()
    );

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
