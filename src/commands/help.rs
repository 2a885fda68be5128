use teloxide::{prelude::*, types::ParseMode};

use crate::{
    config::Config, db::UserDb, errors::HandlerResult, gate::MembershipGate,
    handlers::ensure_access,
};

pub async fn help(
    bot: Bot,
    msg: Message,
    config: Config,
    db: UserDb,
    gate: MembershipGate,
) -> HandlerResult {
    if !ensure_access(&bot, &gate, &db, &config, &msg).await? {
        return Ok(());
    }

    let text = "📖 <b>How to Use This Bot</b>\n\n\
        1️⃣ <b>Upload Your Thumbnail</b>\n\
        Pick 📸 Set Thumbnail and send a photo. It is saved automatically.\n\n\
        2️⃣ <b>Apply to Videos</b>\n\
        Pick 🎬 Apply to Video and send a video file. Your saved thumbnail \
        becomes its cover.\n\n\
        3️⃣ <b>Download &amp; Share</b>\n\
        The bot sends the video back, ready to forward.\n\n\
        💡 <b>Tips:</b>\n\
        • Keep images under 5 MB and videos under 50 MB\n\
        • You can replace the thumbnail anytime\n\
        • /delthumb removes the saved thumbnail";

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub async fn about(
    bot: Bot,
    msg: Message,
    config: Config,
    db: UserDb,
    gate: MembershipGate,
) -> HandlerResult {
    if !ensure_access(&bot, &gate, &db, &config, &msg).await? {
        return Ok(());
    }

    let developer = config.owner_username.as_deref().unwrap_or("the bot owner");
    let text = format!(
        "🤖 <b>About This Bot</b>\n\n\
         A small tool for applying a custom thumbnail to your videos.\n\n\
         ⭐ <b>Features:</b>\n\
         ✅ One saved thumbnail per user\n\
         ✅ One-step cover application\n\
         ✅ ffmpeg-powered processing\n\n\
         💬 <b>Support:</b>\n\
         👨‍💻 Developer: @{}",
        developer
    );

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
