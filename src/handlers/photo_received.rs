use teloxide::{
    net::Download,
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode, PhotoSize},
};
use tokio::fs;

use crate::{
    audit::AuditLog,
    config::Config,
    db::UserDb,
    errors::{ConversionError, HandlerResult},
    gate::MembershipGate,
    handlers::ensure_access,
    schema::{MyDialogue, State},
    utils::{MenuAction, THUMBNAILS_DIR, ensure_dir, thumbnail_path},
};

const MAX_THUMBNAIL_BYTES: u32 = 5 * 1024 * 1024;

pub async fn photo_received(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    photos: Vec<PhotoSize>,
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

    if dialogue.get().await?.unwrap_or_default() != State::AwaitingThumbnail {
        bot.send_message(
            msg.chat.id,
            "💭 I'm not expecting a photo right now.\n\n\
             Use /start and pick 📸 Set Thumbnail to upload one.",
        )
        .await?;
        return Ok(());
    }
    dialogue.exit().await?;

    // Telegram lists sizes smallest to largest
    let Some(photo) = photos.last() else {
        return Ok(());
    };
    if photo.file.size > MAX_THUMBNAIL_BYTES {
        bot.send_message(
            msg.chat.id,
            "❌ That image is too big. Please keep thumbnails under 5 MB.",
        )
        .await?;
        return Ok(());
    }

    ensure_dir(THUMBNAILS_DIR).await?;
    let user_id = user.id.0 as i64;
    let path = thumbnail_path(user_id);

    let file = bot.get_file(photo.file.id.clone()).await?;
    let mut dst = fs::File::create(&path).await?;
    bot.download_file(&file.path, &mut dst).await?;

    db.set_thumbnail(user_id, path.to_str().ok_or(ConversionError::NonUtf8Path)?)
        .await?;
    audit.user_event(user.id, user.username.as_deref(), "Thumbnail set");

    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("🏠 Home", MenuAction::Home.to_string()),
        InlineKeyboardButton::callback("👀 View", MenuAction::ViewThumbnail.to_string()),
    ]]);

    bot.send_photo(msg.chat.id, InputFile::file(&path))
        .caption("✅ <b>Thumbnail Saved!</b>\n\nYour thumbnail is ready to use.")
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;

    Ok(())
}
