use std::path::Path;

use teloxide::{
    net::Download,
    prelude::*,
    types::{InputFile, ParseMode, Video},
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
    temp_file::TempFile,
    utils::{COVERS_DIR, ensure_dir},
    video::{self, VideoInfo},
};

const MAX_VIDEO_BYTES: u32 = 50 * 1024 * 1024;

pub async fn video_received(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    video: Video,
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

    if dialogue.get().await?.unwrap_or_default() != State::AwaitingVideo {
        bot.send_message(
            msg.chat.id,
            "💭 I'm not expecting a video right now.\n\n\
             Use /start and pick 🎬 Apply to Video first.",
        )
        .await?;
        return Ok(());
    }
    dialogue.exit().await?;

    let user_id = user.id.0 as i64;
    let Some(thumb) = db.thumbnail(user_id).await else {
        bot.send_message(
            msg.chat.id,
            "❌ You don't have a thumbnail set yet.\n\nPlease set a thumbnail first.",
        )
        .await?;
        return Ok(());
    };

    if video.file.size > MAX_VIDEO_BYTES {
        bot.send_message(
            msg.chat.id,
            "❌ That video is too big. Please keep videos under 50 MB.",
        )
        .await?;
        return Ok(());
    }

    ensure_dir(COVERS_DIR).await?;
    let input = TempFile::new(
        Path::new(COVERS_DIR).join(format!("{}_input.mp4", uuid::Uuid::new_v4())),
    );

    let file = bot.get_file(video.file.id.clone()).await?;
    let mut dst = fs::File::create(input.path()).await?;
    bot.download_file(&file.path, &mut dst).await?;

    let status_msg = bot
        .send_message(msg.chat.id, "🎬 Applying your cover...")
        .await?;

    let input_str = input.path().to_str().ok_or(ConversionError::NonUtf8Path)?;
    match VideoInfo::probe(input_str).await {
        Ok(info) => log::debug!(
            "Processing {}x{} video ({:.1}s) for user {}",
            info.width,
            info.height,
            info.duration,
            user_id
        ),
        Err(err) => {
            log::warn!("Rejecting upload from user {}: {}", user_id, err);
            bot.edit_message_text(
                msg.chat.id,
                status_msg.id,
                "❌ That file doesn't look like a playable video.",
            )
            .await?;
            return Ok(());
        }
    }

    let thumbnail = InputFile::file(Path::new(&thumb));
    match video::reencode_to_fit(input.path()).await {
        Ok(output_path) => {
            let output = TempFile::new(&output_path);
            bot.send_document(msg.chat.id, InputFile::file(output.path()))
                .caption(
                    "✅ <b>Video Ready!</b>\n\n\
                     Your video with the thumbnail cover is ready to download.",
                )
                .parse_mode(ParseMode::Html)
                .thumbnail(thumbnail)
                .await?;
        }
        Err(err) => {
            // ffmpeg missing or the encode failed: return the original file
            // with the cover attached instead of nothing
            log::warn!("Re-encode failed, sending the original video: {}", err);
            bot.send_video(msg.chat.id, InputFile::file(input.path()))
                .caption("✅ <b>Video Ready!</b>")
                .parse_mode(ParseMode::Html)
                .thumbnail(thumbnail)
                .await?;
        }
    }

    let _ = bot.delete_message(msg.chat.id, status_msg.id).await;
    audit.user_event(user.id, user.username.as_deref(), "Applied cover to video");

    Ok(())
}
