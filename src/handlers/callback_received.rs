use std::path::Path;

use teloxide::{
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MaybeInaccessibleMessage,
        MessageId, ParseMode,
    },
};
use tokio::fs;

use crate::{
    audit::AuditLog,
    commands::{home_keyboard, home_text},
    config::Config,
    db::UserDb,
    errors::HandlerResult,
    gate::{MembershipGate, VerifyOutcome},
    schema::{MyDialogue, State},
    utils::{MenuAction, thumbnail_path},
};

/// Dispatch for every inline button press. Unknown callback data is ignored
/// so stale keyboards from older bot versions don't produce errors.
pub async fn callback_received(
    bot: Bot,
    dialogue: MyDialogue,
    query: CallbackQuery,
    config: Config,
    db: UserDb,
    gate: MembershipGate,
    audit: AuditLog,
) -> HandlerResult {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Ok(action) = data.parse::<MenuAction>() else {
        log::debug!("Unknown callback action: {}", data);
        return Ok(());
    };

    let Some(message) = query.message.as_ref() else {
        return Ok(());
    };
    let (chat_id, message_id) = match message {
        MaybeInaccessibleMessage::Regular(m) => (m.chat.id, m.id),
        MaybeInaccessibleMessage::Inaccessible(m) => (m.chat.id, m.message_id),
    };

    let user = &query.from;
    let user_id = user.id.0 as i64;

    match action {
        MenuAction::Verify => match gate.verify(user.id).await {
            VerifyOutcome::Verified => {
                edit_prompt(
                    &bot,
                    chat_id,
                    message_id,
                    "✅ <b>Verification Successful!</b>\n\n\
                     You can now use all features of this bot.\n\n\
                     Use /start to open the menu.",
                )
                .await?;
                audit.user_event(user.id, user.username.as_deref(), "User verified");
            }
            VerifyOutcome::NotMember => {
                edit_prompt(
                    &bot,
                    chat_id,
                    message_id,
                    "❌ <b>Verification Failed</b>\n\n\
                     It seems you haven't joined the channel yet.\n\n\
                     Please join first, then press Verify again.",
                )
                .await?;
            }
            VerifyOutcome::Error(detail) => {
                edit_prompt(
                    &bot,
                    chat_id,
                    message_id,
                    format!(
                        "⚠️ <b>Verification Error</b>\n\n\
                         Could not check your membership. Please try again later.\n\
                         Error: {}",
                        detail
                    ),
                )
                .await?;
            }
        },

        MenuAction::Dismiss => {
            bot.delete_message(chat_id, message_id).await?;
        }

        MenuAction::SetThumbnail => {
            bot.edit_message_text(
                chat_id,
                message_id,
                "📸 <b>Set Thumbnail</b>\n\n\
                 Send me an image to use as your thumbnail.\n\n\
                 <i>Supported formats: JPG, PNG • Max size: 5 MB</i>\n\n\
                 ✋ Or send /cancel to go back.",
            )
            .parse_mode(ParseMode::Html)
            .await?;
            dialogue.update(State::AwaitingThumbnail).await?;
        }

        MenuAction::ApplyCover => {
            if db.has_thumbnail(user_id).await {
                bot.edit_message_text(
                    chat_id,
                    message_id,
                    "🎬 <b>Apply Thumbnail to Video</b>\n\n\
                     Send me a video and I'll apply your saved thumbnail as the cover.\n\n\
                     <i>Supported formats: MP4, WebM • Max size: 50 MB</i>\n\n\
                     ✋ Or send /cancel to go back.",
                )
                .parse_mode(ParseMode::Html)
                .await?;
                dialogue.update(State::AwaitingVideo).await?;
            } else {
                bot.edit_message_text(
                    chat_id,
                    message_id,
                    "❌ <b>No Thumbnail</b>\n\n\
                     You don't have a saved thumbnail yet.\n\n\
                     Please set one first with 📸 Set Thumbnail.",
                )
                .parse_mode(ParseMode::Html)
                .await?;
            }
        }

        MenuAction::ViewThumbnail => match db.thumbnail(user_id).await {
            Some(path) if Path::new(&path).exists() => {
                bot.send_photo(chat_id, InputFile::file(Path::new(&path)))
                    .caption("🖼️ <b>Your Saved Thumbnail</b>")
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
            _ => {
                bot.send_message(chat_id, "❌ You don't have a saved thumbnail yet.")
                    .await?;
            }
        },

        MenuAction::RemoveThumbnail => {
            if db.remove_thumbnail(user_id).await? {
                let _ = fs::remove_file(thumbnail_path(user_id)).await;
                audit.user_event(user.id, user.username.as_deref(), "Thumbnail removed");
                bot.edit_message_text(
                    chat_id,
                    message_id,
                    "✅ <b>Thumbnail Removed</b>\n\n\
                     Your saved thumbnail has been deleted. You can set a new one anytime.",
                )
                .parse_mode(ParseMode::Html)
                .await?;
            } else {
                bot.edit_message_text(
                    chat_id,
                    message_id,
                    "❌ <b>No Thumbnail</b>\n\nYou don't have a saved thumbnail to remove.",
                )
                .parse_mode(ParseMode::Html)
                .await?;
            }
        }

        MenuAction::Settings => {
            let thumb_status = if db.has_thumbnail(user_id).await {
                "✅ Saved"
            } else {
                "❌ Not set"
            };
            bot.edit_message_text(
                chat_id,
                message_id,
                format!(
                    "⚙️ <b>Your Settings</b>\n\n\
                     User ID: <code>{}</code>\n\
                     Thumbnail: {}",
                    user_id, thumb_status
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(back_keyboard())
            .await?;
        }

        MenuAction::Help => {
            bot.edit_message_text(
                chat_id,
                message_id,
                "ℹ️ <b>How to Use This Bot</b>\n\n\
                 1. 📸 Set Thumbnail, then send an image\n\
                 2. 🎬 Apply to Video, then send a video\n\
                 3. Download the result with your cover applied\n\n\
                 ⚠️ Keep images under 5 MB and videos under 50 MB.",
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(back_keyboard())
            .await?;
        }

        MenuAction::Home => {
            bot.edit_message_text(
                chat_id,
                message_id,
                home_text(&user.first_name, db.has_thumbnail(user_id).await),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(home_keyboard(config.is_owner(user.id)))
            .await?;
        }

        MenuAction::AdminPanel => {
            if !config.is_owner(user.id) {
                bot.send_message(chat_id, "❌ Unauthorized").await?;
                return Ok(());
            }
            bot.edit_message_text(
                chat_id,
                message_id,
                "🛡️ <b>Admin Control Panel</b>\n\n\
                 /stats — bot statistics\n\
                 /status — uptime\n\
                 /ban &lt;user_id&gt; [reason] — ban a user\n\
                 /unban &lt;user_id&gt; — lift a ban\n\
                 /broadcast &lt;message&gt; — announce to all users",
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(back_keyboard())
            .await?;
        }
    }

    Ok(())
}

fn back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🏠 Back to Home",
        MenuAction::Home.to_string(),
    )]])
}

/// The join prompt may have been sent as a photo with a caption, in which
/// case editing the text fails and the caption is edited instead.
async fn edit_prompt(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: impl Into<String>,
) -> HandlerResult {
    let text = text.into();
    let edited = bot
        .edit_message_text(chat_id, message_id, text.clone())
        .parse_mode(ParseMode::Html)
        .await;

    if edited.is_err() {
        bot.edit_message_caption(chat_id, message_id)
            .caption(text)
            .parse_mode(ParseMode::Html)
            .await?;
    }
    Ok(())
}
