use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use crate::{
    audit::AuditLog,
    config::Config,
    db::UserDb,
    errors::HandlerResult,
    gate::MembershipGate,
    handlers::ensure_access,
    utils::MenuAction,
};

pub async fn start(
    bot: Bot,
    msg: Message,
    config: Config,
    db: UserDb,
    gate: MembershipGate,
    audit: AuditLog,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    // Register the account before gating so first contact is always recorded
    let first_contact = db
        .ensure_user(user_id, user.username.as_deref(), Some(&user.first_name))
        .await?;
    if first_contact {
        audit.user_event(user.id, user.username.as_deref(), "New user started the bot");
    }

    if !ensure_access(&bot, &gate, &db, &config, &msg).await? {
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        home_text(&user.first_name, db.has_thumbnail(user_id).await),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(home_keyboard(config.is_owner(user.id)))
    .await?;

    Ok(())
}

pub fn home_text(first_name: &str, has_thumbnail: bool) -> String {
    let thumb_status = if has_thumbnail {
        "✅ Thumbnail saved"
    } else {
        "❌ No thumbnail yet"
    };

    format!(
        "👋 Welcome, <b>{}</b>!\n\n\
         <b>📊 Your Status:</b>\n\
         • {}\n\n\
         <b>What would you like to do?</b>\n\
         Use the buttons below to manage your thumbnails.",
        first_name, thumb_status
    )
}

pub fn home_keyboard(is_owner: bool) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![
            InlineKeyboardButton::callback("📸 Set Thumbnail", MenuAction::SetThumbnail.to_string()),
            InlineKeyboardButton::callback("🎬 Apply to Video", MenuAction::ApplyCover.to_string()),
        ],
        vec![
            InlineKeyboardButton::callback(
                "👀 View Thumbnail",
                MenuAction::ViewThumbnail.to_string(),
            ),
            InlineKeyboardButton::callback(
                "🗑️ Remove Thumbnail",
                MenuAction::RemoveThumbnail.to_string(),
            ),
        ],
        vec![
            InlineKeyboardButton::callback("⚙️ Settings", MenuAction::Settings.to_string()),
            InlineKeyboardButton::callback("ℹ️ Help", MenuAction::Help.to_string()),
        ],
    ];

    if is_owner {
        rows.push(vec![InlineKeyboardButton::callback(
            "🛡️ Admin Panel",
            MenuAction::AdminPanel.to_string(),
        )]);
    }

    InlineKeyboardMarkup::new(rows)
}
