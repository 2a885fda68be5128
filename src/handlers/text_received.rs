use teloxide::prelude::*;

use crate::{
    config::Config,
    db::UserDb,
    errors::HandlerResult,
    gate::MembershipGate,
    handlers::ensure_access,
    schema::{MyDialogue, State},
};

pub async fn text_received(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    config: Config,
    db: UserDb,
    gate: MembershipGate,
) -> HandlerResult {
    if !ensure_access(&bot, &gate, &db, &config, &msg).await? {
        return Ok(());
    }

    let reply = match dialogue.get().await?.unwrap_or_default() {
        State::AwaitingThumbnail => {
            "❌ Please send an image, not text.\n\n📸 Send a JPG or PNG photo for your thumbnail."
        }
        State::AwaitingVideo => {
            "❌ Please send a video, not text.\n\n🎬 Send an MP4 or WebM video file."
        }
        State::Idle => {
            "💭 I'm a video cover tool.\n\nUse /start to open the menu and manage your thumbnails."
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
