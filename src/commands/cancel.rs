use teloxide::prelude::*;

use crate::{
    config::Config, db::UserDb, errors::HandlerResult, gate::MembershipGate,
    handlers::ensure_access, schema::MyDialogue,
};

pub async fn cancel(
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

    dialogue.exit().await?;
    bot.send_message(msg.chat.id, "❌ Cancelled. Use /start to open the menu.")
        .await?;
    Ok(())
}
