use teloxide::{
    dispatching::{
        UpdateHandler,
        dialogue::{self, InMemStorage},
    },
    prelude::*,
    utils::command::BotCommands,
};

use crate::{
    commands::*,
    errors::BotError,
    handlers::{callback_received, photo_received, text_received, video_received},
};

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;

/// What kind of upload the user's next message is expected to carry.
/// One value per user, so a new menu choice simply replaces the old one.
#[derive(Clone, Default, PartialEq)]
pub enum State {
    #[default]
    Idle,
    AwaitingThumbnail,
    AwaitingVideo,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Open the home menu
    Start,
    /// How to use the bot
    Help,
    /// About this bot
    About,
    /// Your account and thumbnail status
    Settings,
    /// Remove your saved thumbnail
    DelThumb,
    /// Cancel the pending upload
    Cancel,
    /// Ban a user (admin): /ban <user_id> [reason]
    Ban(String),
    /// Unban a user (admin): /unban <user_id>
    Unban(String),
    /// Bot statistics (admin)
    Stats,
    /// Uptime (admin)
    Status,
    /// Send an announcement to all users (admin)
    Broadcast(String),
}

pub fn schema() -> UpdateHandler<BotError> {
    use dptree::case;

    dialogue::enter::<Update, InMemStorage<State>, State, _>()
        .branch(
            Update::filter_message()
                .branch(
                    teloxide::filter_command::<Command, _>()
                        .branch(case![Command::Start].endpoint(start))
                        .branch(case![Command::Help].endpoint(help))
                        .branch(case![Command::About].endpoint(about))
                        .branch(case![Command::Settings].endpoint(settings))
                        .branch(case![Command::DelThumb].endpoint(del_thumb))
                        .branch(case![Command::Cancel].endpoint(cancel))
                        .branch(case![Command::Ban(args)].endpoint(ban))
                        .branch(case![Command::Unban(args)].endpoint(unban))
                        .branch(case![Command::Stats].endpoint(stats))
                        .branch(case![Command::Status].endpoint(status))
                        .branch(case![Command::Broadcast(args)].endpoint(broadcast)),
                )
                .branch(Message::filter_photo().endpoint(photo_received))
                .branch(Message::filter_video().endpoint(video_received))
                .branch(Message::filter_text().endpoint(text_received)),
        )
        .branch(Update::filter_callback_query().endpoint(callback_received))
}
