mod audit;
mod commands;
mod config;
mod db;
mod errors;
mod gate;
mod handlers;
mod migrations;
mod schema;
mod temp_file;
mod utils;
mod video;

use std::sync::Arc;

use teloxide::{dispatching::dialogue::InMemStorage, prelude::*};

use crate::{
    audit::AuditLog,
    config::Config,
    db::UserDb,
    gate::{MembershipGate, VerifiedCache},
    schema::{State, schema},
    utils::{COVERS_DIR, StartedAt, THUMBNAILS_DIR, clear_dir, ensure_dir},
};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();
    log::info!("Starting cover bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Bad configuration: {}", e);
            return;
        }
    };

    let bot = Bot::from_env();

    let db = match UserDb::connect(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("Could not open the user database: {}", e);
            return;
        }
    };

    for dir in [THUMBNAILS_DIR, COVERS_DIR] {
        if let Err(e) = ensure_dir(dir).await {
            log::error!("Could not create directory {}: {}", dir, e);
            return;
        }
    }

    match &config.force_sub_channel {
        Some(channel) => log::info!("Membership gate enabled for {:?}", channel),
        None => log::info!("Membership gate disabled (no channel configured)"),
    }

    let gate = MembershipGate::new(
        Arc::new(bot.clone()),
        config.force_sub_channel.clone(),
        config.owner_id,
        VerifiedCache::new(),
    );
    let audit = AuditLog::new(bot.clone(), config.log_channel);

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![
            InMemStorage::<State>::new(),
            config,
            db,
            gate,
            audit,
            StartedAt::now()
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    // Scratch videos are worthless across restarts; saved thumbnails stay
    if let Err(e) = clear_dir(COVERS_DIR).await {
        log::warn!("Could not clean {}: {}", COVERS_DIR, e);
    }
}
