use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use shift_report_bot::config::Config;
use shift_report_bot::database::{self, SqliteDirectory};
use shift_report_bot::engine::Engine;
use shift_report_bot::handlers::{broadcast, command, telegram::TelegramMessenger, update};

const SWEEP_EVERY: Duration = Duration::from_secs(60 * 60);
const SESSION_IDLE_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    log::info!("Starting shift report bot");

    let config = Config::from_env()?;
    log::debug!("Database location: {:?}", config.database_location);
    log::debug!("Admins: {:?}", config.admin_ids);

    let db = database::open(&config.database_location).await?;

    let bot = Bot::from_env().parse_mode(ParseMode::Html);

    if let Err(e) = command::register_commands(&bot).await {
        log::warn!("Could not register bot commands: {:?}", e);
    }

    let engine = Engine::new(
        Arc::new(TelegramMessenger::new(bot.clone())),
        Arc::new(SqliteDirectory::new(db)),
        Arc::new(broadcast::TelegramBroadcaster::new(bot.clone())),
        Arc::new(config.report),
        config.admin_ids.clone(),
    );

    let sweeper = Arc::clone(&engine);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_EVERY);
        loop {
            interval.tick().await;
            sweeper.sweep_sessions(SESSION_IDLE_LIMIT);
        }
    });

    let tree = dptree::entry()
        .branch(Update::filter_message().endpoint(update::receive_message))
        .branch(Update::filter_callback_query().endpoint(update::receive_callback));

    log::debug!("Starting dispatcher");

    Dispatcher::builder(bot.clone(), tree)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher stopped, notifying admins");
    broadcast::notify_stopped(&bot, &config.admin_ids).await;

    Ok(())
}
