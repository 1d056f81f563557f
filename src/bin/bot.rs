use anyhow::Result;
use dotenvy::dotenv;
use log::{info, warn};
use std::sync::Arc;

use whisperbot::commands::handlers::{reminder_handlers, LogsHandler, RollHandler};
use whisperbot::commands::CommandOptions;
use whisperbot::core::Config;
use whisperbot::gateway::ConsoleTransport;
use whisperbot::ChatBot;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting whisper bot...");

    let transport = Arc::new(ConsoleTransport::new(config.console_nick.clone()));
    let bot = ChatBot::from_config(&config, transport)?;

    if bot.is_anonymous() {
        warn!("BOT_AUTH_TOKEN not set, running anonymously with only built-in commands");
    } else {
        bot.on_command(
            "roll",
            &["r"],
            CommandOptions::default(),
            Arc::new(RollHandler::new()),
        )
        .await?;

        let (remind_me, reminders) = reminder_handlers();
        bot.on_command("remindme", &[], CommandOptions::default(), Arc::new(remind_me))
            .await?;
        bot.on_command("reminders", &[], CommandOptions::default(), Arc::new(reminders))
            .await?;

        match &config.logs_base_url {
            Some(base_url) => {
                bot.on_command(
                    "logs",
                    &["log"],
                    CommandOptions::default().optional_trailing(),
                    Arc::new(LogsHandler::new(base_url.clone())),
                )
                .await?;
            }
            None => info!("LOGS_BASE_URL not set, logs command disabled"),
        }
    }

    info!(
        "Type whispers as {}, commands start with {:?}",
        config.console_nick, config.command_prefix
    );
    bot.run_forever().await
}
