use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use astra_core::AstraConfig;
use astra_discord::{BotContext, DiscordAdapter};

mod signal;

/// Astra Discord bot: starboard, rotating presence and slash commands.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file (default: $ASTRA_CONFIG, then ~/.astra/astra.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "astra_bot=info,astra_discord=info,astra_starboard=info,astra_presence=info".into()
            }),
        )
        .init();

    let args = Args::parse();

    // load config: --config > ASTRA_CONFIG env > ~/.astra/astra.toml
    let config_path = args.config.or_else(|| std::env::var("ASTRA_CONFIG").ok());
    let config = AstraConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        AstraConfig::default()
    });

    info!(
        application_id = ?config.discord.application_id,
        guild_id = ?config.discord.guild_id,
        triggers = config.triggers.len(),
        "astra starting"
    );

    let ctx = Arc::new(BotContext::from_config(&config));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut bot = tokio::spawn(DiscordAdapter::new(ctx).run(shutdown_rx));

    tokio::select! {
        _ = signal::shutdown_signal() => {
            info!("shutdown requested");
            let _ = shutdown_tx.send(true);
            bot.await??;
        }
        result = &mut bot => {
            // The adapter only returns early on a fatal setup error.
            result??;
        }
    }

    info!("astra stopped");
    Ok(())
}
