mod gateway;

use clap::{Parser, Subcommand};
use folio_channels::telegram::TelegramChannel;
use folio_core::{
    catalog::{self, TextCatalog},
    config::{self, shellexpand, Config, RelayFailurePolicy},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Folio: Telegram portfolio bot with a question relay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Telegram bot token.
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true, global = true)]
    bot_token: Option<String>,

    /// Chat id that receives relayed questions.
    #[arg(long, env = "ADMIN_CHAT_ID", global = true)]
    admin_chat_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Validate configuration and text bundles without connecting.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(&cli.config)?;
    cfg.apply_overrides(cli.bot_token.as_deref(), cli.admin_chat_id.as_deref())?;

    let _log_guard = init_logging(&cfg);

    match cli.command {
        Commands::Start => {
            let admin_chat_id = cfg.validate()?;
            let catalog = load_catalog(&cfg)?;

            let channel = Arc::new(TelegramChannel::new(cfg.telegram.clone()));

            println!("{}: starting bot...", cfg.folio.name);
            let gw = Arc::new(gateway::Gateway::new(
                channel,
                catalog,
                admin_chat_id,
                cfg.relay.on_failure,
                &cfg.gateway,
            ));
            gw.run().await?;
        }
        Commands::Check => {
            println!("{}: configuration check\n", cfg.folio.name);
            println!("Config: {}", cli.config);

            let admin = cfg.validate();
            let catalog = load_catalog(&cfg);

            match &admin {
                Ok(id) => println!("  telegram: configured (admin chat {id})"),
                Err(e) => println!("  telegram: {e}"),
            }
            match &catalog {
                Ok(c) => println!(
                    "  texts: {} keys per language ({}, {})",
                    c.key_count(),
                    cfg.langs.cn,
                    cfg.langs.en
                ),
                Err(e) => println!("  texts: {e}"),
            }
            println!("  relay failures: {:?}", cfg.relay.on_failure);

            if admin.is_err() || catalog.is_err() {
                anyhow::bail!("configuration check failed");
            }
        }
    }

    Ok(())
}

/// Load both text bundles, requiring the failure text when it can be shown.
fn load_catalog(cfg: &Config) -> anyhow::Result<TextCatalog> {
    let texts = TextCatalog::load(&cfg.langs)?;
    if cfg.relay.on_failure == RelayFailurePolicy::Report {
        texts.require(&[catalog::MESSAGE_FAILED])?;
    }
    Ok(texts)
}

/// Console logging, plus a daily-rolled file when `log_dir` is set.
///
/// `RUST_LOG` wins over the configured level. The returned guard must live
/// until exit so buffered file output is flushed.
fn init_logging(cfg: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.folio.log_level));

    let (file_layer, guard) = if cfg.folio.log_dir.is_empty() {
        (None, None)
    } else {
        let dir = shellexpand(&cfg.folio.log_dir);
        let appender = tracing_appender::rolling::daily(dir, "folio.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}
