use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use queuebot::application::errors::BotError;
use queuebot::application::services::{Queuebot, Runtime};
use queuebot::domain::entities::{Id, Message, User};
use queuebot::domain::traits::SuggestionStore;
use queuebot::extensions::{builtin_catalog, discover};
use queuebot::infrastructure::adapters::ConsoleAdapter;
use queuebot::infrastructure::config::Config;
use queuebot::infrastructure::database::Database;
use queuebot::infrastructure::storage::MemoryStore;

/// Channel id used for every console message
const CONSOLE_CHANNEL: Id = 1;

#[derive(Parser)]
#[command(name = "queuebot")]
#[command(about = "A chat bot core with hot-reloadable extensions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot against the console adapter
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// List extension candidates in the configured directory
    Extensions,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let config = load_config(&cli.config);
            if let Err(e) = async_runtime().block_on(run_bot(config)) {
                tracing::error!("Bot stopped with error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("queuebot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
        Commands::Extensions => {
            let config = load_config(&cli.config);
            let catalog = builtin_catalog();
            match async_runtime().block_on(discover(&config.extensions.directory)) {
                Ok(names) => {
                    for name in names {
                        let known = if catalog.contains(&name) { "" } else { " (unknown)" };
                        println!("{}{}", name, known);
                    }
                    println!("Built in: {}", catalog.names().join(", "));
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn async_runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn open_store(config: &Config) -> Arc<dyn SuggestionStore> {
    match Database::new(&config.database.path) {
        Ok(db) => {
            tracing::info!("Database initialized at {}", config.database.path.display());
            Arc::new(db)
        }
        Err(e) => {
            tracing::error!("Failed to initialize database: {}, using in-memory store", e);
            Arc::new(MemoryStore::new())
        }
    }
}

async fn run_bot(config: Config) -> Result<(), BotError> {
    tracing::info!("Starting queuebot: {}", config.bot.name);

    let store = open_store(&config);
    let adapter = ConsoleAdapter::new();
    let author: User = adapter.owner().clone();
    let auto_load = config.extensions.auto_load;

    let runtime = Runtime::new(config, Arc::new(adapter), store);
    let bot = Queuebot::new(runtime, builtin_catalog());

    if auto_load {
        match bot.load_extensions().await {
            Ok(report) => {
                for e in &report.failed {
                    tracing::warn!("{}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to load extensions: {}", e),
        }
    }
    bot.ready().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut next_id: Id = 1;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }
        if let Some(target) = input.strip_prefix(":reload") {
            console_reload(&bot, target.trim()).await;
            continue;
        }

        let message = Message::new(next_id, CONSOLE_CHANNEL, author.clone(), input);
        next_id += 1;
        if let Err(e) = bot.on_message(message).await {
            tracing::error!("Failed to handle message: {}", e);
        }
    }

    bot.close().await
}

/// `:reload` reloads every startup extension, `:reload <name>` just one
async fn console_reload(bot: &Queuebot, target: &str) {
    if target.is_empty() {
        for e in bot.reload_all().await {
            tracing::warn!("{}", e);
        }
        println!("Loaded: {:?}", bot.loaded_extensions().await);
    } else if let Err(e) = bot.reload(target).await {
        println!("{}", e);
    }
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render config: {}", e),
    }
}
