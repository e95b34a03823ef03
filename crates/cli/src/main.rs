use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "storebot")]
#[command(about = "WhatsApp storefront responder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Write a default config file (does nothing if it already exists).
    Init {
        /// Config file path (default: STOREBOT_CONFIG_PATH or ./storebot.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook server (GET /, GET|POST /webhook, POST /whatsapp).
    Serve {
        /// Config file path (default: STOREBOT_CONFIG_PATH or ./storebot.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from PORT, config, or 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the reply the bot would send for one message (quick rules, then the LLM).
    Reply {
        /// Config file path (default: STOREBOT_CONFIG_PATH or ./storebot.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Customer message text
        message: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("storebot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("server failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Reply { config, message }) => {
            if let Err(e) = run_reply(config, message).await {
                log::error!("reply failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(storebot::config::default_config_path);
    if storebot::init::init_config_file(&path)? {
        println!("wrote default config to {}", path.display());
    } else {
        println!("config already exists at {}", path.display());
    }
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = storebot::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting server on {}:{} (config: {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    storebot::gateway::run_gateway(config).await
}

async fn run_reply(config_path: Option<std::path::PathBuf>, message: String) -> anyhow::Result<()> {
    let (config, _) = storebot::config::load_config(config_path)?;
    let rules = storebot::rules::QuickRules::from_config(&config.business);
    let fallback = storebot::fallback::CompletionFallback::from_config(&config)?;
    let result = storebot::agent::run_turn(&rules, &fallback, message.trim()).await;
    log::debug!("reply source: {:?}", result.source);
    println!("{}", result.content);
    Ok(())
}
