use clap::Parser;
use manifest_dl::{Config, run_bot};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "manifest-dl")]
#[command(author, version, about = "Telegram bot that downloads lists of mpd/m3u8 streams as MP4")]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, env = "MANIFEST_DL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; real deployments set the variables directly.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "manifest_dl=debug,teloxide=info".to_string()
        } else {
            "manifest_dl=info,teloxide=warn".to_string()
        }
    });
    tracing_subscriber::fmt().with_env_filter(&env_filter).init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let config = match Config::load(cli.config.as_deref()).and_then(|c| c.validate().map(|()| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(code = e.error_code(), "invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        tracing::info!(
            owner_id = config.bot.owner_id,
            delivery_target = ?config.bot.delivery_target,
            "configuration is valid"
        );
        return ExitCode::SUCCESS;
    }

    match run_bot(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "bot failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
