use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "keyfeed-cli")]
#[command(about = "Generate a YML product feed from the catalog API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate the feed once and write it to a file or stdout
    Generate {
        /// Output path; stdout when omitted
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Exit non-zero when the feed was built from an incomplete catalog
        #[arg(long)]
        strict: bool,
    },
    /// Print the resolved configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = keyfeed_core::load_app_config()?;

    // Logs go to stderr so stdout stays clean for the feed.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Generate { out, strict }) => run_generate(&config, out, strict).await,
        Some(Commands::Config) => {
            println!("{config:#?}");
            Ok(())
        }
        None => {
            println!("keyfeed-cli: run `keyfeed-cli generate --help` for usage");
            Ok(())
        }
    }
}

async fn run_generate(
    config: &keyfeed_core::AppConfig,
    out: Option<PathBuf>,
    strict: bool,
) -> anyhow::Result<()> {
    let output = keyfeed_feed::generate_feed(config)
        .await
        .context("feed generation failed")?;

    match &out {
        Some(path) => std::fs::write(path, &output.xml)
            .with_context(|| format!("failed to write feed to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&output.xml)?;
            stdout.flush()?;
        }
    }

    tracing::info!(
        offers = output.offer_count,
        partial = output.partial,
        out = out.as_ref().map(|p| p.display().to_string()),
        "feed written"
    );

    if output.partial {
        tracing::warn!("feed is partial: some catalog pages or variant lists were unavailable");
        if strict {
            anyhow::bail!("feed is partial and --strict was given");
        }
    }
    Ok(())
}
