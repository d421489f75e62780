//! Main entry point for the document translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doc_translator::cli::commands::{self, Commands};

/// Document translator - translation, language detection and summarization
#[derive(Parser, Debug)]
#[command(name = "doc-translator", version, about, long_about = None)]
struct Args {
    /// Inference API key (optional, defaults to HUGGINGFACE_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("doc_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Override config with CLI args if provided
    if let Some(api_key) = args.api_key {
        std::env::set_var("HUGGINGFACE_API_KEY", api_key);
    }

    match args.command {
        Some(Commands::Server { host, port }) => {
            commands::handle_server(host, port).await?;
        }
        Some(Commands::Translate {
            text,
            file,
            target_lang,
            source_lang,
            light,
            output,
        }) => {
            commands::handle_translate(text, file, target_lang, source_lang, light, output).await?;
        }
        Some(Commands::Detect { text, file }) => {
            commands::handle_detect(text, file).await?;
        }
        Some(Commands::Summarize { file, output }) => {
            commands::handle_summarize(file, output).await?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages()?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
