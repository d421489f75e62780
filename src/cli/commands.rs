//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::client::{HfInferenceClient, InferenceBackend};
use crate::core::config::ServiceConfig;
use crate::core::detection::LanguageDetector;
use crate::core::languages::SupportedLanguages;
use crate::core::pipeline::{PipelineSettings, TranslationService};
use crate::core::summarizer::Summarizer;
use crate::processors::document::extract_file;

/// Commands for the document translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 10000)
        #[arg(short, long, default_value_t = 10000)]
        port: u16,
    },

    /// Translate text or a PDF/TXT file
    Translate {
        /// Text to translate
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// PDF or TXT file to translate
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Target language code
        #[arg(short, long)]
        target_lang: String,

        /// Source language code (default: auto)
        #[arg(long, default_value = "auto")]
        source_lang: String,

        /// Translate in a single request instead of sentence chunks
        #[arg(long)]
        light: bool,

        /// Write the translation to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect the language of text or a PDF/TXT file
    Detect {
        /// Text to analyze
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// PDF or TXT file to analyze
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Summarize a PDF/TXT file
    Summarize {
        /// Input file (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Write the summary to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported target languages
    Languages,
}

fn load_backend() -> anyhow::Result<(Arc<ServiceConfig>, Arc<dyn InferenceBackend>)> {
    let config = Arc::new(ServiceConfig::load()?);
    let backend: Arc<dyn InferenceBackend> = Arc::new(HfInferenceClient::new(config.clone())?);
    Ok((config, backend))
}

async fn read_input(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(file)) => Ok(extract_file(&file).await?),
        (None, None) => anyhow::bail!("Either --text or --file is required"),
    }
}

async fn write_output(content: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(&path, content).await?;
            println!("📝 Saved to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn spinner(message: String) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

/// Handle translate command
pub async fn handle_translate(
    text: Option<String>,
    file: Option<PathBuf>,
    target_lang: String,
    source_lang: String,
    light: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    use tracing::info;

    let start_time = Instant::now();
    let (config, backend) = load_backend()?;
    let service = TranslationService::with_defaults(backend, PipelineSettings::from(config.as_ref()));

    let input = read_input(text, file).await?;
    info!("Target language: {}", target_lang);
    info!("Source language: {}", source_lang);

    let pb = spinner(format!("Translating {} characters", input.chars().count()))?;
    let result = if light {
        service.translate_text(&input, &target_lang, &source_lang).await
    } else {
        service.translate_long_text(&input, &target_lang, &source_lang).await
    };
    pb.finish_and_clear();

    if result.pivot_fallback {
        eprintln!(
            "⚠️  No dedicated model for {} → {}; output comes from the pivot model",
            source_lang, target_lang
        );
    }

    if !result.success {
        if let Some(partial) = result.partial_result.as_deref().filter(|p| !p.is_empty()) {
            eprintln!("Partial translation:\n{}", partial);
        }
        anyhow::bail!(
            "Translation failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    write_output(&result.translated_text.unwrap_or_default(), output).await?;

    let duration = start_time.elapsed();
    info!(
        "Completed: {} chunk(s) in {:?}",
        result.chunks_processed.unwrap_or(1),
        duration
    );

    Ok(())
}

/// Handle detect command
pub async fn handle_detect(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, backend) = load_backend()?;
    let detector = LanguageDetector::remote(
        backend,
        config.detection_model.clone(),
        config.detection_max_chars,
    );

    let input = read_input(text, file).await?;
    let language = detector.detect_language(&input).await;

    println!("{}", language);
    Ok(())
}

/// Handle summarize command
pub async fn handle_summarize(file: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    use tracing::info;

    let (config, backend) = load_backend()?;
    let summarizer = Summarizer::from_config(backend, &config);

    info!("Summarizing: {}", file.display());
    let text = extract_file(&file).await?;

    let pb = spinner(format!("Summarizing {}", file.display()))?;
    let summary = summarizer.summarize_document(&text).await;
    pb.finish_and_clear();

    write_output(&summary?, output).await
}

/// Handle languages command
pub fn handle_languages() -> anyhow::Result<()> {
    let listing = SupportedLanguages::default().listing();

    for (code, name) in &listing.languages {
        println!("{:<4} {}", code, name);
    }
    println!("\n{} languages", listing.total_languages);

    Ok(())
}

/// Handle server command
pub async fn handle_server(host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);
    println!("📊 Health check: http://{}:{}/health", host, port);
    println!("📄 OpenAPI: http://{}:{}/api-docs/openapi.json", host, port);

    run_server(host, port).await?;

    Ok(())
}
