//! Strata binary - composition root.
//!
//! Ties the Strata crates together into a single executable:
//! 1. Parse CLI args and load configuration from TOML
//! 2. Initialize tracing
//! 3. Ingest the chat export into normalized transcripts
//! 4. Select the embedding backend (ONNX model when configured, mock otherwise)
//! 5. Segment every conversation and extract key sentences
//! 6. Write the segmented output JSON

mod cli;

use clap::Parser;

use cli::CliArgs;
use strata_core::config::StrataConfig;
use strata_ingest::load_export;
use strata_segment::{BatchOutcome, SegmentationPipeline};
use strata_vector::{EmbeddingService, MockEmbedding, OnnxEmbeddingService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first so the log level can come from it; its own load
    // diagnostics precede the subscriber and are dropped.
    let config_path = args.resolve_config_path();
    let config = StrataConfig::load_or_default(&config_path);

    // Tracing: --log-level flag > RUST_LOG > config value.
    let filter = match args.log_level.as_deref() {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Strata v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_path.display(), "Configuration resolved");

    // Ingest.
    let transcripts = load_export(&args.input)?;
    tracing::info!(
        conversations = transcripts.len(),
        path = %args.input.display(),
        "Export loaded"
    );

    // Embedding backend.
    let outcome = match args.resolve_model_dir(config.embedding.model_dir.as_deref()) {
        Some(model_dir) => {
            let embedder = OnnxEmbeddingService::from_directory(&model_dir)?;
            run_pipeline(embedder, &config, transcripts).await
        }
        None => {
            tracing::warn!(
                "No embedding model configured; using deterministic mock embeddings"
            );
            run_pipeline(MockEmbedding::new(), &config, transcripts).await
        }
    };

    for failure in &outcome.failures {
        tracing::error!(
            id = %failure.id,
            title = %failure.title,
            error = %failure.error,
            "Conversation skipped"
        );
    }

    // Output.
    let json = serde_json::to_string_pretty(&outcome.conversations)?;
    std::fs::write(&args.output, json)?;
    tracing::info!(
        conversations = outcome.conversations.len(),
        failures = outcome.failures.len(),
        path = %args.output.display(),
        "Segmented output written"
    );

    Ok(())
}

async fn run_pipeline<E: EmbeddingService>(
    embedder: E,
    config: &StrataConfig,
    transcripts: Vec<strata_core::types::Transcript>,
) -> BatchOutcome {
    tracing::info!(dimensions = embedder.dimensions(), "Embedding backend ready");
    let pipeline = SegmentationPipeline::new(embedder, &config.segmentation);
    pipeline.process_all(transcripts).await
}
