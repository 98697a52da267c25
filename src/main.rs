use clap::{Parser, Subcommand};
use orbitx::watch;
use orbitx::{
    loading, train, AnalysisResponse, ArtifactStore, ColumnReport, EngineConfig,
    Error, InferenceEngine, InferenceRequest, Snapshot,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Exoplanet record matching and classification over archive CSV data
#[derive(Parser, Debug)]
#[command(name = "orbitx")]
#[command(about = "Exoplanet record matching and classification", long_about = None)]
struct Args {
    /// Path to the observation CSV
    #[arg(short, long, default_value = "training_data.csv")]
    data: PathBuf,

    /// Directory for persisted model artifacts
    #[arg(short, long, default_value = "models")]
    models: PathBuf,

    /// Neighbors returned by a similarity search
    #[arg(long, default_value_t = 6)]
    neighbors: usize,

    /// Absolute tolerance for numeric exact matching
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,

    /// Column-info cache freshness in seconds
    #[arg(long, default_value_t = 300)]
    cache_freshness: u64,

    /// Debounce window for the dataset watcher in seconds
    #[arg(long, default_value_t = 5)]
    debounce: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the dataset (generating sample data if missing), train, and
    /// save artifacts
    Train,
    /// Analyze one record; REQUEST is the JSON request object
    Predict { request: String },
    /// Print per-column summary statistics
    Columns,
    /// Watch the dataset and retrain on change
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdout is reserved for the JSON response.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = EngineConfig {
        neighbor_count: args.neighbors,
        numeric_tolerance: args.tolerance,
        cache_freshness: Duration::from_secs(args.cache_freshness),
    };

    match &args.command {
        Command::Train => cmd_train(&args),
        Command::Predict { request } => cmd_predict(&args, config, request),
        Command::Columns => cmd_columns(&args, config),
        Command::Watch => cmd_watch(&args, config).await?,
    }

    Ok(())
}

fn cmd_train(args: &Args) {
    let outcome = (|| -> orbitx::Result<serde_json::Value> {
        let data = loading::load_or_synthesize(&args.data)?;
        let (model, report) = train::train(&data)?;
        let metadata = ArtifactStore::new(&args.models).save(&model, &report)?;
        serde_json::to_value(&metadata).map_err(|e| Error::Serialization(e.to_string()))
    })();

    match outcome {
        Ok(metadata) => print_json(&metadata),
        Err(err) => print_json(&serde_json::json!({
            "error": format!("training failed: {err}"),
        })),
    }
}

fn cmd_predict(args: &Args, config: EngineConfig, raw: &str) {
    let response = match run_predict(args, config, raw) {
        Ok(response) => response,
        Err(err) => AnalysisResponse::failure(&err),
    };
    print_json(&response);
}

fn run_predict(args: &Args, config: EngineConfig, raw: &str) -> orbitx::Result<AnalysisResponse> {
    let request: InferenceRequest = serde_json::from_str(raw)
        .map_err(|e| Error::InvalidInput(format!("request is not valid JSON: {e}")))?;
    let engine = bootstrap_trained(args, config)?;
    Ok(engine.analyze(&request))
}

fn cmd_columns(args: &Args, config: EngineConfig) {
    let report = match loading::load_or_synthesize(&args.data) {
        Ok(data) => {
            let engine = InferenceEngine::new(config);
            engine.install(Snapshot { data, model: None });
            engine.column_info()
        }
        Err(err) => ColumnReport::failure(format!("failed to get columns: {err}")),
    };
    print_json(&report);
}

async fn cmd_watch(args: &Args, config: EngineConfig) -> anyhow::Result<()> {
    let engine = Arc::new(bootstrap_trained(args, config)?);
    let store = Arc::new(ArtifactStore::new(&args.models));

    info!("orbitx watch started");
    tokio::select! {
        result = watch::run(
            engine,
            store,
            args.data.clone(),
            Duration::from_secs(args.debounce),
        ) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    Ok(())
}

/// Load the dataset and the persisted model, retraining when no artifacts
/// exist or they no longer fit the current schema.
fn bootstrap_trained(args: &Args, config: EngineConfig) -> orbitx::Result<InferenceEngine> {
    let data = loading::load_or_synthesize(&args.data)?;
    let store = ArtifactStore::new(&args.models);

    let model = match store.load() {
        Ok(Some((model, _)))
            if model.feature_columns == data.feature_columns
                && model.target_column == data.target_column =>
        {
            model
        }
        Ok(Some(_)) => {
            info!("persisted artifacts do not match the current schema, retraining");
            train_and_save(&data, &store)?
        }
        Ok(None) => {
            info!("no persisted artifacts, training");
            train_and_save(&data, &store)?
        }
        Err(err) => {
            warn!(%err, "failed to load artifacts, retraining");
            train_and_save(&data, &store)?
        }
    };

    let engine = InferenceEngine::new(config);
    engine.install(Snapshot {
        data,
        model: Some(model),
    });
    Ok(engine)
}

fn train_and_save(
    data: &orbitx::PreparedDataset,
    store: &ArtifactStore,
) -> orbitx::Result<orbitx::FittedModel> {
    let (model, report) = train::train(data)?;
    store.save(&model, &report)?;
    Ok(model)
}

/// The CLI contract: exactly one well-formed JSON object on stdout, even
/// when encoding itself fails.
fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(_) => println!(r#"{{"type":"error","message":"failed to encode response"}}"#),
    }
}
