//! Change-triggered retraining.
//!
//! A filesystem watcher forwards CSV change events into a channel; a single
//! consumer task owns the reload/train/swap sequence, so there is exactly
//! one writer to the engine snapshot. Repeated signals inside the debounce
//! window are dropped.

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use orbitx_core::{loading, train, InferenceEngine, Snapshot};
use orbitx_storage::ArtifactStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

/// Watch the dataset and retrain on change. Runs until the channel closes.
pub async fn run(
    engine: Arc<InferenceEngine>,
    store: Arc<ArtifactStore>,
    csv_path: PathBuf,
    debounce: Duration,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<()>(16);

    let mut watcher: RecommendedWatcher =
        notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let csv_changed = event
                    .paths
                    .iter()
                    .any(|p| p.extension().is_some_and(|e| e == "csv"));
                if csv_changed && (event.kind.is_modify() || event.kind.is_create()) {
                    // Dropped sends just coalesce into the pending signal.
                    let _ = tx.try_send(());
                }
            }
        })?;

    // Watch the containing directory so the file can be replaced wholesale.
    let watch_path = csv_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
    info!(path = %csv_path.display(), "watching dataset for changes");

    let mut last_trigger: Option<Instant> = None;
    while rx.recv().await.is_some() {
        if last_trigger.is_some_and(|t| t.elapsed() < debounce) {
            continue;
        }
        last_trigger = Some(Instant::now());
        info!("dataset changed, retraining");

        let engine = engine.clone();
        let store = store.clone();
        let path = csv_path.clone();
        match tokio::task::spawn_blocking(move || retrain(&engine, &store, &path)).await {
            Ok(Ok(())) => info!("retraining completed"),
            Ok(Err(err)) => warn!(%err, "retraining failed, keeping previous model"),
            Err(err) => error!(%err, "retraining task aborted"),
        }
    }

    Ok(())
}

/// One retraining cycle: clear cached statistics, reload, retrain, persist,
/// and install the new dataset/model pair as a single snapshot. Any failure
/// leaves the previous snapshot in place.
pub fn retrain(
    engine: &InferenceEngine,
    store: &ArtifactStore,
    csv_path: &Path,
) -> orbitx_core::Result<()> {
    engine.clear_cache();
    let data = loading::load_prepared(csv_path)?;
    let (model, report) = train::train(&data)?;
    store.save(&model, &report)?;
    engine.install(Snapshot {
        data,
        model: Some(model),
    });
    Ok(())
}
