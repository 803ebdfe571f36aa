use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::storage::ObjectStore;

/// Install the global subscriber: console output plus, when `log_file` is
/// given, a plain-text copy in that file. The file is truncated first.
/// `RUST_LOG` overrides the default `info` level.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Upload the run log to `key` and remove the local copy. Failures are
/// logged and otherwise ignored.
pub async fn archive(store: &dyn ObjectStore, log_file: &Path, key: &str) -> bool {
    let text = match tokio::fs::read_to_string(log_file).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read log file {}: {}", log_file.display(), e);
            return false;
        }
    };

    if let Err(e) = store.write_text(key, &text).await {
        warn!("Failed to upload log file: {:#}", e);
        return false;
    }
    info!(
        "Log file {} uploaded to {} with key {}.",
        log_file.display(),
        store.describe(),
        key
    );

    if let Err(e) = tokio::fs::remove_file(log_file).await {
        warn!("Failed to remove local log file {}: {}", log_file.display(), e);
    }
    true
}
