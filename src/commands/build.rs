//! Build the static site.

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::Generator;
use crate::Folio;

pub fn run(folio: &Folio) -> Result<()> {
    Generator::new(folio)?.generate()?;
    Ok(())
}

/// Watch for file changes and rebuild. A failed rebuild leaves the
/// previous output in place.
pub async fn watch(folio: &Folio) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    if folio.content_dir.exists() {
        watcher.watch(&folio.content_dir, notify::RecursiveMode::Recursive)?;
    }

    let config_path = folio.base_dir.join("folio.yml");
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // Debounce events
    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                // Only rebuild if more than 500ms since the last one
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, rebuilding...");
                    // Re-read the config so edits to folio.yml apply
                    match Folio::new(&folio.base_dir).and_then(|fresh| fresh.build()) {
                        Ok(_) => tracing::info!("Rebuilt successfully"),
                        Err(e) => tracing::error!("Build failed: {}", e),
                    }
                    last_rebuild = std::time::Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Continue waiting
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}
