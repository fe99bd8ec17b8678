//! Build the static site

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::Galley;

/// Run a full build and report what was written.
pub fn run(site: &Galley) -> Result<()> {
    let start = std::time::Instant::now();

    let stats = site.build()?;

    let duration = start.elapsed();
    println!(
        "Built {} posts and {} pages ({} files, {} assets) in {:.2}s",
        stats.posts,
        stats.pages,
        stats.files_written,
        stats.assets_copied,
        duration.as_secs_f64()
    );

    Ok(())
}

/// Watch for file changes and rebuild
pub fn watch(site: &Galley) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    // Watch source directory
    watcher.watch(site.source_dir.as_ref(), notify::RecursiveMode::Recursive)?;

    // Watch config file
    let config_path = site.base_dir.join("_config.yml");
    if config_path.exists() {
        watcher.watch(config_path.as_ref(), notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // Debounce events
    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                // The output directory lives under the source tree when
                // `source: .`; ignore our own writes or we rebuild forever.
                if event.paths.iter().all(|p| p.starts_with(&site.output_dir)) {
                    continue;
                }

                // Debounce: only rebuild if more than 500ms since last rebuild
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, rebuilding...");
                    // Re-read the config so edits to _config.yml take effect.
                    match Galley::new(&site.base_dir) {
                        Ok(fresh) => {
                            if let Err(e) = run(&fresh) {
                                tracing::error!("Build failed: {}", e);
                            }
                        }
                        Err(e) => {
                            tracing::error!("Build failed: {}", e);
                        }
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
