// src/bin/generate_index.rs

//! Writes `index.json` listing every markdown file under the lecture directory.
//! Usage: `generate-index [DIR]` (defaults to `LECTURES_DIR` or `lectures`).

use std::path::PathBuf;

use quizroom::{config::Config, utils::manifest};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.rust_log))
        .with_target(false)
        .init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or(config.lectures_dir);

    tracing::info!("Searching for markdown files in {}", root.display());
    match manifest::write_manifest(&root) {
        Ok(m) => {
            if m.files.is_empty() {
                tracing::warn!("No markdown files found");
            }
            for file in &m.files {
                tracing::info!("  - {}", file.path);
            }
            tracing::info!(
                "{} written with {} files",
                root.join(manifest::INDEX_FILE).display(),
                m.files.len()
            );
        }
        Err(e) => {
            tracing::error!("Failed to write manifest: {}", e);
            std::process::exit(1);
        }
    }
}
