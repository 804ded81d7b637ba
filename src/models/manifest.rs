// src/models/manifest.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One markdown file found under the lecture root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// `/`-separated path relative to the lecture root.
    pub path: String,
    pub name: String,
    pub size: u64,
}

/// Contents of `index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub generated: DateTime<Utc>,
    pub files: Vec<ManifestEntry>,
}
