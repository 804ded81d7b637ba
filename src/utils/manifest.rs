// src/utils/manifest.rs

use std::{fs, io, path::Path};

use chrono::Utc;
use walkdir::WalkDir;

use crate::models::manifest::{Manifest, ManifestEntry};

/// File name of the manifest written into the lecture root.
pub const INDEX_FILE: &str = "index.json";

/// Walks `root` recursively and lists every `.md` file, sorted by path.
pub fn scan(root: &Path) -> io::Result<Vec<ManifestEntry>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|x| x.to_str()) != Some("md")
        {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(ManifestEntry {
            path,
            name: entry.file_name().to_string_lossy().into_owned(),
            size: entry.metadata()?.len(),
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Scans `root` and writes `index.json` into it.
pub fn write_manifest(root: &Path) -> io::Result<Manifest> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("lecture directory {} does not exist", root.display()),
        ));
    }

    let manifest = Manifest {
        generated: Utc::now(),
        files: scan(root)?,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(root.join(INDEX_FILE), json)?;
    Ok(manifest)
}
