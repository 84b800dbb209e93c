use std::{fs, path::Path};

use anyhow::Context;

use crate::sync::PlaylistManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            Format::Yaml
        }
        _ => Format::Json,
    }
}

/// Read a playlist manifest. `.yaml`/`.yml` files are YAML, anything else JSON.
pub fn load(path: &Path) -> anyhow::Result<PlaylistManifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read playlist file {:?}", path))?;

    match format_of(path) {
        Format::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse playlist YAML {:?}", path)),
        Format::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse playlist JSON {:?}", path)),
    }
}

pub fn save(manifest: &PlaylistManifest, path: &Path) -> anyhow::Result<()> {
    let content = match format_of(path) {
        Format::Yaml => serde_yaml::to_string(manifest).context("Failed to serialize playlist")?,
        Format::Json => {
            serde_json::to_string_pretty(manifest).context("Failed to serialize playlist")? + "\n"
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write playlist to {:?}", path))
}

/// Filesystem-safe stem for a playlist name: lowercase alphanumerics joined by `-`.
pub fn slug(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "playlist".to_string()
    } else {
        slug
    }
}
