//! Named-asset lookup.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ViewError;

/// Resolves a named animation to its document text.
pub trait AssetLoader {
    fn read(&self, name: &str) -> Result<String, ViewError>;
}

/// Append `.{extension}` to names that carry no extension of their own.
///
/// `"spinner"` becomes `"spinner.json"`; `"spinner.lottie"` and `"dir/a.json"` are kept.
pub fn normalize_asset_name(name: &str, extension: &str) -> String {
    let file = name.rsplit('/').next().unwrap_or(name);
    if file.contains('.') {
        name.to_string()
    } else {
        format!("{name}.{extension}")
    }
}

/// Reads assets from a directory on disk.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for FsAssetLoader {
    fn read(&self, name: &str) -> Result<String, ViewError> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path)
            .map_err(|e| ViewError::io(path.display().to_string(), e.to_string()))
    }
}

/// In-memory asset table, for bundled or host-registered documents.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetLoader {
    assets: HashMap<String, String>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, json: impl Into<String>) {
        self.assets.insert(name.into(), json.into());
    }

    pub fn with(mut self, name: impl Into<String>, json: impl Into<String>) -> Self {
        self.insert(name, json);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn read(&self, name: &str) -> Result<String, ViewError> {
        self.assets
            .get(name)
            .cloned()
            .ok_or_else(|| ViewError::io(name, "asset not registered"))
    }
}
