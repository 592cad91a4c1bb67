//! Discovery of available patches.
//!
//! A [`PatchCatalog`] maps patch names (file stems) to their `.ips` paths.
//! It is built once from a directory and passed to whatever needs it, so the
//! set of patches does not change underneath a run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ips::PATCH_EXTENSION;
use crate::path::has_extension;

/// Available patches, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchCatalog {
    patches: BTreeMap<String, PathBuf>,
}

impl PatchCatalog {
    /// Scan `dir` (non-recursively) for `.ips` files.
    ///
    /// A missing directory yields an empty catalog rather than an error.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            warn!("Patches directory not found: {}", dir.display());
            return Ok(Self::default());
        }

        let mut patches = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !has_extension(&path, PATCH_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("Skipping patch with non UTF-8 name: {}", path.display());
                continue;
            };
            patches.insert(name.to_string(), path.clone());
        }

        debug!("Found {} patches in {}", patches.len(), dir.display());
        Ok(Self { patches })
    }

    /// Add or replace a single entry
    pub fn insert<S: Into<String>, P: Into<PathBuf>>(&mut self, name: S, path: P) {
        self.patches.insert(name.into(), path.into());
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.patches.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patches.contains_key(name)
    }

    /// Patch names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patches.keys().map(String::as_str)
    }

    /// `(name, path)` pairs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.patches
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Look up `names` in order, failing on the first unknown name.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<(String, PathBuf)>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.patches
                    .get(name)
                    .map(|path| (name.to_string(), path.clone()))
                    .ok_or_else(|| Error::UnknownPatch(name.to_string()))
            })
            .collect()
    }

    /// Every patch in sorted order
    pub fn all(&self) -> Vec<(String, PathBuf)> {
        self.patches
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }
}
