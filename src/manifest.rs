//! Source manifest: per-version source archives and patches.
//!
//! ```toml
//! [sources."0.13.0"]
//! url = "https://archive.apache.org/dist/logging/log4cxx/0.13.0/apache-log4cxx-0.13.0.tar.gz"
//! sha256 = "..."
//!
//! [[patches."0.13.0"]]
//! patch_file = "patches/0.13.0-0001-fix-cmake.patch"
//! patch_description = "find expat through CMakeDeps"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RecipeError, Result};

/// File name looked up in the recipe directory.
pub const MANIFEST_FILE: &str = "manifest.toml";

/// One URL or a list of mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Urls {
    One(String),
    Mirrors(Vec<String>),
}

impl Urls {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Urls::One(url) => std::slice::from_ref(url),
            Urls::Mirrors(urls) => urls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceEntry {
    pub url: Urls,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatchEntry {
    /// Relative to the recipe directory.
    pub patch_file: PathBuf,
    #[serde(default)]
    pub patch_description: Option<String>,
    #[serde(default)]
    pub patch_type: Option<String>,
    /// Subfolder of the source tree the patch applies to.
    #[serde(default)]
    pub base_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceManifest {
    #[serde(default)]
    sources: BTreeMap<String, SourceEntry>,
    #[serde(default)]
    patches: BTreeMap<String, Vec<PatchEntry>>,
}

impl SourceManifest {
    /// Load `manifest.toml` from a recipe directory.
    pub fn load_from_dir(recipe_dir: &Path) -> Result<Self> {
        Self::load(&recipe_dir.join(MANIFEST_FILE))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RecipeError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|reason| RecipeError::Manifest {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let manifest: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        for version in manifest.sources.keys().chain(manifest.patches.keys()) {
            semver::Version::parse(version)
                .map_err(|e| format!("invalid version {}: {}", version, e))?;
        }
        Ok(manifest)
    }

    pub fn source(&self, version: &semver::Version) -> Result<&SourceEntry> {
        self.sources
            .get(&version.to_string())
            .ok_or_else(|| RecipeError::MissingSource(version.to_string()))
    }

    /// Patches for a version, in application order.
    pub fn patches(&self, version: &semver::Version) -> &[PatchEntry] {
        self.patches
            .get(&version.to_string())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Known versions, oldest first.
    pub fn versions(&self) -> Vec<semver::Version> {
        let mut versions: Vec<_> = self
            .sources
            .keys()
            .filter_map(|v| semver::Version::parse(v).ok())
            .collect();
        versions.sort();
        versions
    }

    pub fn latest(&self) -> Option<semver::Version> {
        self.versions().pop()
    }
}
