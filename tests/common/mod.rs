//! Common test utilities for recipe integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use log4cxx_recipe::{Context, Lifecycle, Log4cxx, Options, Os, RecipeState, Settings};
use tempfile::TempDir;

pub const VERSION: &str = "0.13.0";

/// Create a recipe directory and a workspace under one temp dir.
pub fn create_test_env(manifest: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let recipe_dir = dir.path().join("recipe");
    let workspace = dir.path().join("ws");
    std::fs::create_dir_all(&recipe_dir).unwrap();
    std::fs::create_dir_all(&workspace).unwrap();
    std::fs::write(recipe_dir.join("manifest.toml"), manifest).unwrap();
    (dir, recipe_dir, workspace)
}

pub fn manifest_for(url: &str, sha256: &str) -> String {
    format!(
        "[sources.\"{}\"]\nurl = \"{}\"\nsha256 = \"{}\"\n",
        VERSION, url, sha256
    )
}

pub fn settings(os: Os) -> Settings {
    let mut settings = Settings::detect();
    settings.os = os;
    settings.compiler = if os == Os::Windows { "msvc" } else { "gcc" }.to_string();
    settings
}

pub fn options(shared: bool) -> Options {
    let mut options = Options::default();
    options.shared = shared;
    options
}

pub fn log4cxx_state(ctx: Context, settings: Settings, options: Options) -> RecipeState {
    Lifecycle::new(&Log4cxx).state_with_options(
        VERSION.parse().unwrap(),
        settings,
        options,
        ctx,
    )
}

/// Build a gzipped tarball of `(path, contents)` entries.
pub fn make_tar_gz(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}
