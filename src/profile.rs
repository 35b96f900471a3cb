//! Profiles: TOML files of default settings and options.
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! arch = "x86_64"
//! compiler = "gcc"
//! "compiler.version" = "12"
//! "compiler.cppstd" = "17"
//! build_type = "Release"
//!
//! [options]
//! shared = false
//! prefer_boost = "False"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RecipeError, Result};
use crate::options::Options;
use crate::settings::Settings;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub settings: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub options: BTreeMap<String, toml::Value>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| RecipeError::InvalidSetting(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Profile to use when none is given on the command line.
    ///
    /// `$RECIPE_PROFILE` wins; otherwise `<config_dir>/recipe/profiles/default.toml`
    /// if it exists.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("RECIPE_PROFILE") {
            return Some(PathBuf::from(path));
        }
        let path = dirs::config_dir()?
            .join("recipe")
            .join("profiles")
            .join("default.toml");
        path.is_file().then_some(path)
    }

    /// Apply this profile on top of `settings` and `options`.
    pub fn apply(&self, settings: &mut Settings, options: &mut Options) -> Result<()> {
        self.apply_settings(settings)?;
        for (key, value) in &self.options {
            options.set(key, &value_string(value))?;
        }
        Ok(())
    }

    /// Apply only the `[settings]` table, as for a build machine profile.
    pub fn apply_settings(&self, settings: &mut Settings) -> Result<()> {
        for (key, value) in &self.settings {
            settings.set(key, &value_string(value))?;
        }
        Ok(())
    }
}

fn value_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Boolean(true) => "True".to_string(),
        toml::Value::Boolean(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Split a `key=value` command-line assignment.
pub fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {}", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
