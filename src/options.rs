//! Package options.
//!
//! `fpic` is `None` once the option no longer applies (Windows targets or
//! shared builds). A removed option stays removed for the rest of the
//! evaluation; later writes are rejected.

use serde::Serialize;

use crate::error::{RecipeError, Result};

/// User-settable build parameters for the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Options {
    pub shared: bool,
    #[serde(rename = "fPIC")]
    fpic: Option<bool>,
    pub prefer_boost: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            shared: false,
            fpic: Some(true),
            prefer_boost: false,
        }
    }
}

impl Options {
    /// Current fPIC value, `None` when not applicable.
    pub fn fpic(&self) -> Option<bool> {
        self.fpic
    }

    pub fn set_fpic(&mut self, value: bool) -> Result<()> {
        match self.fpic {
            Some(_) => {
                self.fpic = Some(value);
                Ok(())
            }
            None => Err(RecipeError::InvalidOption(
                "fPIC does not apply to this configuration".to_string(),
            )),
        }
    }

    /// Mark fPIC as not applicable.
    pub fn remove_fpic(&mut self) {
        self.fpic = None;
    }

    /// Apply a `key=value` option override.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = parse_bool(key, value)?;
        match key {
            "shared" => self.shared = value,
            "fPIC" => self.set_fpic(value)?,
            "prefer_boost" => self.prefer_boost = value,
            _ => {
                return Err(RecipeError::InvalidOption(format!(
                    "unknown option: {}",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Option values as `(name, value)` pairs, removed options omitted.
    pub fn entries(&self) -> Vec<(&'static str, bool)> {
        let mut entries = vec![("shared", self.shared)];
        if let Some(fpic) = self.fpic {
            entries.push(("fPIC", fpic));
        }
        entries.push(("prefer_boost", self.prefer_boost));
        entries
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        _ => Err(RecipeError::InvalidOption(format!(
            "{} expects True or False, got {}",
            key, value
        ))),
    }
}
