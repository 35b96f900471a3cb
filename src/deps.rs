//! Dependency declarations.
//!
//! Requirements are computed from settings by pure functions and recorded on
//! the recipe state. Nothing here resolves or fetches the dependencies.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{RecipeError, Result};

/// A `name/version` package reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    pub name: String,
    pub version: semver::Version,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl FromStr for Dependency {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, version) = s
            .split_once('/')
            .ok_or_else(|| RecipeError::InvalidReference(s.to_string()))?;
        if name.is_empty() {
            return Err(RecipeError::InvalidReference(s.to_string()));
        }
        let version = semver::Version::parse(version)
            .map_err(|e| RecipeError::InvalidReference(format!("{}: {}", s, e)))?;
        Ok(Self::new(name, version))
    }
}

/// Ordered set of declared references. Re-declaring a name replaces the
/// earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Requirements(Vec<Dependency>);

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a reference, replacing any earlier one with the same name.
    pub fn insert(&mut self, dep: Dependency) {
        match self.0.iter_mut().find(|d| d.name == dep.name) {
            Some(existing) => *existing = dep,
            None => self.0.push(dep),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Extend<Dependency> for Requirements {
    fn extend<I: IntoIterator<Item = Dependency>>(&mut self, iter: I) {
        for dep in iter {
            self.insert(dep);
        }
    }
}

impl<'a> IntoIterator for &'a Requirements {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
