//! Recipe state: everything one evaluation reads and writes.

use serde::Serialize;

use crate::context::Context;
use crate::cpp_info::CppInfo;
use crate::deps::{Dependency, Requirements};
use crate::error::{RecipeError, Result};
use crate::layout::Layout;
use crate::lifecycle::Stage;
use crate::options::Options;
use crate::settings::Settings;
use crate::tools::{CMake, Definitions};

/// Descriptive package metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub description: String,
    pub license: String,
    pub homepage: String,
    pub url: String,
    pub topics: Vec<String>,
}

/// Mutable state shared by every hook of one evaluation.
#[derive(Debug)]
pub struct RecipeState {
    pub name: String,
    pub version: semver::Version,
    pub metadata: Metadata,
    pub settings: Settings,
    pub options: Options,
    pub layout: Layout,
    pub requirements: Requirements,
    pub build_requirements: Requirements,
    pub cpp_info: CppInfo,
    pub ctx: Context,
    /// Set for verification packages: the package under test.
    pub tested_reference: Option<Dependency>,
    cmake: Option<CMake>,
    completed: Vec<Stage>,
}

impl RecipeState {
    pub fn new(
        name: impl Into<String>,
        version: semver::Version,
        settings: Settings,
        options: Options,
        ctx: Context,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            metadata: Metadata::default(),
            settings,
            options,
            layout: Layout::default(),
            requirements: Requirements::new(),
            build_requirements: Requirements::new(),
            cpp_info: CppInfo::default(),
            ctx,
            tested_reference: None,
            cmake: None,
            completed: Vec::new(),
        }
    }

    /// `name/version` of this package.
    pub fn reference(&self) -> Dependency {
        Dependency::new(self.name.clone(), self.version.clone())
    }

    /// CMake handle for this evaluation, configured on first use.
    ///
    /// `definitions` is only consulted the first time; later calls return
    /// the already configured project.
    pub fn cmake(&mut self, definitions: impl FnOnce(&RecipeState) -> Definitions) -> Result<&CMake> {
        let cmake = match self.cmake.take() {
            Some(cmake) => cmake,
            None => {
                if !self.layout.is_set() {
                    return Err(RecipeError::ConfigurationInvalid(
                        "cmake requested before layout".to_string(),
                    ));
                }
                let defs = definitions(self);
                let cmake = CMake::new(&self.layout, self.ctx.nproc);
                cmake.configure(&self.ctx, &defs)?;
                cmake
            }
        };
        let cmake: &CMake = self.cmake.insert(cmake);
        Ok(cmake)
    }

    pub fn has_cmake(&self) -> bool {
        self.cmake.is_some()
    }

    /// True when the target differs from the machine running the build.
    pub fn is_cross_building(&self) -> bool {
        self.settings.is_cross_building(&self.ctx.build_settings)
    }

    /// Stages completed so far, in order.
    pub fn completed_stages(&self) -> &[Stage] {
        &self.completed
    }

    pub(crate) fn mark_completed(&mut self, stage: Stage) {
        self.completed.push(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn state() -> RecipeState {
        let ctx = Context::new("/recipe").workspace("/ws").dry_run(true);
        let mut state = RecipeState::new(
            "log4cxx",
            semver::Version::new(0, 13, 0),
            Settings::detect(),
            Options::default(),
            ctx,
        );
        state.layout = Layout::cmake(
            &PathBuf::from("/ws"),
            PathBuf::from("/ws/src"),
            &state.settings,
        );
        state
    }

    #[test]
    fn test_reference() {
        assert_eq!(state().reference().to_string(), "log4cxx/0.13.0");
    }

    #[test]
    fn test_cmake_configured_once() {
        let mut state = state();
        let mut calls = 0;
        state
            .cmake(|_| {
                calls += 1;
                Definitions::new()
            })
            .unwrap();
        state
            .cmake(|_| {
                calls += 1;
                Definitions::new()
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert!(state.has_cmake());
        let configures = state
            .ctx
            .history()
            .iter()
            .filter(|c| c.starts_with("cmake -S"))
            .count();
        assert_eq!(configures, 1);
    }

    #[test]
    fn test_cmake_requires_layout() {
        let ctx = Context::new("/recipe").dry_run(true);
        let mut state = RecipeState::new(
            "log4cxx",
            semver::Version::new(0, 13, 0),
            Settings::detect(),
            Options::default(),
            ctx,
        );

        let err = state.cmake(|_| Definitions::new()).unwrap_err();
        assert!(matches!(err, RecipeError::ConfigurationInvalid(_)));
        assert!(!state.has_cmake());
        assert!(state.ctx.history().is_empty());
    }

    #[test]
    fn test_not_cross_building_on_host() {
        assert!(!state().is_cross_building());
    }
}
