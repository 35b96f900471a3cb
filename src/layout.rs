//! Folder layout of one evaluation.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::settings::{BuildType, Settings};

/// Source, build, generators and package folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub source_folder: PathBuf,
    pub build_folder: PathBuf,
    pub generators_folder: PathBuf,
    pub package_folder: PathBuf,
    /// Multi-config generators put binaries in a per-build-type subfolder.
    pub multi_config: bool,
    pub build_type: BuildType,
}

impl Layout {
    /// CMake-style layout rooted at `workspace`, with sources in `source_folder`.
    ///
    /// Single-config generators build into `build/<BuildType>`; multi-config
    /// generators (MSVC) share `build` across configurations.
    pub fn cmake(workspace: &Path, source_folder: PathBuf, settings: &Settings) -> Self {
        let multi_config = is_multi_config(settings);
        let build_folder = if multi_config {
            workspace.join("build")
        } else {
            workspace.join("build").join(settings.build_type.as_str())
        };
        Self {
            source_folder,
            generators_folder: build_folder.join("generators"),
            build_folder,
            package_folder: workspace.join("package"),
            multi_config,
            build_type: settings.build_type,
        }
    }

    /// Folder holding the binaries produced by the build.
    pub fn bindir(&self) -> PathBuf {
        if self.multi_config {
            self.build_folder.join(self.build_type.as_str())
        } else {
            self.build_folder.clone()
        }
    }

    /// True once the layout stage has filled the folders in.
    pub fn is_set(&self) -> bool {
        !self.build_folder.as_os_str().is_empty()
    }
}

fn is_multi_config(settings: &Settings) -> bool {
    settings.os.is_windows() && settings.compiler == "msvc"
}
