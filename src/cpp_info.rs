//! Consumer-facing package metadata.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::context::Context;
use crate::error::Result;
use crate::output;

/// File written into the package folder after package_info.
pub const CPP_INFO_FILE: &str = "cpp_info.json";

/// How consumers find, compile against and link the packaged library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CppInfo {
    pub properties: BTreeMap<String, String>,
    pub includedirs: Vec<String>,
    pub libdirs: Vec<String>,
    pub bindirs: Vec<String>,
    pub libs: Vec<String>,
    pub defines: Vec<String>,
    pub system_libs: Vec<String>,
}

impl Default for CppInfo {
    fn default() -> Self {
        Self {
            properties: BTreeMap::new(),
            includedirs: vec!["include".to_string()],
            libdirs: vec!["lib".to_string()],
            bindirs: vec!["bin".to_string()],
            libs: Vec::new(),
            defines: Vec::new(),
            system_libs: Vec::new(),
        }
    }
}

impl CppInfo {
    pub fn set_property(&mut self, key: &str, value: impl Into<String>) {
        self.properties.insert(key.to_string(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| std::io::Error::other(e).into())
    }

    /// Write `cpp_info.json` into the package folder.
    pub fn write(&self, ctx: &Context, package_folder: &Path) -> Result<PathBuf> {
        let dest = package_folder.join(CPP_INFO_FILE);
        ctx.record(format!("save {}", dest.display()));
        if ctx.dry_run {
            output::command(true, &format!("save {}", dest.display()));
            return Ok(dest);
        }
        std::fs::create_dir_all(package_folder)?;
        std::fs::write(&dest, self.to_json()?)?;
        Ok(dest)
    }

    /// Render a pkg-config file for a package installed at `prefix`.
    pub fn to_pkg_config(&self, prefix: &Path, description: &str, version: &str) -> String {
        let name = self
            .get_property("pkg_config_name")
            .unwrap_or("unknown")
            .to_string();
        let libdir = self.libdirs.first().map(String::as_str).unwrap_or("lib");
        let includedir = self
            .includedirs
            .first()
            .map(String::as_str)
            .unwrap_or("include");

        let mut pc = String::new();
        let _ = writeln!(pc, "prefix={}", prefix.display());
        let _ = writeln!(pc, "libdir=${{prefix}}/{}", libdir);
        let _ = writeln!(pc, "includedir=${{prefix}}/{}", includedir);
        let _ = writeln!(pc);
        let _ = writeln!(pc, "Name: {}", name);
        let _ = writeln!(pc, "Description: {}", description);
        let _ = writeln!(pc, "Version: {}", version);

        let mut libs = vec!["-L\"${libdir}\"".to_string()];
        libs.extend(self.libs.iter().map(|l| format!("-l{}", l)));
        libs.extend(self.system_libs.iter().map(|l| format!("-l{}", l)));
        let _ = writeln!(pc, "Libs: {}", libs.join(" "));

        let mut cflags = vec!["-I\"${includedir}\"".to_string()];
        cflags.extend(self.defines.iter().map(|d| format!("-D{}", d)));
        let _ = writeln!(pc, "Cflags: {}", cflags.join(" "));
        pc
    }
}
