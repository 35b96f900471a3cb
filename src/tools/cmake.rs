//! CMake configure/build/install driver.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use crate::context::Context;
use crate::error::Result;
use crate::layout::Layout;
use crate::output;
use crate::settings::BuildType;

use super::command;

/// Cache variables passed as `-D<name>=<value>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions(BTreeMap<String, String>);

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.set(name, if value { "ON" } else { "OFF" })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn args(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().map(|(k, v)| format!("-D{}={}", k, v))
    }
}

/// A CMake project bound to one layout.
#[derive(Debug, Clone)]
pub struct CMake {
    source_folder: PathBuf,
    build_folder: PathBuf,
    package_folder: PathBuf,
    build_type: BuildType,
    multi_config: bool,
    jobs: usize,
}

impl CMake {
    pub fn new(layout: &Layout, jobs: usize) -> Self {
        Self {
            source_folder: layout.source_folder.clone(),
            build_folder: layout.build_folder.clone(),
            package_folder: layout.package_folder.clone(),
            build_type: layout.build_type,
            multi_config: layout.multi_config,
            jobs: jobs.max(1),
        }
    }

    /// Generate the build tree.
    pub fn configure(&self, ctx: &Context, definitions: &Definitions) -> Result<()> {
        if !ctx.dry_run {
            std::fs::create_dir_all(&self.build_folder)?;
        }

        let mut cmd = Command::new("cmake");
        cmd.arg("-S")
            .arg(&self.source_folder)
            .arg("-B")
            .arg(&self.build_folder);
        if !self.multi_config {
            cmd.arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_type));
        }
        cmd.arg(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            self.package_folder.display()
        ));
        cmd.args(definitions.args());

        output::detail("configuring with cmake");
        command::run(ctx, &mut cmd)
    }

    /// Compile the configured build tree.
    pub fn build(&self, ctx: &Context) -> Result<()> {
        let mut cmd = Command::new("cmake");
        cmd.arg("--build").arg(&self.build_folder);
        if self.multi_config {
            cmd.args(["--config", self.build_type.as_str()]);
        }
        cmd.arg("--parallel").arg(self.jobs.to_string());

        let pb = (!ctx.dry_run && !ctx.verbose).then(|| output::spinner("building"));
        let result = command::run(ctx, &mut cmd);
        if let Some(pb) = pb {
            output::progress_done(pb);
        }
        result
    }

    /// Install the build output into the package folder.
    pub fn install(&self, ctx: &Context) -> Result<()> {
        let mut cmd = Command::new("cmake");
        cmd.arg("--install").arg(&self.build_folder);
        if self.multi_config {
            cmd.args(["--config", self.build_type.as_str()]);
        }
        cmd.arg("--prefix").arg(&self.package_folder);

        output::detail(&format!("installing to {}", self.package_folder.display()));
        command::run(ctx, &mut cmd)
    }
}
