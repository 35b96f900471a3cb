//! Verification package: builds a small consumer against the packaged
//! library and runs it with a sample configuration file.

use std::path::PathBuf;
use std::process::Command;

use crate::deps::Dependency;
use crate::error::Result;
use crate::layout::Layout;
use crate::output;
use crate::recipe::Recipe;
use crate::state::RecipeState;
use crate::tools::{command, Definitions};

/// Subdirectory of the recipe holding the consumer project.
pub const TEST_PACKAGE_DIR: &str = "test_package";

/// Sample configuration passed to the consumer binary.
pub const CONFIG_FILE: &str = "log4cxx_config.xml";

#[derive(Debug, Clone)]
pub struct TestPackage {
    tested: Dependency,
    /// Package folder of the library under test.
    tested_package_folder: PathBuf,
}

impl TestPackage {
    pub fn new(tested: Dependency, tested_package_folder: impl Into<PathBuf>) -> Self {
        Self {
            tested,
            tested_package_folder: tested_package_folder.into(),
        }
    }

    fn binary_name() -> &'static str {
        if cfg!(windows) { "test_package.exe" } else { "test_package" }
    }
}

impl Recipe for TestPackage {
    fn name(&self) -> &str {
        "test_package"
    }

    fn layout(&self, state: &mut RecipeState) -> Result<()> {
        let workspace = state.ctx.workspace.join(TEST_PACKAGE_DIR);
        let source = state.ctx.recipe_dir.join(TEST_PACKAGE_DIR);
        state.layout = Layout::cmake(&workspace, source, &state.settings);
        Ok(())
    }

    fn requirements(&self, state: &mut RecipeState) -> Result<()> {
        state.requirements.insert(self.tested.clone());
        state.tested_reference = Some(self.tested.clone());
        Ok(())
    }

    fn build(&self, state: &mut RecipeState) -> Result<()> {
        let prefix = self.tested_package_folder.display().to_string();
        let ctx = state.ctx.clone();
        let cmake = state.cmake(|_| {
            let mut defs = Definitions::new();
            defs.set("CMAKE_PREFIX_PATH", prefix);
            defs
        })?;
        cmake.build(&ctx)
    }

    fn test(&self, state: &mut RecipeState) -> Result<()> {
        if state.is_cross_building() {
            output::skip("cross-building, skipping test run");
            return Ok(());
        }

        let config = state.layout.source_folder.join(CONFIG_FILE);
        let bin = state.layout.bindir().join(Self::binary_name());
        let mut cmd = Command::new(&bin);
        cmd.arg(&config);
        command::run(&state.ctx, &mut cmd)
    }
}
