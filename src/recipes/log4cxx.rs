//! Recipe for Apache log4cxx, a logging framework for C++ patterned after log4j.

use crate::deps::Dependency;
use crate::error::{RecipeError, Result};
use crate::layout::Layout;
use crate::manifest::SourceManifest;
use crate::output;
use crate::recipe::Recipe;
use crate::settings::{CppStd, Settings};
use crate::state::{Metadata, RecipeState};
use crate::tools::{files, Definitions, ExtractOptions};

/// Minimum C++ standard the library compiles with.
pub const MIN_CPPSTD: u32 = 17;

/// Define consumers need when linking the static library.
pub const STATIC_DEFINE: &str = "LOG4CXX_STATIC";

/// Upstream archives contain test fixtures whose names end in `:`, which
/// cannot be created on Windows.
pub const SOURCE_PATTERN: &str = "*[!:]";

/// Libraries the recipe links against, for the given target.
pub fn compute_dependencies(settings: &Settings) -> Vec<Dependency> {
    let mut deps = vec![
        dep("apr", 1, 7, 0),
        dep("apr-util", 1, 6, 1),
        dep("expat", 2, 5, 0),
    ];
    if !settings.os.is_windows() {
        deps.push(dep("odbc", 2, 3, 9));
    }
    deps
}

/// Tools needed only while building, for the given target.
pub fn compute_build_dependencies(settings: &Settings) -> Vec<Dependency> {
    if settings.os.is_windows() {
        Vec::new()
    } else {
        vec![dep("pkgconf", 1, 7, 4)]
    }
}

fn dep(name: &str, major: u64, minor: u64, patch: u64) -> Dependency {
    Dependency::new(name, semver::Version::new(major, minor, patch))
}

/// Fail unless the configured standard is at least `min`.
///
/// An unset standard means the compiler default and is accepted.
pub fn check_min_cppstd(settings: &Settings, min: u32) -> Result<()> {
    let Some(cppstd) = settings.cppstd else {
        return Ok(());
    };
    if cppstd.year() < CppStd::new(min).year() {
        return Err(RecipeError::ConfigurationInvalid(format!(
            "current cppstd ({}) is lower than the required C++ standard ({})",
            cppstd, min
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Log4cxx;

impl Log4cxx {
    fn cmake_definitions(state: &RecipeState) -> Definitions {
        let mut defs = Definitions::new();
        defs.set_bool("BUILD_TESTING", false)
            .set_bool("PREFER_BOOST", state.options.prefer_boost)
            .set_bool("BUILD_SHARED_LIBS", state.options.shared);
        if let Some(fpic) = state.options.fpic() {
            defs.set_bool("CMAKE_POSITION_INDEPENDENT_CODE", fpic);
        }
        if state.settings.os.is_windows() {
            defs.set_bool("LOG4CXX_INSTALL_PDB", false);
        }
        defs
    }
}

impl Recipe for Log4cxx {
    fn name(&self) -> &str {
        "log4cxx"
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            description: "Logging framework for C++ patterned after Apache log4j".to_string(),
            license: "Apache-2.0".to_string(),
            homepage: "https://logging.apache.org/log4cxx".to_string(),
            url: "https://github.com/conan-io/conan-center-index".to_string(),
            topics: vec!["logging".to_string(), "log".to_string()],
        }
    }

    fn layout(&self, state: &mut RecipeState) -> Result<()> {
        let workspace = state.ctx.workspace.clone();
        state.layout = Layout::cmake(&workspace, workspace.join("src"), &state.settings);
        Ok(())
    }

    fn config_options(&self, state: &mut RecipeState) -> Result<()> {
        if state.settings.os.is_windows() {
            state.options.remove_fpic();
        }
        Ok(())
    }

    fn configure(&self, state: &mut RecipeState) -> Result<()> {
        if state.options.shared {
            state.options.remove_fpic();
        }
        Ok(())
    }

    fn requirements(&self, state: &mut RecipeState) -> Result<()> {
        let deps = compute_dependencies(&state.settings);
        state.requirements.extend(deps);
        Ok(())
    }

    fn validate(&self, state: &mut RecipeState) -> Result<()> {
        // TODO: fall back to boost when the compiler lacks C++17
        check_min_cppstd(&state.settings, MIN_CPPSTD)
    }

    fn build_requirements(&self, state: &mut RecipeState) -> Result<()> {
        let deps = compute_build_dependencies(&state.settings);
        state.build_requirements.extend(deps);
        Ok(())
    }

    fn source(&self, state: &mut RecipeState) -> Result<()> {
        let manifest = SourceManifest::load_from_dir(&state.ctx.recipe_dir)?;
        let entry = manifest.source(&state.version)?;
        let opts = ExtractOptions::default()
            .with_pattern(SOURCE_PATTERN)?
            .strip_root(true);
        files::get(&state.ctx, entry, &state.layout.source_folder, &opts)
    }

    fn build(&self, state: &mut RecipeState) -> Result<()> {
        let manifest = SourceManifest::load_from_dir(&state.ctx.recipe_dir)?;
        files::apply_patches(
            &state.ctx,
            manifest.patches(&state.version),
            &state.ctx.recipe_dir,
            &state.layout.source_folder,
        )?;

        let ctx = state.ctx.clone();
        let cmake = state.cmake(Self::cmake_definitions)?;
        cmake.build(&ctx)
    }

    fn package(&self, state: &mut RecipeState) -> Result<()> {
        let licenses = state.layout.package_folder.join("licenses");
        for name in ["LICENSE", "NOTICE"] {
            let copied = files::copy(&state.ctx, name, &state.layout.source_folder, &licenses)?;
            if copied.is_empty() && !state.ctx.dry_run {
                output::warning(&format!("{} not found in source folder", name));
            }
        }

        let ctx = state.ctx.clone();
        let cmake = state.cmake(Self::cmake_definitions)?;
        cmake.install(&ctx)?;

        files::rmdir(&state.ctx, &state.layout.package_folder.join("share"))
    }

    fn package_info(&self, state: &mut RecipeState) -> Result<()> {
        let info = &mut state.cpp_info;
        info.set_property("cmake_file_name", "log4cxx");
        info.set_property("cmake_target_name", "log4cxx");
        info.set_property("pkg_config_name", "liblog4cxx");
        if !state.options.shared {
            info.defines = vec![STATIC_DEFINE.to_string()];
        }
        info.libs = vec!["log4cxx".to_string()];

        if state.settings.os.is_windows() {
            info.system_libs.push("odbc32".to_string());
        }
        Ok(())
    }
}
