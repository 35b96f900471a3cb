//! Build recipe for Apache log4cxx
//!
//! A recipe is a set of hooks that the [`Lifecycle`] calls in a fixed order,
//! each reading and mutating one [`RecipeState`]:
//!
//! ```text
//! layout -> config_options -> configure -> requirements -> validate
//!        -> build_requirements -> source -> build -> package -> package_info
//! ```
//!
//! The first failing hook aborts the evaluation. CMake, `patch` and the
//! consumer test binary run as child processes; source archives are
//! downloaded, verified and unpacked natively.
//!
//! # Example
//!
//! ```no_run
//! use log4cxx_recipe::{Context, Lifecycle, Log4cxx, Settings};
//!
//! let ctx = Context::new("recipes/log4cxx").workspace("/tmp/log4cxx-build");
//! let lifecycle = Lifecycle::new(&Log4cxx);
//! let mut state = lifecycle.state(semver::Version::new(0, 13, 0), Settings::detect(), ctx);
//! lifecycle.run(&mut state)?;
//! println!("{:?}", state.cpp_info.libs);
//! # Ok::<(), log4cxx_recipe::LifecycleError>(())
//! ```
//!
//! # Options
//!
//! - `shared` - build a shared library (default `False`)
//! - `fPIC` - position independent code; absent on Windows and for shared builds
//! - `prefer_boost` - use boost instead of C++17 facilities (default `False`)

pub mod context;
pub mod cpp_info;
pub mod deps;
pub mod error;
pub mod layout;
pub mod lifecycle;
pub mod manifest;
pub mod options;
pub mod output;
pub mod profile;
pub mod recipe;
pub mod recipes;
pub mod settings;
pub mod state;
pub mod tools;

pub use context::Context;
pub use cpp_info::CppInfo;
pub use deps::{Dependency, Requirements};
pub use error::RecipeError;
pub use lifecycle::{Lifecycle, LifecycleError, Stage};
pub use manifest::SourceManifest;
pub use options::Options;
pub use profile::Profile;
pub use recipe::Recipe;
pub use recipes::{Log4cxx, TestPackage};
pub use settings::{BuildType, CppStd, Os, Settings};
pub use state::{Metadata, RecipeState};
