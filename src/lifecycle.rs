//! Lifecycle orchestration for recipe evaluation
//!
//! The lifecycle flow:
//! 1. layout - compute folders
//! 2. config_options - drop options that do not apply to the platform
//! 3. configure - derive dependent option values
//! 4. requirements - declare dependencies
//! 5. validate - reject unbuildable configurations
//! 6. build_requirements - declare build-only tools
//! 7. source - fetch and unpack upstream sources
//! 8. build - patch, configure and compile
//! 9. package - collect licenses and installed artifacts
//! 10. package_info - publish consumer metadata
//!
//! Each stage runs once, in order. The first failure aborts the evaluation.

use std::fmt;

use thiserror::Error;

use crate::context::Context;
use crate::error::RecipeError;
use crate::options::Options;
use crate::output;
use crate::recipe::Recipe;
use crate::settings::Settings;
use crate::state::RecipeState;

/// A named hook in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Layout,
    ConfigOptions,
    Configure,
    Requirements,
    Validate,
    BuildRequirements,
    Source,
    Build,
    Package,
    PackageInfo,
    Test,
}

impl Stage {
    /// Full evaluation of a library recipe.
    pub const RECIPE: [Stage; 10] = [
        Stage::Layout,
        Stage::ConfigOptions,
        Stage::Configure,
        Stage::Requirements,
        Stage::Validate,
        Stage::BuildRequirements,
        Stage::Source,
        Stage::Build,
        Stage::Package,
        Stage::PackageInfo,
    ];

    /// Stages that only compute metadata and touch no files.
    pub const METADATA: [Stage; 7] = [
        Stage::Layout,
        Stage::ConfigOptions,
        Stage::Configure,
        Stage::Requirements,
        Stage::Validate,
        Stage::BuildRequirements,
        Stage::PackageInfo,
    ];

    /// Evaluation of a verification package.
    pub const VERIFY: [Stage; 4] = [
        Stage::Layout,
        Stage::Requirements,
        Stage::Build,
        Stage::Test,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Layout => "layout",
            Stage::ConfigOptions => "config_options",
            Stage::Configure => "configure",
            Stage::Requirements => "requirements",
            Stage::Validate => "validate",
            Stage::BuildRequirements => "build_requirements",
            Stage::Source => "source",
            Stage::Build => "build",
            Stage::Package => "package",
            Stage::PackageInfo => "package_info",
            Stage::Test => "test",
        }
    }

    fn invoke<R: Recipe + ?Sized>(
        self,
        recipe: &R,
        state: &mut RecipeState,
    ) -> Result<(), RecipeError> {
        match self {
            Stage::Layout => recipe.layout(state),
            Stage::ConfigOptions => recipe.config_options(state),
            Stage::Configure => recipe.configure(state),
            Stage::Requirements => recipe.requirements(state),
            Stage::Validate => recipe.validate(state),
            Stage::BuildRequirements => recipe.build_requirements(state),
            Stage::Source => recipe.source(state),
            Stage::Build => recipe.build(state),
            Stage::Package => recipe.package(state),
            Stage::PackageInfo => recipe.package_info(state),
            Stage::Test => recipe.test(state),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed stage and its cause.
#[derive(Error, Debug)]
#[error("{stage} failed")]
pub struct LifecycleError {
    pub stage: Stage,
    pub source: RecipeError,
}

/// Drives a recipe's hooks over one [`RecipeState`].
pub struct Lifecycle<'a, R: Recipe + ?Sized> {
    recipe: &'a R,
}

impl<'a, R: Recipe + ?Sized> Lifecycle<'a, R> {
    pub fn new(recipe: &'a R) -> Self {
        Self { recipe }
    }

    /// Fresh state for one evaluation, with the recipe's metadata and
    /// default options.
    pub fn state(&self, version: semver::Version, settings: Settings, ctx: Context) -> RecipeState {
        let mut state = RecipeState::new(
            self.recipe.name(),
            version,
            settings,
            self.recipe.default_options(),
            ctx,
        );
        state.metadata = self.recipe.metadata();
        state
    }

    /// Same as [`Lifecycle::state`] with explicit options.
    pub fn state_with_options(
        &self,
        version: semver::Version,
        settings: Settings,
        options: Options,
        ctx: Context,
    ) -> RecipeState {
        let mut state = self.state(version, settings, ctx);
        state.options = options;
        state
    }

    /// Run every stage, then write the published metadata into the package
    /// folder.
    pub fn run(&self, state: &mut RecipeState) -> Result<(), LifecycleError> {
        output::action(&format!("Creating {}", state.reference()));
        self.run_stages(&Stage::RECIPE, state)?;

        state
            .cpp_info
            .write(&state.ctx, &state.layout.package_folder)
            .map_err(|source| LifecycleError {
                stage: Stage::PackageInfo,
                source,
            })?;

        output::success(&format!("{} created", state.reference()));
        Ok(())
    }

    /// Compute requirements and consumer metadata without building.
    pub fn evaluate(&self, state: &mut RecipeState) -> Result<(), LifecycleError> {
        self.run_stages(&Stage::METADATA, state)
    }

    /// Build and run a verification package.
    pub fn verify(&self, state: &mut RecipeState) -> Result<(), LifecycleError> {
        output::action(&format!("Testing {}", self.recipe.name()));
        self.run_stages(&Stage::VERIFY, state)
    }

    fn run_stages(&self, stages: &[Stage], state: &mut RecipeState) -> Result<(), LifecycleError> {
        for &stage in stages {
            output::stage(stage.name());
            stage
                .invoke(self.recipe, state)
                .map_err(|source| LifecycleError { stage, source })?;
            state.mark_completed(stage);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every hook call; fails at `fail_at` when set.
    struct Recorder {
        calls: RefCell<Vec<Stage>>,
        fail_at: Option<Stage>,
    }

    impl Recorder {
        fn new(fail_at: Option<Stage>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_at,
            }
        }

        fn hit(&self, stage: Stage) -> Result<(), RecipeError> {
            self.calls.borrow_mut().push(stage);
            if self.fail_at == Some(stage) {
                return Err(RecipeError::ConfigurationInvalid("recorder".to_string()));
            }
            Ok(())
        }
    }

    impl Recipe for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn layout(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::Layout)
        }
        fn config_options(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::ConfigOptions)
        }
        fn configure(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::Configure)
        }
        fn requirements(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::Requirements)
        }
        fn validate(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::Validate)
        }
        fn build_requirements(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::BuildRequirements)
        }
        fn source(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::Source)
        }
        fn build(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::Build)
        }
        fn package(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::Package)
        }
        fn package_info(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::PackageInfo)
        }
        fn test(&self, _: &mut RecipeState) -> Result<(), RecipeError> {
            self.hit(Stage::Test)
        }
    }

    fn state_for(recorder: &Recorder) -> RecipeState {
        let ctx = Context::new("/recipe").workspace("/ws").dry_run(true);
        Lifecycle::new(recorder).state(semver::Version::new(1, 0, 0), Settings::detect(), ctx)
    }

    #[test]
    fn test_run_calls_each_stage_once_in_order() {
        let recorder = Recorder::new(None);
        let mut state = state_for(&recorder);
        Lifecycle::new(&recorder).run(&mut state).unwrap();

        assert_eq!(*recorder.calls.borrow(), Stage::RECIPE.to_vec());
        assert_eq!(state.completed_stages(), &Stage::RECIPE);
    }

    #[test]
    fn test_failure_stops_sequence() {
        let recorder = Recorder::new(Some(Stage::Validate));
        let mut state = state_for(&recorder);
        let err = Lifecycle::new(&recorder).run(&mut state).unwrap_err();

        assert_eq!(err.stage, Stage::Validate);
        assert!(matches!(err.source, RecipeError::ConfigurationInvalid(_)));
        assert_eq!(recorder.calls.borrow().last(), Some(&Stage::Validate));
        assert!(!recorder.calls.borrow().contains(&Stage::Source));
        assert_eq!(state.completed_stages().len(), 4);
    }

    #[test]
    fn test_evaluate_skips_file_stages() {
        let recorder = Recorder::new(None);
        let mut state = state_for(&recorder);
        Lifecycle::new(&recorder).evaluate(&mut state).unwrap();

        assert_eq!(*recorder.calls.borrow(), Stage::METADATA.to_vec());
        assert!(state.ctx.history().is_empty());
    }

    #[test]
    fn test_verify_sequence() {
        let recorder = Recorder::new(None);
        let mut state = state_for(&recorder);
        Lifecycle::new(&recorder).verify(&mut state).unwrap();
        assert_eq!(*recorder.calls.borrow(), Stage::VERIFY.to_vec());
    }

    #[test]
    fn test_error_message_names_stage() {
        let err = LifecycleError {
            stage: Stage::BuildRequirements,
            source: RecipeError::ConfigurationInvalid("x".to_string()),
        };
        assert_eq!(err.to_string(), "build_requirements failed");
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "build_requirements failed: invalid configuration: x"
        );
    }
}
