//! The hook surface a recipe implements.
//!
//! Every hook defaults to doing nothing, so a recipe only implements the
//! stages it cares about. Hooks are called by [`crate::Lifecycle`], once
//! each, in [`crate::Stage`] order.

use crate::error::Result;
use crate::options::Options;
use crate::state::{Metadata, RecipeState};

pub trait Recipe {
    /// Package name.
    fn name(&self) -> &str;

    fn metadata(&self) -> Metadata {
        Metadata::default()
    }

    fn default_options(&self) -> Options {
        Options::default()
    }

    /// Compute source/build/package folders.
    fn layout(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    /// Remove options that do not apply to the target platform.
    fn config_options(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    /// Derive option values from other options.
    fn configure(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    fn requirements(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    /// Reject configurations that cannot be built.
    fn validate(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    /// Declare tools needed only while building.
    fn build_requirements(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    fn source(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    fn build(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    fn package(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    /// Publish consumer metadata into `state.cpp_info`.
    fn package_info(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }

    /// Exercise the built package. Only verification recipes implement this.
    fn test(&self, _state: &mut RecipeState) -> Result<()> {
        Ok(())
    }
}
