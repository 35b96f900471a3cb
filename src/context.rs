//! Execution context shared by every stage of one evaluation.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::settings::Settings;

/// Execution context providing configuration for recipe evaluation.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory holding the recipe's manifest, patches and test package
    pub recipe_dir: PathBuf,
    /// Root under which source, build and package folders are laid out
    pub workspace: PathBuf,
    /// Settings of the machine running the build
    pub build_settings: Settings,
    /// Number of parallel jobs for builds
    pub nproc: usize,
    /// If true, log commands and file operations without executing them
    pub dry_run: bool,
    /// If true, print commands as they execute
    pub verbose: bool,
    history: Rc<RefCell<Vec<String>>>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            recipe_dir: PathBuf::from("."),
            workspace: std::env::temp_dir().join("log4cxx-recipe"),
            build_settings: Settings::detect(),
            nproc: num_cpus::get(),
            dry_run: false,
            verbose: false,
            history: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl Context {
    /// Create a new context for the recipe in `recipe_dir`.
    pub fn new(recipe_dir: impl Into<PathBuf>) -> Self {
        Self {
            recipe_dir: recipe_dir.into(),
            ..Default::default()
        }
    }

    /// Set the workspace directory.
    pub fn workspace(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace = dir.into();
        self
    }

    /// Set the settings of the build machine.
    pub fn build_settings(mut self, settings: Settings) -> Self {
        self.build_settings = settings;
        self
    }

    /// Set dry run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set verbose mode.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Record an external command or file operation.
    pub(crate) fn record(&self, entry: String) {
        self.history.borrow_mut().push(entry);
    }

    /// Commands and file operations issued so far, in order.
    ///
    /// Clones of a context share one history.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }
}
