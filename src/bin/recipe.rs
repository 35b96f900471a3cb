//! Recipe CLI - evaluate the log4cxx build recipe
//!
//! Usage:
//!   recipe create <recipe-dir>     Fetch, build and package, then run the test package
//!   recipe info <recipe-dir>       Show requirements and consumer metadata
//!   recipe test <recipe-dir>       Run the test package against an existing build

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use log4cxx_recipe::profile::parse_assignment;
use log4cxx_recipe::{
    output, Context, Lifecycle, Log4cxx, Options, Profile, Recipe, RecipeState, Settings,
    SourceManifest, TestPackage,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "recipe")]
#[command(about = "Build and package Apache log4cxx")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Setting override, e.g. -s os=Linux -s compiler.cppstd=17
    #[arg(short = 's', long = "settings", global = true, value_parser = parse_assignment)]
    settings: Vec<(String, String)>,

    /// Option override, e.g. -o shared=True
    #[arg(short = 'o', long = "options", global = true, value_parser = parse_assignment)]
    options: Vec<(String, String)>,

    /// Profile file (defaults to $RECIPE_PROFILE or the user profile)
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Profile describing the machine running the build (defaults to this host)
    #[arg(long, global = true)]
    build_profile: Option<PathBuf>,

    /// Build machine setting override, e.g. --build-setting arch=x86_64
    #[arg(long = "build-setting", global = true, value_parser = parse_assignment)]
    build_settings: Vec<(String, String)>,

    /// Workspace for source, build and package folders
    #[arg(short, long, global = true, env = "RECIPE_BUILD_FOLDER")]
    build_folder: Option<PathBuf>,

    /// Package version (defaults to the newest in manifest.toml)
    #[arg(long = "pkg-version", global = true)]
    pkg_version: Option<semver::Version>,

    /// Print commands without running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Echo every external command
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole recipe lifecycle, then the test package
    Create {
        /// Directory containing manifest.toml, patches/ and test_package/
        recipe_dir: PathBuf,

        /// Skip the test package
        #[arg(long)]
        no_test: bool,
    },

    /// Show requirements and consumer metadata without building
    Info {
        recipe_dir: PathBuf,

        /// Print metadata as JSON
        #[arg(long, conflicts_with = "pkg_config")]
        json: bool,

        /// Print a pkg-config file for the package folder
        #[arg(long)]
        pkg_config: bool,
    },

    /// Build and run the test package against an existing package folder
    Test { recipe_dir: PathBuf },
}

fn main() {
    if let Err(e) = run() {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let (settings, options) = resolve_configuration(&cli)?;
    let build_settings = resolve_build_settings(&cli)?;

    match &cli.command {
        Commands::Create {
            recipe_dir,
            no_test,
        } => {
            let ctx = context(&cli, recipe_dir, &build_settings);
            let version = resolve_version(&cli, recipe_dir)?;
            let lifecycle = Lifecycle::new(&Log4cxx);
            let mut state = lifecycle.state_with_options(version, settings.clone(), options, ctx);
            lifecycle.run(&mut state)?;

            if *no_test {
                output::skip("test package disabled");
            } else {
                run_test_package(&cli, recipe_dir, &state, settings, &build_settings)?;
            }
        }

        Commands::Info {
            recipe_dir,
            json,
            pkg_config,
        } => {
            let ctx = context(&cli, recipe_dir, &build_settings);
            let version = resolve_version(&cli, recipe_dir)?;
            let lifecycle = Lifecycle::new(&Log4cxx);
            let mut state = lifecycle.state_with_options(version, settings, options, ctx);
            lifecycle.evaluate(&mut state)?;

            if *json {
                println!("{}", info_json(&state)?);
            } else if *pkg_config {
                print!(
                    "{}",
                    state.cpp_info.to_pkg_config(
                        &state.layout.package_folder,
                        &state.metadata.description,
                        &state.version.to_string(),
                    )
                );
            } else {
                print_info(&state);
            }
        }

        Commands::Test { recipe_dir } => {
            let version = resolve_version(&cli, recipe_dir)?;
            let ctx = context(&cli, recipe_dir, &build_settings);
            let lifecycle = Lifecycle::new(&Log4cxx);
            let mut state = lifecycle.state_with_options(version, settings.clone(), options, ctx);
            lifecycle.evaluate(&mut state)?;
            run_test_package(&cli, recipe_dir, &state, settings, &build_settings)?;
        }
    }

    Ok(())
}

/// Defaults, then profile, then command-line overrides.
fn resolve_configuration(cli: &Cli) -> Result<(Settings, Options)> {
    let mut settings = Settings::detect();
    let mut options = Log4cxx.default_options();

    if let Some(path) = cli.profile.clone().or_else(Profile::default_path) {
        let profile = Profile::load(&path)
            .with_context(|| format!("Failed to load profile: {}", path.display()))?;
        profile.apply(&mut settings, &mut options)?;
    }
    for (key, value) in &cli.settings {
        settings.set(key, value)?;
    }
    for (key, value) in &cli.options {
        options.set(key, value)?;
    }
    Ok((settings, options))
}

/// Settings of the machine running the build: host, then build profile, then
/// `--build-setting` overrides.
fn resolve_build_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::detect();
    if let Some(path) = &cli.build_profile {
        let profile = Profile::load(path)
            .with_context(|| format!("Failed to load build profile: {}", path.display()))?;
        profile.apply_settings(&mut settings)?;
    }
    for (key, value) in &cli.build_settings {
        settings.set(key, value)?;
    }
    Ok(settings)
}

fn context(cli: &Cli, recipe_dir: &Path, build_settings: &Settings) -> Context {
    let mut ctx = Context::new(recipe_dir)
        .build_settings(build_settings.clone())
        .dry_run(cli.dry_run)
        .verbose(cli.verbose);
    if let Some(dir) = &cli.build_folder {
        ctx = ctx.workspace(dir);
    }
    ctx
}

fn resolve_version(cli: &Cli, recipe_dir: &Path) -> Result<semver::Version> {
    if let Some(version) = &cli.pkg_version {
        return Ok(version.clone());
    }
    let manifest = SourceManifest::load_from_dir(recipe_dir)?;
    manifest.latest().with_context(|| {
        format!(
            "No versions listed in {}; pass --pkg-version",
            recipe_dir.join("manifest.toml").display()
        )
    })
}

fn run_test_package(
    cli: &Cli,
    recipe_dir: &Path,
    tested: &RecipeState,
    settings: Settings,
    build_settings: &Settings,
) -> Result<()> {
    let recipe = TestPackage::new(tested.reference(), &tested.layout.package_folder);
    let lifecycle = Lifecycle::new(&recipe);
    let ctx = context(cli, recipe_dir, build_settings);
    let mut state = lifecycle.state(tested.version.clone(), settings, ctx);
    lifecycle.verify(&mut state)?;
    output::success(&format!("{} verified", tested.reference()));
    Ok(())
}

fn info_json(state: &RecipeState) -> Result<String> {
    let value = serde_json::json!({
        "reference": state.reference().to_string(),
        "metadata": state.metadata,
        "settings": state.settings,
        "options": state.options,
        "requires": state.requirements,
        "build_requires": state.build_requirements,
        "cpp_info": state.cpp_info,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn print_info(state: &RecipeState) {
    output::action(&state.reference().to_string());
    output::info(&state.metadata.description);

    println!("  options:");
    for (name, value) in state.options.entries() {
        println!("    {}={}", name, if value { "True" } else { "False" });
    }
    println!("  requires ({}):", state.requirements.len());
    for dep in &state.requirements {
        println!("    {}", dep);
    }
    if !state.build_requirements.is_empty() {
        println!("  build_requires ({}):", state.build_requirements.len());
        for dep in &state.build_requirements {
            println!("    {}", dep);
        }
    }

    let info = &state.cpp_info;
    println!("  libs: {}", info.libs.join(", "));
    if !info.defines.is_empty() {
        println!("  defines: {}", info.defines.join(", "));
    }
    if !info.system_libs.is_empty() {
        println!("  system_libs: {}", info.system_libs.join(", "));
    }
    for (key, value) in &info.properties {
        println!("  {}: {}", key, value);
    }
}
