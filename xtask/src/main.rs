// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - developer automation for crew-ftl
//!
//! - `cargo xtask ci` runs lint, dependency checks, build and tests
//! - `cargo xtask check-rules [PATH]` loads a rule table file through the
//!   same provider chain the library uses and prints what it resolved to
//! - `cargo xtask coverage` writes an lcov report to `target/lcov.info`

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{
    io,
    path::{Path, PathBuf},
    process::Output,
};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context};
use crew_ftl_config::{CONFIG_FILE_NAME, Config};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.run() {
        tracing::error!("{err:?}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, dependency checks, build, test, rule fixtures)
    CI,

    /// Build the workspace
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Load a rule table file and print the resolved table
    #[command(visible_alias = "cr")]
    CheckRules {
        /// Rule table file (defaults to `ftl.toml` in the working directory)
        path: Option<PathBuf>,
    },

    /// Generate an lcov coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependency licenses and advisories
    #[command(visible_alias = "cd")]
    Deny,

    /// Check for unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the workspace
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Build docs with warnings denied
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check formatting
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Apply clippy fixes
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Apply formatting
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Fix typos in place
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run lib and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::CheckRules { path } => {
                check_rules(path.as_deref().unwrap_or_else(|| Path::new(CONFIG_FILE_NAME)))
            }
            Self::Coverage => coverage(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::FixTypos => fix_typos(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
        }
    }
}

/// Lint, check dependencies, build, test, then load the shipped fixture
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    check_rules(Path::new("crates/config/fixtures/ftl.toml"))
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Resolve a rule table through defaults, file and `FTL_` environment
/// overrides, validate it, and print a summary of what will be enforced.
fn check_rules(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "{} not found, only defaults and environment overrides apply",
            path.display()
        );
    }

    let config: Config = Config::load_from(path)
        .wrap_err_with(|| format!("failed to load rule table from {}", path.display()))?;
    let rules = &config.rules;

    tracing::info!("rule table '{}' is valid", rules.version);
    for band in &rules.fdp_bands {
        let crew: String = band
            .crew
            .map_or_else(|| String::from("any crew"), |crew| crew.to_string());
        let steps: Vec<String> = band
            .sector_ladder
            .iter()
            .map(|step| format!("<={} sectors: {}", step.max_sectors, step.max_fdp))
            .collect();
        tracing::info!(
            "  report {:?}-{:?} ({crew}): {}",
            band.report_from,
            band.report_until,
            steps.join(", ")
        );
    }
    tracing::info!(
        "  disruptive window {:?}-{:?}, reduction {}",
        rules.disruptive.window_start,
        rules.disruptive.window_end,
        rules.disruptive.max_fdp_reduction
    );
    tracing::info!(
        "  minimum rest {} or {}% of the preceding FDP, measured on {:?}",
        rules.minimum_rest.floor,
        rules.minimum_rest.preceding_duty_percent,
        rules.rest_boundary
    );
    tracing::info!(
        "  extensions: up to {} x {} in {} days",
        rules.extension.max_uses,
        rules.extension.max_extension,
        rules.extension.lookback_days
    );
    Ok(())
}

fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint clippy, docs, formatting and typos
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    Ok(())
}

fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Build docs for every default member with docs.rs flags and warnings denied
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Check for typos using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

fn fix_typos() -> Result<()> {
    cmd!("typos", "-w").run_with_trace()?;
    Ok(())
}

/// Lib tests first, doc tests last because they are slow
fn test() -> Result<()> {
    test_libs()?;
    test_docs()
}

fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO is set because this runs as a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Logs a `duct::Expression` before running it.
trait ExpressionExt {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // Repeat the command; its output may have scrolled it away
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
