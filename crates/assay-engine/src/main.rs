//! Assay CLI
//!
//! Usage:
//!   assay [--config assay.yaml] [--log-level debug] features/*.feature
//!
//! Runs every scenario of every feature file, prints a summary and exits
//! with status 1 when any scenario failed.

use anyhow::Context;
use assay_engine::{EngineConfig, Feature, ReqwestClient, Runner};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Run Gherkin feature files against an HTTP API
#[derive(Parser, Debug)]
#[command(name = "assay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Engine configuration file (YAML)
    #[arg(short, long, env = "ASSAY_CONFIG")]
    config: Option<PathBuf>,

    /// Default log level, overridden by RUST_LOG
    #[arg(short, long, default_value = "warn")]
    log_level: tracing::Level,

    /// Feature files to run
    #[arg(required = true)]
    features: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(args.log_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let client = ReqwestClient::new(config.timeout()).context("Failed to create HTTP client")?;
    let runner = Runner::new(Arc::new(config), Arc::new(client));

    let mut passed = 0;
    let mut failed = 0;
    for path in &args.features {
        let feature = Feature::from_file(path)
            .with_context(|| format!("Failed to load feature {}", path.display()))?;
        println!("{BOLD}Feature: {}{RESET} {DIM}({}){RESET}", feature.name, path.display());

        let report = runner.run_feature(&feature);
        for scenario in &report.scenarios {
            match &scenario.failure {
                None => println!("  {GREEN}✓{RESET} {}", scenario.name),
                Some(failure) => {
                    println!("  {RED}✗{RESET} {}", scenario.name);
                    println!("    {DIM}line {}:{RESET} {}", failure.line, failure.step);
                    for line in failure.error.to_string().lines() {
                        println!("    {RED}{line}{RESET}");
                    }
                }
            }
        }
        println!();
        passed += report.passed();
        failed += report.failed();
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  {GREEN}Passed: {passed}{RESET}");
    println!("  {RED}Failed: {failed}{RESET}");

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
