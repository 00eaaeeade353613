//! OpenAPI Autodoc - Command-line tool for synthesizing and publishing OpenAPI documents.
//!
//! Reads a route manifest, builds the same document the library pushes from a running
//! service, and writes it as YAML or JSON. With `--push` the document is also sent to
//! the docs aggregator.
//!
//! # Usage
//!
//! ```bash
//! openapi-autodoc [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Print the document as YAML:
//! ```bash
//! openapi-autodoc routes.yaml --project-name "Billing API"
//! ```
//!
//! Write JSON and push it to an aggregator:
//! ```bash
//! openapi-autodoc routes.yaml -f json -o openapi.json --push --aggregator-url http://docs:8080/api/docs
//! ```
//!
//! Settings not given as flags are read from `AUTODOC_*` environment variables (a `.env`
//! file is loaded first if present).

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_autodoc::cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI Autodoc starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args).await?;

    info!("Done");

    Ok(())
}
