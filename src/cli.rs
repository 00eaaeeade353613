use crate::autodoc::{AutoDocer, CycleOutcome};
use crate::config::AutoDocOptions;
use crate::extractor::manifest::ManifestSource;
use crate::extractor::extract;
use crate::openapi_builder::synthesize;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// OpenAPI Autodoc - Synthesize an OpenAPI document from a route manifest and publish it
#[derive(Parser, Debug)]
#[command(name = "openapi-autodoc")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the route manifest (JSON or YAML)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Project name used as document title and operation tag
    #[arg(long = "project-name")]
    pub project_name: Option<String>,

    /// API version written into the document
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// Push the document to the aggregator
    #[arg(long = "push")]
    pub push: bool,

    /// Aggregator endpoint to push to
    #[arg(long = "aggregator-url", value_name = "URL")]
    pub aggregator_url: Option<String>,

    /// Base URL of the documented service
    #[arg(long = "service-url", value_name = "URL")]
    pub service_url: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.is_file() {
        anyhow::bail!(
            "Manifest file does not exist: {}",
            args.manifest_path.display()
        );
    }

    if args.aggregator_url.is_some() && !args.push {
        log::warn!("--aggregator-url has no effect without --push");
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

impl CliArgs {
    /// Options from the flags, layered over whatever the environment set.
    fn options(&self, env: AutoDocOptions) -> AutoDocOptions {
        AutoDocOptions {
            project_name: self.project_name.clone().or(env.project_name),
            version: self.api_version.clone().or(env.version),
            aggregator_url: self.aggregator_url.clone().or(env.aggregator_url),
            service_url: self.service_url.clone().or(env.service_url),
            debug: Some(self.verbose || env.debug.unwrap_or(false)),
            ..env
        }
    }
}

/// Run the main workflow
pub async fn run(args: CliArgs) -> Result<()> {
    let env = AutoDocOptions::from_env()?;
    run_with(args, env).await
}

/// Run the main workflow with `env` as the lowest-precedence options
pub async fn run_with(args: CliArgs, env: AutoDocOptions) -> Result<()> {
    let options = args.options(env);
    let autodoc = AutoDocer::new(options)?;
    let source = ManifestSource::new(&args.manifest_path);

    info!("Extracting routes...");
    let routes = extract(&source)?;
    info!("Extracted {} paths", routes.len());
    if routes.is_empty() {
        log::warn!("No routes found in the manifest");
    }

    let document = synthesize(&routes, &autodoc.config().spec_info());
    info!(
        "Built document with {} operations",
        document.operation_count()
    );

    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    if args.push {
        match autodoc.run_cycle(&source).await {
            CycleOutcome::Synced { operations, .. } => {
                info!("Pushed {} operations to {}", operations, autodoc.config().aggregator_url);
            }
            CycleOutcome::Skipped { kind, message } => {
                anyhow::bail!("Push failed ({}): {}", kind, message);
            }
        }
    }

    Ok(())
}
