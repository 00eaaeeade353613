//! OpenAPI Autodoc - publish OpenAPI documentation for a running web service.
//!
//! This library discovers the routes a service has registered at runtime, synthesizes a
//! minimal OpenAPI 3.0 document describing them (one operation per path and verb, with a
//! default `200` response) and pushes that document to a docs aggregator over HTTP.
//!
//! # Architecture
//!
//! 1. [`extractor`] - Lists routes from a host registry and normalizes them
//! 2. [`openapi_builder`] - Synthesizes the OpenAPI document
//! 3. [`delivery`] - Wraps the document in a payload and sends it to the aggregator
//! 4. [`scheduler`] - Runs the scan once, after a startup delay, unless cancelled
//! 5. [`autodoc`] - The [`autodoc::AutoDocer`] facade tying the pipeline together
//! 6. [`config`] - Layered, immutable configuration
//! 7. [`serializer`] - YAML/JSON output for the command-line tool
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_autodoc::autodoc::AutoDocer;
//! use openapi_autodoc::config::AutoDocOptions;
//! use openapi_autodoc::extractor::axum::{get, DocumentedRouter};
//!
//! async fn health() -> &'static str { "ok" }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let autodoc = AutoDocer::new(AutoDocOptions::new().title("Billing API"))?;
//!
//!     let app: DocumentedRouter = DocumentedRouter::new().route("/health", get(health));
//!     let (router, registry) = app.into_parts();
//!
//!     // Scans after the startup delay; failures are logged, never raised.
//!     autodoc.init(registry, &AutoDocOptions::new())?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For documents built from a route manifest, see the [`cli`] module.

pub mod autodoc;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod extractor;
pub mod openapi_builder;
pub mod scheduler;
pub mod serializer;
