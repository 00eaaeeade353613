//! The documentation sync facade.
//!
//! [`AutoDocer`] ties the pipeline together: after a startup delay it extracts the routes
//! of a [`RouteSource`], synthesizes a document and hands it to a [`DocumentSink`]. A sync
//! failure never reaches the host; it is reported through [`CycleOutcome`] and, with
//! `debug` enabled, the log.
//!
//! ```no_run
//! use openapi_autodoc::autodoc::{pass_through, AutoDocer};
//! use openapi_autodoc::config::AutoDocOptions;
//! use openapi_autodoc::extractor::axum::{get, post, DocumentedRouter};
//!
//! async fn create_user() -> &'static str { "created" }
//!
//! # async fn run() -> openapi_autodoc::error::Result<()> {
//! let autodoc = AutoDocer::new(AutoDocOptions::new().title("Node Production API").version("2.5.0"))?;
//! let app: DocumentedRouter = DocumentedRouter::new().route("/users", post(create_user));
//! let registry = app.registry();
//!
//! let app = app
//!     .route("/autodoc/openapi.json", get(|| async { "" }))
//!     .layer(axum::middleware::from_fn(pass_through));
//! let _scan = autodoc.init(registry, &AutoDocOptions::new())?;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

use crate::config::{AutoDocConfig, AutoDocOptions};
use crate::delivery::{AggregatorClient, DeliveryPayload, DocumentSink};
use crate::error::Result;
use crate::extractor::{extract, RouteSource};
use crate::openapi_builder::{synthesize, OpenApiDocument};
use crate::scheduler::{schedule_once, ScanHandle};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{self, MethodRouter};
use axum::Json;
use log::{error, info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Result of one scan-and-send cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The aggregator accepted the document
    Synced { paths: usize, operations: usize },
    /// The cycle was abandoned
    Skipped { kind: &'static str, message: String },
}

impl CycleOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, CycleOutcome::Synced { .. })
    }
}

/// Discovers routes, synthesizes the document and pushes it to the aggregator.
#[derive(Clone)]
pub struct AutoDocer {
    config: AutoDocConfig,
    client: reqwest::Client,
    sink: Option<Arc<dyn DocumentSink>>,
}

impl AutoDocer {
    /// Create an AutoDocer with `options` applied over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::InvalidConfig`] for malformed options.
    pub fn new(options: AutoDocOptions) -> Result<Self> {
        Ok(Self {
            config: AutoDocConfig::resolve(&[&options])?,
            client: reqwest::Client::new(),
            sink: None,
        })
    }

    /// Use `sink` instead of posting to the configured aggregator URL.
    pub fn with_sink(mut self, sink: Arc<dyn DocumentSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &AutoDocConfig {
        &self.config
    }

    /// Schedules a single scan of `source` after the configured startup delay.
    ///
    /// `overrides` are applied on top of the constructor options for this scan only.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::InvalidConfig`] if `overrides` are malformed and
    /// [`crate::error::Error::Scheduling`] outside a tokio runtime. Nothing is scheduled in
    /// either case.
    pub fn init<R>(&self, source: R, overrides: &AutoDocOptions) -> Result<ScanHandle<CycleOutcome>>
    where
        R: RouteSource + Send + Sync + 'static,
    {
        self.init_with_shutdown(source, overrides, &CancellationToken::new())
    }

    /// Like [`AutoDocer::init`], but the scan is skipped if `shutdown` is cancelled before
    /// the delay elapses.
    pub fn init_with_shutdown<R>(
        &self,
        source: R,
        overrides: &AutoDocOptions,
        shutdown: &CancellationToken,
    ) -> Result<ScanHandle<CycleOutcome>>
    where
        R: RouteSource + Send + Sync + 'static,
    {
        let config = self.config.merged(overrides)?;
        if config.debug {
            info!("[AutoDocer] Initialized for: {}", config.project_name);
        }

        let sink = self.sink_for(&config);
        let delay = config.startup_delay;
        schedule_once(delay, shutdown.child_token(), move || async move {
            run_cycle_with(&config, sink.as_ref(), &source).await
        })
    }

    /// Runs one cycle immediately, publishing under `service_name` at `service_url`.
    pub async fn register<R>(&self, source: &R, service_name: &str, service_url: &str) -> CycleOutcome
    where
        R: RouteSource + ?Sized,
    {
        let overrides = AutoDocOptions::new()
            .service_name(service_name)
            .service_url(service_url);
        match self.config.merged(&overrides) {
            Ok(config) => {
                let sink = self.sink_for(&config);
                run_cycle_with(&config, sink.as_ref(), source).await
            }
            Err(e) => skipped(&self.config, e),
        }
    }

    /// Runs one cycle immediately with the constructor configuration.
    pub async fn run_cycle<R>(&self, source: &R) -> CycleOutcome
    where
        R: RouteSource + ?Sized,
    {
        let sink = self.sink_for(&self.config);
        run_cycle_with(&self.config, sink.as_ref(), source).await
    }

    /// Extracts and synthesizes without delivering.
    pub fn build_document<R>(&self, source: &R) -> Result<OpenApiDocument>
    where
        R: RouteSource + ?Sized,
    {
        let routes = extract(source)?;
        Ok(synthesize(&routes, &self.config.spec_info()))
    }

    /// A GET endpoint that serves the live document as JSON.
    ///
    /// Routes are re-read on every request. A discovery failure answers
    /// `503 Service Unavailable`.
    pub fn spec_endpoint<R, S>(&self, source: R) -> MethodRouter<S>
    where
        R: RouteSource + Send + Sync + 'static,
        S: Clone + Send + Sync + 'static,
    {
        let source = Arc::new(source);
        let info = self.config.spec_info();
        routing::get(move || {
            let source = source.clone();
            let info = info.clone();
            async move {
                match extract(&source) {
                    Ok(routes) => Json(synthesize(&routes, &info)).into_response(),
                    Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
                }
            }
        })
    }

    fn sink_for(&self, config: &AutoDocConfig) -> Arc<dyn DocumentSink> {
        match &self.sink {
            Some(sink) => sink.clone(),
            None => Arc::new(AggregatorClient::new(self.client.clone(), config)),
        }
    }
}

/// Middleware that forwards every request untouched, for `axum::middleware::from_fn`.
pub async fn pass_through(request: Request, next: Next) -> Response {
    next.run(request).await
}

async fn run_cycle_with<R>(config: &AutoDocConfig, sink: &dyn DocumentSink, source: &R) -> CycleOutcome
where
    R: RouteSource + ?Sized,
{
    if config.debug {
        info!("[AutoDocer] Scanning routes...");
    }

    let routes = match extract(source) {
        Ok(routes) => routes,
        Err(e) => return skipped(config, e),
    };

    let spec = synthesize(&routes, &config.spec_info());
    let paths = spec.paths.len();
    let operations = spec.operation_count();
    let payload = DeliveryPayload::new(config, spec);

    if config.debug {
        info!("[AutoDocer] Sending docs to {}...", sink.endpoint());
    }

    if let Err(e) = sink.deliver(&payload).await {
        return skipped(config, e);
    }

    info!("[AutoDocer] Docs synced for \"{}\"", config.project_name);
    CycleOutcome::Synced { paths, operations }
}

fn skipped(config: &AutoDocConfig, err: crate::error::Error) -> CycleOutcome {
    if config.debug {
        error!("[AutoDocer] Sync failed ({}): {}", err.kind(), err);
        if err.is_connection_refused() {
            error!("   -> Check that the aggregator at {} is running.", config.aggregator_url);
        }
    }
    CycleOutcome::Skipped {
        kind: err.kind(),
        message: err.to_string(),
    }
}
