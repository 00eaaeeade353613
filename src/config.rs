//! Configuration for documentation sync.
//!
//! [`AutoDocConfig`] is immutable once built. It is resolved from layers of
//! [`AutoDocOptions`] applied over the defaults in a fixed order: constructor options
//! first, then per-call overrides. Options can be built in code, deserialized (camelCase
//! keys, `title` accepted for `projectName`) or read from `AUTODOC_*` environment
//! variables.

use crate::error::{Error, Result};
use crate::openapi_builder::SpecInfo;
use reqwest::Url;
use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled API";
pub const DEFAULT_AGGREGATOR_URL: &str = "http://localhost:8080/api/docs";
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3000";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoDocConfig {
    /// Document title and operation tag
    pub project_name: String,
    /// Name the service is published under; defaults to the project name
    pub service_name: String,
    /// Where the document is POSTed
    pub aggregator_url: String,
    /// Base URL at which this service can be reached
    pub service_url: String,
    /// API version written into the document
    pub version: String,
    /// Verbose diagnostics; never changes the document produced
    pub debug: bool,
    /// Wait between `init` and the scan
    pub startup_delay: Duration,
    /// Timeout for the delivery request
    pub request_timeout: Duration,
}

/// Optional overrides; unset fields keep the value of the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoDocOptions {
    #[serde(alias = "title")]
    pub project_name: Option<String>,
    pub service_name: Option<String>,
    pub aggregator_url: Option<String>,
    pub service_url: Option<String>,
    pub version: Option<String>,
    pub debug: Option<bool>,
    pub startup_delay_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

impl Default for AutoDocConfig {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            service_name: DEFAULT_PROJECT_NAME.to_string(),
            aggregator_url: DEFAULT_AGGREGATOR_URL.to_string(),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            version: DEFAULT_VERSION.to_string(),
            debug: false,
            startup_delay: DEFAULT_STARTUP_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AutoDocConfig {
    /// Resolves the defaults overlaid with `layers`, lowest precedence first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a URL does not parse or a name is blank.
    pub fn resolve(layers: &[&AutoDocOptions]) -> Result<Self> {
        layers
            .iter()
            .try_fold(Self::default(), |config, layer| config.merged(layer))
    }

    /// Returns a new config with `options` applied on top of this one.
    pub fn merged(&self, options: &AutoDocOptions) -> Result<Self> {
        let mut next = self.clone();

        if let Some(name) = &options.project_name {
            // An explicit service name on a lower layer survives a rename.
            if next.service_name == next.project_name {
                next.service_name = name.clone();
            }
            next.project_name = name.clone();
        }
        if let Some(service_name) = &options.service_name {
            next.service_name = service_name.clone();
        }
        if let Some(url) = &options.aggregator_url {
            next.aggregator_url = url.clone();
        }
        if let Some(url) = &options.service_url {
            next.service_url = url.clone();
        }
        if let Some(version) = &options.version {
            next.version = version.clone();
        }
        if let Some(debug) = options.debug {
            next.debug = debug;
        }
        if let Some(ms) = options.startup_delay_ms {
            next.startup_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = options.request_timeout_ms {
            next.request_timeout = Duration::from_millis(ms);
        }

        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(Error::InvalidConfig("projectName must not be empty".to_string()));
        }
        if self.service_name.trim().is_empty() {
            return Err(Error::InvalidConfig("serviceName must not be empty".to_string()));
        }
        for (key, value) in [
            ("aggregatorUrl", &self.aggregator_url),
            ("serviceUrl", &self.service_url),
        ] {
            Url::parse(value)
                .map_err(|e| Error::InvalidConfig(format!("{} {:?}: {}", key, value, e)))?;
        }
        Ok(())
    }

    /// Naming inputs for the synthesizer
    pub fn spec_info(&self) -> SpecInfo {
        SpecInfo {
            project_name: self.project_name.clone(),
            version: self.version.clone(),
        }
    }
}

impl AutoDocOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Alias of [`AutoDocOptions::project_name`]
    pub fn title(self, title: impl Into<String>) -> Self {
        self.project_name(title)
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn aggregator_url(mut self, url: impl Into<String>) -> Self {
        self.aggregator_url = Some(url.into());
        self
    }

    pub fn service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Load options from `AUTODOC_*` environment variables. Unset variables stay `None`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            project_name: env::var("AUTODOC_PROJECT_NAME").ok(),
            service_name: env::var("AUTODOC_SERVICE_NAME").ok(),
            aggregator_url: env::var("AUTODOC_AGGREGATOR_URL").ok(),
            service_url: env::var("AUTODOC_SERVICE_URL").ok(),
            version: env::var("AUTODOC_VERSION").ok(),
            debug: env::var("AUTODOC_DEBUG")
                .ok()
                .map(|v| v == "true" || v == "1"),
            startup_delay_ms: parse_env_u64("AUTODOC_STARTUP_DELAY_MS")?,
            request_timeout_ms: parse_env_u64("AUTODOC_REQUEST_TIMEOUT_MS")?,
        })
    }
}

fn parse_env_u64(key: &str) -> Result<Option<u64>> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("Invalid {}: {:?}", key, value))),
        Err(_) => Ok(None),
    }
}
