use crate::extractor::{openapi_template, NormalizedRoute, RouteEntry};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// OpenAPI version written into every document
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Description of the single default response
pub const DEFAULT_RESPONSE_DESCRIPTION: &str = "Successful response";

/// Naming inputs for a synthesized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecInfo {
    /// Used as the document title and as the tag of every operation
    pub project_name: String,
    /// API version
    pub version: String,
}

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Paths collection (URL path -> verb -> Operation)
    paths: IndexMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
}

/// Operations for a single path, keyed by lowercase verb
pub type PathItem = IndexMap<String, Operation>;

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    pub summary: String,
    /// Tags, always the project name
    pub tags: Vec<String>,
    /// Responses by status code
    pub responses: IndexMap<String, Response>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// API paths
    pub paths: IndexMap<String, PathItem>,
}

impl OpenApiDocument {
    /// Total number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.len()).sum()
    }
}

/// Builds a document describing `routes`.
///
/// Pure and deterministic: paths appear in the order of `routes`, verbs in canonical
/// order. Entries with no methods contribute nothing.
pub fn synthesize(routes: &[RouteEntry], info: &SpecInfo) -> OpenApiDocument {
    let mut builder =
        OpenApiBuilder::new().with_info(info.project_name.clone(), info.version.clone());

    for entry in routes {
        if entry.methods.is_empty() {
            debug!("Skipping {} (empty method set)", entry.path);
            continue;
        }
        for route in entry.normalize() {
            builder.add_route(&route);
        }
    }

    builder.build()
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Untitled API".to_string(),
                version: "1.0.0".to_string(),
            },
            paths: IndexMap::new(),
        }
    }

    /// Set custom info for the API. The title is also the tag of every operation.
    pub fn with_info(mut self, title: String, version: String) -> Self {
        self.info = Info { title, version };
        self
    }

    /// Add a route to the OpenAPI document.
    ///
    /// If the same path and verb were already added, the new operation replaces the old
    /// one. Extraction never yields such duplicates, so a replacement here means two
    /// sources described the same endpoint and the latest one is kept on purpose.
    pub fn add_route(&mut self, route: &NormalizedRoute) {
        let openapi_path = openapi_template(&route.path);
        debug!("Adding route: {} {}", route.method, openapi_path);

        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
            },
        );

        let operation = Operation {
            summary: format!("Auto-detected {} {}", route.method.as_str(), openapi_path),
            tags: vec![self.info.title.clone()],
            responses,
        };

        let path_item = self.paths.entry(openapi_path).or_default();
        if path_item
            .insert(route.verb().to_string(), operation)
            .is_some()
        {
            debug!(
                "Replaced existing operation for {} {}",
                route.method, route.path
            );
        }
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            paths: self.paths,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
