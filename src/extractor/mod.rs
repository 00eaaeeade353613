//! Route extraction from a host framework's route registry.
//!
//! This module provides a unified interface for listing the routes a running service has
//! registered. Each supported host has its own [`RouteSource`] implementation that knows how
//! to enumerate its registry; [`extract`] then normalizes whatever the source lists into one
//! [`RouteEntry`] per distinct path.
//!
//! # Supported Sources
//!
//! - **Axum**: See [`axum::DocumentedRouter`] and [`axum::RouteRegistry`]
//! - **Manifest files**: See [`manifest::ManifestSource`]
//! - **In-memory lists**: `Vec<RouteEntry>` implements [`RouteSource`] directly
//!
//! # Example
//!
//! ```
//! use openapi_autodoc::extractor::{extract, HttpMethod, RouteEntry};
//!
//! let registry = vec![
//!     RouteEntry::new("/users", [HttpMethod::Get]),
//!     RouteEntry::new("/users", [HttpMethod::Post]),
//! ];
//! let routes = extract(&registry).unwrap();
//! assert_eq!(routes.len(), 1);
//! assert_eq!(routes[0].methods.len(), 2);
//! ```

pub mod axum;
pub mod manifest;

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A registry that can enumerate the routes mounted on a host application.
///
/// Implementations know how to walk one framework's route table, including nested and
/// merged sub-routers, and must leave out constructs that are not user routes
/// (fallback handlers, bare service mounts, middleware layers).
pub trait RouteSource {
    /// Lists every registered route.
    ///
    /// The same path may be listed more than once; [`extract`] merges duplicates.
    fn list_routes(&self) -> Result<Vec<RouteEntry>>;
}

impl RouteSource for Vec<RouteEntry> {
    fn list_routes(&self) -> Result<Vec<RouteEntry>> {
        Ok(self.clone())
    }
}

impl<T: RouteSource + ?Sized> RouteSource for &T {
    fn list_routes(&self) -> Result<Vec<RouteEntry>> {
        (**self).list_routes()
    }
}

impl<T: RouteSource + ?Sized> RouteSource for Arc<T> {
    fn list_routes(&self) -> Result<Vec<RouteEntry>> {
        (**self).list_routes()
    }
}

/// HTTP methods the synthesizer documents.
///
/// Any verb outside this set is treated as unclassified and dropped when a
/// [`RouteEntry`] is built from raw verb strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
    /// HTTP TRACE method
    Trace,
}

impl HttpMethod {
    /// Every method in canonical order.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Trace,
    ];

    /// Parses a verb case-insensitively. Returns `None` for unclassified verbs.
    pub fn parse(method: &str) -> Option<Self> {
        match method.trim().to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    /// Canonical uppercase form, e.g. `GET`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase form used as the operation key in a document, e.g. `get`.
    pub fn as_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single discovered route: one path and every verb bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// The URL path template (e.g. "/users/:id" or "/users/{id}")
    pub path: String,
    /// The verbs bound to this path
    pub methods: BTreeSet<HttpMethod>,
}

impl RouteEntry {
    /// Create a RouteEntry from already classified methods
    pub fn new(path: impl Into<String>, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        Self {
            path: path.into(),
            methods: methods.into_iter().collect(),
        }
    }

    /// Create a RouteEntry from raw verb strings as a registry reports them.
    ///
    /// Verbs outside [`HttpMethod`] are dropped and logged at debug level; if every verb is
    /// dropped the entry has an empty method set and will not appear in any document.
    pub fn from_verbs<I, V>(path: impl Into<String>, verbs: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let path = path.into();
        let mut methods = BTreeSet::new();
        for verb in verbs {
            let verb = verb.as_ref();
            match HttpMethod::parse(verb) {
                Some(method) => {
                    methods.insert(method);
                }
                None => debug!("Dropping unclassified verb {:?} on {}", verb, path),
            }
        }
        Self { path, methods }
    }

    /// Flattens this entry into one [`NormalizedRoute`] per verb.
    pub fn normalize(&self) -> impl Iterator<Item = NormalizedRoute> + '_ {
        self.methods.iter().map(move |method| NormalizedRoute {
            path: self.path.clone(),
            method: *method,
        })
    }
}

/// One (path, verb) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedRoute {
    pub path: String,
    pub method: HttpMethod,
}

impl NormalizedRoute {
    /// Lowercase verb used as the document key
    pub fn verb(&self) -> &'static str {
        self.method.as_key()
    }
}

/// Rewrites `:param` and `*param` segments into the `{param}` form used by OpenAPI.
///
/// Paths already in `{param}` form and anonymous wildcards (`*`) are left as they are.
pub fn openapi_template(path: &str) -> String {
    path.split('/')
        .map(|part| match part.strip_prefix(':').or_else(|| part.strip_prefix('*')) {
            Some(name) if !name.is_empty() => format!("{{{}}}", name),
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Lists the routes of `source` and normalizes them.
///
/// Paths are rewritten with [`openapi_template`] before merging, so `/files/:name` and
/// `/files/{name}` count as the same path. The result holds exactly one entry per distinct
/// template, in order of first registration, carrying the union of all verbs registered on
/// it. Entries left with no verbs are excluded.
///
/// # Errors
///
/// Returns [`Error::Discovery`] when the source cannot be enumerated or lists a path that
/// is empty or not rooted at `/`.
pub fn extract<S: RouteSource + ?Sized>(source: &S) -> Result<Vec<RouteEntry>> {
    let listed = source.list_routes()?;
    debug!("Registry listed {} route entries", listed.len());

    let mut merged: IndexMap<String, BTreeSet<HttpMethod>> = IndexMap::new();
    for entry in listed {
        if !entry.path.starts_with('/') {
            return Err(Error::Discovery(format!(
                "registry contains a malformed path: {:?}",
                entry.path
            )));
        }
        merged
            .entry(openapi_template(&entry.path))
            .or_default()
            .extend(entry.methods);
    }

    let routes: Vec<RouteEntry> = merged
        .into_iter()
        .filter_map(|(path, methods)| {
            if methods.is_empty() {
                debug!("Skipping {} (no documentable verbs)", path);
                None
            } else {
                Some(RouteEntry { path, methods })
            }
        })
        .collect();

    debug!("Extracted {} distinct paths", routes.len());
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct BrokenSource;

    impl RouteSource for BrokenSource {
        fn list_routes(&self) -> Result<Vec<RouteEntry>> {
            Err(Error::Discovery("registry unavailable".to_string()))
        }
    }

    #[test]
    fn test_parse_http_method() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse(" Patch "), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("trace"), Some(HttpMethod::Trace));
        assert_eq!(HttpMethod::parse("CONNECT"), None);
        assert_eq!(HttpMethod::parse("PROPFIND"), None);
        assert_eq!(HttpMethod::parse("*"), None);
    }

    #[test]
    fn test_method_forms() {
        for method in HttpMethod::ALL {
            assert_eq!(method.as_str().to_lowercase(), method.as_key());
            assert_eq!(HttpMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_from_verbs_drops_unclassified() {
        let entry = RouteEntry::from_verbs("/files", ["GET", "PROPFIND", "delete"]);
        assert_eq!(
            entry.methods.into_iter().collect::<Vec<_>>(),
            vec![HttpMethod::Get, HttpMethod::Delete]
        );

        let entry = RouteEntry::from_verbs("/dav", ["MKCOL"]);
        assert!(entry.methods.is_empty());
    }

    #[test]
    fn test_normalize_one_pair_per_verb() {
        let entry = RouteEntry::new("/users", [HttpMethod::Post, HttpMethod::Get]);
        let normalized: Vec<_> = entry.normalize().collect();

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].verb(), "get");
        assert_eq!(normalized[1].verb(), "post");
        assert!(normalized.iter().all(|r| r.path == "/users"));
    }

    #[test]
    fn test_extract_merges_verbs_per_path() {
        let registry = vec![
            RouteEntry::new("/users", [HttpMethod::Get]),
            RouteEntry::new("/health", [HttpMethod::Get]),
            RouteEntry::new("/users", [HttpMethod::Post]),
        ];

        let routes = extract(&registry).unwrap();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path, "/users");
        assert_eq!(
            routes[0].methods,
            [HttpMethod::Get, HttpMethod::Post].into_iter().collect()
        );
        assert_eq!(routes[1].path, "/health");
    }

    #[test]
    fn test_extract_collapses_duplicates() {
        let registry = vec![
            RouteEntry::new("/items", [HttpMethod::Get]),
            RouteEntry::new("/items", [HttpMethod::Get]),
        ];

        let routes = extract(&registry).unwrap();

        assert_eq!(routes, vec![RouteEntry::new("/items", [HttpMethod::Get])]);
    }

    #[test]
    fn test_extract_skips_entries_without_verbs() {
        let registry = vec![
            RouteEntry::new("/empty", []),
            RouteEntry::from_verbs("/dav", ["PROPFIND"]),
            RouteEntry::new("/ok", [HttpMethod::Put]),
        ];

        let routes = extract(&registry).unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/ok");
    }

    #[test]
    fn test_extract_merges_equivalent_templates() {
        let registry = vec![
            RouteEntry::new("/files/:name", [HttpMethod::Get]),
            RouteEntry::new("/files/{name}", [HttpMethod::Put]),
            RouteEntry::new("/files/*name", [HttpMethod::Get, HttpMethod::Delete]),
        ];

        let routes = extract(&registry).unwrap();

        assert_eq!(
            routes,
            vec![RouteEntry::new(
                "/files/{name}",
                [HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete]
            )]
        );
    }

    #[test]
    fn test_openapi_template() {
        assert_eq!(openapi_template("/users/:id/posts/:post_id"), "/users/{id}/posts/{post_id}");
        assert_eq!(openapi_template("/users/{id}"), "/users/{id}");
        assert_eq!(openapi_template("/assets/*path"), "/assets/{path}");
        assert_eq!(openapi_template("/assets/*"), "/assets/*");
        assert_eq!(openapi_template("/users/list"), "/users/list");
        assert_eq!(openapi_template("/"), "/");
    }

    #[test]
    fn test_extract_rejects_malformed_path() {
        let registry = vec![RouteEntry::new("users", [HttpMethod::Get])];
        let err = extract(&registry).unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));

        let registry = vec![RouteEntry::new("", [HttpMethod::Get])];
        assert!(matches!(extract(&registry), Err(Error::Discovery(_))));
    }

    #[test]
    fn test_extract_propagates_source_failure() {
        let err = extract(&BrokenSource).unwrap_err();
        assert_eq!(err.kind(), "DiscoveryError");
    }

    #[test]
    fn test_extract_through_arc() {
        let source: Arc<dyn RouteSource> =
            Arc::new(vec![RouteEntry::new("/a", [HttpMethod::Get])]);
        assert_eq!(extract(&source).unwrap().len(), 1);
    }
}
