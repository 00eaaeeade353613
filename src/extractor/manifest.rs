//! Route discovery from a manifest file.
//!
//! A manifest lists routes for hosts that are not built on a supported framework, or for
//! generating documents offline. JSON and YAML are accepted; the format is chosen by file
//! extension (`.json`, everything else is read as YAML).
//!
//! ```yaml
//! routes:
//!   - path: /users
//!     methods: [GET, POST]
//!   - path: /users/{id}
//!     methods: [GET]
//! ```

use crate::error::{Error, Result};
use crate::extractor::{RouteEntry, RouteSource};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Route source backed by a manifest file, read on every listing.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    routes: Vec<ManifestRoute>,
}

#[derive(Debug, Deserialize)]
struct ManifestRoute {
    path: String,
    #[serde(default)]
    methods: Vec<String>,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses manifest content; `json` selects the JSON reader over YAML.
    fn parse(content: &str, json: bool) -> Result<Vec<RouteEntry>> {
        let manifest: Manifest = if json {
            serde_json::from_str(content)
                .map_err(|e| Error::Discovery(format!("invalid JSON manifest: {}", e)))?
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| Error::Discovery(format!("invalid YAML manifest: {}", e)))?
        };

        Ok(manifest
            .routes
            .into_iter()
            .map(|route| RouteEntry::from_verbs(route.path, route.methods))
            .collect())
    }
}

impl RouteSource for ManifestSource {
    fn list_routes(&self) -> Result<Vec<RouteEntry>> {
        debug!("Reading route manifest: {}", self.path.display());
        let content = fs::read_to_string(&self.path).map_err(|e| {
            Error::Discovery(format!(
                "cannot read manifest {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let is_json = self
            .path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self::parse(&content, is_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{extract, HttpMethod};
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_yaml_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(
            &temp_dir,
            "routes.yaml",
            r#"
routes:
  - path: /users
    methods: [GET, post]
  - path: /users/{id}
    methods: [GET]
"#,
        );

        let routes = ManifestSource::new(&path).list_routes().unwrap();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path, "/users");
        assert!(routes[0].methods.contains(&HttpMethod::Post));
        assert_eq!(routes[1].path, "/users/{id}");
    }

    #[test]
    fn test_json_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(
            &temp_dir,
            "routes.json",
            r#"{"routes": [{"path": "/health", "methods": ["GET"]}]}"#,
        );

        let routes = ManifestSource::new(&path).list_routes().unwrap();

        assert_eq!(routes, vec![RouteEntry::new("/health", [HttpMethod::Get])]);
    }

    #[test]
    fn test_manifest_with_unclassified_and_missing_methods() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(
            &temp_dir,
            "routes.yml",
            r#"
routes:
  - path: /dav
    methods: [PROPFIND]
  - path: /nothing
  - path: /ok
    methods: [DELETE]
"#,
        );

        let routes = extract(&ManifestSource::new(&path)).unwrap();

        assert_eq!(routes, vec![RouteEntry::new("/ok", [HttpMethod::Delete])]);
    }

    #[test]
    fn test_missing_manifest_is_discovery_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = ManifestSource::new(temp_dir.path().join("absent.yaml"));

        let err = source.list_routes().unwrap_err();

        assert!(matches!(err, Error::Discovery(_)));
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn test_malformed_manifest_is_discovery_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(&temp_dir, "routes.json", "{ not json");

        let err = ManifestSource::new(&path).list_routes().unwrap_err();

        assert!(matches!(err, Error::Discovery(_)));
    }
}
