//! Route discovery for Axum applications.
//!
//! Axum's `Router` does not expose its route table, so routes are recorded as they are
//! registered: [`DocumentedRouter`] wraps an `axum::Router` and mirrors every `route`,
//! `nest`, `merge`, `fallback` and `nest_service` call into a shared [`RouteRegistry`].
//! The registry handle stays valid after the router is built, so routes added after the
//! scan was scheduled are still picked up.
//!
//! ```
//! use openapi_autodoc::extractor::axum::{get, DocumentedRouter};
//! use openapi_autodoc::extractor::extract;
//!
//! async fn list_users() -> &'static str { "[]" }
//! async fn create_user() -> &'static str { "{}" }
//!
//! let app: DocumentedRouter = DocumentedRouter::new()
//!     .route("/users", get(list_users).post(create_user));
//! let registry = app.registry();
//! let routes = extract(&registry).unwrap();
//! assert_eq!(routes[0].methods.len(), 2);
//! ```

use crate::error::Result;
use crate::extractor::{HttpMethod, RouteEntry, RouteSource};
use axum::extract::Request;
use axum::handler::Handler;
use axum::response::IntoResponse;
use axum::routing::{self, MethodRouter, Route};
use axum::Router;
use log::debug;
use parking_lot::RwLock;
use std::convert::Infallible;
use std::sync::Arc;
use tower::{Layer, Service};

/// What a registry record was mounted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// A user route with handlers bound to specific verbs
    Handler,
    /// A catch-all fallback handler
    Fallback,
    /// An opaque service mounted under a prefix
    Service,
}

#[derive(Debug, Clone)]
struct RecordedRoute {
    path: String,
    verbs: Vec<String>,
    kind: MountKind,
}

/// Shared record of everything mounted on a [`DocumentedRouter`].
///
/// Cloning is cheap and every clone observes the same registry.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    records: Arc<RwLock<Vec<RecordedRoute>>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a user route. Useful for hosts that register routes outside of
    /// [`DocumentedRouter`], e.g. with raw `axum::Router::route_service` calls.
    pub fn record_route<I, V>(&self, path: &str, verbs: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.push(RecordedRoute {
            path: path.to_string(),
            verbs: verbs.into_iter().map(Into::into).collect(),
            kind: MountKind::Handler,
        });
    }

    /// Number of records, including fallbacks and service mounts.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Kinds of every record in registration order.
    pub fn kinds(&self) -> Vec<MountKind> {
        self.records.read().iter().map(|r| r.kind).collect()
    }

    fn push(&self, record: RecordedRoute) {
        debug!(
            "Recording {:?} mount at {} ({:?})",
            record.kind, record.path, record.verbs
        );
        self.records.write().push(record);
    }

    /// Copies every record of `nested` under `prefix`.
    fn absorb(&self, prefix: &str, nested: &RouteRegistry) {
        if Arc::ptr_eq(&self.records, &nested.records) {
            return;
        }
        let snapshot = nested.records.read().clone();
        let mut records = self.records.write();
        for record in snapshot {
            records.push(RecordedRoute {
                path: combine_paths(prefix, &record.path),
                ..record
            });
        }
    }
}

impl RouteSource for RouteRegistry {
    fn list_routes(&self) -> Result<Vec<RouteEntry>> {
        let records = self.records.read();
        let routes = records
            .iter()
            .filter(|record| record.kind == MountKind::Handler)
            .map(|record| RouteEntry::from_verbs(record.path.clone(), &record.verbs))
            .collect();
        Ok(routes)
    }
}

/// Joins a mount prefix and a path the way `Router::nest` does.
fn combine_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }

    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// An `axum::routing::MethodRouter` that remembers which verbs it serves.
pub struct DocumentedMethodRouter<S = ()> {
    inner: MethodRouter<S>,
    methods: Vec<HttpMethod>,
}

impl<S> DocumentedMethodRouter<S> {
    /// Verbs bound so far
    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    /// Gives back the underlying axum method router
    pub fn into_inner(self) -> MethodRouter<S> {
        self.inner
    }
}

macro_rules! top_level_handler_fn {
    ($name:ident, $method:ident) => {
        #[doc = concat!("Route `", stringify!($method), "` requests to `handler` and record the binding.")]
        pub fn $name<H, T, S>(handler: H) -> DocumentedMethodRouter<S>
        where
            H: Handler<T, S>,
            T: 'static,
            S: Clone + Send + Sync + 'static,
        {
            DocumentedMethodRouter {
                inner: routing::$name(handler),
                methods: vec![HttpMethod::$method],
            }
        }
    };
}

macro_rules! chained_handler_fn {
    ($name:ident, $method:ident) => {
        #[doc = concat!("Chain an additional `", stringify!($method), "` handler.")]
        pub fn $name<H, T>(mut self, handler: H) -> Self
        where
            H: Handler<T, S>,
            T: 'static,
        {
            self.inner = self.inner.$name(handler);
            self.methods.push(HttpMethod::$method);
            self
        }
    };
}

top_level_handler_fn!(get, Get);
top_level_handler_fn!(post, Post);
top_level_handler_fn!(put, Put);
top_level_handler_fn!(delete, Delete);
top_level_handler_fn!(patch, Patch);
top_level_handler_fn!(options, Options);
top_level_handler_fn!(head, Head);
top_level_handler_fn!(trace, Trace);

/// Route requests of any method to `handler`.
///
/// Recorded as every verb in [`HttpMethod::ALL`]; non-standard verbs the handler also
/// accepts are not documented.
pub fn any<H, T, S>(handler: H) -> DocumentedMethodRouter<S>
where
    H: Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    DocumentedMethodRouter {
        inner: routing::any(handler),
        methods: HttpMethod::ALL.to_vec(),
    }
}

impl<S> DocumentedMethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    chained_handler_fn!(get, Get);
    chained_handler_fn!(post, Post);
    chained_handler_fn!(put, Put);
    chained_handler_fn!(delete, Delete);
    chained_handler_fn!(patch, Patch);
    chained_handler_fn!(options, Options);
    chained_handler_fn!(head, Head);
    chained_handler_fn!(trace, Trace);
}

/// An `axum::Router` that records its routes into a [`RouteRegistry`].
pub struct DocumentedRouter<S = ()> {
    router: Router<S>,
    registry: RouteRegistry,
}

impl<S> Default for DocumentedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> DocumentedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            registry: RouteRegistry::new(),
        }
    }

    /// Handle to the registry; it keeps observing routes added after this call.
    pub fn registry(&self) -> RouteRegistry {
        self.registry.clone()
    }

    /// Add a route, see `axum::Router::route`.
    pub fn route(self, path: &str, method_router: DocumentedMethodRouter<S>) -> Self {
        self.registry.push(RecordedRoute {
            path: path.to_string(),
            verbs: method_router
                .methods
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            kind: MountKind::Handler,
        });
        Self {
            router: self.router.route(path, method_router.inner),
            registry: self.registry,
        }
    }

    /// Nest a documented router under `path`, see `axum::Router::nest`.
    pub fn nest(self, path: &str, nested: DocumentedRouter<S>) -> Self {
        self.registry.absorb(path, &nested.registry);
        Self {
            router: self.router.nest(path, nested.router),
            registry: self.registry,
        }
    }

    /// Merge another documented router, see `axum::Router::merge`.
    pub fn merge(self, other: DocumentedRouter<S>) -> Self {
        self.registry.absorb("", &other.registry);
        Self {
            router: self.router.merge(other.router),
            registry: self.registry,
        }
    }

    /// Mount an opaque service under `path`. Service mounts are not documented.
    pub fn nest_service<T>(self, path: &str, service: T) -> Self
    where
        T: Service<Request, Error = Infallible> + Clone + Send + 'static,
        T::Response: IntoResponse,
        T::Future: Send + 'static,
    {
        self.registry.push(RecordedRoute {
            path: path.to_string(),
            verbs: Vec::new(),
            kind: MountKind::Service,
        });
        Self {
            router: self.router.nest_service(path, service),
            registry: self.registry,
        }
    }

    /// Set the fallback handler. Fallbacks are not documented.
    pub fn fallback<H, T>(self, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.registry.push(RecordedRoute {
            path: "/*".to_string(),
            verbs: Vec::new(),
            kind: MountKind::Fallback,
        });
        Self {
            router: self.router.fallback(handler),
            registry: self.registry,
        }
    }

    /// Apply a middleware layer to every route, see `axum::Router::layer`.
    pub fn layer<L>(self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + 'static,
        L::Service: Service<Request> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self {
            router: self.router.layer(layer),
            registry: self.registry,
        }
    }

    /// Provide the state, see `axum::Router::with_state`.
    pub fn with_state<S2>(self, state: S) -> DocumentedRouter<S2> {
        DocumentedRouter {
            router: self.router.with_state(state),
            registry: self.registry,
        }
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }

    pub fn into_parts(self) -> (Router<S>, RouteRegistry) {
        (self.router, self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    async fn ok() -> &'static str {
        "ok"
    }

    async fn not_found() -> StatusCode {
        StatusCode::NOT_FOUND
    }

    fn paths_and_methods(registry: &RouteRegistry) -> Vec<(String, Vec<HttpMethod>)> {
        extract(registry)
            .unwrap()
            .into_iter()
            .map(|r| (r.path, r.methods.into_iter().collect()))
            .collect()
    }

    #[test]
    fn test_simple_route_extraction() {
        let app: DocumentedRouter = DocumentedRouter::new().route("/hello", get(ok));

        let routes = paths_and_methods(&app.registry());

        assert_eq!(routes, vec![("/hello".to_string(), vec![HttpMethod::Get])]);
    }

    #[test]
    fn test_chained_methods_share_one_entry() {
        let app: DocumentedRouter = DocumentedRouter::new()
            .route("/users", get(ok).post(ok))
            .route("/users/:id", get(ok).put(ok).delete(ok));

        let routes = paths_and_methods(&app.registry());

        assert_eq!(
            routes,
            vec![
                ("/users".to_string(), vec![HttpMethod::Get, HttpMethod::Post]),
                (
                    "/users/:id".to_string(),
                    vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete]
                ),
            ]
        );
    }

    #[test]
    fn test_nested_router_paths_are_prefixed() {
        let users: DocumentedRouter = DocumentedRouter::new()
            .route("/", get(ok).post(ok))
            .route("/:id", get(ok));
        let app: DocumentedRouter = DocumentedRouter::new()
            .route("/health", get(ok))
            .nest("/api/users", users);

        let routes = paths_and_methods(&app.registry());

        assert_eq!(
            routes,
            vec![
                ("/health".to_string(), vec![HttpMethod::Get]),
                ("/api/users".to_string(), vec![HttpMethod::Get, HttpMethod::Post]),
                ("/api/users/:id".to_string(), vec![HttpMethod::Get]),
            ]
        );
    }

    #[test]
    fn test_merged_router_routes_are_recorded() {
        let admin: DocumentedRouter = DocumentedRouter::new().route("/admin", post(ok));
        let app: DocumentedRouter = DocumentedRouter::new()
            .route("/health", get(ok))
            .merge(admin);

        let routes = paths_and_methods(&app.registry());

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[1], ("/admin".to_string(), vec![HttpMethod::Post]));
    }

    #[test]
    fn test_fallback_and_service_mounts_are_excluded() {
        let app: DocumentedRouter = DocumentedRouter::new()
            .route("/health", get(ok))
            .nest_service(
                "/static",
                tower::service_fn(|_req: Request| async {
                    Ok::<_, Infallible>(StatusCode::OK.into_response())
                }),
            )
            .fallback(not_found);

        let registry = app.registry();

        assert_eq!(
            registry.kinds(),
            vec![MountKind::Handler, MountKind::Service, MountKind::Fallback]
        );
        assert_eq!(
            paths_and_methods(&registry),
            vec![("/health".to_string(), vec![HttpMethod::Get])]
        );
    }

    #[test]
    fn test_any_records_every_standard_method() {
        let app: DocumentedRouter = DocumentedRouter::new().route("/echo", any(ok));

        let routes = extract(&app.registry()).unwrap();

        assert_eq!(routes[0].methods.len(), HttpMethod::ALL.len());
    }

    #[test]
    fn test_registry_observes_late_registration() {
        let app: DocumentedRouter = DocumentedRouter::new().route("/early", get(ok));
        let registry = app.registry();
        assert_eq!(registry.len(), 1);

        let _app = app.route("/late", get(ok));

        let routes = paths_and_methods(&registry);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[1].0, "/late");
    }

    #[test]
    fn test_record_route_with_raw_verbs() {
        let registry = RouteRegistry::new();
        registry.record_route("/files", ["GET", "PROPFIND"]);
        registry.record_route("/dav", ["MKCOL"]);

        let routes = paths_and_methods(&registry);

        assert_eq!(routes, vec![("/files".to_string(), vec![HttpMethod::Get])]);
    }

    #[tokio::test]
    async fn test_method_router_unwraps_to_plain_axum() {
        let method_router: DocumentedMethodRouter = get(ok).post(ok).delete(ok);
        assert_eq!(
            method_router.methods(),
            &[HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete]
        );

        let router: Router = Router::new().route("/items", method_router.into_inner());

        let response = router
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .method("DELETE")
                    .uri("/items")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .method("PUT")
                    .uri("/items")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_combine_paths() {
        assert_eq!(combine_paths("", "/users"), "/users");
        assert_eq!(combine_paths("/api", "/users"), "/api/users");
        assert_eq!(combine_paths("/api/", "users"), "/api/users");
        assert_eq!(combine_paths("/api", "/"), "/api");
    }

    #[tokio::test]
    async fn test_wrapped_router_still_serves_requests() {
        let app: DocumentedRouter = DocumentedRouter::new()
            .route("/hello", get(ok))
            .fallback(not_found);
        let router = app.into_router();

        let response = router
            .clone()
            .oneshot(HttpRequest::builder().uri("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(HttpRequest::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
