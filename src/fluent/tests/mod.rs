//! Test helpers and utilities for Enrouten tests
//!
//! This module provides shared test infrastructure for all Enrouten **unit tests**.
//! These tests use `oneshot()` for fast, in-process testing without network I/O.
//!
//! ## Test Organization
//!
//! - **Unit tests** (`src/fluent/tests/`): assembly against the fixture trees
//!   in `tests/fixtures/`, requests sent with `oneshot()`
//! - **Integration tests** (`tests/`): the public API only
//!
//! ## Available Helpers
//!
//! - Configuration builders: `create_base_config()`, `create_config_with_toml()`
//! - Loader: `fixture_catalog()` knows every fixture module
//! - Request helpers: `get_request()`, `post_request()`
//! - Response helpers: `get_body_string()`, `send()`

use crate::{
    BoxedHandler, Config, Error, Middleware, ModuleCatalog, Registry, Result, RouteOptions,
};
use axum::{
    Router,
    body::Body,
    extract::Path,
    http::Request,
    response::Response,
};
use std::path::PathBuf;
use tower::ServiceExt;

#[cfg(test)]
pub(crate) mod basic;

// ============================================================================
// Configuration Helpers
// ============================================================================

pub(crate) fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Creates a configuration rooted at the fixture directory with nothing
/// else set.
pub(crate) fn create_base_config() -> Config {
    Config::empty().with_basedir(fixtures_root())
}

/// Creates a test configuration from a `[routing]` body, with `basedir`
/// pointing at the fixture directory.
///
/// # Example
/// ```ignore
/// let config = create_config_with_toml(r#"
/// mountpath = "/foo"
/// index = "named/routes"
/// "#);
/// ```
pub(crate) fn create_config_with_toml(routing_toml: &str) -> Config {
    let toml_str = format!(
        r#"
[routing]
basedir = '{}'
{routing_toml}

[logging]
format = "json"
        "#,
        fixtures_root().display()
    );

    toml_str.parse().expect("Failed to parse test config TOML")
}

// ============================================================================
// Fixture Modules
// ============================================================================

/// `named/routes/index.rs`
pub(crate) fn named_routes(router: &mut Registry) -> Result<()> {
    router
        .route(RouteOptions::new("/").named("my-foo"))?
        .get(|| async { "foo" });
    router
        .route(RouteOptions::new("/bar").named("my-bar"))?
        .get(|| async { "bar" });
    router
        .route(RouteOptions::new("/bar/:id").named("the-bar"))?
        .get(|Path(id): Path<u32>| async move { format!("bar {id}") });
    Ok(())
}

/// `named/duplicates/index.rs`
pub(crate) fn duplicate_names(router: &mut Registry) -> Result<()> {
    router
        .route(RouteOptions::new("/first").named("twice"))?
        .get(|| async { "first" });
    router
        .route(RouteOptions::new("/second").named("twice"))?
        .get(|| async { "second" });
    Ok(())
}

/// `strict/index.rs`
pub(crate) fn strict_routes(router: &mut Registry) -> Result<()> {
    router.get("/users", || async { "users" });
    router.get("/users/:user/", |Path(user): Path<String>| async move {
        format!("user {user}")
    });
    Ok(())
}

/// Every module of `tests/fixtures`, keyed relative to the fixture root.
pub(crate) fn fixture_catalog() -> ModuleCatalog {
    ModuleCatalog::new(fixtures_root())
        .mount("named/routes/index.rs", named_routes)
        .mount("named/duplicates/index.rs", duplicate_names)
        .mount("strict/index.rs", strict_routes)
        .mount("indexed/index.rs", |router: &mut Registry| {
            router.get("/", || async { "indexed index" });
            Ok(())
        })
        .mount("indexed/routes.rs", |router: &mut Registry| {
            router
                .route(RouteOptions::new("/home").named("home"))?
                .get(|| async { "indexed routes" });
            Ok(())
        })
        .mount("controllers/index.rs", |router: &mut Registry| {
            router
                .route(RouteOptions::new("/").named("root"))?
                .get(|| async { "controllers root" });
            Ok(())
        })
        .mount("controllers/users/index.rs", |router: &mut Registry| {
            router
                .route(RouteOptions::new("/").named("users"))?
                .get(|| async { "users" })
                .post(|| async { "created" });
            Ok(())
        })
        .mount("controllers/users/{user}.rs", |router: &mut Registry| {
            router
                .route(RouteOptions::new("/").named("user"))?
                .get(|Path(user): Path<String>| async move { format!("user {user}") });
            Ok(())
        })
        .mount("controllers/products/{product}/update.rs", |router: &mut Registry| {
            router.post("/", |Path(product): Path<String>| async move {
                format!("updated {product}")
            });
            Ok(())
        })
        .module_with("broken/index.rs", || {
            Err(Error::load("broken/index.rs: unexpected end of input"))
        })
        .handler(
            "hello",
            BoxedHandler::new(|_req| async { Ok("hello from config") }),
        )
        .handler(
            "fail",
            BoxedHandler::new(|_req| async { Err::<&str, _>(Error::internal("E")) }),
        )
        .middleware(
            "tag",
            Middleware::new(|req, next| async move {
                let mut response = next.run(req).await;
                response
                    .headers_mut()
                    .insert("x-tagged", "yes".parse().unwrap());
                Ok(response)
            }),
        )
}

// ============================================================================
// Request Helpers
// ============================================================================

/// Creates a GET request to the specified URI.
pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Creates a POST request to the specified URI with an empty body.
pub(crate) fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Extracts the body from a response as a String.
pub(crate) async fn get_body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

/// Sends one request through a clone of `router`.
pub(crate) async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}
