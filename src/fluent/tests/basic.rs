//! Basic assembly tests for Enrouten: declared and configured routes,
//! the routes extension and the default error channel.

use super::{
    create_base_config, create_config_with_toml, fixture_catalog, get_body_string, get_request,
    post_request, send,
};
use crate::{BoxedHandler, Config, Enrouten, ErrorKind, Middleware, RouteDefinition, Routes};
use axum::{extract::Request, http::StatusCode};
use tracing_test::traced_test;

fn greeting() -> BoxedHandler {
    BoxedHandler::new(|_req| async { Ok("greetings") })
}

#[tokio::test]
async fn test_empty_config_assembles_empty_router() {
    let mounted = Enrouten::with_loader(create_base_config(), fixture_catalog())
        .unwrap()
        .build()
        .unwrap();

    assert!(mounted.routes().is_empty());
    assert_eq!(mounted.mountpath(), "/");

    let router = mounted.into_router();
    let response = send(&router, get_request("/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_default_loader_skips_unregistered_files() {
    let config = create_base_config().with_directory("controllers");
    let mounted = Enrouten::new(config).unwrap().build().unwrap();

    assert!(mounted.routes().is_empty());
    let router = mounted.into_router();
    assert_eq!(
        send(&router, get_request("/users")).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_declared_route_responds_and_is_named() {
    let mounted = Enrouten::with_loader(create_base_config(), fixture_catalog())
        .unwrap()
        .route(RouteDefinition::new("/greet", greeting()).named("greet"))
        .build()
        .unwrap();

    assert_eq!(mounted.routes().path("greet").unwrap(), Some("/greet".to_string()));

    let router = mounted.into_router();
    let response = send(&router, get_request("/greet")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_string(response).await, "greetings");

    // Non-strict routing answers the trailing-slash form too.
    let response = send(&router, get_request("/greet/")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_declared_route_method_is_honored() {
    let router = Enrouten::with_loader(create_base_config(), fixture_catalog())
        .unwrap()
        .with_routes([
            RouteDefinition::new("/submit", greeting()).method("post"),
            RouteDefinition::new("/anything", greeting()).method("all"),
        ])
        .build()
        .unwrap()
        .into_router();

    assert_eq!(
        send(&router, post_request("/submit")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&router, get_request("/submit")).await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(
        send(&router, post_request("/anything")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&router, get_request("/anything")).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_declared_route_middleware_runs_in_order() {
    let first = Middleware::new(|req, next| async move {
        let mut response = next.run(req).await;
        response
            .headers_mut()
            .append("x-order", "first".parse().unwrap());
        Ok(response)
    });
    let second = Middleware::new(|req, next| async move {
        let mut response = next.run(req).await;
        response
            .headers_mut()
            .append("x-order", "second".parse().unwrap());
        Ok(response)
    });

    let router = Enrouten::with_loader(create_base_config(), fixture_catalog())
        .unwrap()
        .route(
            RouteDefinition::new("/ordered", greeting())
                .middleware(first)
                .middleware(second),
        )
        .build()
        .unwrap()
        .into_router();

    let response = send(&router, get_request("/ordered")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The innermost middleware touches the response first.
    let order: Vec<_> = response
        .headers()
        .get_all("x-order")
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect();
    assert_eq!(order, vec!["second", "first"]);
}

#[tokio::test]
async fn test_configured_routes_resolve_handlers_and_middleware() {
    let config = create_config_with_toml(
        r#"
[[routing.routes]]
path = "/hello"
handler = "hello"
middleware = ["tag"]
name = "hello"

[[routing.routes]]
path = "/hello"
method = "post"
handler = "hello"
        "#,
    );

    let mounted = Enrouten::with_loader(config, fixture_catalog())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(mounted.routes().path("hello").unwrap(), Some("/hello".to_string()));

    let router = mounted.into_router();
    let response = send(&router, get_request("/hello")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-tagged").unwrap(), "yes");
    assert_eq!(get_body_string(response).await, "hello from config");

    let response = send(&router, post_request("/hello")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-tagged").is_none());
}

#[test]
fn test_configured_route_with_unknown_handler_fails() {
    let config = create_config_with_toml(
        r#"
[[routing.routes]]
path = "/nowhere"
handler = "not-registered"
        "#,
    );

    let err = Enrouten::with_loader(config, fixture_catalog())
        .unwrap()
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("handler is required"));
}

#[test]
fn test_configured_route_with_unknown_middleware_fails() {
    let config = create_config_with_toml(
        r#"
[[routing.routes]]
path = "/hello"
handler = "hello"
middleware = ["missing"]
        "#,
    );

    let err = Enrouten::with_loader(config, fixture_catalog())
        .unwrap()
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().starts_with("middleware must be a function"));
}

#[test]
fn test_configured_route_without_path_fails() {
    let config = create_config_with_toml(
        r#"
[[routing.routes]]
handler = "hello"
        "#,
    );

    let err = Enrouten::with_loader(config, fixture_catalog())
        .unwrap()
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.to_string(), "path is required");
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let config = Config::empty().with_mountpath("relative");
    let err = Enrouten::with_loader(config, fixture_catalog()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_routes_extension_is_available_to_handlers() {
    let lookup = BoxedHandler::new(|req: Request| async move {
        let path = match req.extensions().get::<Routes>() {
            Some(routes) => routes.path("lookup")?,
            None => None,
        };
        Ok(path.unwrap_or_else(|| "missing".to_string()))
    });

    let router = Enrouten::with_loader(create_base_config().with_mountpath("/api"), fixture_catalog())
        .unwrap()
        .route(RouteDefinition::new("/lookup", lookup).named("lookup"))
        .build()
        .unwrap()
        .into_router();

    let response = send(&router, get_request("/api/lookup")).await;
    assert_eq!(get_body_string(response).await, "/api/lookup");
}

#[tokio::test]
async fn test_trace_requests_keeps_routes_working() {
    let router = Enrouten::with_loader(
        create_base_config().with_trace_requests(true),
        fixture_catalog(),
    )
    .unwrap()
    .route(RouteDefinition::new("/greet", greeting()))
    .build()
    .unwrap()
    .into_router();

    let response = send(&router, get_request("/greet")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[traced_test]
async fn test_default_error_channel_logs_and_renders() {
    let config = create_config_with_toml(
        r#"
[[routing.routes]]
path = "/fail"
handler = "fail"
        "#,
    );

    let router = Enrouten::with_loader(config, fixture_catalog())
        .unwrap()
        .build()
        .unwrap()
        .into_router();

    let response = send(&router, get_request("/fail")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(get_body_string(response).await.contains("INTERNAL_ERROR"));
    assert!(logs_contain("Request handler failed"));
}
