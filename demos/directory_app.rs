//! Directory Routing Example
//!
//! Mounts the handler modules below `demos/controllers` at `/api` and links
//! between them by route name.
//!
//! Run with:
//! ```bash
//! cargo run --example directory_app
//! ```
//!
//! Then test:
//! ```bash
//! curl http://localhost:3000/api
//! curl http://localhost:3000/api/users
//! curl http://localhost:3000/api/users/ada
//! curl http://localhost:3000/api/status
//! ```

use axum::{
    Extension, Json, Router,
    extract::{Path, Request},
    routing::get,
};
use axum_enroute::{
    BoxedHandler, Config, Enrouten, Error, ModuleCatalog, Registry, Result, RouteOptions, Routes,
};
use serde::Serialize;

#[derive(Serialize)]
struct User {
    name: String,
    href: String,
}

fn home(router: &mut Registry) -> Result<()> {
    router
        .route(RouteOptions::new("/").named("home"))?
        .get(|Extension(routes): Extension<Routes>| async move {
            Json(routes.routes().clone())
        });
    Ok(())
}

fn users(router: &mut Registry) -> Result<()> {
    router
        .route(RouteOptions::new("/").named("users"))?
        .get(|Extension(routes): Extension<Routes>| async move {
            let users = ["ada", "grace"]
                .into_iter()
                .map(|name| {
                    let href = routes.path_with("user", [("user", name)])?.unwrap_or_default();
                    Ok(User {
                        name: name.to_string(),
                        href,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok::<_, Error>(Json(users))
        });
    Ok(())
}

fn user(router: &mut Registry) -> Result<()> {
    router
        .route(RouteOptions::new("/").named("user"))?
        .get(
            |Path(user): Path<String>, Extension(routes): Extension<Routes>| async move {
                let href = routes.path_with("user", [("user", &user)])?.unwrap_or_default();
                Ok::<_, Error>(Json(User { name: user, href }))
            },
        );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config: Config = format!(
        r#"
[routing]
mountpath = "/api"
basedir = '{}/demos'
directory = "controllers"

[[routing.routes]]
path = "/status"
handler = "status"
name = "status"

[logging]
format = "default"
"#,
        env!("CARGO_MANIFEST_DIR")
    )
    .parse()?;

    config.setup_tracing();

    let catalog = ModuleCatalog::new(config.routing.resolve_path("controllers")?)
        .mount("index.rs", home)
        .mount("users/index.rs", users)
        .mount("users/{user}.rs", user)
        .handler(
            "status",
            BoxedHandler::new(|_req: Request| async { Ok("up") }),
        );

    let mounted = Enrouten::with_loader(config, catalog)?.build()?;
    for (name, path) in mounted.routes().routes() {
        tracing::info!(%name, %path, "Named route");
    }

    let app = mounted.attach_to(Router::new().route("/", get(|| async { "see /api" })));

    println!("Starting server on http://127.0.0.1:3000");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    axum::serve(listener, app).await?;
    Ok(())
}
