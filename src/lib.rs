//! # axum-enroute
//!
//! Convention-based route composition for Axum.
//!
//! Point it at a directory of handler modules, an index module, a list of
//! declared routes, or all three, and get back one `axum::Router` together
//! with a table of named routes for building URLs.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum_enroute::{Config, Enrouten, ModuleCatalog, Registry, Result, RouteOptions};
//!
//! fn users(router: &mut Registry) -> Result<()> {
//!     router
//!         .route(RouteOptions::new("/").named("users"))?
//!         .get(|| async { "all users" });
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::default();  // Loads from config/{RUST_ENV}.toml
//!     config.setup_tracing();
//!
//!     let catalog = ModuleCatalog::new(config.routing.resolve_path("controllers")?)
//!         .mount("users/index.rs", users);
//!
//!     let mounted = Enrouten::with_loader(config, catalog)?.build()?;
//!     let app = mounted.attach_to(Router::new());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! With `config/dev.toml`:
//! ```toml
//! [routing]
//! mountpath = "/api"
//! directory = "controllers"
//! ```
//!
//! # How Files Become Routes
//!
//! | File | Route |
//! |------|-------|
//! | `controllers/index.rs` | `/` |
//! | `controllers/users/index.rs` | `/users` |
//! | `controllers/users/{user}.rs` | `/users/:user` |
//! | `controllers/products/{product}/update.rs` | `/products/:product/update` |
//!
//! Dot-prefixed files and directories are never scanned. Files whose
//! module exposes no mount function are skipped, so helpers can live next
//! to route modules.
//!
//! # Named Routes
//!
//! Every route registered with a name lands in a table shared by the whole
//! assembly. The finished router exposes it as an `Extension<Routes>`:
//!
//! ```rust
//! use axum_enroute::{Config, Enrouten, ModuleCatalog, Registry, RouteOptions};
//!
//! # fn main() -> axum_enroute::Result<()> {
//! let catalog = ModuleCatalog::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
//!     .mount("strict/index.rs", |router: &mut Registry| {
//!         router
//!             .route(RouteOptions::new("/users/:id").named("user"))?
//!             .get(|| async { "one user" });
//!         Ok(())
//!     });
//!
//! let config = Config::empty()
//!     .with_basedir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
//!     .with_mountpath("/api")
//!     .with_index("strict");
//!
//! let mounted = Enrouten::with_loader(config, catalog)?.build()?;
//! assert_eq!(
//!     mounted.routes().path_with("user", [("id", 7)])?,
//!     Some("/api/users/7".to_string())
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type. Assembly errors carry an
//! [`ErrorKind`]; errors returned by handlers and middleware go to the
//! [`ErrorChannel`], which by default logs them and renders JSON:
//!
//! ```json
//! {
//!   "error_code": "INTERNAL_ERROR",
//!   "message": "upstream unavailable"
//! }
//! ```
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | Configuration loading and validation ([`Config`]) |
//! | `routing` | Scanning, loading, the [`Registry`] and reverse routing |
//! | `fluent` | Assembly ([`Enrouten`]) and mounting ([`Mounted`]) |
//! | `error` | Error types and handling ([`Error`]) |
//! | `utils` | Environment substitution |
mod config;
mod error;
mod fluent;
mod routing;
mod utils;

pub use config::*;
pub use error::*;
pub use fluent::*;
pub use routing::*;
pub use utils::*;

pub type Result<T> = std::result::Result<T, Error>;
