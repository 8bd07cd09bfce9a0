//! Route assembly: directory scanning, handler modules, the registry and
//! reverse routing.
//!
//! | Module | Role |
//! |--------|------|
//! | `scan` | directory tree to ordered URL paths |
//! | `loader` | file to handler module |
//! | `registry` | named, composable router decorator |
//! | `directory` | one child registry per handler module |
//! | `routes` | declarative routes and the index module |
//! | `guard` | handler failures to the error channel |
//! | `resolver` | route name and parameters to a path |

mod directory;
mod guard;
mod handler;
mod loader;
mod pattern;
mod registry;
mod resolver;
mod routes;
mod scan;

pub use directory::mount_directory;
pub use guard::{CatchRejection, CatchRejectionLayer, DefaultErrorChannel, ErrorChannel};
pub use handler::{BoxFuture, BoxedHandler, Middleware};
pub use loader::{Extensions, HandlerExport, HandlerLoader, Module, ModuleCatalog, MountFn};
pub use registry::{NameTable, Registry, RouteBuilder, RouteOptions, RouterOptions};
pub use resolver::{Routes, resolve};
pub use routes::{
    RouteDefinition, install_configured_routes, install_index, install_routes, resolve_index,
};
pub use scan::{FileFilter, ScanResult, map_directory};
