use {
    crate::{Error, Result, RouterOptions},
    serde::Deserialize,
    std::{
        env,
        path::{Path, PathBuf},
    },
};

///
/// Configuration for route assembly.
///
/// Every field is optional. An empty `[routing]` section assembles an empty
/// router mounted at `/`.
///
/// ```toml
/// [routing]
/// mountpath = "/api"
/// basedir = "src"
/// index = "routes/index"
/// directory = "controllers"
/// ignore = ["**/helpers/**", "*.test.rs"]
///
/// [routing.router_options]
/// strict = true
///
/// [[routing.routes]]
/// path = "/health"
/// handler = "health"
/// name = "health"
/// ```
///
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Absolute path the assembled router is attached at. Route names
    /// resolve to paths below it.
    pub mountpath: String,

    /// Directory `index` and `directory` are relative to.
    /// Defaults to the current working directory.
    pub basedir: Option<PathBuf>,

    /// A single handler module mounted on the root registry.
    pub index: Option<String>,

    /// A directory of handler modules, one mount per file.
    pub directory: Option<String>,

    /// Glob patterns of files and directories the scan skips.
    pub ignore: Vec<String>,

    pub router_options: RouterOptions,

    /// Routes declared explicitly. Handlers and middleware are referenced
    /// by the names they were registered under with the loader.
    pub routes: Vec<RouteConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            mountpath: "/".to_string(),
            basedir: None,
            index: None,
            directory: None,
            ignore: Vec::new(),
            router_options: RouterOptions::default(),
            routes: Vec::new(),
        }
    }
}

impl RoutingConfig {
    /// The configured base directory, or the current working directory.
    pub fn basedir(&self) -> Result<PathBuf> {
        match &self.basedir {
            Some(basedir) => Ok(basedir.clone()),
            None => Ok(env::current_dir()?),
        }
    }

    /// Resolves `path` against the base directory. Absolute paths are
    /// returned unchanged.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        Ok(self.basedir()?.join(path))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.mountpath.starts_with('/') {
            return Err(Error::config(format!(
                "routing.mountpath must start with '/' (got '{}')",
                self.mountpath
            )));
        }
        for pattern in &self.ignore {
            glob::Pattern::new(pattern)?;
        }
        self.router_options.validate()
    }
}

///
/// A route declared in configuration.
///
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RouteConfig {
    pub path: String,
    /// HTTP method, case-insensitive. Defaults to `get`; `all` matches any method.
    pub method: Option<String>,
    /// Name of a handler registered with the loader.
    pub handler: Option<String>,
    /// Names of middleware registered with the loader, outermost first.
    pub middleware: Vec<String>,
    /// Registers the route for reverse routing.
    pub name: Option<String>,
}
