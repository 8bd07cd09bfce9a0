//! Handler modules and the loaders that produce them.
//!
//! A handler module is whatever a file in the scanned tree stands for. Rust
//! cannot load code from a path at runtime, so the mapping from file to
//! module is supplied by a [`HandlerLoader`]. The stock implementation is
//! [`ModuleCatalog`], which maps paths relative to a root directory onto
//! registered modules:
//!
//! ```rust
//! use axum_enroute::{ModuleCatalog, Registry};
//!
//! let catalog = ModuleCatalog::<()>::new("controllers")
//!     .mount("index.rs", |router: &mut Registry| {
//!         router.get("/", || async { "home" });
//!         Ok(())
//!     })
//!     .mount("users/{user}.rs", |router: &mut Registry| {
//!         router.get("/", || async { "a user" });
//!         Ok(())
//!     });
//! ```
//!
//! Whether a module contributes routes is decided once, by
//! [`HandlerExport::classify`].

use {
    super::{
        handler::{BoxedHandler, Middleware},
        registry::Registry,
    },
    crate::{Error, Result},
    std::{
        collections::HashMap,
        fmt,
        path::{Path, PathBuf},
        sync::Arc,
    },
};

/// A route contributor: receives a registry and registers routes on it.
pub type MountFn<S> = Arc<dyn Fn(&mut Registry<S>) -> Result<()> + Send + Sync>;

type ModuleFactory<S> = Arc<dyn Fn() -> Result<Module<S>> + Send + Sync>;

/// The value a loaded file stands for.
pub enum Module<S = ()> {
    /// A mount function, used directly.
    Mount(MountFn<S>),
    /// A wrapper whose default export is another module.
    Default(Box<Module<S>>),
    /// A plain request handler. Not a route contributor.
    Handler(BoxedHandler),
    /// Data, such as a parsed settings file. Not a route contributor.
    Data(toml::Value),
    /// Nothing usable was exported.
    Empty,
}

impl<S> Module<S> {
    pub fn mount<F>(mount: F) -> Self
    where
        F: Fn(&mut Registry<S>) -> Result<()> + Send + Sync + 'static,
    {
        Self::Mount(Arc::new(mount))
    }

    /// Wraps a module as the default export of another one.
    pub fn default_export(inner: Module<S>) -> Self {
        Self::Default(Box::new(inner))
    }
}

impl<S> Clone for Module<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Mount(mount) => Self::Mount(mount.clone()),
            Self::Default(inner) => Self::Default(inner.clone()),
            Self::Handler(handler) => Self::Handler(handler.clone()),
            Self::Data(value) => Self::Data(value.clone()),
            Self::Empty => Self::Empty,
        }
    }
}

impl<S> fmt::Debug for Module<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mount(_) => write!(f, "Module::Mount(..)"),
            Self::Default(inner) => f.debug_tuple("Module::Default").field(inner).finish(),
            Self::Handler(_) => write!(f, "Module::Handler(..)"),
            Self::Data(value) => f.debug_tuple("Module::Data").field(value).finish(),
            Self::Empty => write!(f, "Module::Empty"),
        }
    }
}

/// Result of classifying a loaded module.
pub enum HandlerExport<S = ()> {
    /// The module itself is a mount function.
    Direct(MountFn<S>),
    /// The module's default export is a mount function.
    Wrapped(MountFn<S>),
    /// Anything else. Skipped silently by the directory assembler.
    NotAHandler,
}

impl<S> HandlerExport<S> {
    pub fn classify(module: Module<S>) -> Self {
        match module {
            Module::Mount(mount) => Self::Direct(mount),
            Module::Default(inner) => match *inner {
                Module::Mount(mount) => Self::Wrapped(mount),
                _ => Self::NotAHandler,
            },
            Module::Handler(_) | Module::Data(_) | Module::Empty => Self::NotAHandler,
        }
    }

    pub fn is_handler(&self) -> bool {
        !matches!(self, Self::NotAHandler)
    }

    pub fn into_mount_fn(self) -> Option<MountFn<S>> {
        match self {
            Self::Direct(mount) | Self::Wrapped(mount) => Some(mount),
            Self::NotAHandler => None,
        }
    }
}

/// The file extensions a loader understands.
///
/// Code extensions hold handler modules. Data extensions are loadable too
/// but are never tried when resolving an index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions {
    code: Vec<String>,
    data: Vec<String>,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            code: vec!["rs".to_string()],
            data: vec!["toml".to_string(), "json".to_string()],
        }
    }
}

impl Extensions {
    pub fn new<C, D>(code: C, data: D) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            code: code.into_iter().map(Into::into).collect(),
            data: data.into_iter().map(Into::into).collect(),
        }
    }

    pub fn code(&self) -> &[String] {
        &self.code
    }

    pub fn data(&self) -> &[String] {
        &self.data
    }

    /// Every recognized extension, code first.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.code.iter().chain(self.data.iter()).map(String::as_str)
    }
}

/// Produces modules for files found by the scanner.
///
/// `load` receives the path of an existing file and must either return the
/// module it stands for or the error that loading raised. Errors propagate
/// unchanged and abort assembly.
///
/// Declarative routes configured in TOML name their handlers and middleware;
/// a loader resolves those names through [`HandlerLoader::handler`] and
/// [`HandlerLoader::middleware`].
pub trait HandlerLoader<S>: Send + Sync {
    fn extensions(&self) -> &Extensions;

    fn load(&self, file: &Path) -> Result<Module<S>>;

    fn handler(&self, _name: &str) -> Option<BoxedHandler> {
        None
    }

    fn middleware(&self, _name: &str) -> Option<Middleware> {
        None
    }
}

/// A loader backed by an explicit table of modules.
///
/// Modules are keyed by their path relative to the catalog root. Files that
/// exist on disk but were never registered load as [`Module::Empty`] and are
/// therefore skipped, so helper files can live next to route modules.
pub struct ModuleCatalog<S = ()> {
    root: PathBuf,
    extensions: Extensions,
    modules: HashMap<PathBuf, ModuleFactory<S>>,
    handlers: HashMap<String, BoxedHandler>,
    middleware: HashMap<String, Middleware>,
}

impl<S> ModuleCatalog<S>
where
    S: 'static,
{
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: Extensions::default(),
            modules: HashMap::new(),
            handlers: HashMap::new(),
            middleware: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Registers a module under `relative`.
    #[must_use]
    pub fn module(self, relative: impl AsRef<Path>, module: Module<S>) -> Self {
        self.module_with(relative, move || Ok(module.clone()))
    }

    /// Registers a module whose loading can fail.
    #[must_use]
    pub fn module_with<F>(mut self, relative: impl AsRef<Path>, factory: F) -> Self
    where
        F: Fn() -> Result<Module<S>> + Send + Sync + 'static,
    {
        self.modules
            .insert(relative.as_ref().to_path_buf(), Arc::new(factory));
        self
    }

    /// Registers a mount function under `relative`.
    #[must_use]
    pub fn mount<F>(self, relative: impl AsRef<Path>, mount: F) -> Self
    where
        F: Fn(&mut Registry<S>) -> Result<()> + Send + Sync + 'static,
    {
        self.module(relative, Module::mount(mount))
    }

    /// Registers a named request handler for declarative routes.
    #[must_use]
    pub fn handler(mut self, name: impl Into<String>, handler: BoxedHandler) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Registers a named middleware for declarative routes.
    #[must_use]
    pub fn middleware(mut self, name: impl Into<String>, middleware: Middleware) -> Self {
        self.middleware.insert(name.into(), middleware);
        self
    }

    fn relative_path(&self, file: &Path) -> Result<PathBuf> {
        if let Ok(relative) = file.strip_prefix(&self.root) {
            return Ok(relative.to_path_buf());
        }
        let root = self.root.canonicalize()?;
        let file = file.canonicalize()?;
        file.strip_prefix(&root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                Error::load(format!(
                    "'{}' is outside the module root '{}'",
                    file.display(),
                    root.display()
                ))
            })
    }
}

impl<S> HandlerLoader<S> for ModuleCatalog<S>
where
    S: 'static,
{
    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn load(&self, file: &Path) -> Result<Module<S>> {
        let relative = self.relative_path(file)?;
        match self.modules.get(&relative) {
            Some(factory) => factory(),
            None => {
                tracing::debug!(file = %file.display(), "No module registered for file");
                Ok(Module::Empty)
            }
        }
    }

    fn handler(&self, name: &str) -> Option<BoxedHandler> {
        self.handlers.get(name).cloned()
    }

    fn middleware(&self, name: &str) -> Option<Middleware> {
        self.middleware.get(name).cloned()
    }
}
