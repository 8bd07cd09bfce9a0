//! The name-tracking decorator over an axum router.
//!
//! A [`Registry`] owns an `axum::Router`, knows the absolute path it is
//! mounted at, and shares a [`NameTable`] with every registry composed from
//! it. Handler modules receive a `&mut Registry` and register their routes
//! relative to its mount point:
//!
//! ```rust
//! use axum_enroute::{Registry, RouteOptions, RouterOptions};
//!
//! # fn main() -> axum_enroute::Result<()> {
//! let mut root: Registry = Registry::new("/foo", RouterOptions::default());
//! let mut child = root.compose("/bar");
//!
//! child
//!     .route(RouteOptions::new("/").named("my-bar"))?
//!     .get(|| async { "bar" });
//! child
//!     .route(RouteOptions::new("/:id").named("the-bar"))?
//!     .get(|| async { "one bar" });
//!
//! root.attach(child)?;
//!
//! let routes = root.routes();
//! assert_eq!(routes.path("my-bar")?, Some("/foo/bar".to_string()));
//! assert_eq!(routes.path_with("the-bar", [("id", 10)])?, Some("/foo/bar/10".to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! Composed registries do not nest axum routers. Each registry keeps the
//! path prefix it was composed at and registers its routes with that prefix
//! already applied; [`Registry::attach`] merges the child router back into
//! its parent. Middleware registered on a child therefore only ever wraps
//! that child's routes.

use {
    super::{
        guard::{CatchRejectionLayer, DefaultErrorChannel, ErrorChannel},
        handler::Middleware,
        pattern::{
            ends_with_catch_all, ensure_leading_slash, join_mountpath, route_shape,
            to_router_path, to_template_path, trim_trailing_slash,
        },
        resolver::Routes,
    },
    crate::{Error, Result},
    axum::{
        Router,
        handler::Handler,
        http::Method,
        routing::{MethodFilter, MethodRouter},
    },
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        fmt,
        sync::{Arc, Mutex, PoisonError, RwLock},
    },
};

// ============================================================================
// NameTable
// ============================================================================

/// Route name to absolute path template, shared by handle.
///
/// Cloning a `NameTable` yields another handle to the same table.
#[derive(Clone, Default)]
pub struct NameTable(Arc<RwLock<BTreeMap<String, String>>>);

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `path` under `name`.
    ///
    /// # Errors
    ///
    /// `Configuration` when `name` is already registered.
    pub fn register(&self, name: &str, path: String) -> Result<()> {
        let mut table = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if table.contains_key(name) {
            return Err(Error::config(format!(
                "A route already exists for the name \"{name}\""
            )));
        }
        tracing::debug!(name, path = %path, "Registered route name");
        table.insert(name.to_string(), path);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the current contents out of the table.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Whether both handles point at the same table.
    pub fn shares_with(&self, other: &NameTable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.snapshot()).finish()
    }
}

// ============================================================================
// MethodTable
// ============================================================================

/// What a registration occupies at its router path.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Claim {
    /// The methods matched by a filter.
    Methods(MethodFilter),
    /// The method-independent fallback installed by `any`.
    Fallback,
    /// Everything at the path: prebuilt method routers and nested routers.
    Whole,
}

const METHODS: [(MethodFilter, Method); 9] = [
    (MethodFilter::CONNECT, Method::CONNECT),
    (MethodFilter::DELETE, Method::DELETE),
    (MethodFilter::GET, Method::GET),
    (MethodFilter::HEAD, Method::HEAD),
    (MethodFilter::OPTIONS, Method::OPTIONS),
    (MethodFilter::PATCH, Method::PATCH),
    (MethodFilter::POST, Method::POST),
    (MethodFilter::PUT, Method::PUT),
    (MethodFilter::TRACE, Method::TRACE),
];

fn methods_of(filter: MethodFilter) -> Vec<Method> {
    METHODS
        .iter()
        .filter(|(single, _)| filter.or(*single) == filter)
        .map(|(_, method)| method.clone())
        .collect()
}

#[derive(Debug)]
struct PathEntry {
    path: String,
    methods: Vec<Method>,
    fallback: bool,
    whole: bool,
}

impl PathEntry {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            methods: Vec::new(),
            fallback: false,
            whole: false,
        }
    }

    /// Records `claim`, or returns the method it collides on.
    fn claim(&mut self, claim: Claim) -> Option<String> {
        let methods = match claim {
            Claim::Methods(filter) => methods_of(filter),
            Claim::Fallback | Claim::Whole => Vec::new(),
        };
        let label = methods
            .first()
            .map_or_else(|| "ANY".to_string(), Method::to_string);
        if self.whole {
            return Some(label);
        }

        match claim {
            Claim::Whole if self.fallback || !self.methods.is_empty() => return Some(label),
            Claim::Whole => self.whole = true,
            Claim::Fallback if self.fallback => return Some(label),
            Claim::Fallback => self.fallback = true,
            Claim::Methods(_) => {
                if let Some(taken) = methods.iter().find(|method| self.methods.contains(*method)) {
                    return Some(taken.to_string());
                }
                self.methods.extend(methods);
            }
        }
        None
    }
}

/// The methods each router path answers, shared by every registry of one
/// assembly like the [`NameTable`].
///
/// axum rejects overlapping registrations by panicking. Claiming a path
/// here first reports the overlap as a `Configuration` error instead.
#[derive(Clone, Default)]
pub(crate) struct MethodTable(Arc<Mutex<BTreeMap<String, PathEntry>>>);

impl MethodTable {
    pub(crate) fn claim(&self, path: &str, claim: Claim) -> Result<()> {
        let mut table = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = table
            .entry(route_shape(path))
            .or_insert_with(|| PathEntry::new(path));

        if entry.path != path {
            return Err(Error::config(format!(
                "The route {path} conflicts with the route {}",
                entry.path
            )));
        }
        match entry.claim(claim) {
            Some(method) => Err(Error::config(format!(
                "A handler for {method} {path} is already registered"
            ))),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_list()
            .entries(table.values().map(|entry| &entry.path))
            .finish()
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options applied to every registry of an assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// When false, `/x` and `/x/` are the same route.
    pub strict: bool,
    /// Only `true` is supported: axum matches paths case-sensitively.
    pub case_sensitive: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            strict: false,
            case_sensitive: true,
        }
    }
}

impl RouterOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.case_sensitive {
            return Err(Error::config(
                "router_options.case_sensitive = false is not supported, paths always match case-sensitively",
            ));
        }
        Ok(())
    }
}

/// Arguments of [`Registry::route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    pub path: String,
    pub name: Option<String>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            name: None,
        }
    }
}

impl RouteOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ============================================================================
// Registry
// ============================================================================

/// A router decorator that tracks route names and composes mount paths.
pub struct Registry<S = ()> {
    router: Router<S>,
    mountpath: String,
    prefix: String,
    names: NameTable,
    methods: MethodTable,
    channel: Arc<dyn ErrorChannel>,
    options: RouterOptions,
    middleware: Vec<Middleware>,
    pending: Option<Error>,
}

macro_rules! verb_methods {
    ($($(#[$meta:meta])* $verb:ident => $filter:ident,)*) => {
        $(
            $(#[$meta])*
            pub fn $verb<H, T>(&mut self, path: &str, handler: H) -> &mut Self
            where
                H: Handler<T, S>,
                T: 'static,
            {
                self.on(MethodFilter::$filter, path, handler)
            }
        )*
    };
}

impl<S> Registry<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates a root registry with a fresh name table.
    ///
    /// `mountpath` is the absolute path the finished router will be attached
    /// at. It only affects the paths stored in the name table.
    pub fn new(mountpath: &str, options: RouterOptions) -> Self {
        Self {
            router: Router::new(),
            mountpath: ensure_leading_slash(mountpath),
            prefix: String::new(),
            names: NameTable::new(),
            methods: MethodTable::default(),
            channel: Arc::new(DefaultErrorChannel),
            options,
            middleware: Vec::new(),
            pending: None,
        }
    }

    /// Creates a root registry whose routes are registered below `mountpath`.
    ///
    /// The finished router answers at absolute paths and is merged into an
    /// application as is.
    pub fn mounted(mountpath: &str, options: RouterOptions) -> Self {
        let mut registry = Self::new(mountpath, options);
        let prefix = trim_trailing_slash(&registry.mountpath);
        if prefix != "/" {
            registry.prefix = to_template_path(prefix);
        }
        registry
    }

    /// Replaces the error channel of this registry and all registries
    /// composed from it afterwards.
    #[must_use]
    pub fn with_error_channel(mut self, channel: Arc<dyn ErrorChannel>) -> Self {
        self.channel = channel;
        self
    }

    /// Creates a child registry mounted at `mountpath` below this one.
    ///
    /// The child shares this registry's name table, error channel and router
    /// options. Its routes are registered on a fresh router that must be
    /// handed back with [`Registry::attach`].
    pub fn compose(&self, mountpath: &str) -> Registry<S> {
        let relative = trim_trailing_slash(&ensure_leading_slash(mountpath)).to_string();
        let prefix = if relative == "/" {
            self.prefix.clone()
        } else {
            format!("{}{relative}", self.prefix)
        };

        Registry {
            router: Router::new(),
            mountpath: join_mountpath(&self.mountpath, mountpath),
            prefix,
            names: self.names.clone(),
            methods: self.methods.clone(),
            channel: self.channel.clone(),
            options: self.options,
            middleware: Vec::new(),
            pending: None,
        }
    }

    /// The absolute path this registry is mounted at.
    pub fn mountpath(&self) -> &str {
        &self.mountpath
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    pub fn router_options(&self) -> RouterOptions {
        self.options
    }

    pub fn error_channel(&self) -> Arc<dyn ErrorChannel> {
        self.channel.clone()
    }

    /// Snapshot of the name table as a reverse-routing lookup.
    pub fn routes(&self) -> Routes {
        Routes::from(&self.names)
    }

    /// Starts a route at `options.path`, registering `options.name` if given.
    ///
    /// # Errors
    ///
    /// `Configuration` when the name is already taken in the shared table.
    pub fn route(&mut self, options: RouteOptions) -> Result<RouteBuilder<'_, S>> {
        if let Some(name) = &options.name {
            let absolute = join_mountpath(&self.mountpath, &options.path);
            self.names.register(name, to_template_path(&absolute))?;
        }
        Ok(RouteBuilder {
            registry: self,
            path: options.path,
        })
    }

    verb_methods! {
        get => GET,
        post => POST,
        put => PUT,
        patch => PATCH,
        delete => DELETE,
        head => HEAD,
        options => OPTIONS,
        trace => TRACE,
    }

    /// Registers `handler` for every method matched by `filter`.
    pub fn on<H, T>(&mut self, filter: MethodFilter, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.register(path, Claim::Methods(filter), axum::routing::on(filter, handler))
    }

    /// Registers `handler` for every method not registered otherwise.
    pub fn any<H, T>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.register(path, Claim::Fallback, axum::routing::any(handler))
    }

    /// Registers a prebuilt method router, wrapped like every other handler.
    ///
    /// The method router takes the whole path: nothing else may be
    /// registered there.
    pub fn method_router(&mut self, path: &str, method_router: MethodRouter<S>) -> &mut Self {
        self.register(path, Claim::Whole, method_router)
    }

    fn register(&mut self, path: &str, claim: Claim, method_router: MethodRouter<S>) -> &mut Self {
        let method_router = method_router.layer(self.catch_layer());
        self.add(path, claim, method_router);
        self
    }

    /// Runs `middleware` ahead of every route of this registry, including
    /// routes attached from composed children.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Runs `middleware` ahead of the routes of this registry whose request
    /// path is `path` or lies below it. Parameter segments match any value.
    pub fn use_at(&mut self, path: &str, middleware: Middleware) -> &mut Self {
        let scope = self.router_path(path);
        self.middleware.push(middleware.scoped(scope));
        self
    }

    /// Nests a plain axum router at `path` below this registry.
    ///
    /// The nested router takes `path` and everything below it. At `/` its
    /// routes are merged instead and are not checked for overlaps.
    pub fn nest(&mut self, path: &str, router: Router<S>) -> &mut Self {
        if self.pending.is_some() {
            return self;
        }
        let path = self.router_path(path);
        let current = std::mem::take(&mut self.router);
        if path == "/" {
            self.router = current.merge(router);
            return self;
        }

        let tail = format!("{path}/{{*rest}}");
        match self
            .methods
            .claim(&path, Claim::Whole)
            .and_then(|()| self.methods.claim(&tail, Claim::Whole))
        {
            Ok(()) => self.router = current.nest(&path, router),
            Err(err) => {
                self.router = current;
                self.pending = Some(err);
            }
        }
        self
    }

    /// Merges a composed child's routes into this registry.
    ///
    /// # Errors
    ///
    /// `Configuration` when the child recorded a conflicting registration.
    pub fn attach(&mut self, child: Registry<S>) -> Result<&mut Self> {
        tracing::debug!(mountpath = %child.mountpath, "Attaching child registry");
        let router = child.into_router()?;
        let current = std::mem::take(&mut self.router);
        self.router = current.merge(router);
        Ok(self)
    }

    /// Finishes the registry, applying its middleware, and returns the
    /// concrete router.
    ///
    /// # Errors
    ///
    /// `Configuration` when a registration conflicted with an earlier one.
    /// Registrations after the first conflict are dropped.
    pub fn into_router(mut self) -> Result<Router<S>> {
        self.settle()?;
        let catch = self.catch_layer();
        Ok(self
            .middleware
            .into_iter()
            .rev()
            .fold(self.router, |router, middleware| {
                middleware.wrap_router(router).layer(catch.clone())
            }))
    }

    /// Returns the first registration conflict recorded since the last call.
    pub(crate) fn settle(&mut self) -> Result<()> {
        match self.pending.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub(crate) fn catch_layer(&self) -> CatchRejectionLayer {
        CatchRejectionLayer::new(self.channel.clone())
    }

    /// Registers `method_router` at `path` and, where applicable, at its
    /// trailing-slash twin.
    ///
    /// The root route of a registry mounted below `/` answers both forms of
    /// the mount path. Other routes get their twin when routing is not
    /// strict. A conflicting registration is recorded and dropped; it
    /// surfaces from [`Registry::into_router`].
    pub(crate) fn add(&mut self, path: &str, claim: Claim, method_router: MethodRouter<S>) {
        if self.pending.is_some() {
            return;
        }

        let is_root = ensure_leading_slash(path) == "/";
        let path = self.router_path(path);
        let mut paths = vec![path.clone()];
        if is_root && path != "/" && !ends_with_catch_all(&path) {
            paths.push(format!("{path}/"));
        } else if !self.options.strict
            && let Some(alias) = trailing_slash_alias(&path)
        {
            paths.push(alias);
        }

        for candidate in &paths {
            if let Err(err) = self.methods.claim(candidate, claim) {
                self.pending = Some(err);
                return;
            }
        }

        let mut router = std::mem::take(&mut self.router);
        for candidate in &paths {
            router = router.route(candidate, method_router.clone());
        }
        tracing::debug!(path = %path, "Registered route");
        self.router = router;
    }

    /// The router-relative path of `path`, in axum syntax.
    fn router_path(&self, path: &str) -> String {
        let path = ensure_leading_slash(path);
        let joined = match (path.as_str(), self.prefix.is_empty()) {
            ("/", true) => path,
            ("/", false) => self.prefix.clone(),
            (_, _) => format!("{}{path}", self.prefix),
        };
        to_router_path(&joined)
    }
}

impl<S> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("mountpath", &self.mountpath)
            .field("prefix", &self.prefix)
            .field("names", &self.names)
            .field("options", &self.options)
            .field("methods", &self.methods)
            .field("middleware", &self.middleware.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

fn trailing_slash_alias(path: &str) -> Option<String> {
    if path == "/" || ends_with_catch_all(path) {
        return None;
    }
    match path.strip_suffix('/') {
        Some(trimmed) => Some(trimmed.to_string()),
        None => Some(format!("{path}/")),
    }
}

// ============================================================================
// RouteBuilder
// ============================================================================

/// Verb registrations for a single path, returned by [`Registry::route`].
pub struct RouteBuilder<'a, S = ()> {
    registry: &'a mut Registry<S>,
    path: String,
}

macro_rules! builder_verbs {
    ($($verb:ident => $filter:ident,)*) => {
        $(
            pub fn $verb<H, T>(self, handler: H) -> Self
            where
                H: Handler<T, S>,
                T: 'static,
            {
                self.on(MethodFilter::$filter, handler)
            }
        )*
    };
}

impl<S> RouteBuilder<'_, S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn path(&self) -> &str {
        &self.path
    }

    builder_verbs! {
        get => GET,
        post => POST,
        put => PUT,
        patch => PATCH,
        delete => DELETE,
        head => HEAD,
        options => OPTIONS,
        trace => TRACE,
    }

    pub fn on<H, T>(self, filter: MethodFilter, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.registry.on(filter, &self.path, handler);
        self
    }

    pub fn any<H, T>(self, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.registry.any(&self.path, handler);
        self
    }

    pub fn method_router(self, method_router: MethodRouter<S>) -> Self {
        self.registry.method_router(&self.path, method_router);
        self
    }
}
