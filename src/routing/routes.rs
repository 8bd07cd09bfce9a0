//! Declarative routes and the index module.

use {
    super::{
        handler::{BoxedHandler, Middleware},
        loader::{Extensions, HandlerExport, HandlerLoader},
        registry::{Claim, Registry, RouteOptions},
    },
    crate::{Error, Result, config::RouteConfig},
    axum::routing::MethodFilter,
    http::Method,
    std::path::{Path, PathBuf},
};

/// One explicitly configured route.
///
/// ```rust
/// use axum_enroute::{BoxedHandler, Middleware, RouteDefinition};
///
/// let create = RouteDefinition::new("/users", BoxedHandler::new(|_req| async { Ok("created") }))
///     .method("POST")
///     .middleware(Middleware::new(|req, next| async move { Ok(next.run(req).await) }))
///     .named("create-user");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteDefinition {
    pub path: String,
    /// Defaults to `get`. Case-insensitive; `all` matches every method.
    pub method: Option<String>,
    pub handler: Option<BoxedHandler>,
    /// Runs in order, ahead of the handler, on this route only.
    pub middleware: Vec<Middleware>,
    pub name: Option<String>,
}

impl RouteDefinition {
    pub fn new(path: impl Into<String>, handler: BoxedHandler) -> Self {
        Self {
            path: path.into(),
            handler: Some(handler),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds a definition from its TOML form, resolving handler and
    /// middleware names through `loader`.
    ///
    /// An unknown handler name leaves the handler empty, which installation
    /// reports. An unknown middleware name fails right away.
    pub fn from_config<S, L>(config: &RouteConfig, loader: &L) -> Result<Self>
    where
        L: HandlerLoader<S> + ?Sized,
    {
        let handler = config.handler.as_deref().and_then(|name| loader.handler(name));
        let middleware = config
            .middleware
            .iter()
            .map(|name| {
                loader.middleware(name).ok_or_else(|| {
                    Error::config(format!(
                        "middleware must be a function ('{name}' on route '{}')",
                        config.path
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path: config.path.clone(),
            method: config.method.clone(),
            handler,
            middleware,
            name: config.name.clone(),
        })
    }
}

/// Parses a route method. `None` stands for every method.
fn method_filter(method: Option<&str>) -> Result<Option<MethodFilter>> {
    let method = method.unwrap_or("get").to_ascii_lowercase();
    if method == "all" {
        return Ok(None);
    }

    let parsed = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| Error::config(format!("Invalid route method '{method}'")))?;
    MethodFilter::try_from(parsed)
        .map(Some)
        .map_err(|_| Error::config(format!("Unsupported route method '{method}'")))
}

/// Installs `definitions` in order.
///
/// The first invalid definition aborts installation. Routes installed
/// before it stay installed.
pub fn install_routes<S, I>(registry: &mut Registry<S>, definitions: I) -> Result<()>
where
    S: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = RouteDefinition>,
{
    for definition in definitions {
        install_route(registry, definition)?;
    }
    Ok(())
}

/// Resolves and installs routes configured in TOML.
pub fn install_configured_routes<S, L>(
    registry: &mut Registry<S>,
    routes: &[RouteConfig],
    loader: &L,
) -> Result<()>
where
    S: Clone + Send + Sync + 'static,
    L: HandlerLoader<S> + ?Sized,
{
    for config in routes {
        install_route(registry, RouteDefinition::from_config(config, loader)?)?;
    }
    Ok(())
}

fn install_route<S>(registry: &mut Registry<S>, definition: RouteDefinition) -> Result<()>
where
    S: Clone + Send + Sync + 'static,
{
    let RouteDefinition {
        path,
        method,
        handler,
        middleware,
        name,
    } = definition;

    if path.is_empty() {
        return Err(Error::config("path is required"));
    }
    let Some(handler) = handler else {
        return Err(Error::config(format!(
            "handler is required (route '{path}')"
        )));
    };
    let filter = method_filter(method.as_deref())?;

    if let Some(name) = name {
        registry.route(RouteOptions::new(path.as_str()).named(name))?;
    }

    let catch = registry.catch_layer();
    let method_router = match filter {
        Some(filter) => handler.into_method_router_for(filter),
        None => handler.into_method_router(),
    }
    .layer(catch.clone());

    let method_router = middleware
        .into_iter()
        .rev()
        .fold(method_router, |method_router, middleware| {
            middleware
                .wrap_method_router(method_router)
                .layer(catch.clone())
        });

    tracing::debug!(
        path = %path,
        method = method.as_deref().unwrap_or("get"),
        "Installing declared route"
    );
    let claim = filter.map_or(Claim::Fallback, Claim::Methods);
    registry.add(&path, claim, method_router);
    registry.settle()
}

/// Finds the file an index setting refers to.
///
/// Tries the literal path, then the path with each code extension
/// appended, then `index.<ext>` inside it when it is a directory. Data
/// extensions are never tried.
pub fn resolve_index(file: &Path, extensions: &Extensions) -> Result<PathBuf> {
    if file.is_file() {
        return Ok(file.to_path_buf());
    }

    for ext in extensions.code() {
        let mut candidate = file.as_os_str().to_owned();
        candidate.push(".");
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    if file.is_dir() {
        for ext in extensions.code() {
            let candidate = file.join(format!("index.{ext}"));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(Error::resolution(format!(
        "Index file not found. ('{}')",
        file.display()
    )))
}

/// Loads the index module and mounts it on `registry` itself.
pub fn install_index<S, L>(registry: &mut Registry<S>, file: &Path, loader: &L) -> Result<()>
where
    S: Clone + Send + Sync + 'static,
    L: HandlerLoader<S> + ?Sized,
{
    let resolved = resolve_index(file, loader.extensions())?;
    let Some(mount) = HandlerExport::classify(loader.load(&resolved)?).into_mount_fn() else {
        return Err(Error::config(format!(
            "An index file must export a function. ('{}')",
            resolved.display()
        )));
    };

    tracing::debug!(file = %resolved.display(), "Mounting index module");
    mount(registry)?;
    registry.settle()
}
