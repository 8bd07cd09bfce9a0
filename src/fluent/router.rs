//! Core `Enrouten` struct and initialization methods.

use {
    crate::{
        Config, DefaultErrorChannel, ErrorChannel, HandlerLoader, ModuleCatalog, Result,
        RouteDefinition,
    },
    std::{fmt, sync::Arc},
};

/// Assembles a router from configuration and a handler loader.
///
/// `Enrouten` wires the index module, the handler directory and the
/// declared routes of a [`Config`] into one `axum::Router`, in that order.
/// Handler files are turned into modules by a [`HandlerLoader`]; the
/// default [`ModuleCatalog`] maps paths relative to the base directory onto
/// registered mount functions.
///
/// ```rust
/// use axum_enroute::{Config, Enrouten, ModuleCatalog, Registry, RouteOptions};
///
/// # fn main() -> axum_enroute::Result<()> {
/// let config = Config::empty()
///     .with_basedir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
///     .with_directory("controllers");
///
/// let catalog = ModuleCatalog::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/controllers"))
///     .mount("users/index.rs", |router: &mut Registry| {
///         router
///             .route(RouteOptions::new("/").named("users"))?
///             .get(|| async { "all users" });
///         Ok(())
///     });
///
/// let mounted = Enrouten::with_loader(config, catalog)?.build()?;
/// assert_eq!(mounted.routes().path("users")?, Some("/users".to_string()));
///
/// let app: axum::Router = mounted.into_router();
/// # Ok(())
/// # }
/// ```
pub struct Enrouten<State = ()> {
    pub(crate) config: Config,
    pub(crate) loader: Arc<dyn HandlerLoader<State>>,
    pub(crate) routes: Vec<RouteDefinition>,
    pub(crate) channel: Arc<dyn ErrorChannel>,
}

impl Enrouten {
    /// Creates an `Enrouten` without application state whose loader knows no
    /// modules yet.
    ///
    /// Files found by a directory scan load as empty modules and are
    /// skipped; only declared routes contribute.
    pub fn new(config: Config) -> Result<Enrouten<()>> {
        let catalog = ModuleCatalog::new(config.routing.basedir()?);
        Enrouten::<()>::with_loader(config, catalog)
    }
}

impl<State> Enrouten<State>
where
    State: Clone + Send + Sync + 'static,
{
    /// Creates a new `Enrouten` with the provided configuration and loader.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn with_loader<L>(config: Config, loader: L) -> Result<Enrouten<State>>
    where
        L: HandlerLoader<State> + 'static,
    {
        config.validate()?;

        Ok(Enrouten {
            config,
            loader: Arc::new(loader),
            routes: Vec::new(),
            channel: Arc::new(DefaultErrorChannel),
        })
    }

    /// Replaces the channel that receives errors returned by handlers and
    /// middleware. The default channel logs the error and renders it as
    /// JSON.
    #[must_use]
    pub fn with_error_channel<C>(mut self, channel: C) -> Self
    where
        C: ErrorChannel,
    {
        self.channel = Arc::new(channel);
        self
    }

    /// Adds a route definition, installed after the configured routes.
    #[must_use]
    pub fn route(mut self, definition: RouteDefinition) -> Self {
        self.routes.push(definition);
        self
    }

    /// Adds route definitions, installed after the configured routes.
    #[must_use]
    pub fn with_routes<I>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        self.routes.extend(definitions);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<State> fmt::Debug for Enrouten<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enrouten")
            .field("config", &self.config)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}
