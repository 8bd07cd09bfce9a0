//! Assembly: build(), the mounted router and attachment to an application.

use super::router::Enrouten;
use crate::{
    Registry, Result, Routes, install_configured_routes, install_index, install_routes,
    mount_directory,
};

use {
    axum::{Extension, Router, body::Body},
    http::Request,
    tower_http::trace::TraceLayer,
};

impl<State> Enrouten<State>
where
    State: Clone + Send + Sync + 'static,
{
    /// Assembles the router.
    ///
    /// Assembly runs once, in this order:
    ///
    /// 1. **Index** - the index module is mounted on the root registry
    /// 2. **Directory** - one child registry per handler module found below
    ///    the configured directory
    /// 3. **Configured routes** - `[[routing.routes]]` entries, handlers and
    ///    middleware resolved by name through the loader
    /// 4. **Added routes** - definitions passed to [`Enrouten::route`]
    ///
    /// All registries of one build share a single name table. The finished
    /// router answers at absolute paths below the mount path and carries a
    /// frozen copy of the table as an `Extension<Routes>`.
    ///
    /// # Errors
    ///
    /// The first failure aborts the whole assembly:
    /// - `Resolution` when the directory or the index file does not exist
    /// - `Load` when a handler module fails to load
    /// - `Configuration` for invalid route definitions, duplicate names and
    ///   handlers registered twice for the same method and path
    pub fn build(self) -> Result<Mounted<State>> {
        let Enrouten {
            config,
            loader,
            routes,
            channel,
        } = self;
        let routing = &config.routing;

        let mut registry = Registry::mounted(&routing.mountpath, routing.router_options)
            .with_error_channel(channel);

        if let Some(index) = &routing.index {
            let file = routing.resolve_path(index)?;
            install_index(&mut registry, &file, loader.as_ref())?;
        }

        if let Some(directory) = &routing.directory {
            let basedir = routing.resolve_path(directory)?;
            mount_directory(&mut registry, &basedir, &routing.ignore, loader.as_ref())?;
        }

        install_configured_routes(&mut registry, &routing.routes, loader.as_ref())?;
        install_routes(&mut registry, routes)?;

        let names = registry.routes();
        tracing::debug!(
            mountpath = %routing.mountpath,
            named_routes = names.len(),
            "Assembled router"
        );

        let mut router = registry.into_router()?.layer(Extension(names.clone()));
        if config.logging.trace_requests {
            router = router.layer(TraceLayer::new_for_http().make_span_with(
                |request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                },
            ));
        }

        Ok(Mounted {
            router,
            routes: names,
            mountpath: routing.mountpath.clone(),
        })
    }
}

/// An assembled router together with its reverse-routing table.
#[derive(Debug)]
pub struct Mounted<State = ()> {
    router: Router<State>,
    routes: Routes,
    mountpath: String,
}

impl<State> Mounted<State>
where
    State: Clone + Send + Sync + 'static,
{
    /// The name table of the assembly.
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// The mount path route names were resolved against.
    pub fn mountpath(&self) -> &str {
        &self.mountpath
    }

    pub fn into_router(self) -> Router<State> {
        self.router
    }

    pub fn into_parts(self) -> (Router<State>, Routes) {
        (self.router, self.routes)
    }

    /// Merges the assembled routes into `app`.
    ///
    /// The routes already live below the mount path, so `app` keeps its own
    /// routes outside of it.
    pub fn attach_to(self, app: Router<State>) -> Router<State> {
        tracing::debug!(mountpath = %self.mountpath, "Attaching assembled router");
        app.merge(self.router)
    }
}
