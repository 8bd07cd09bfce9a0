//! Type-erased request handlers and middleware.
//!
//! Handler modules and declarative route definitions carry their callables
//! around as values, so they cannot use axum's generic `Handler` trait
//! directly. These wrappers erase the concrete type while keeping the
//! `Result`-returning shape that lets failures reach the error channel.

use {
    super::pattern::matches_prefix,
    crate::Result,
    axum::{
        extract::Request,
        middleware::{Next, from_fn},
        response::{IntoResponse, Response},
        routing::MethodRouter,
    },
    std::{fmt, future::Future, pin::Pin, sync::Arc},
};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type HandlerFn = dyn Fn(Request) -> BoxFuture<Result<Response>> + Send + Sync;
type MiddlewareFn = dyn Fn(Request, Next) -> BoxFuture<Result<Response>> + Send + Sync;

/// A request handler stored as a value.
///
/// ```rust
/// use axum_enroute::BoxedHandler;
///
/// let hello = BoxedHandler::new(|_req| async { Ok("hello") });
/// ```
#[derive(Clone)]
pub struct BoxedHandler(Arc<HandlerFn>);

impl BoxedHandler {
    pub fn new<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
        R: IntoResponse,
    {
        Self(Arc::new(move |req: Request| -> BoxFuture<Result<Response>> {
            let fut = handler(req);
            Box::pin(async move { fut.await.map(IntoResponse::into_response) })
        }))
    }

    pub fn call(&self, req: Request) -> BoxFuture<Result<Response>> {
        (self.0)(req)
    }

    /// Builds a method router answering any method with this handler.
    pub(crate) fn into_method_router<S>(self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        axum::routing::any(move |req: Request| {
            let handler = self.clone();
            async move { handler.call(req).await }
        })
    }

    /// Builds a method router answering only `filter` with this handler.
    pub(crate) fn into_method_router_for<S>(
        self,
        filter: axum::routing::MethodFilter,
    ) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        axum::routing::on(filter, move |req: Request| {
            let handler = self.clone();
            async move { handler.call(req).await }
        })
    }
}

impl fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxedHandler(..)")
    }
}

/// A middleware function stored as a value.
///
/// Middleware receives the request and the rest of the chain. Returning
/// `Err` short-circuits the chain; the error is forwarded to the
/// registry's error channel.
///
/// ```rust
/// use axum_enroute::Middleware;
///
/// let tag = Middleware::new(|req, next| async move {
///     let mut response = next.run(req).await;
///     response.headers_mut().insert("x-tagged", "yes".parse().unwrap());
///     Ok(response)
/// });
/// ```
#[derive(Clone)]
pub struct Middleware(Arc<MiddlewareFn>);

impl Middleware {
    pub fn new<F, Fut, R>(middleware: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
        R: IntoResponse,
    {
        Self(Arc::new(move |req: Request, next: Next| -> BoxFuture<Result<Response>> {
            let fut = middleware(req, next);
            Box::pin(async move { fut.await.map(IntoResponse::into_response) })
        }))
    }

    pub fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response>> {
        (self.0)(req, next)
    }

    /// Restricts the middleware to requests whose path is `prefix` or lies below it.
    pub(crate) fn scoped(self, prefix: String) -> Self {
        Self(Arc::new(move |req: Request, next: Next| -> BoxFuture<Result<Response>> {
            if matches_prefix(&prefix, req.uri().path()) {
                (self.0)(req, next)
            } else {
                Box::pin(async move { Ok(next.run(req).await) })
            }
        }))
    }

    /// Wraps a method router so this middleware runs before it.
    pub(crate) fn wrap_method_router<S>(self, router: MethodRouter<S>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(from_fn(move |req: Request, next: Next| {
            let middleware = self.clone();
            async move { middleware.call(req, next).await }
        }))
    }

    /// Wraps every route of a router so this middleware runs before them.
    pub(crate) fn wrap_router<S>(self, router: axum::Router<S>) -> axum::Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(from_fn(move |req: Request, next: Next| {
            let middleware = self.clone();
            async move { middleware.call(req, next).await }
        }))
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Middleware(..)")
    }
}
