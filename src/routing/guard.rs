//! Forwards failed handler results to a single error channel.
//!
//! Handlers and middleware registered through a [`Registry`](crate::Registry)
//! return `Result`. When one resolves to `Err(error)`, the error renders
//! itself and rides along in the response extensions. [`CatchRejectionLayer`]
//! sits directly around every registered handler and middleware, takes the
//! error back out and hands it to the registry's [`ErrorChannel`], whose
//! response replaces the rendered one.
//!
//! Successful responses pass through untouched. Panics are left to whatever
//! the host application installs for them.

use {
    crate::{Error, error::Rejection},
    axum::{extract::Request, response::Response},
    std::{
        fmt,
        future::Future,
        pin::Pin,
        sync::Arc,
        task::{Context, Poll},
    },
    tower::{Layer, Service},
};

/// Receives errors returned by handlers and middleware.
///
/// Any `Fn(Error) -> Response` closure is a channel. Implementations must
/// build their response with [`Error::render`] or by hand; converting the
/// error with `into_response` would stash it again and hand it to the next
/// enclosing channel.
pub trait ErrorChannel: Send + Sync + 'static {
    fn forward(&self, error: Error) -> Response;
}

impl<F> ErrorChannel for F
where
    F: Fn(Error) -> Response + Send + Sync + 'static,
{
    fn forward(&self, error: Error) -> Response {
        self(error)
    }
}

/// Logs the error and renders it as a JSON [`ErrorResponse`](crate::ErrorResponse).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorChannel;

impl ErrorChannel for DefaultErrorChannel {
    fn forward(&self, error: Error) -> Response {
        tracing::error!(
            error_code = error.error_code(),
            error = %error,
            "Request handler failed"
        );
        error.render()
    }
}

/// Layer connecting a handler's failures to an [`ErrorChannel`].
#[derive(Clone)]
pub struct CatchRejectionLayer {
    channel: Arc<dyn ErrorChannel>,
}

impl CatchRejectionLayer {
    pub fn new(channel: Arc<dyn ErrorChannel>) -> Self {
        Self { channel }
    }
}

impl fmt::Debug for CatchRejectionLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatchRejectionLayer").finish_non_exhaustive()
    }
}

impl<I> Layer<I> for CatchRejectionLayer {
    type Service = CatchRejection<I>;

    fn layer(&self, inner: I) -> Self::Service {
        CatchRejection {
            inner,
            channel: self.channel.clone(),
        }
    }
}

/// Service produced by [`CatchRejectionLayer`].
#[derive(Clone)]
pub struct CatchRejection<I> {
    inner: I,
    channel: Arc<dyn ErrorChannel>,
}

impl<I> Service<Request> for CatchRejection<I>
where
    I: Service<Request, Response = Response> + Clone + Send + 'static,
    I::Future: Send + 'static,
{
    type Response = Response;
    type Error = I::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let channel = self.channel.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            let rejected = response
                .extensions_mut()
                .remove::<Rejection>()
                .and_then(|rejection| rejection.take());

            match rejected {
                Some(error) => Ok(channel.forward(error)),
                None => Ok(response),
            }
        })
    }
}
