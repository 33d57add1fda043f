use crate::{ApiError, ApiResponse, Request};
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// Application logic a route resolves to. The handler owns the request for the rest of its lifecycle.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, request: Request) -> Result<ApiResponse, ApiError>;
}

/// an async `Fn(Request)` holder
pub struct FnHandler<F, Fut> {
    f: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ApiResponse, ApiError>> + Send,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F, Fut>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ApiResponse, ApiError>> + Send,
{
    FnHandler::new(f)
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F, Fut>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ApiResponse, ApiError>> + Send,
{
    async fn invoke(&self, request: Request) -> Result<ApiResponse, ApiError> {
        (self.f)(request).await
    }
}

/// Answers `HEAD` and `OPTIONS` with an empty 204.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreflightHandler;

#[async_trait]
impl RequestHandler for PreflightHandler {
    async fn invoke(&self, request: Request) -> Result<ApiResponse, ApiError> {
        Ok(ApiResponse::preflight(request.rid()))
    }
}

/// The default not-found answer: a 404 envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundHandler;

#[async_trait]
impl RequestHandler for NotFoundHandler {
    async fn invoke(&self, request: Request) -> Result<ApiResponse, ApiError> {
        Ok(ApiResponse::not_found(request.rid()))
    }
}
