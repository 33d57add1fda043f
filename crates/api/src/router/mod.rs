//! Route registration and request dispatch.
//!
//! A [`Router`] is built once through [`Router::builder`] and is read-only afterwards, so it can be
//! shared across concurrently handled requests.

mod tree;

pub use tree::{Route, RouteMatch, RouteNode, RouteTree, Segment, parse_pattern};

use crate::event::{EventListener, Listeners};
use crate::handler::{PreflightHandler, RequestHandler};
use crate::{ApiError, ApiResponse, DispatchOptions, Request, ResponseBody, TransportSnapshot};
use http::Method;
use http_body::Body;
use micro_param::Source;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

type BoxedHandler = Box<dyn RequestHandler>;

pub struct Router {
    tree: RouteTree<BoxedHandler>,
    not_found: Option<BoxedHandler>,
    preflight: PreflightHandler,
    listeners: Listeners,
    options: DispatchOptions,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Finds the handler for `request`, binding `:name` segments of the winning pattern into its
    /// parameters with [`Source::Url`].
    ///
    /// `HEAD` and `OPTIONS` always resolve to the preflight handler. When nothing matches, the
    /// not-found handler is used if one is registered; otherwise this fails with a bad request.
    pub fn resolve(&self, request: &mut Request) -> Result<&dyn RequestHandler, ApiError> {
        let method = request.method().clone();
        if method == Method::HEAD || method == Method::OPTIONS {
            return Ok(&self.preflight);
        }

        let path = request.segments().to_vec();
        let route = self.tree.search(&path).into_iter().find_map(|found| found.node().route(&method));

        if let Some(route) = route {
            debug!(pattern = route.pattern(), "route matched");
            for (name, value) in route.bindings(&path) {
                request.set_param(name, value, Source::Url);
            }
            return Ok(route.handler().as_ref());
        }

        match &self.not_found {
            Some(handler) => Ok(handler.as_ref()),
            None => {
                warn!(method = %method, path = %request.path(), "route not found");
                Err(ApiError::bad_request("Route not found"))
            }
        }
    }

    /// Runs one request to completion. Every failure is turned into an error envelope.
    pub async fn dispatch(&self, mut request: Request) -> ApiResponse {
        let rid = request.rid();
        let span = info_span!("request", rid = %rid, method = %request.method(), path = %request.path());

        async move {
            if let Some(prefix) = &self.options.strip_prefix {
                request.strip_prefix(prefix);
            }

            self.listeners.before_run(&mut request);
            let pretty = request.is_param(&self.options.pretty_param, None);

            let result = match self.resolve(&mut request) {
                Ok(handler) => handler.invoke(request).await,
                Err(e) => Err(e),
            };

            let mut response = result.unwrap_or_else(|e| {
                if e.status_code().is_server_error() {
                    error!(cause = %e, "request failed");
                } else {
                    info!(cause = %e, "request rejected");
                }
                ApiResponse::from_error(Some(rid), &e)
            });
            response.pretty |= pretty;

            self.listeners.after_run(rid, &response);
            debug!(code = response.code, "request finished");
            response
        }
        .instrument(span)
        .await
    }

    /// Builds the request from a transport snapshot, then dispatches it.
    pub async fn handle(&self, snapshot: &TransportSnapshot) -> ApiResponse {
        match Request::with_options(snapshot, &self.options) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                warn!(cause = %e, path = snapshot.path(), "failed to build request");
                ApiResponse::from_error(None, &e)
            }
        }
    }

    /// End to end: an `http::Request` in, the serialized envelope out.
    pub async fn handle_http<B>(&self, request: http::Request<B>) -> http::Response<ResponseBody>
    where
        B: Body,
        B::Error: Into<Box<dyn Error + Send + Sync>>,
    {
        match TransportSnapshot::from_http(request).await {
            Ok(snapshot) => self.handle(&snapshot).await.into_http(),
            Err(e) => ApiResponse::from_error(None, &e).into_http(),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("nodes", &self.tree.len())
            .field("not_found", &self.not_found.is_some())
            .field("listeners", &self.listeners)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

pub struct RouterBuilder {
    routes: Vec<(String, MethodRoute)>,
    not_found: Option<BoxedHandler>,
    listeners: Listeners,
    options: DispatchOptions,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: Vec::new(), not_found: None, listeners: Listeners::new(), options: DispatchOptions::default() }
    }

    pub fn route(mut self, pattern: impl Into<String>, route: MethodRoute) -> Self {
        self.routes.push((pattern.into(), route));
        self
    }

    pub fn not_found<H: RequestHandler + 'static>(mut self, handler: H) -> Self {
        self.not_found = Some(Box::new(handler));
        self
    }

    pub fn listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.add_last(listener);
        self
    }

    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Router {
        let mut tree = RouteTree::new();
        for (pattern, route) in self.routes {
            tree.insert(route.method, &pattern, route.handler);
        }

        Router { tree, not_found: self.not_found, preflight: PreflightHandler, listeners: self.listeners, options: self.options }
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder").field("routes", &self.routes).field("options", &self.options).finish_non_exhaustive()
    }
}

/// A handler bound to one method, or to any method.
pub struct MethodRoute {
    method: Option<Method>,
    handler: BoxedHandler,
}

macro_rules! method_route {
    ($name:ident, $method:expr) => {
        pub fn $name<H: RequestHandler + 'static>(handler: H) -> MethodRoute {
            MethodRoute { method: $method, handler: Box::new(handler) }
        }
    };
}

impl fmt::Debug for MethodRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRoute").field("method", &self.method).finish_non_exhaustive()
    }
}

method_route!(get, Some(Method::GET));
method_route!(post, Some(Method::POST));
method_route!(put, Some(Method::PUT));
method_route!(delete, Some(Method::DELETE));
method_route!(any, None);
