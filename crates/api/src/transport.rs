//! The immutable view of one inbound transport event.
//!
//! Nothing downstream reads ambient process state: the aggregator and [`Request`](crate::Request)
//! are built from a [`TransportSnapshot`] only.

use crate::ApiError;
use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use http_body::Body;
use http_body_util::BodyExt;
use micro_param::UploadedFile;
use std::collections::BTreeMap;
use std::error::Error;
use std::net::IpAddr;
use tracing::error;

#[derive(Debug, Clone)]
pub struct TransportSnapshot {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    files: BTreeMap<String, UploadedFile>,
    remote_addr: Option<IpAddr>,
}

impl TransportSnapshot {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri, headers: HeaderMap::new(), body: Bytes::new(), files: BTreeMap::new(), remote_addr: None }
    }

    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self { method: parts.method, uri: parts.uri, headers: parts.headers, ..Self::new(Method::GET, Uri::default()) }
            .with_body(body)
    }

    /// Reads the whole body of `request` once and snapshots it.
    pub async fn from_http<B>(request: http::Request<B>) -> Result<Self, ApiError>
    where
        B: Body,
        B::Error: Into<Box<dyn Error + Send + Sync>>,
    {
        let (parts, body) = request.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                let e: Box<dyn Error + Send + Sync> = e.into();
                error!(cause = %e, "failed to read request body");
                return Err(ApiError::bad_request("Unreadable request body").with_source(e));
            }
        };
        Ok(Self::from_parts(parts, body))
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a file the transport already received, e.g. a multipart part.
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(name.into(), file);
        self
    }

    #[must_use]
    pub fn with_remote_addr(mut self, addr: IpAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn files(&self) -> &BTreeMap<String, UploadedFile> {
        &self.files
    }

    pub fn remote_addr(&self) -> Option<IpAddr> {
        self.remote_addr
    }
}
