//! The per-request state the router and controllers work on.

mod headers;

pub use headers::{Headers, normalize_name};

use crate::incoming::{Incoming, Payload};
use crate::{ApiError, DispatchOptions, TransportSnapshot};
use bytes::Bytes;
use http::Method;
use micro_param::{Map, Source, Value};
use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use uuid::Uuid;

const METHOD_PARAM: &str = "_method";
const METHOD_OVERRIDE_HEADER: &str = "X-Http-Method-Override";

/// A request parameter together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub value: Value,
    pub source: Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Json,
    FormUrlEncoded,
    MultipartFormData,
}

impl ContentType {
    const ALL: [ContentType; 3] = [ContentType::Json, ContentType::FormUrlEncoded, ContentType::MultipartFormData];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::MultipartFormData => "multipart/form-data",
        }
    }

    /// Substring match against the known content types.
    pub fn detect(header: &str) -> Option<Self> {
        let header = header.to_ascii_lowercase();
        Self::ALL.into_iter().find(|content_type| header.contains(content_type.as_str()))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound request: id, effective method, path segments, headers and the tagged parameter map.
///
/// Only the parameter map and the path change after construction; the path through
/// [`Request::replace_url`] and [`Request::strip_prefix`].
#[derive(Debug)]
pub struct Request {
    rid: Uuid,
    method: Method,
    segments: Vec<String>,
    content_type: Option<ContentType>,
    headers: Headers,
    params: BTreeMap<String, Param>,
    payload: Payload,
    remote_ip: Option<IpAddr>,
}

impl Request {
    pub fn new(snapshot: &TransportSnapshot) -> Result<Self, ApiError> {
        Self::with_options(snapshot, &DispatchOptions::default())
    }

    pub fn with_options(snapshot: &TransportSnapshot, options: &DispatchOptions) -> Result<Self, ApiError> {
        let rid = Uuid::new_v4();
        let headers = Headers::from_header_map(snapshot.headers());

        let payload = Payload::new(snapshot.body().clone());
        let incoming = Incoming::aggregate(snapshot, &payload, &options.temp_dir())?;
        let mut params = BTreeMap::new();
        for (key, value, source) in incoming.into_entries() {
            params.insert(key, Param { value, source });
        }

        let segments = split_path(snapshot.path(), true);
        let method = resolve_method(snapshot.method(), &mut params, &headers);
        let content_type = headers.get(http::header::CONTENT_TYPE.as_str()).and_then(ContentType::detect);
        let remote_ip = detect_remote_ip(&headers).or(snapshot.remote_addr());

        Ok(Self { rid, method, segments, content_type, headers, params, payload, remote_ip })
    }

    pub fn rid(&self) -> Uuid {
        self.rid
    }

    /// The effective method, after `_method` and `X-Http-Method-Override` are applied.
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    pub fn remote_ip(&self) -> Option<IpAddr> {
        self.remote_ip
    }

    pub fn is_ajax(&self) -> bool {
        self.content_type == Some(ContentType::Json)
            || ["X-Requested-With", "Requested-With"]
                .into_iter()
                .any(|name| self.header(name).is_some_and(|value| value.eq_ignore_ascii_case("xmlhttprequest")))
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn is_header(&self, key: &str) -> bool {
        self.headers.contains(key)
    }

    /// The raw body; the same bytes on every call.
    pub fn payload(&self) -> &Bytes {
        self.payload.bytes()
    }

    /// The body decoded as a json object, decoded at most once.
    pub fn json(&self) -> &Map {
        self.payload.json()
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key).map(|param| &param.value)
    }

    pub fn param_entry(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    /// Whether `key` holds a non-null value, optionally only one that came from `source`.
    pub fn is_param(&self, key: &str, source: Option<Source>) -> bool {
        self.params
            .get(key)
            .is_some_and(|param| !param.value.is_null() && source.is_none_or(|source| param.source == source))
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<Value>, source: Source) {
        self.params.insert(key.into(), Param { value: value.into(), source });
    }

    pub fn remove_param(&mut self, key: &str) -> Option<Param> {
        self.params.remove(key)
    }

    pub fn params(&self) -> &BTreeMap<String, Param> {
        &self.params
    }

    /// Replaces every occurrence of `search` in the current path, then re-parses it.
    pub fn replace_url(&mut self, search: &str, replace: &str) {
        let url = self.path().replace(search, replace);
        let path = url.split(['?', '#']).next().unwrap_or_default();
        self.segments = split_path(path, false);
    }

    /// Drops leading segments equal to `prefix`'s. Returns whether the path started with it.
    pub fn strip_prefix(&mut self, prefix: &str) -> bool {
        let prefix = split_path(prefix, false);
        if prefix.is_empty() || !self.segments.starts_with(&prefix) {
            return false;
        }
        self.segments.drain(..prefix.len());
        true
    }
}

fn split_path(path: &str, decode: bool) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if decode { percent_decode_str(segment).decode_utf8_lossy().into_owned() } else { segment.to_owned() }
        })
        .collect()
}

fn override_method(raw: &str) -> Option<Method> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "DELETE" => Some(Method::DELETE),
        "GET" => Some(Method::GET),
        "POST" => Some(Method::POST),
        "PUT" => Some(Method::PUT),
        _ => None,
    }
}

fn resolve_method(transport: &Method, params: &mut BTreeMap<String, Param>, headers: &Headers) -> Method {
    if let Some(method) = params.get(METHOD_PARAM).and_then(|param| param.value.as_str()).and_then(override_method) {
        params.remove(METHOD_PARAM);
        return method;
    }

    if let Some(method) = headers.get(METHOD_OVERRIDE_HEADER).and_then(override_method) {
        return method;
    }

    transport.clone()
}

fn detect_remote_ip(headers: &Headers) -> Option<IpAddr> {
    let cloudflare = headers.get("Cf-Connecting-Ip").and_then(|value| value.parse().ok());
    cloudflare.or_else(|| {
        headers
            .get("X-Forwarded-For")
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse().ok())
    })
}
