//! Normalizes the raw transport sources into tagged parameter values.
//!
//! Query and form bodies are parsed by `serde_qs`, with bracket nesting (`tags[]=a`, `user[name]=b`). The json body
//! is decoded once through [`Payload`]; only a top-level object contributes parameters. Any top-level
//! string of the form `data:<mime>;base64,<data>` is written to a temporary file and moved to the
//! file source.

use crate::{ApiError, ContentType, TransportSnapshot};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use micro_param::{Map, Source, UploadedFile, Value};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// The raw request body, with its json decoding cached for the request's lifetime.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    bytes: Bytes,
    json: OnceCell<Map>,
}

impl Payload {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes, json: OnceCell::new() }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The body decoded as a json object; empty when the body is not one.
    pub fn json(&self) -> &Map {
        self.json.get_or_init(|| {
            if self.bytes.is_empty() {
                return Map::new();
            }
            match serde_json::from_slice::<serde_json::Value>(&self.bytes) {
                Ok(json @ serde_json::Value::Object(_)) => match Value::from(json) {
                    Value::Map(map) => map,
                    _ => Map::new(),
                },
                Ok(_) => Map::new(),
                Err(e) => {
                    debug!(cause = %e, "request body is not json");
                    Map::new()
                }
            }
        })
    }
}

/// Parameters gathered from query, form, json and files, each keyed by its source.
#[derive(Debug, Default)]
pub struct Incoming {
    query: Map,
    form: Map,
    json: Map,
    files: BTreeMap<String, UploadedFile>,
}

impl Incoming {
    pub fn aggregate(snapshot: &TransportSnapshot, payload: &Payload, temp_dir: &Path) -> Result<Self, ApiError> {
        let mut files = snapshot.files().clone();

        let query = decode(snapshot.query().unwrap_or_default())?;
        let query = detach_files(query, temp_dir, &mut files)?;

        let form = if is_form(snapshot) {
            let body = String::from_utf8_lossy(payload.bytes());
            detach_files(decode(&body)?, temp_dir, &mut files)?
        } else {
            Map::new()
        };

        let json = detach_files(payload.json().clone(), temp_dir, &mut files)?;

        Ok(Self { query, form, json, files })
    }

    pub fn query(&self) -> &Map {
        &self.query
    }

    pub fn form(&self) -> &Map {
        &self.form
    }

    pub fn json(&self) -> &Map {
        &self.json
    }

    pub fn files(&self) -> &BTreeMap<String, UploadedFile> {
        &self.files
    }

    /// Every value with its source, in precedence order: a later source overrides an earlier key.
    pub fn into_entries(self) -> impl Iterator<Item = (String, Value, Source)> {
        let tag = |source: Source| move |(key, value): (String, Value)| (key, value, source);

        self.query
            .into_iter()
            .map(tag(Source::Query))
            .chain(self.form.into_iter().map(tag(Source::Form)))
            .chain(self.json.into_iter().map(tag(Source::Json)))
            .chain(self.files.into_iter().map(|(key, file)| (key, Value::File(file), Source::File)))
    }
}

fn is_form(snapshot: &TransportSnapshot) -> bool {
    snapshot
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(ContentType::detect)
        == Some(ContentType::FormUrlEncoded)
}

/// Parses an urlencoded string, nesting bracketed keys.
fn decode(input: &str) -> Result<Map, ApiError> {
    let decoded = serde_qs::from_str::<BTreeMap<String, serde_json::Value>>(input)
        .map_err(|e| ApiError::bad_request("Malformed urlencoded input").with_source(e))?;

    Ok(decoded.into_iter().map(|(key, value)| (key, Value::from(value))).collect())
}

fn detach_files(source: Map, temp_dir: &Path, files: &mut BTreeMap<String, UploadedFile>) -> Result<Map, ApiError> {
    let mut kept = Map::new();
    for (key, value) in source {
        let detached = match value.as_str().and_then(split_data_uri) {
            Some((mime, data)) => Some(write_data_uri(mime, data, temp_dir)?),
            None => None,
        };
        match detached {
            Some(file) => {
                debug!(param = %key, mime = file.mime(), size = file.size(), "detached inline file");
                files.insert(key, file);
            }
            None => {
                kept.insert(key, value);
            }
        }
    }
    Ok(kept)
}

/// Splits `data:<mime>;base64,<data>` into its mime type and encoded data.
fn split_data_uri(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix(DATA_PREFIX)?;
    let marker = rest.find(BASE64_MARKER)?;
    Some((&rest[..marker], &rest[marker + BASE64_MARKER.len()..]))
}

fn write_data_uri(mime: &str, data: &str, temp_dir: &Path) -> Result<UploadedFile, ApiError> {
    let extension = extension_for(mime)
        .ok_or_else(|| ApiError::internal(format!("Invalid mime type: {mime}")).with_context("mime", mime))?;

    // form decoding turns '+' into ' '
    let bytes = STANDARD
        .decode(data.replace(' ', "+"))
        .map_err(|e| ApiError::bad_request("Invalid base64 data").with_source(e))?;

    let mut temp = tempfile::Builder::new().suffix(&format!(".{extension}")).tempfile_in(temp_dir)?;
    temp.write_all(&bytes)?;
    let path = temp.into_temp_path();

    let name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    Ok(UploadedFile::temporary(name, path, mime, size))
}

fn extension_for(mime: &str) -> Option<&'static str> {
    let extension = match mime {
        "application/pdf" => "pdf",
        "application/zip" => "zip",
        "image/gif" => "gif",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "text/csv" => "csv",
        "text/css" => "css",
        "text/html" => "html",
        "text/javascript" => "js",
        "text/plain" => "txt",
        "text/xml" => "xml",
        _ => return None,
    };
    Some(extension)
}
