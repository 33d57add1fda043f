//! The uniform json envelope every request ends in.

use crate::{ApiError, FieldError, ResponseBody};
use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

/// Codes for which status and headers are emitted.
pub const ALLOWED_CODES: [u16; 11] = [200, 203, 204, 400, 401, 402, 403, 404, 500, 501, 503];

/// Wire format: `{rid, code, errors, status, message, response}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub rid: Option<Uuid>,
    pub code: u16,
    pub errors: Option<Vec<FieldError>>,
    pub status: bool,
    pub message: Option<String>,
    pub response: serde_json::Value,
    /// Indent the serialized json.
    #[serde(skip)]
    pub pretty: bool,
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self {
            rid: None,
            code: 200,
            errors: None,
            status: true,
            message: None,
            response: serde_json::Value::Null,
            pretty: false,
        }
    }
}

impl ApiResponse {
    pub fn new(rid: Uuid) -> Self {
        Self { rid: Some(rid), ..Self::default() }
    }

    /// A successful envelope carrying `payload`.
    pub fn ok(rid: Uuid, payload: impl Into<serde_json::Value>) -> Self {
        Self { response: payload.into(), ..Self::new(rid) }
    }

    pub fn not_found(rid: Uuid) -> Self {
        Self { code: 404, status: false, message: Some("Not found".to_owned()), ..Self::new(rid) }
    }

    /// The CORS preflight answer: 204 with no body.
    pub fn preflight(rid: Uuid) -> Self {
        Self { code: 204, ..Self::new(rid) }
    }

    pub fn from_error(rid: Option<Uuid>, e: &ApiError) -> Self {
        Self {
            rid,
            code: e.status_code().as_u16(),
            errors: e.errors().map(<[FieldError]>::to_vec),
            status: false,
            message: Some(e.message().to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn is_allowed_code(&self) -> bool {
        ALLOWED_CODES.contains(&self.code)
    }

    pub fn format(&self) -> Result<String, serde_json::Error> {
        if self.pretty { serde_json::to_string_pretty(self) } else { serde_json::to_string(self) }
    }

    /// The standard headers, or `None` when the code is not one that may be sent.
    pub fn headers(&self) -> Option<HeaderMap> {
        if !self.is_allowed_code() {
            return None;
        }

        let mut headers = HeaderMap::with_capacity(12);
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Authorization, Content-Type, X-Requested-With"),
        );
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("HEAD, POST, GET, DELETE, PUT"));
        headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0, no-store, no-cache"));
        headers.append(header::CACHE_CONTROL, HeaderValue::from_static("post-check=0, pre-check=0"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("Mon, 26 Jul 1997 05:00:00 GMT"));

        let mut date = faf_http_date::get_date_buff_no_key();
        faf_http_date::get_date_no_key(&mut date);
        if let Ok(value) = HeaderValue::from_bytes(&date) {
            headers.insert(header::LAST_MODIFIED, value);
        }

        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

        if let Some(rid) = self.rid {
            if let Ok(value) = HeaderValue::from_str(&rid.to_string()) {
                headers.insert(HeaderName::from_static("request-id"), value);
            }
        }

        Some(headers)
    }

    /// Serializes the envelope exactly once into an http response.
    pub fn into_http(self) -> Response<ResponseBody> {
        let body = if self.code == 204 {
            ResponseBody::empty()
        } else {
            match self.format() {
                Ok(json) => ResponseBody::from(json),
                Err(e) => {
                    error!(cause = %e, rid = ?self.rid, "failed to serialize response");
                    let mut response = Response::new(ResponseBody::empty());
                    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                    return response;
                }
            }
        };

        let Some(headers) = self.headers() else {
            warn!(code = self.code, rid = ?self.rid, "status code is not allowed, headers not sent");
            return Response::new(body);
        };

        let mut response = Response::new(body);
        *response.headers_mut() = headers;
        *response.status_mut() = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        response
    }
}

impl From<ApiResponse> for Response<ResponseBody> {
    fn from(response: ApiResponse) -> Self {
        response.into_http()
    }
}

impl From<ApiResponse> for ResponseBody {
    fn from(response: ApiResponse) -> Self {
        response.format().map(ResponseBody::from).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use http_body_util::BodyExt;
    use indoc::indoc;

    fn rid() -> Uuid {
        Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap()
    }

    #[test]
    fn envelope_field_order() {
        let response = ApiResponse::ok(rid(), serde_json::json!({"id": 1}));

        assert_eq!(
            response.format().unwrap(),
            r#"{"rid":"67e55044-10b1-426f-9247-bb680e5fe0c8","code":200,"errors":null,"status":true,"message":null,"response":{"id":1}}"#
        );
    }

    #[test]
    fn pretty_output() {
        let response = ApiResponse::not_found(rid()).with_pretty(true);

        assert_eq!(
            response.format().unwrap(),
            indoc! {r#"
            {
              "rid": "67e55044-10b1-426f-9247-bb680e5fe0c8",
              "code": 404,
              "errors": null,
              "status": false,
              "message": "Not found",
              "response": null
            }"#}
        );
    }

    #[test]
    fn error_envelope() {
        let error = ApiError::bad_request("Invalid integer value").field("limit");
        let response = ApiResponse::from_error(Some(rid()), &error);

        assert_eq!(response.code, 400);
        assert!(!response.status);
        assert_eq!(response.message.as_deref(), Some("Invalid integer value: limit"));
        assert_eq!(response.errors, Some(vec![FieldError::new("limit", "Invalid integer value")]));
        assert_eq!(ApiError::new(ErrorKind::ServiceUnavailable, "x").status_code().as_u16(), 503);
    }

    #[test]
    fn standard_headers() {
        let headers = ApiResponse::new(rid()).headers().unwrap();

        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");
        assert_eq!(headers.get_all(header::CACHE_CONTROL).iter().count(), 2);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json; charset=utf-8");
        assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
        assert!(headers.get(header::LAST_MODIFIED).unwrap().to_str().unwrap().ends_with("GMT"));
        assert_eq!(headers.get("request-id").unwrap(), "67e55044-10b1-426f-9247-bb680e5fe0c8");

        assert!(!ApiResponse::default().headers().unwrap().contains_key("request-id"));
    }

    #[test]
    fn unknown_codes_send_no_headers() {
        let response = ApiResponse::new(rid()).with_code(415);

        assert!(response.headers().is_none());

        let response = response.into_http();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());
    }

    #[tokio::test]
    async fn preflight_has_no_body() {
        let response = ApiResponse::preflight(rid()).into_http();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
        assert!(response.into_body().collect().await.unwrap().to_bytes().is_empty());
    }

    #[tokio::test]
    async fn into_http_writes_envelope() {
        let response = ApiResponse::not_found(rid()).into_http();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Not found");
        assert_eq!(json["status"], false);
    }
}
