use http::StatusCode;
use micro_param::RuleError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// The status-shaped failure classes a request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    UnsupportedMediaType,
    Internal,
    ServiceUnavailable,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// One failing field, as listed in the envelope's `errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// A failure that ends a request. Every `ApiError` becomes a response envelope with `status: false`.
#[derive(Error, Debug)]
#[error("{message} ({})", .kind.status_code().as_u16())]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    errors: Option<Vec<FieldError>>,
    context: Option<BTreeMap<String, String>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

macro_rules! api_error_constructor {
    ($name:ident, $kind:ident) => {
        pub fn $name<S: ToString>(message: S) -> Self {
            Self::new(ErrorKind::$kind, message)
        }
    };
}

impl ApiError {
    pub fn new<S: ToString>(kind: ErrorKind, message: S) -> Self {
        Self { kind, message: message.to_string(), errors: None, context: None, source: None }
    }

    api_error_constructor!(bad_request, BadRequest);
    api_error_constructor!(unauthorized, Unauthorized);
    api_error_constructor!(payment_required, PaymentRequired);
    api_error_constructor!(forbidden, Forbidden);
    api_error_constructor!(not_found, NotFound);
    api_error_constructor!(unsupported_media_type, UnsupportedMediaType);
    api_error_constructor!(internal, Internal);
    api_error_constructor!(service_unavailable, ServiceUnavailable);

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.get_or_insert_with(BTreeMap::new).insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_source<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Names the offending field: the message gets `": field"` appended and the field is listed.
    #[must_use]
    pub fn field(mut self, field: &str) -> Self {
        self.errors.get_or_insert_with(Vec::new).push(FieldError::new(field, self.message.clone()));
        self.message = format!("{}: {field}", self.message);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> Option<&[FieldError]> {
        self.errors.as_deref()
    }

    pub fn context(&self) -> Option<&BTreeMap<String, String>> {
        self.context.as_ref()
    }
}

impl From<RuleError> for ApiError {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::Invalid { .. } => ApiError::bad_request(&e).with_source(e),
            RuleError::UnknownKind { .. } => ApiError::internal(&e).with_source(e),
        }
    }
}

impl From<io::Error> for ApiError {
    fn from(e: io::Error) -> Self {
        ApiError::internal("io failure").with_source(e)
    }
}
