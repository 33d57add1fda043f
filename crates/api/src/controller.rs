//! Declarative controllers.
//!
//! A [`Controller`] declares its parameters once per request through [`Controller::define`]. Before
//! its logic runs, every declared parameter is resolved against the request (or its default),
//! validated, and written back to the request in normalized form. Business logic then reads the
//! values through [`Args`], which only answers declared names.

use crate::event::{ControllerEvent, EventListener, Listeners};
use crate::{ApiError, ApiResponse, FieldError, Request, RequestHandler};
use async_trait::async_trait;
use micro_param::{ObjectId, Parameter, Source, UploadedFile, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait Controller: Send + Sync {
    /// The parameters this controller expects, by name.
    fn define(&self) -> ParamSet;

    async fn exec(&self, request: &Request, args: &Args) -> Result<Reply, ApiError>;
}

/// Declared parameters, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    params: Vec<(String, Parameter)>,
    duplicates: Vec<String>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name`. A name declared twice makes loading fail.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        let name = name.into();
        if self.params.iter().any(|(declared, _)| *declared == name) {
            self.duplicates.push(name);
        } else {
            self.params.push((name, parameter));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Resolves, validates and writes back every declared parameter.
    ///
    /// All parameters are processed before failing; the error names the first failing field and
    /// lists every one.
    pub fn load(self, request: &mut Request) -> Result<Args, ApiError> {
        if let Some(name) = self.duplicates.first() {
            return Err(ApiError::internal(format!("Parameter declared twice: {name}")).field(name));
        }

        let mut values = BTreeMap::new();
        let mut errors = Vec::new();

        for (name, mut parameter) in self.params {
            let (value, source) = match request.param_entry(&name) {
                Some(param) => (param.value.clone(), param.source),
                None if !parameter.default().is_null() => (parameter.default().clone(), Source::Default),
                None => (Value::Null, parameter.source()),
            };

            parameter.set(value, source);
            match parameter.validate() {
                Ok(parameter) => request.set_param(name.as_str(), parameter.value().clone(), parameter.source()),
                Err(e) => {
                    debug!(param = %name, cause = %e, "parameter failed validation");
                    errors.push(FieldError::new(name.as_str(), e.to_string()));
                }
            }
            values.insert(name, parameter);
        }

        match errors.first() {
            Some(first) => {
                let message = format!("{}: {}", first.message, first.field);
                Err(ApiError::bad_request(message).with_errors(errors))
            }
            None => Ok(Args { values }),
        }
    }
}

/// The validated values of a controller's declared parameters.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: BTreeMap<String, Parameter>,
}

macro_rules! typed_arg {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $accessor:expr) => {
        $(#[$doc])*
        pub fn $name(&self, name: &str) -> Result<Option<$ty>, ApiError> {
            self.get(name).map($accessor)
        }
    };
}

impl Args {
    /// The value of a declared parameter; `Null` when it was optional and absent.
    pub fn get(&self, name: &str) -> Result<&Value, ApiError> {
        self.parameter(name).map(Parameter::value)
    }

    pub fn parameter(&self, name: &str) -> Result<&Parameter, ApiError> {
        self.values.get(name).ok_or_else(|| ApiError::internal(format!("Undeclared parameter: {name}")).field(name))
    }

    /// The external representation of a declared parameter.
    pub fn export(&self, name: &str) -> Result<Value, ApiError> {
        self.parameter(name).map(Parameter::export)
    }

    typed_arg!(bool, bool, Value::as_bool);
    typed_arg!(i64, i64, Value::as_i64);
    typed_arg!(
        /// Floats, with integers widened.
        f64,
        f64,
        Value::as_f64
    );
    typed_arg!(str, &str, Value::as_str);
    typed_arg!(file, &UploadedFile, Value::as_file);
    typed_arg!(object_id, ObjectId, Value::as_object_id);

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What controller logic returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// passed through as is
    Response(ApiResponse),
    /// becomes the envelope's `status` and payload
    Status(bool),
    /// a successful payload
    Payload(serde_json::Value),
}

impl Reply {
    fn into_response(self, request: &Request) -> ApiResponse {
        match self {
            Reply::Response(response) => response,
            Reply::Status(status) => ApiResponse { status, ..ApiResponse::ok(request.rid(), status) },
            Reply::Payload(payload) => ApiResponse::ok(request.rid(), payload),
        }
    }
}

impl From<ApiResponse> for Reply {
    fn from(response: ApiResponse) -> Self {
        Reply::Response(response)
    }
}

impl From<bool> for Reply {
    fn from(status: bool) -> Self {
        Reply::Status(status)
    }
}

impl From<serde_json::Value> for Reply {
    fn from(payload: serde_json::Value) -> Self {
        Reply::Payload(payload)
    }
}

/// Runs a [`Controller`] as a route handler: load, then exec, emitting lifecycle events.
#[derive(Debug)]
pub struct ControllerHandler<C> {
    controller: C,
    listeners: Listeners,
}

pub fn controller<C: Controller>(controller: C) -> ControllerHandler<C> {
    ControllerHandler { controller, listeners: Listeners::new() }
}

impl<C> ControllerHandler<C> {
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.add_last(listener);
        self
    }
}

#[async_trait]
impl<C: Controller> RequestHandler for ControllerHandler<C> {
    async fn invoke(&self, mut request: Request) -> Result<ApiResponse, ApiError> {
        self.listeners.on_controller(ControllerEvent::Start, &mut request);

        self.listeners.on_controller(ControllerEvent::BeforeLoad, &mut request);
        let args = self.controller.define().load(&mut request)?;
        self.listeners.on_controller(ControllerEvent::AfterLoad, &mut request);

        self.listeners.on_controller(ControllerEvent::BeforeExec, &mut request);
        let reply = self.controller.exec(&request, &args).await?;
        let response = reply.into_response(&request);
        self.listeners.on_controller(ControllerEvent::AfterExec, &mut request);

        Ok(response)
    }
}
