//! Request dispatch core.
//!
//! An inbound request is snapshotted ([`TransportSnapshot`]), turned into a [`Request`] whose
//! parameters are aggregated from query, form, json and files, resolved by the segment tree
//! [`Router`] to a [`RequestHandler`], and answered with an [`ApiResponse`] envelope. Controllers
//! ([`Controller`]) declare typed parameters that are validated before their logic runs.
//!
//! ```no_run
//! use micro_api::router::get;
//! use micro_api::{ApiError, ApiResponse, Request, Router, handler_fn};
//!
//! async fn user(request: Request) -> Result<ApiResponse, ApiError> {
//!     let id = request.param("id").cloned().unwrap_or_default();
//!     Ok(ApiResponse::ok(request.rid(), serde_json::Value::from(id)))
//! }
//!
//! # async fn run() {
//! let router = Router::builder().route("/users/:id", get(handler_fn(user))).build();
//! let request = http::Request::get("/users/42").body(String::new()).unwrap();
//! let response = router.handle_http(request).await;
//! assert_eq!(response.status(), 200);
//! # }
//! ```

mod body;
mod controller;
mod error;
mod handler;
mod incoming;
mod options;
mod response;
mod transport;

pub mod event;
pub mod request;
pub mod router;

pub use body::ResponseBody;
pub use controller::{Args, Controller, ControllerHandler, ParamSet, Reply, controller};
pub use error::{ApiError, ErrorKind, FieldError};
pub use handler::{FnHandler, NotFoundHandler, PreflightHandler, RequestHandler, handler_fn};
pub use incoming::{Incoming, Payload};
pub use options::DispatchOptions;
pub use request::{ContentType, Param, Request};
pub use response::{ALLOWED_CODES, ApiResponse};
pub use router::Router;
pub use transport::TransportSnapshot;

pub use micro_param as param;
