use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use micro_api::event::EventListener;
use micro_api::param::{Parameter, RuleKind, Source};
use micro_api::router::{get, post};
use micro_api::{
    ApiError, ApiResponse, Args, Controller, NotFoundHandler, ParamSet, Reply, Request, Router, controller, handler_fn,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

async fn hello(request: Request) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::ok(request.rid(), "hello world"))
}

struct ListUsers;

#[async_trait]
impl Controller for ListUsers {
    fn define(&self) -> ParamSet {
        ParamSet::new()
            .param("limit", Parameter::new(RuleKind::Int).with_default(20))
            .param("active", Parameter::new(RuleKind::Bool).with_default(true))
            .param("user", Parameter::new(RuleKind::Fid))
    }

    async fn exec(&self, _request: &Request, args: &Args) -> Result<Reply, ApiError> {
        Ok(Reply::from(json!({
            "limit": args.i64("limit")?,
            "active": args.bool("active")?,
            "user": args.str("user")?,
        })))
    }
}

struct CreateUser;

#[async_trait]
impl Controller for CreateUser {
    fn define(&self) -> ParamSet {
        ParamSet::new()
            .param("email", Parameter::new(RuleKind::Email).required())
            .param("tags", Parameter::new(RuleKind::StringList))
    }

    async fn exec(&self, _request: &Request, args: &Args) -> Result<Reply, ApiError> {
        Ok(Reply::from(serde_json::Value::from(args.export("tags")?)))
    }
}

/// Binds the caller from an api key header.
struct ApiKey;

impl EventListener for ApiKey {
    fn before_run(&self, request: &mut Request) {
        if let Some(key) = request.header("X-Api-Key").map(str::to_owned) {
            request.set_param("user", key, Source::Event);
        }
    }
}

async fn call(router: &Router, request: http::Request<Full<Bytes>>) {
    let line = format!("{} {}", request.method(), request.uri());
    let response = router.handle_http(request).await;
    let status = response.status();
    let body = response.into_body().collect().await.map(|c| c.to_bytes()).unwrap_or_default();
    info!("{line} -> {status} {}", String::from_utf8_lossy(&body));
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::builder()
        .route("/", get(handler_fn(hello)))
        .route("/users", get(controller(ListUsers)))
        .route("/users", post(controller(CreateUser)))
        .not_found(NotFoundHandler)
        .listener(Arc::new(ApiKey))
        .build();

    let requests = [
        http::Request::get("/").body(Full::default()),
        http::Request::get("/users?limit=5&pretty=1").header("X-Api-Key", "alice").body(Full::default()),
        http::Request::post("/users")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from_static(br#"{"email": "bob@example.com", "tags": "a, b"}"#))),
        http::Request::post("/users").body(Full::default()),
        http::Request::options("/users").body(Full::default()),
        http::Request::get("/missing").body(Full::default()),
    ];

    for request in requests {
        call(&router, request.expect("valid request")).await;
    }
}
