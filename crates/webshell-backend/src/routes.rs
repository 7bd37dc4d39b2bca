use std::collections::BTreeMap;
use std::path::Path;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// JSON envelope returned by every API route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiResponse {
    fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: Some(message.into()),
            data,
        }
    }
}

/// The embedded server's router.
///
/// `/api/*` routes answer JSON; anything else is looked up under
/// `static_dir`, with `index.html` served for directories.
pub fn build_router(static_dir: &Path) -> Router {
    let assets = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .route("/api/ping", get(ping).post(ping))
        .route("/api/form", post(form))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
}

/// `GET|POST /api/ping`
async fn ping() -> Json<ApiResponse> {
    debug!("Ping request received");
    Json(ApiResponse::ok("Ping request received", None))
}

/// `POST /api/form`: echo the submitted fields.
async fn form(Form(fields): Form<BTreeMap<String, String>>) -> Json<ApiResponse> {
    info!(fields = fields.len(), "Form submitted");
    let message = match fields.len() {
        0 => "No fields received".to_string(),
        1 => "Received 1 field".to_string(),
        n => format!("Received {n} fields"),
    };
    Json(ApiResponse::ok(message, Some(json!({ "formFields": fields }))))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
