//! Router, history endpoint and CORS
//!
//! `GET /ws` upgrades to the chat WebSocket; `GET /api/messages` returns the
//! full persisted history as JSON. The history route answers cross-origin
//! requests from any origin, so it carries a permissive CORS layer and
//! replies to preflight with an empty 204.

use axum::extract::{Request, State};
use axum::http::{header::HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use super::ws::ws_upgrade;
use super::AppState;
use crate::store::MessageRecord;

const ALLOW_HEADERS: &str = "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, \
     Authorization, accept, origin, Cache-Control, X-Requested-With";
const ALLOW_METHODS: &str = "POST, GET, OPTIONS, PUT, DELETE";

/// Build the full axum Router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/messages", get(list_messages))
        .route_layer(middleware::from_fn(cors));

    Router::new()
        .route("/ws", get(ws_upgrade))
        .merge(api)
        .with_state(state)
}

/// GET /api/messages: full history in insertion order
///
/// A failed list surfaces as a 500 with no partial body.
async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageRecord>>, StatusCode> {
    match state.store.list_all().await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            tracing::error!(error = %e, "History query failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Permissive CORS for the history route
///
/// Preflight requests get an empty 204; everything else passes through with
/// the allow headers appended.
async fn cors(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(&mut response);
        return response;
    }

    let mut response = next.run(req).await;
    apply_cors_headers(&mut response);
    response
}

fn apply_cors_headers(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-credentials"),
        HeaderValue::from_static("true"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static(ALLOW_METHODS),
    );
}
