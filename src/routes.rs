use crate::docs::ApiDoc;
use crate::state::AppState;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower_http::cors::{Any, CorsLayer};

pub fn configure_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(root))
        .nest("/api/v1", api_routes())
        .nest("/api/v1/transcode", crate::modules::transcode::router())
        .layer(cors)
}

async fn root() -> Json<Value> {
    Json(json!({ "Hello": "Welcome to Video Transcoding" }))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(crate::modules::media::router())
}
