use crate::state::AppState;
use axum::routing::get;
use axum::Router;

pub mod dto;
pub mod handler;
pub mod model;
pub mod planner;
pub mod resolution;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_jobs).post(handler::submit_transcode))
        .route("/{id}", get(handler::get_job))
}
