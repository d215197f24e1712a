pub mod auth;
pub mod extract;
pub mod middleware;
pub mod properties;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Listing routes; static segments win over `{id}`
        .route(
            "/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/properties/upload",
            post(properties::upload_image)
                .layer(DefaultBodyLimit::max(properties::MAX_UPLOAD_BYTES)),
        )
        .route("/properties/my", get(properties::list_my_properties))
        .route(
            "/properties/{id}",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .with_state(state)
}
