use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::DocumentStore;

pub fn create_router<S: DocumentStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Rendering entry points
        .route("/render", post(handlers::render::<S>))
        .route(
            "/templates/:shortid",
            get(handlers::render_by_shortid::<S>)
                .patch(handlers::update_template::<S>)
                .delete(handlers::delete_template::<S>),
        )
        // Template and folder management
        .route("/templates", post(handlers::create_template::<S>))
        .route("/folders", post(handlers::create_folder::<S>))
}
