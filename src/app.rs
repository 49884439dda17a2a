use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/activities/add", post(handlers::add_form))
        .route("/activities/:id/delete", post(handlers::delete_form))
        .route(
            "/api/activities",
            get(handlers::list_activities)
                .post(handlers::create_activity)
                .delete(handlers::clear_activities),
        )
        .route("/api/activities/:id", delete(handlers::delete_activity))
        .route("/api/commands", post(handlers::dispatch_command))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
