use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Instructor Router Module
///
/// Defines the routes exclusively accessible to users whose *stored* role is
/// 'instructor'. This is the same parametrized Role Guard as the admin
/// module, instantiated with the other role; not an independent mechanism.
pub fn instructor_routes() -> Router<AppState> {
    Router::new()
        // GET /instructormanageclasses
        // The management listing as seen by instructors.
        .route(
            "/instructormanageclasses",
            get(handlers::get_instructor_manage_classes),
        )
        // POST /classes
        // Submits a new class; it enters the review queue as 'pending'.
        .route("/classes", post(handlers::create_class))
}
