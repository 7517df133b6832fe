use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get},
};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users whose *stored* role is
/// 'admin': user management and the full class review queue.
///
/// Access Control:
/// Every handler here calls the Role Guard (`auth::authorize`) before doing
/// any work. The guard re-reads the user's current role from the store on
/// each request, so a stale token loses admin access the moment the role is
/// revoked.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /users
        // Lists every user record for the admin dashboard.
        .route("/users", get(handlers::get_users))
        // DELETE /users/{id}
        // Removes a user outright. The only deletion path for user records.
        .route("/users/{id}", delete(handlers::delete_user))
        // GET /manageclasses
        // All classes regardless of status, for the approve/deny queue.
        .route("/manageclasses", get(handlers::get_manage_classes))
}
