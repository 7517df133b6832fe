use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the browsing surface of the catalogue, signup,
/// token issuance, cart mutation, and the role-promotion and class-moderation
/// PATCHes, which carry no token requirement.
///
/// Security Mandate:
/// Catalogue handlers in this module must enforce `class_status = 'approved'`
/// at the Repository level, so pending or denied classes are never visible to
/// anonymous users.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Root banner so a bare hit on the host confirms the API is up.
        .route("/", get(|| async { "Summer Camp API is running" }))
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /jwt
        // Issues a signed, 1-hour session token for the email in the body.
        .route("/jwt", post(handlers::issue_jwt))
        // POST /users
        // Signup, idempotent on email: duplicates return an already-exists signal.
        .route("/users", post(handlers::create_user))
        // PATCH /users/admin/{id} and /users/instructor/{id}
        // Role promotion endpoints. Role is only ever mutated here.
        .route("/users/admin/{id}", patch(handlers::promote_admin))
        .route("/users/instructor/{id}", patch(handlers::promote_instructor))
        // GET /classes
        // The approved catalogue, sorted by price descending.
        .route("/classes", get(handlers::get_classes))
        // GET /popularclasses
        // Top 6 approved classes by enrolled seats.
        .route("/popularclasses", get(handlers::get_popular_classes))
        // PATCH /class/approve/{id} and /class/deny/{id}
        // One-way status transitions out of 'pending'; denial carries feedback.
        .route("/class/approve/{id}", patch(handlers::approve_class))
        .route("/class/deny/{id}", patch(handlers::deny_class))
        // GET /instructors and /popularinstructors
        // Users holding the instructor role; the popular view caps at 6.
        .route("/instructors", get(handlers::get_instructors))
        .route("/popularinstructors", get(handlers::get_popular_instructors))
        // POST /carts and DELETE /carts/{id}
        // Cart mutation. Additions verify the class reference exists.
        .route("/carts", post(handlers::add_cart_item))
        .route("/carts/{id}", delete(handlers::delete_cart_item))
}
