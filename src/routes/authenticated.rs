use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any caller presenting a valid session
/// token. No role is required here; self-scoping (carts, role checks,
/// checkout) is enforced inside the handlers by comparing against the
/// verified claims email.
///
/// Access Control Strategy:
/// This router is wrapped in the `auth_middleware` route layer, so a missing
/// or invalid token is rejected with 401 before any handler runs. Handlers
/// additionally receive the `AuthUser` extractor for the resolved identity.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users/admin/{email} and /users/instructor/{email}
        // Self-only role checks; a token/path mismatch answers false immediately.
        .route("/users/admin/{id}", get(handlers::check_admin))
        .route("/users/instructor/{id}", get(handlers::check_instructor))
        // GET /studentmanageclasses
        // The classes the caller has paid for, resolved from their payment records.
        .route(
            "/studentmanageclasses",
            get(handlers::get_student_manage_classes),
        )
        // GET /carts?email=...
        // The caller's cart entries; the email parameter must match the session.
        .route("/carts", get(handlers::get_carts))
        // POST /create-payment-intent
        // Obtains the opaque client secret from the external payment provider.
        .route(
            "/create-payment-intent",
            post(handlers::create_payment_intent),
        )
        // POST /payments
        // Finalizes the Enrollment Transaction for a completed payment.
        .route("/payments", post(handlers::checkout))
}
