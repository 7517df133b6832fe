use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Domain Constants ---

/// Role strings stored on the `users.role` column. The default tier for a
/// fresh signup is `STUDENT`; promotion endpoints move a user to `ADMIN` or
/// `INSTRUCTOR`. The Role Guard in `auth` compares against these values.
pub mod roles {
    pub const STUDENT: &str = "student";
    pub const ADMIN: &str = "admin";
    pub const INSTRUCTOR: &str = "instructor";
}

/// Lifecycle states stored on the `classes.class_status` column.
/// Transitions are one-way: `pending` -> `approved` | `denied`.
pub mod class_status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const DENIED: &str = "denied";
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Represents the user's canonical identity record stored in the `users` table.
/// This structure includes the minimal required data resolved during authentication
/// and role lookup.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // The user's primary identifier; unique across the collection.
    pub email: String,
    // The RBAC field: 'student', 'admin' or 'instructor'.
    pub role: String,
}

/// Class
///
/// Represents a summer-camp class record from the `classes` table.
/// Seat counters are only ever mutated by the Enrollment Transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    // URL of the class cover image shown in the catalogue.
    pub image: String,
    // Denormalized creator identity, captured from the instructor's session at creation.
    pub instructor_name: String,
    pub instructor_email: String,
    pub price: f64,
    pub available_seats: i32,
    pub enrolled_seats: i32,
    // Lifecycle field: 'pending', 'approved' or 'denied'.
    pub class_status: String,
    // Admin feedback text, populated only when the class is denied.
    pub feedback: Option<String>,
}

/// CartItem
///
/// A user's pending, unpurchased class selection from the `carts` table.
/// `class_item_id` is a reference to a `Class`, not ownership of it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CartItem {
    pub id: Uuid,
    // Owner of the cart entry.
    pub email: String,
    pub class_item_id: Uuid,
}

/// Payment
///
/// Append-only record of a completed checkout from the `payments` table.
/// Created exactly once per checkout by the Enrollment Transaction and
/// immutable thereafter. The reference lists are stored as `UUID[]` columns.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Payment {
    pub id: Uuid,
    pub email: String,
    // Identifier returned by the external payment provider.
    pub transaction_id: String,
    pub cart_item_ids: Vec<Uuid>,
    pub class_item_ids: Vec<Uuid>,
    pub price: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// TokenRequest
///
/// Input payload for the token issuing endpoint (POST /jwt). The email becomes
/// the `sub` claim of the signed session token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenRequest {
    pub email: String,
}

/// TokenResponse
///
/// Output schema carrying the signed, 1-hour session token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// CreateUserRequest
///
/// Input payload for signup (POST /users). Role is never accepted from the
/// client; every new user starts as 'student'.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

/// CreateClassRequest
///
/// Input payload for an instructor submitting a new class (POST /classes).
/// The instructor identity is taken from the authenticated session, and the
/// class always starts in 'pending' status awaiting admin review.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateClassRequest {
    pub name: String,
    pub image: String,
    pub price: f64,
    pub available_seats: i32,
}

/// DenyClassRequest
///
/// Input payload for denying a pending class (PATCH /class/deny/{id}),
/// carrying the mandatory feedback text shown to the instructor.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DenyClassRequest {
    pub feedback: String,
}

/// AddCartItemRequest
///
/// Input payload for adding a class to a cart (POST /carts).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AddCartItemRequest {
    pub email: String,
    pub class_item_id: Uuid,
}

/// PaymentIntentRequest
///
/// Input payload for POST /create-payment-intent. The price is in the same
/// currency unit as `Class.price`; the handler converts it to cents for the
/// payment provider.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

/// PaymentIntentResponse
///
/// Output schema carrying the opaque client secret the frontend hands to the
/// payment provider's JS SDK to confirm the payment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// CheckoutRequest
///
/// Input payload for POST /payments: the completed payment to be realized by
/// the Enrollment Transaction. The email must match the verified session;
/// both reference lists must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CheckoutRequest {
    pub email: String,
    pub transaction_id: String,
    pub cart_item_ids: Vec<Uuid>,
    pub class_item_ids: Vec<Uuid>,
    pub price: f64,
}

// --- Response Schemas ---

/// AdminCheckResponse
///
/// Output of GET /users/admin/{email}: whether that email currently holds the
/// admin role. Also returned (as `false`) when the token identity does not
/// match the requested email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminCheckResponse {
    pub admin: bool,
}

/// InstructorCheckResponse
///
/// Output of GET /users/instructor/{email}; mirror of `AdminCheckResponse`
/// for the instructor role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct InstructorCheckResponse {
    pub instructor: bool,
}

/// EnrollmentOutcome
///
/// Summary of the three Enrollment Transaction sub-operations, returned on a
/// fully applied checkout: the recorded payment, the number of cart entries
/// removed, and the number of classes whose seat counters were adjusted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EnrollmentOutcome {
    pub payment: Payment,
    pub carts_removed: u64,
    pub classes_updated: u64,
}
