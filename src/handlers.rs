use crate::{
    AppState,
    auth::{self, AuthError, AuthUser, Role},
    enrollment::{self, EnrollmentError},
    models::{
        self, AddCartItemRequest, AdminCheckResponse, CartItem, CheckoutRequest, Class,
        CreateClassRequest, CreateUserRequest, DenyClassRequest, EnrollmentOutcome,
        InstructorCheckResponse, PaymentIntentRequest, PaymentIntentResponse, TokenRequest,
        TokenResponse, User, roles,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// CartFilter
///
/// Accepted query parameters for the cart listing endpoint (GET /carts).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CartFilter {
    /// Owner email whose cart entries are requested.
    pub email: Option<String>,
}

// --- Token Service ---

/// issue_jwt
///
/// [Public Route] Issues a signed, 1-hour session token for the identity in
/// the request body. Stateless: no user record is consulted or created here.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses((status = 200, description = "Signed session token", body = TokenResponse))
)]
pub async fn issue_jwt(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, StatusCode> {
    match auth::issue_token(&payload.email, &state.config.jwt_secret) {
        Ok(token) => Ok(Json(TokenResponse { token })),
        Err(e) => {
            tracing::error!("token signing error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// --- Users ---

/// get_users
///
/// [Admin Route] Lists every user record in the system.
///
/// *Authorization*: the Role Guard re-reads the caller's stored role before
/// the listing is released.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_users(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<models::User>>, AuthError> {
    auth::authorize(&state.repo, &user, Role::Admin).await?;
    Ok(Json(state.repo.list_users().await))
}

/// create_user
///
/// [Public Route] Signup endpoint. Idempotent on email: a duplicate signup
/// leaves the existing record untouched and returns an already-exists signal
/// instead of an error.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 200, description = "Email already registered")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Response {
    if state
        .repo
        .find_user_by_email(&payload.email)
        .await
        .is_some()
    {
        return Json(serde_json::json!({ "message": "user already exists" })).into_response();
    }
    match state.repo.create_user(&payload.name, &payload.email).await {
        Some(user) => (StatusCode::CREATED, Json(user)).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// delete_user
///
/// [Admin Route] Removes a user record outright. The only path by which a
/// user is ever deleted.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AuthError> {
    auth::authorize(&state.repo, &user, Role::Admin).await?;
    if state.repo.delete_user(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// check_admin
///
/// [Authenticated Route] Reports whether the given email currently holds the
/// admin role. A caller may only ask about their own email: on a token/path
/// mismatch the handler answers `{"admin": false}` and returns immediately,
/// never looking the other identity up.
#[utoipa::path(
    get,
    path = "/users/admin/{id}",
    params(("id" = String, Path, description = "Email to check (must match the session)")),
    responses((status = 200, description = "Admin status", body = AdminCheckResponse))
)]
pub async fn check_admin(
    user: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<AdminCheckResponse> {
    if user.email != email {
        return Json(AdminCheckResponse { admin: false });
    }
    let admin = matches!(
        state.repo.find_user_by_email(&email).await,
        Some(record) if record.role == roles::ADMIN
    );
    Json(AdminCheckResponse { admin })
}

/// promote_admin
///
/// [Public Route] Promotes a user to the admin role.
#[utoipa::path(
    patch,
    path = "/users/admin/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Promoted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn promote_admin(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.set_user_role(id, roles::ADMIN).await {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

/// check_instructor
///
/// [Authenticated Route] Mirror of `check_admin` for the instructor role,
/// with the same self-only early-return semantics.
#[utoipa::path(
    get,
    path = "/users/instructor/{id}",
    params(("id" = String, Path, description = "Email to check (must match the session)")),
    responses((status = 200, description = "Instructor status", body = InstructorCheckResponse))
)]
pub async fn check_instructor(
    user: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<InstructorCheckResponse> {
    if user.email != email {
        return Json(InstructorCheckResponse { instructor: false });
    }
    let instructor = matches!(
        state.repo.find_user_by_email(&email).await,
        Some(record) if record.role == roles::INSTRUCTOR
    );
    Json(InstructorCheckResponse { instructor })
}

/// promote_instructor
///
/// [Public Route] Promotes a user to the instructor role.
#[utoipa::path(
    patch,
    path = "/users/instructor/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Promoted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn promote_instructor(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.set_user_role(id, roles::INSTRUCTOR).await {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

// --- Classes ---

/// get_classes
///
/// [Public Route] The course catalogue: approved classes only, most expensive
/// first. Pending and denied classes never leak to anonymous users.
#[utoipa::path(
    get,
    path = "/classes",
    responses((status = 200, description = "Approved classes by price desc", body = [Class]))
)]
pub async fn get_classes(State(state): State<AppState>) -> Json<Vec<models::Class>> {
    Json(state.repo.list_approved_classes().await)
}

/// get_popular_classes
///
/// [Public Route] The top 6 approved classes ranked by enrolled seats.
#[utoipa::path(
    get,
    path = "/popularclasses",
    responses((status = 200, description = "Top classes", body = [Class]))
)]
pub async fn get_popular_classes(State(state): State<AppState>) -> Json<Vec<models::Class>> {
    Json(state.repo.list_popular_classes(6).await)
}

/// get_manage_classes
///
/// [Admin Route] Every class regardless of status, for the review queue.
#[utoipa::path(
    get,
    path = "/manageclasses",
    responses(
        (status = 200, description = "All classes", body = [Class]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_manage_classes(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<models::Class>>, AuthError> {
    auth::authorize(&state.repo, &user, Role::Admin).await?;
    Ok(Json(state.repo.list_all_classes().await))
}

/// approve_class
///
/// [Public Route] Moves a pending class to 'approved'. The transition is
/// one-way: a class that was already decided affects 0 rows and reports 404.
#[utoipa::path(
    patch,
    path = "/class/approve/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Approved"),
        (status = 404, description = "Not Found or already decided")
    )
)]
pub async fn approve_class(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state
        .repo
        .set_class_status(id, models::class_status::APPROVED, None)
        .await
    {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

/// deny_class
///
/// [Public Route] Moves a pending class to 'denied', recording the feedback
/// text the instructor will see.
#[utoipa::path(
    patch,
    path = "/class/deny/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = DenyClassRequest,
    responses(
        (status = 200, description = "Denied"),
        (status = 404, description = "Not Found or already decided")
    )
)]
pub async fn deny_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DenyClassRequest>,
) -> StatusCode {
    if state
        .repo
        .set_class_status(id, models::class_status::DENIED, Some(payload.feedback))
        .await
    {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_instructor_manage_classes
///
/// [Instructor Route] The management listing as seen by instructors.
#[utoipa::path(
    get,
    path = "/instructormanageclasses",
    responses(
        (status = 200, description = "All classes", body = [Class]),
        (status = 403, description = "Not an instructor")
    )
)]
pub async fn get_instructor_manage_classes(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<models::Class>>, AuthError> {
    auth::authorize(&state.repo, &user, Role::Instructor).await?;
    Ok(Json(state.repo.list_all_classes().await))
}

/// get_student_manage_classes
///
/// [Authenticated Route] The classes the caller has actually paid for,
/// resolved by walking their payment records' class references.
#[utoipa::path(
    get,
    path = "/studentmanageclasses",
    responses((status = 200, description = "Enrolled classes", body = [Class]))
)]
pub async fn get_student_manage_classes(
    user: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<models::Class>> {
    let payments = state.repo.payments_by_email(&user.email).await;
    let mut class_ids: Vec<Uuid> = Vec::new();
    for payment in &payments {
        for id in &payment.class_item_ids {
            if !class_ids.contains(id) {
                class_ids.push(*id);
            }
        }
    }
    if class_ids.is_empty() {
        return Json(vec![]);
    }
    Json(state.repo.get_classes_by_ids(&class_ids).await)
}

/// create_class
///
/// [Instructor Route] Submits a new class. The instructor identity is taken
/// from the session record, never from the body, and the class starts in
/// 'pending' status awaiting admin review.
#[utoipa::path(
    post,
    path = "/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Created", body = Class),
        (status = 403, description = "Not an instructor")
    )
)]
pub async fn create_class(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<Response, AuthError> {
    auth::authorize(&state.repo, &user, Role::Instructor).await?;
    // The guard just confirmed this record exists with the instructor role.
    let record = state
        .repo
        .find_user_by_email(&user.email)
        .await
        .ok_or(AuthError::Forbidden)?;
    match state
        .repo
        .create_class(payload, &record.name, &record.email)
        .await
    {
        Some(class) => Ok((StatusCode::CREATED, Json(class)).into_response()),
        None => Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response()),
    }
}

// --- Instructors ---

/// get_instructors
///
/// [Public Route] Every user currently holding the instructor role.
#[utoipa::path(
    get,
    path = "/instructors",
    responses((status = 200, description = "Instructors", body = [User]))
)]
pub async fn get_instructors(State(state): State<AppState>) -> Json<Vec<models::User>> {
    Json(state.repo.list_instructors(None).await)
}

/// get_popular_instructors
///
/// [Public Route] The first 6 instructor users for the landing page strip.
#[utoipa::path(
    get,
    path = "/popularinstructors",
    responses((status = 200, description = "Instructors", body = [User]))
)]
pub async fn get_popular_instructors(State(state): State<AppState>) -> Json<Vec<models::User>> {
    Json(state.repo.list_instructors(Some(6)).await)
}

// --- Carts ---

/// get_carts
///
/// [Authenticated Route] Lists the caller's cart entries. The email query
/// parameter must match the verified session identity; asking for someone
/// else's cart is a 403. A missing email yields an empty list.
#[utoipa::path(
    get,
    path = "/carts",
    params(CartFilter),
    responses(
        (status = 200, description = "Cart items", body = [CartItem]),
        (status = 403, description = "Email does not match the session")
    )
)]
pub async fn get_carts(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<CartFilter>,
) -> Result<Json<Vec<models::CartItem>>, AuthError> {
    let Some(email) = filter.email else {
        return Ok(Json(vec![]));
    };
    if email != user.email {
        return Err(AuthError::Forbidden);
    }
    Ok(Json(state.repo.carts_by_email(&email).await))
}

/// add_cart_item
///
/// [Public Route] Adds a class selection to a cart. The class reference must
/// resolve to an existing class at creation time.
#[utoipa::path(
    post,
    path = "/carts",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Added", body = CartItem),
        (status = 404, description = "Referenced class does not exist")
    )
)]
pub async fn add_cart_item(
    State(state): State<AppState>,
    Json(payload): Json<AddCartItemRequest>,
) -> Response {
    // Referential integrity at creation time: never cart a phantom class.
    if state.repo.get_class(payload.class_item_id).await.is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    match state
        .repo
        .add_cart_item(&payload.email, payload.class_item_id)
        .await
    {
        Some(item) => (StatusCode::CREATED, Json(item)).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// delete_cart_item
///
/// [Public Route] Removes a single cart entry by its globally unique id.
#[utoipa::path(
    delete,
    path = "/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_cart_item(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.delete_cart_item(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// --- Payments ---

/// create_payment_intent
///
/// [Authenticated Route] Asks the external payment provider to open an intent
/// for the given price and relays the opaque client secret to the frontend.
/// The provider is a black box; no state is written here.
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = PaymentIntentRequest,
    responses((status = 200, description = "Client secret", body = PaymentIntentResponse))
)]
pub async fn create_payment_intent(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, StatusCode> {
    let amount_cents = (payload.price * 100.0).round() as i64;
    match state.payments.create_intent(amount_cents).await {
        Ok(client_secret) => Ok(Json(PaymentIntentResponse { client_secret })),
        Err(e) => {
            tracing::error!("payment intent error: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// checkout
///
/// [Authenticated Route] Finalizes the Enrollment Transaction for a completed
/// payment: records the payment, clears the referenced cart items, and
/// adjusts seat counters once per distinct class. A body email that disagrees
/// with the verified session is rejected outright.
///
/// Partial failure after the payment is recorded comes back as a distinct
/// `partial_apply` error with per-step counts, never as success.
#[utoipa::path(
    post,
    path = "/payments",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Enrollment applied", body = EnrollmentOutcome),
        (status = 400, description = "Empty or unresolvable reference lists"),
        (status = 403, description = "Email does not match the session"),
        (status = 500, description = "Payment not recorded, or partially applied")
    )
)]
pub async fn checkout(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Response {
    if payload.email != user.email {
        return AuthError::Forbidden.into_response();
    }

    match enrollment::finalize(&state.repo, &payload).await {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e @ (EnrollmentError::EmptyReferences | EnrollmentError::UnknownClassReference)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "invalid_checkout", "message": e.to_string() })),
        )
            .into_response(),
        Err(e @ EnrollmentError::PaymentNotRecorded) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "payment_not_recorded", "message": e.to_string() })),
        )
            .into_response(),
        Err(EnrollmentError::PartialApply {
            payment_id,
            carts_expected,
            carts_removed,
            classes_expected,
            classes_updated,
        }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "partial_apply",
                "message": "payment recorded but enrollment cleanup fell short; retry the remainder",
                "payment_id": payment_id,
                "carts_removed": carts_removed,
                "carts_expected": carts_expected,
                "classes_updated": classes_updated,
                "classes_expected": classes_expected,
            })),
        )
            .into_response(),
    }
}
