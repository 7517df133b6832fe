use crate::models::{CartItem, CheckoutRequest, Class, CreateClassRequest, Payment, User, class_status, roles};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations over the four
/// record collections (users, classes, carts, payments). This is the core of
/// the Repository Abstraction pattern: handlers and the Enrollment Transaction
/// interact with the data layer without knowing the concrete implementation
/// (Postgres, in-memory mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// Lookup by the unique email; the Role Guard calls this on every protected request.
    async fn find_user_by_email(&self, email: &str) -> Option<User>;
    async fn list_users(&self) -> Vec<User>;
    /// Inserts a new user with the default 'student' role. The caller is
    /// responsible for the duplicate-email check (idempotent signup).
    async fn create_user(&self, name: &str, email: &str) -> Option<User>;
    // Admin action: removes a user record outright.
    async fn delete_user(&self, id: Uuid) -> bool;
    // Promotion endpoints: returns true if a row was actually updated.
    async fn set_user_role(&self, id: Uuid, role: &str) -> bool;
    /// Users holding the instructor role, optionally capped (popular-instructors view).
    async fn list_instructors(&self, limit: Option<i64>) -> Vec<User>;

    // --- Classes ---
    /// Public catalogue: approved classes only, sorted by price descending.
    async fn list_approved_classes(&self) -> Vec<Class>;
    /// Approved classes ranked by enrolled seats descending, capped at `limit`.
    async fn list_popular_classes(&self, limit: i64) -> Vec<Class>;
    /// Management view: every class regardless of status.
    async fn list_all_classes(&self) -> Vec<Class>;
    async fn get_class(&self, id: Uuid) -> Option<Class>;
    /// Bulk fetch used to resolve a payment's class references.
    async fn get_classes_by_ids(&self, ids: &[Uuid]) -> Vec<Class>;
    /// Inserts a new class in 'pending' status with zero enrolled seats.
    async fn create_class(
        &self,
        req: CreateClassRequest,
        instructor_name: &str,
        instructor_email: &str,
    ) -> Option<Class>;
    /// One-way status transition: only fires while the class is still 'pending'.
    async fn set_class_status(&self, id: Uuid, status: &str, feedback: Option<String>) -> bool;
    /// Conditional atomic seat adjustment: +1 enrolled / -1 available, applied
    /// only while `available_seats > 0`. Returns false when the class is absent,
    /// already full, or the store errored. Only the Enrollment Transaction may
    /// call this.
    async fn adjust_class_seats(&self, id: Uuid) -> bool;

    // --- Carts ---
    async fn carts_by_email(&self, email: &str) -> Vec<CartItem>;
    async fn add_cart_item(&self, email: &str, class_item_id: Uuid) -> Option<CartItem>;
    async fn delete_cart_item(&self, id: Uuid) -> bool;
    /// Bulk deletion by id list; id match is sufficient scoping since ids are
    /// globally unique. Returns the number of rows removed.
    async fn delete_cart_items(&self, ids: &[Uuid]) -> u64;

    // --- Payments ---
    /// Appends the payment record. `None` signals the insert did not happen,
    /// which the Enrollment Transaction treats as a full abort.
    async fn insert_payment(&self, req: &CheckoutRequest) -> Option<Payment>;
    async fn payments_by_email(&self, email: &str) -> Vec<Payment>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
/// All queries use the runtime `sqlx` API so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, name, email, role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("find_user_by_email error: {:?}", e);
                None
            })
    }

    async fn list_users(&self) -> Vec<User> {
        sqlx::query_as::<_, User>("SELECT id, name, email, role FROM users ORDER BY email ASC")
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_users error: {:?}", e);
                vec![]
            })
    }

    /// create_user
    ///
    /// Inserts a fresh signup. Every new user starts as 'student'; role changes
    /// go through the explicit promotion endpoints only.
    async fn create_user(&self, name: &str, email: &str) -> Option<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, role) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, role",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(roles::STUDENT)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_user error: {:?}", e);
            None
        })
    }

    async fn delete_user(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_user error: {:?}", e);
                false
            }
        }
    }

    async fn set_user_role(&self, id: Uuid, role: &str) -> bool {
        match sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("set_user_role error: {:?}", e);
                false
            }
        }
    }

    async fn list_instructors(&self, limit: Option<i64>) -> Vec<User> {
        // LIMIT NULL is a no-op in Postgres, so one query covers both views.
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, role FROM users WHERE role = $1 ORDER BY name ASC LIMIT $2",
        )
        .bind(roles::INSTRUCTOR)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_instructors error: {:?}", e);
            vec![]
        })
    }

    // --- CLASSES ---

    /// list_approved_classes
    ///
    /// The public catalogue view. Strictly enforces `class_status = 'approved'`
    /// so pending/denied classes never leak to anonymous users.
    async fn list_approved_classes(&self) -> Vec<Class> {
        sqlx::query_as::<_, Class>(
            "SELECT id, name, image, instructor_name, instructor_email, price, \
                    available_seats, enrolled_seats, class_status, feedback \
             FROM classes WHERE class_status = $1 ORDER BY price DESC",
        )
        .bind(class_status::APPROVED)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_approved_classes error: {:?}", e);
            vec![]
        })
    }

    async fn list_popular_classes(&self, limit: i64) -> Vec<Class> {
        sqlx::query_as::<_, Class>(
            "SELECT id, name, image, instructor_name, instructor_email, price, \
                    available_seats, enrolled_seats, class_status, feedback \
             FROM classes WHERE class_status = $1 ORDER BY enrolled_seats DESC LIMIT $2",
        )
        .bind(class_status::APPROVED)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_popular_classes error: {:?}", e);
            vec![]
        })
    }

    /// list_all_classes
    ///
    /// Management view for admins and instructors. **Note**: does *not*
    /// include the approved-only restriction.
    async fn list_all_classes(&self) -> Vec<Class> {
        sqlx::query_as::<_, Class>(
            "SELECT id, name, image, instructor_name, instructor_email, price, \
                    available_seats, enrolled_seats, class_status, feedback \
             FROM classes ORDER BY class_status ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_all_classes error: {:?}", e);
            vec![]
        })
    }

    async fn get_class(&self, id: Uuid) -> Option<Class> {
        sqlx::query_as::<_, Class>(
            "SELECT id, name, image, instructor_name, instructor_email, price, \
                    available_seats, enrolled_seats, class_status, feedback \
             FROM classes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_class error: {:?}", e);
            None
        })
    }

    async fn get_classes_by_ids(&self, ids: &[Uuid]) -> Vec<Class> {
        sqlx::query_as::<_, Class>(
            "SELECT id, name, image, instructor_name, instructor_email, price, \
                    available_seats, enrolled_seats, class_status, feedback \
             FROM classes WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_classes_by_ids error: {:?}", e);
            vec![]
        })
    }

    /// create_class
    ///
    /// Inserts a new class submission. All new classes start in 'pending'
    /// status with zero enrolled seats, requiring administrative approval
    /// before they appear in the public catalogue.
    async fn create_class(
        &self,
        req: CreateClassRequest,
        instructor_name: &str,
        instructor_email: &str,
    ) -> Option<Class> {
        sqlx::query_as::<_, Class>(
            "INSERT INTO classes (id, name, image, instructor_name, instructor_email, price, \
                                  available_seats, enrolled_seats, class_status, feedback) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, NULL) \
             RETURNING id, name, image, instructor_name, instructor_email, price, \
                       available_seats, enrolled_seats, class_status, feedback",
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.image)
        .bind(instructor_name)
        .bind(instructor_email)
        .bind(req.price)
        .bind(req.available_seats)
        .bind(class_status::PENDING)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_class error: {:?}", e);
            None
        })
    }

    /// set_class_status
    ///
    /// Approves or denies a submission. The `class_status = 'pending'` filter
    /// makes the transition one-way: re-approving or flipping an already
    /// decided class affects 0 rows.
    async fn set_class_status(&self, id: Uuid, status: &str, feedback: Option<String>) -> bool {
        match sqlx::query(
            "UPDATE classes SET class_status = $1, feedback = $2 \
             WHERE id = $3 AND class_status = $4",
        )
        .bind(status)
        .bind(feedback)
        .bind(id)
        .bind(class_status::PENDING)
        .execute(&self.pool)
        .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("set_class_status error: {:?}", e);
                false
            }
        }
    }

    /// adjust_class_seats
    ///
    /// The single point where seat counters change. The `available_seats > 0`
    /// guard makes the decrement conditional and per-document atomic, so two
    /// concurrent checkouts cannot drive the counter negative: the loser
    /// affects 0 rows and the caller reports a partial apply.
    async fn adjust_class_seats(&self, id: Uuid) -> bool {
        match sqlx::query(
            "UPDATE classes SET enrolled_seats = enrolled_seats + 1, \
                                available_seats = available_seats - 1 \
             WHERE id = $1 AND available_seats > 0",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("adjust_class_seats error: {:?}", e);
                false
            }
        }
    }

    // --- CARTS ---

    async fn carts_by_email(&self, email: &str) -> Vec<CartItem> {
        sqlx::query_as::<_, CartItem>(
            "SELECT id, email, class_item_id FROM carts WHERE email = $1",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("carts_by_email error: {:?}", e);
            vec![]
        })
    }

    async fn add_cart_item(&self, email: &str, class_item_id: Uuid) -> Option<CartItem> {
        sqlx::query_as::<_, CartItem>(
            "INSERT INTO carts (id, email, class_item_id) VALUES ($1, $2, $3) \
             RETURNING id, email, class_item_id",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(class_item_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("add_cart_item error: {:?}", e);
            None
        })
    }

    async fn delete_cart_item(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_cart_item error: {:?}", e);
                false
            }
        }
    }

    async fn delete_cart_items(&self, ids: &[Uuid]) -> u64 {
        match sqlx::query("DELETE FROM carts WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected(),
            Err(e) => {
                tracing::error!("delete_cart_items error: {:?}", e);
                0
            }
        }
    }

    // --- PAYMENTS ---

    /// insert_payment
    ///
    /// Appends the checkout record. Payments are immutable once written; there
    /// is no update path for this collection anywhere in the codebase.
    async fn insert_payment(&self, req: &CheckoutRequest) -> Option<Payment> {
        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, email, transaction_id, cart_item_ids, class_item_ids, \
                                   price, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             RETURNING id, email, transaction_id, cart_item_ids, class_item_ids, price, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&req.email)
        .bind(&req.transaction_id)
        .bind(&req.cart_item_ids)
        .bind(&req.class_item_ids)
        .bind(req.price)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("insert_payment error: {:?}", e);
            None
        })
    }

    async fn payments_by_email(&self, email: &str) -> Vec<Payment> {
        sqlx::query_as::<_, Payment>(
            "SELECT id, email, transaction_id, cart_item_ids, class_item_ids, price, created_at \
             FROM payments WHERE email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("payments_by_email error: {:?}", e);
            vec![]
        })
    }
}
