//! Shared in-memory `Repository` implementation for integration tests.
//!
//! Mirrors the semantics the Postgres implementation promises: conditional
//! seat adjustment, one-way status transitions, and idempotency-by-count
//! deletions, all behind the same trait the handlers use.

use async_trait::async_trait;
use camp_portal::models::{
    CartItem, CheckoutRequest, Class, CreateClassRequest, Payment, User, class_status, roles,
};
use camp_portal::repository::Repository;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemRepo {
    pub users: Mutex<HashMap<Uuid, User>>,
    pub classes: Mutex<HashMap<Uuid, Class>>,
    pub carts: Mutex<HashMap<Uuid, CartItem>>,
    pub payments: Mutex<Vec<Payment>>,
    /// When true, `insert_payment` simulates a store failure.
    pub fail_payment_insert: bool,
}

impl MemRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user directly, sidestepping the student-only signup path.
    pub fn seed_user(&self, name: &str, email: &str, role: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        user
    }

    /// Inserts a class in the given status with zero enrolled seats.
    pub fn seed_class(&self, name: &str, price: f64, available_seats: i32, status: &str) -> Class {
        let class = Class {
            id: Uuid::new_v4(),
            name: name.to_string(),
            image: "https://img.example.com/class.jpg".to_string(),
            instructor_name: "Seeded Instructor".to_string(),
            instructor_email: "instructor@example.com".to_string(),
            price,
            available_seats,
            enrolled_seats: 0,
            class_status: status.to_string(),
            feedback: None,
        };
        self.classes.lock().unwrap().insert(class.id, class.clone());
        class
    }

    pub fn seed_cart_item(&self, email: &str, class_item_id: Uuid) -> CartItem {
        let item = CartItem {
            id: Uuid::new_v4(),
            email: email.to_string(),
            class_item_id,
        };
        self.carts.lock().unwrap().insert(item.id, item.clone());
        item
    }
}

#[async_trait]
impl Repository for MemRepo {
    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }

    async fn create_user(&self, name: &str, email: &str) -> Option<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role: roles::STUDENT.to_string(),
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        Some(user)
    }

    async fn delete_user(&self, id: Uuid) -> bool {
        self.users.lock().unwrap().remove(&id).is_some()
    }

    async fn set_user_role(&self, id: Uuid, role: &str) -> bool {
        match self.users.lock().unwrap().get_mut(&id) {
            Some(user) => {
                user.role = role.to_string();
                true
            }
            None => false,
        }
    }

    async fn list_instructors(&self, limit: Option<i64>) -> Vec<User> {
        let mut instructors: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.role == roles::INSTRUCTOR)
            .cloned()
            .collect();
        instructors.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(limit) = limit {
            instructors.truncate(limit as usize);
        }
        instructors
    }

    async fn list_approved_classes(&self) -> Vec<Class> {
        let mut classes: Vec<Class> = self
            .classes
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.class_status == class_status::APPROVED)
            .cloned()
            .collect();
        classes.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap());
        classes
    }

    async fn list_popular_classes(&self, limit: i64) -> Vec<Class> {
        let mut classes: Vec<Class> = self
            .classes
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.class_status == class_status::APPROVED)
            .cloned()
            .collect();
        classes.sort_by(|a, b| b.enrolled_seats.cmp(&a.enrolled_seats));
        classes.truncate(limit as usize);
        classes
    }

    async fn list_all_classes(&self) -> Vec<Class> {
        self.classes.lock().unwrap().values().cloned().collect()
    }

    async fn get_class(&self, id: Uuid) -> Option<Class> {
        self.classes.lock().unwrap().get(&id).cloned()
    }

    async fn get_classes_by_ids(&self, ids: &[Uuid]) -> Vec<Class> {
        let classes = self.classes.lock().unwrap();
        ids.iter().filter_map(|id| classes.get(id).cloned()).collect()
    }

    async fn create_class(
        &self,
        req: CreateClassRequest,
        instructor_name: &str,
        instructor_email: &str,
    ) -> Option<Class> {
        let class = Class {
            id: Uuid::new_v4(),
            name: req.name,
            image: req.image,
            instructor_name: instructor_name.to_string(),
            instructor_email: instructor_email.to_string(),
            price: req.price,
            available_seats: req.available_seats,
            enrolled_seats: 0,
            class_status: class_status::PENDING.to_string(),
            feedback: None,
        };
        self.classes.lock().unwrap().insert(class.id, class.clone());
        Some(class)
    }

    async fn set_class_status(&self, id: Uuid, status: &str, feedback: Option<String>) -> bool {
        match self.classes.lock().unwrap().get_mut(&id) {
            // One-way transition: only a pending class can be decided.
            Some(class) if class.class_status == class_status::PENDING => {
                class.class_status = status.to_string();
                class.feedback = feedback;
                true
            }
            _ => false,
        }
    }

    async fn adjust_class_seats(&self, id: Uuid) -> bool {
        match self.classes.lock().unwrap().get_mut(&id) {
            // The conditional decrement: a full class is left untouched.
            Some(class) if class.available_seats > 0 => {
                class.enrolled_seats += 1;
                class.available_seats -= 1;
                true
            }
            _ => false,
        }
    }

    async fn carts_by_email(&self, email: &str) -> Vec<CartItem> {
        self.carts
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.email == email)
            .cloned()
            .collect()
    }

    async fn add_cart_item(&self, email: &str, class_item_id: Uuid) -> Option<CartItem> {
        let item = CartItem {
            id: Uuid::new_v4(),
            email: email.to_string(),
            class_item_id,
        };
        self.carts.lock().unwrap().insert(item.id, item.clone());
        Some(item)
    }

    async fn delete_cart_item(&self, id: Uuid) -> bool {
        self.carts.lock().unwrap().remove(&id).is_some()
    }

    async fn delete_cart_items(&self, ids: &[Uuid]) -> u64 {
        let mut carts = self.carts.lock().unwrap();
        let mut removed = 0u64;
        for id in ids {
            if carts.remove(id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    async fn insert_payment(&self, req: &CheckoutRequest) -> Option<Payment> {
        if self.fail_payment_insert {
            return None;
        }
        let payment = Payment {
            id: Uuid::new_v4(),
            email: req.email.clone(),
            transaction_id: req.transaction_id.clone(),
            cart_item_ids: req.cart_item_ids.clone(),
            class_item_ids: req.class_item_ids.clone(),
            price: req.price,
            created_at: Utc::now(),
        };
        self.payments.lock().unwrap().push(payment.clone());
        Some(payment)
    }

    async fn payments_by_email(&self, email: &str) -> Vec<Payment> {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.email == email)
            .cloned()
            .collect()
    }
}
