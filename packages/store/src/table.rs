//! # Remote table client
//!
//! [`StudentTable`] is the seam between the dashboard controller and whatever
//! backend holds the `students` relation. It mirrors the query surface the
//! controller needs and nothing more: select, insert, update, delete, an
//! email existence check and a change-feed subscription.
//!
//! Implementations:
//! - [`crate::MemoryTable`]: in-memory rows, used by tests.
//! - `ui::ApiTable`: forwards each call to the matching server function.
//!
//! Ordering, constraint enforcement and event delivery are the backend's
//! business; implementations are pass-throughs.

use std::future::Future;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::models::{ChangeEvent, SortKey, Student, StudentFields};

/// SQLSTATE reported by PostgreSQL for a unique-constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Error returned by the backend: a message plus an optional machine-readable code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct TableError {
    pub message: String,
    pub code: Option<String>,
}

impl TableError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn unique_violation(message: impl Into<String>) -> Self {
        Self::new(message).with_code(UNIQUE_VIOLATION)
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code.as_deref() == Some(UNIQUE_VIOLATION)
    }
}

/// Result shape shared by the table client and the server functions.
pub type TableReply<T> = Result<T, TableError>;

/// Callback invoked for every change event delivered by a subscription.
pub type ChangeListener = Rc<dyn Fn(&ChangeEvent)>;

/// Handle to an active change-feed subscription.
///
/// Delivery stops when the handle is dropped or [`Subscription::unsubscribe`]
/// is called.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Async façade over the backend's `students` table.
pub trait StudentTable {
    fn select_all(
        &self,
        order_by: SortKey,
    ) -> impl Future<Output = TableReply<Vec<Student>>>;
    fn insert(
        &self,
        fields: StudentFields,
    ) -> impl Future<Output = TableReply<Student>>;
    fn update(
        &self,
        id: &str,
        fields: StudentFields,
    ) -> impl Future<Output = TableReply<Student>>;
    fn delete(
        &self,
        id: &str,
    ) -> impl Future<Output = TableReply<()>>;
    fn exists_by_email(
        &self,
        email: &str,
        excluding_id: Option<&str>,
    ) -> impl Future<Output = TableReply<bool>>;
    fn subscribe(&self, listener: ChangeListener) -> Subscription;
}
