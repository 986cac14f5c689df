use std::cell::RefCell;
use std::rc::Rc;

use crate::models::{ChangeEvent, SortKey, Student, StudentFields};
use crate::table::{ChangeListener, StudentTable, Subscription, TableError, TableReply};

/// In-memory StudentTable for tests.
///
/// Enforces the same rules as the `students` table: trimmed names,
/// lower-cased emails and a unique-email constraint. Change events are
/// delivered synchronously to every subscriber after each successful write.
#[derive(Clone, Default)]
pub struct MemoryTable {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<Student>,
    listeners: Vec<(u64, ChangeListener)>,
    next_listener: u64,
    calls: Vec<&'static str>,
    fail_next: Option<TableError>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows directly, bypassing the change feed.
    pub fn with_rows(rows: Vec<Student>) -> Self {
        let table = Self::default();
        table.inner.borrow_mut().rows = rows;
        table
    }

    pub fn rows(&self) -> Vec<Student> {
        self.inner.borrow().rows.clone()
    }

    /// Names of the operations invoked so far, in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.borrow().calls.clone()
    }

    /// Make the next operation fail with `error`.
    pub fn fail_next(&self, error: TableError) {
        self.inner.borrow_mut().fail_next = Some(error);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn begin(&self, op: &'static str) -> TableReply<()> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(op);
        match inner.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn email_taken(&self, email: &str, excluding_id: Option<&str>) -> bool {
        self.inner
            .borrow()
            .rows
            .iter()
            .any(|s| s.email == email && Some(s.id.as_str()) != excluding_id)
    }

    fn emit(&self, event: ChangeEvent) {
        // Listeners may re-enter the table; release the borrow first.
        let listeners: Vec<ChangeListener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }
}

fn duplicate_email() -> TableError {
    TableError::unique_violation(
        "duplicate key value violates unique constraint \"students_email_key\"",
    )
}

impl StudentTable for MemoryTable {
    async fn select_all(&self, order_by: SortKey) -> TableReply<Vec<Student>> {
        self.begin("select_all")?;
        let mut rows = self.rows();
        rows.sort_by(|a, b| order_by.compare(a, b));
        Ok(rows)
    }

    async fn insert(&self, fields: StudentFields) -> TableReply<Student> {
        self.begin("insert")?;
        let fields = fields.normalized();
        if self.email_taken(&fields.email, None) {
            return Err(duplicate_email());
        }
        let student = Student {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            email: fields.email,
        };
        self.inner.borrow_mut().rows.push(student.clone());
        self.emit(ChangeEvent::insert(student.clone()));
        Ok(student)
    }

    async fn update(&self, id: &str, fields: StudentFields) -> TableReply<Student> {
        self.begin("update")?;
        let fields = fields.normalized();
        if self.email_taken(&fields.email, Some(id)) {
            return Err(duplicate_email());
        }
        let updated = {
            let mut inner = self.inner.borrow_mut();
            let Some(row) = inner.rows.iter_mut().find(|s| s.id == id) else {
                return Err(TableError::new("Student not found"));
            };
            row.name = fields.name;
            row.email = fields.email;
            row.clone()
        };
        self.emit(ChangeEvent::update(updated.clone()));
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> TableReply<()> {
        self.begin("delete")?;
        let removed = {
            let mut inner = self.inner.borrow_mut();
            inner
                .rows
                .iter()
                .position(|s| s.id == id)
                .map(|pos| inner.rows.remove(pos))
        };
        if let Some(row) = removed {
            self.emit(ChangeEvent::delete(row));
        }
        Ok(())
    }

    async fn exists_by_email(&self, email: &str, excluding_id: Option<&str>) -> TableReply<bool> {
        self.begin("exists_by_email")?;
        Ok(self.email_taken(&email.trim().to_lowercase(), excluding_id))
    }

    fn subscribe(&self, listener: ChangeListener) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.listeners.push((id, listener));
            id
        };
        let inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().listeners.retain(|(l, _)| *l != id);
            }
        })
    }
}
