//! [`StudentTable`] over the server functions.

use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::*;
use store::{
    ChangeListener, SortKey, Student, StudentFields, StudentTable, Subscription, TableError,
    TableReply,
};

use crate::timer::sleep;

/// Pause before re-polling after a failed poll.
const FEED_RETRY: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApiTable;

fn transport_error(err: ServerFnError) -> TableError {
    TableError::new(err.to_string())
}

/// Flatten the transport result into the table's result.
fn flatten<T>(reply: Result<TableReply<T>, ServerFnError>) -> TableReply<T> {
    reply.map_err(transport_error)?
}

impl ApiTable {
    /// Follow the change feed, calling `listener` for every event and
    /// `on_resync` whenever the server can no longer replay what was missed.
    ///
    /// Must be called inside a component scope; the poll loop is a task of
    /// that scope and also stops when the returned handle is dropped.
    pub fn subscribe_with_resync(
        &self,
        listener: ChangeListener,
        on_resync: Rc<dyn Fn()>,
    ) -> Subscription {
        let task = spawn(async move {
            let mut cursor: Option<api::FeedCursor> = None;
            loop {
                match flatten(api::poll_student_changes(cursor.clone()).await) {
                    Ok(batch) => {
                        if batch.resync {
                            tracing::warn!(?cursor, "change feed gap, reloading students");
                            on_resync();
                        }
                        for event in &batch.events {
                            listener(event);
                        }
                        cursor = Some(batch.cursor);
                    }
                    Err(err) => {
                        tracing::warn!("change feed poll failed: {err}");
                        sleep(FEED_RETRY).await;
                    }
                }
            }
        });
        Subscription::new(move || task.cancel())
    }
}

impl StudentTable for ApiTable {
    async fn select_all(&self, order_by: SortKey) -> TableReply<Vec<Student>> {
        flatten(api::list_students(order_by).await)
    }

    async fn insert(&self, fields: StudentFields) -> TableReply<Student> {
        flatten(api::insert_student(fields).await)
    }

    async fn update(&self, id: &str, fields: StudentFields) -> TableReply<Student> {
        flatten(api::update_student(id.to_string(), fields).await)
    }

    async fn delete(&self, id: &str) -> TableReply<()> {
        flatten(api::delete_student(id.to_string()).await)
    }

    async fn exists_by_email(&self, email: &str, excluding_id: Option<&str>) -> TableReply<bool> {
        flatten(
            api::student_email_exists(email.to_string(), excluding_id.map(str::to_string)).await,
        )
    }

    fn subscribe(&self, listener: ChangeListener) -> Subscription {
        self.subscribe_with_resync(
            listener,
            Rc::new(|| tracing::debug!("resync requested with no handler")),
        )
    }
}
