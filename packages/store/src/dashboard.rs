//! # Dashboard controller
//!
//! [`Dashboard`] is the application state behind the student screen: the
//! authoritative student list (a cache of the backend table), the form, inline
//! field errors, the in-flight flag, the transient notice, the view state and a
//! pending delete confirmation.
//!
//! ## Remote operations
//!
//! Each remote operation comes in three steps so a UI never holds a borrow of
//! the dashboard across an await:
//!
//! | Step | Signature | Role |
//! |------|-----------|------|
//! | begin | `begin_load` / `begin_submit` / `begin_remove` | Sync. Validates, flips flags, returns a request value. |
//! | run | `LoadRequest::run` / `SubmitRequest::run` / `DeleteRequest::run` | Async. Talks to a [`StudentTable`]; touches no dashboard state. |
//! | finish | `finish_load` / `finish_submit` / `finish_remove` | Sync. Merges the result and sets the notice. |
//!
//! [`Dashboard::load`], [`Dashboard::submit`] and [`Dashboard::confirm_remove`]
//! chain the three for callers that own the dashboard outright.
//!
//! ## Reconciliation
//!
//! Confirmed rows returned by the backend replace (by id) or are appended to
//! the list; rows pushed by the change feed go through
//! [`Dashboard::on_remote_change`]. Both paths upsert by id, so an echo of our
//! own write never duplicates a row. Whichever write is applied last wins.
//!
//! ## Failure policy
//!
//! Nothing here returns an error to the caller. Remote failures become error
//! notices that expire after the configured TTL; validation failures become
//! inline field errors.

use crate::clock::now_millis;
use crate::config::DashboardConfig;
use crate::models::{ChangeEvent, ChangeKind, SortDirection, SortKey, Student, StudentFields};
use crate::table::{StudentTable, TableError};
use crate::validation::{
    validate_email, validate_fields, validate_name, FieldErrors, ValidationError,
    DUPLICATE_EMAIL_MESSAGE,
};
use crate::view::{self, derive_view, PageView, ViewState};

const CREATED_MESSAGE: &str = "Student added successfully.";
const UPDATED_MESSAGE: &str = "Student updated successfully.";
const DELETED_MESSAGE: &str = "Student deleted successfully.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient banner message with its expiry time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at_ms: i64,
}

/// Form fields; `editing` holds the id of the record being edited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub email: String,
    pub editing: Option<String>,
}

impl StudentForm {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Student),
    Updated(Student),
    /// Local validation failed; nothing was sent.
    Invalid,
    /// The email belongs to another student.
    Duplicate,
    /// The backend reported an error, surfaced as a notice.
    Failed(String),
    /// A submit is already in flight.
    Busy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    order_by: SortKey,
}

impl LoadRequest {
    pub async fn run<T: StudentTable>(self, table: &T) -> Result<Vec<Student>, TableError> {
        table.select_all(self.order_by).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    editing: Option<String>,
    fields: StudentFields,
}

/// Raw result of a [`SubmitRequest`], before it is merged into the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitResult {
    Saved { updated: bool, student: Student },
    Duplicate,
    Failed(TableError),
}

impl SubmitRequest {
    pub fn fields(&self) -> &StudentFields {
        &self.fields
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Existence check, then insert or update. A duplicate found by the check
    /// short-circuits before the mutating call.
    pub async fn run<T: StudentTable>(self, table: &T) -> SubmitResult {
        match table
            .exists_by_email(&self.fields.email, self.editing.as_deref())
            .await
        {
            Ok(true) => return SubmitResult::Duplicate,
            Ok(false) => {}
            Err(err) => return SubmitResult::Failed(err),
        }

        let saved = match &self.editing {
            Some(id) => table.update(id, self.fields).await,
            None => table.insert(self.fields).await,
        };
        match saved {
            Ok(student) => SubmitResult::Saved {
                updated: self.editing.is_some(),
                student,
            },
            Err(err) if err.is_unique_violation() => SubmitResult::Duplicate,
            Err(err) => SubmitResult::Failed(err),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteRequest {
    id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteResult {
    pub id: String,
    pub result: Result<(), TableError>,
}

impl DeleteRequest {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn run<T: StudentTable>(self, table: &T) -> DeleteResult {
        let result = table.delete(&self.id).await;
        DeleteResult {
            id: self.id,
            result,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    students: Vec<Student>,
    form: StudentForm,
    field_errors: FieldErrors,
    submitting: bool,
    loading: bool,
    notice: Option<Notice>,
    view: ViewState,
    pending_delete: Option<String>,
    notice_ttl_ms: i64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(&DashboardConfig::default())
    }
}

impl Dashboard {
    pub fn new(config: &DashboardConfig) -> Self {
        let mut dashboard = Self {
            students: Vec::new(),
            form: StudentForm::default(),
            field_errors: FieldErrors::default(),
            submitting: false,
            loading: false,
            notice: None,
            view: ViewState::default(),
            pending_delete: None,
            notice_ttl_ms: 0,
        };
        dashboard.apply_config(config);
        dashboard
    }

    pub fn apply_config(&mut self, config: &DashboardConfig) {
        self.view.page_size = config.view.page_size.max(1);
        self.notice_ttl_ms = config.notices.ttl_ms as i64;
        self.clamp_page();
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn form(&self) -> &StudentForm {
        &self.form
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn pending_delete(&self) -> Option<&Student> {
        let id = self.pending_delete.as_deref()?;
        self.students.iter().find(|s| s.id == id)
    }

    // -- notices ---------------------------------------------------------

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            message: message.into(),
            expires_at_ms: now_millis() + self.notice_ttl_ms,
        });
    }

    /// Drop the notice once `now_ms` has reached its expiry.
    pub fn expire_notice(&mut self, now_ms: i64) -> bool {
        match &self.notice {
            Some(notice) if notice.expires_at_ms <= now_ms => {
                self.notice = None;
                true
            }
            _ => false,
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // -- load ------------------------------------------------------------

    pub fn begin_load(&mut self) -> LoadRequest {
        self.loading = true;
        LoadRequest {
            order_by: self.view.sort_key,
        }
    }

    /// Replace the list wholesale; on failure keep the previous list.
    pub fn finish_load(&mut self, result: Result<Vec<Student>, TableError>) {
        self.loading = false;
        match result {
            Ok(students) => {
                tracing::debug!(count = students.len(), "students loaded");
                self.students = students;
                self.clamp_page();
            }
            Err(err) => {
                tracing::warn!(code = ?err.code, "failed to load students: {}", err.message);
                self.notify(NoticeLevel::Error, err.message);
            }
        }
    }

    pub async fn load<T: StudentTable>(&mut self, table: &T) {
        let request = self.begin_load();
        let result = request.run(table).await;
        self.finish_load(result);
    }

    // -- form ------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
        if self.field_errors.name.is_some() {
            self.field_errors.name = validate_name(&self.form.name).err();
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.form.email = email.into();
        if self.field_errors.email.is_some() {
            self.field_errors.email = validate_email(&self.form.email).err();
        }
    }

    pub fn begin_edit(&mut self, student: &Student) {
        self.form = StudentForm {
            name: student.name.clone(),
            email: student.email.clone(),
            editing: Some(student.id.clone()),
        };
        self.field_errors = FieldErrors::default();
    }

    pub fn cancel_edit(&mut self) {
        self.form = StudentForm::default();
        self.field_errors = FieldErrors::default();
    }

    // -- submit ----------------------------------------------------------

    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SubmitOutcome> {
        if self.submitting {
            return Err(SubmitOutcome::Busy);
        }
        let fields = match validate_fields(&self.form.name, &self.form.email) {
            Ok(fields) => fields,
            Err(errors) => {
                self.field_errors = errors;
                return Err(SubmitOutcome::Invalid);
            }
        };
        self.field_errors = FieldErrors::default();
        self.submitting = true;
        Ok(SubmitRequest {
            editing: self.form.editing.clone(),
            fields,
        })
    }

    pub fn finish_submit(&mut self, result: SubmitResult) -> SubmitOutcome {
        self.submitting = false;
        match result {
            SubmitResult::Saved { updated, student } => {
                self.upsert(student.clone());
                self.cancel_edit();
                self.clamp_page();
                if updated {
                    self.notify(NoticeLevel::Success, UPDATED_MESSAGE);
                    SubmitOutcome::Updated(student)
                } else {
                    self.notify(NoticeLevel::Success, CREATED_MESSAGE);
                    SubmitOutcome::Created(student)
                }
            }
            SubmitResult::Duplicate => {
                self.field_errors.email = Some(ValidationError::DuplicateEmail);
                self.notify(NoticeLevel::Error, DUPLICATE_EMAIL_MESSAGE);
                SubmitOutcome::Duplicate
            }
            SubmitResult::Failed(err) => {
                tracing::warn!(code = ?err.code, "failed to save student: {}", err.message);
                self.notify(NoticeLevel::Error, err.message.clone());
                SubmitOutcome::Failed(err.message)
            }
        }
    }

    pub async fn submit<T: StudentTable>(&mut self, table: &T) -> SubmitOutcome {
        match self.begin_submit() {
            Ok(request) => {
                let result = request.run(table).await;
                self.finish_submit(result)
            }
            Err(outcome) => outcome,
        }
    }

    // -- delete ----------------------------------------------------------

    /// Ask for confirmation before deleting `id`. Unknown ids are ignored.
    pub fn request_remove(&mut self, id: &str) -> bool {
        if self.students.iter().any(|s| s.id == id) {
            self.pending_delete = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn cancel_remove(&mut self) {
        self.pending_delete = None;
    }

    /// Consume the pending confirmation and produce the delete request.
    pub fn begin_remove(&mut self) -> Option<DeleteRequest> {
        self.pending_delete.take().map(|id| DeleteRequest { id })
    }

    pub fn finish_remove(&mut self, result: DeleteResult) -> bool {
        match result.result {
            Ok(()) => {
                self.remove_local(&result.id);
                self.notify(NoticeLevel::Success, DELETED_MESSAGE);
                true
            }
            Err(err) => {
                tracing::warn!(code = ?err.code, id = %result.id, "failed to delete student: {}", err.message);
                self.notify(NoticeLevel::Error, err.message);
                false
            }
        }
    }

    pub async fn confirm_remove<T: StudentTable>(&mut self, table: &T) -> bool {
        let Some(request) = self.begin_remove() else {
            return false;
        };
        let result = request.run(table).await;
        self.finish_remove(result)
    }

    // -- change feed -----------------------------------------------------

    /// Merge a row-level change regardless of which client caused it.
    pub fn on_remote_change(&mut self, event: ChangeEvent) {
        tracing::debug!(kind = ?event.kind, id = %event.row.id, "remote change");
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => self.upsert(event.row),
            ChangeKind::Delete => self.remove_local(&event.row.id),
        }
        self.clamp_page();
    }

    fn upsert(&mut self, student: Student) {
        match self.students.iter_mut().find(|s| s.id == student.id) {
            Some(existing) => *existing = student,
            None => self.students.push(student),
        }
    }

    fn remove_local(&mut self, id: &str) {
        self.students.retain(|s| s.id != id);
        if self.pending_delete.as_deref() == Some(id) {
            self.pending_delete = None;
        }
        if self.form.editing.as_deref() == Some(id) {
            self.cancel_edit();
        }
        self.clamp_page();
    }

    // -- view ------------------------------------------------------------

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if self.view.search != search {
            self.view.search = search;
            self.view.page = 1;
        }
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        if self.view.sort_key != key {
            self.view.sort_key = key;
            self.view.page = 1;
        }
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        if self.view.direction != direction {
            self.view.direction = direction;
            self.view.page = 1;
        }
    }

    pub fn toggle_sort_direction(&mut self) {
        self.set_sort_direction(self.view.direction.toggled());
    }

    pub fn set_page(&mut self, page: usize) {
        self.view.page = view::clamp_page(page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.view.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.view.page.saturating_sub(1));
    }

    pub fn total_pages(&self) -> usize {
        let count = view::filter_students(&self.students, &self.view.search).len();
        view::total_pages(count, self.view.page_size)
    }

    fn clamp_page(&mut self) {
        self.view.page = view::clamp_page(self.view.page, self.total_pages());
    }

    pub fn derived_view(&self) -> PageView {
        derive_view(&self.students, &self.view)
    }
}
