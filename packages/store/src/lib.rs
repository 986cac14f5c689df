pub mod auth;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod models;
pub mod table;
pub mod theme;
pub mod validation;
pub mod view;

mod memory;
pub use memory::MemoryTable;

pub use auth::{AuthAttempt, AuthError, AuthGate, AuthMode, PasswordIssue};
pub use config::DashboardConfig;
pub use dashboard::{
    Dashboard, DeleteRequest, DeleteResult, LoadRequest, Notice, NoticeLevel, StudentForm,
    SubmitOutcome, SubmitRequest, SubmitResult,
};
pub use debounce::{DebounceTicket, Debouncer};
pub use models::{ChangeEvent, ChangeKind, SortDirection, SortKey, Student, StudentFields};
pub use table::{ChangeListener, StudentTable, Subscription, TableError, TableReply};
pub use theme::Theme;
pub use validation::{FieldErrors, ValidationError};
pub use view::{PageView, ViewState};
