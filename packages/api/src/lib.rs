//! # API crate: fullstack server functions for the student roster
//!
//! Every public `async fn` in this file is a Dioxus server function, annotated
//! with `#[get(...)]` or `#[post(...)]` and compiled twice: once with the
//! server logic (behind `#[cfg(feature = "server")]`) and once as a client
//! stub that forwards the call over HTTP.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | `server` items | Argon2id password hashing, session helpers |
//! | [`db`] | `server` items | PostgreSQL pool (lazy `OnceCell`) and migrations |
//! | [`error`] | `server` | `ApiError` and its mapping onto `TableError` |
//! | [`feed`] | partly | Bounded change log; long-poll wake-ups on the server |
//! | [`models`] | | `User` row and its client-safe `UserInfo` |
//! | [`settings`] | `server` | Layered server settings (`config` crate) |
//! | [`students`] | `server` | Queries on the `students` table |
//!
//! ## Result shapes
//!
//! The outer `Result<_, ServerFnError>` is transport. Student endpoints return
//! a [`TableReply`] inside it so backend rejections (constraint violations,
//! missing rows, "Not authenticated") reach the client with their message and
//! SQLSTATE. Sign-in and sign-up return `Result<UserInfo, String>` inside it;
//! the `String` is a user-facing rejection.

use dioxus::prelude::*;

pub mod auth;
pub mod db;
#[cfg(feature = "server")]
pub mod error;
pub mod feed;
pub mod models;
#[cfg(feature = "server")]
pub mod settings;
#[cfg(feature = "server")]
pub mod students;

pub use feed::{ChangeBatch, FeedCursor};
pub use models::UserInfo;
pub use store::{DashboardConfig, SortKey, Student, StudentFields, TableReply};

#[cfg(feature = "server")]
use error::{server_error, ApiError};

#[cfg(feature = "server")]
const DUPLICATE_ACCOUNT_MESSAGE: &str = "An account with this email already exists";
#[cfg(feature = "server")]
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Run a student operation for a signed-in caller, mapping failures onto
/// [`store::TableError`].
#[cfg(feature = "server")]
async fn student_op<T, Fut>(
    session: &tower_sessions::Session,
    op: impl FnOnce(&'static sqlx::PgPool) -> Fut,
) -> TableReply<T>
where
    Fut: std::future::Future<Output = Result<T, ApiError>>,
{
    let result = async {
        auth::require_user(session).await?;
        let pool = db::get_pool().await?;
        op(pool).await
    }
    .await;

    result.map_err(|err| {
        match &err {
            ApiError::NotAuthenticated | ApiError::Rejected(_) => {}
            ApiError::Database(sqlx::Error::Database(db)) if db.code().is_some() => {
                tracing::info!(code = ?db.code(), "student write rejected: {}", db.message());
            }
            other => tracing::warn!("student operation failed: {other}"),
        }
        err.to_table_error()
    })
}

#[cfg(feature = "server")]
fn parse_id(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|_| ApiError::Rejected("Student not found".to_string()))
}

#[cfg(feature = "server")]
fn validated(fields: &StudentFields) -> Result<StudentFields, ApiError> {
    store::validation::validate_fields(&fields.name, &fields.email).map_err(|errors| {
        let message = errors
            .name
            .or(errors.email)
            .map(|e| e.to_string())
            .unwrap_or_default();
        ApiError::Rejected(message)
    })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Get the current authenticated user from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    let Some(user_id) = auth::current_user_id(&session).await.map_err(server_error)? else {
        return Ok(None);
    };
    let pool = db::get_pool().await.map_err(server_error)?;

    let user: Option<models::User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(server_error)?;

    Ok(user.map(|u| u.to_info()))
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    Ok(None)
}

/// Create an account and sign it in.
#[cfg(feature = "server")]
#[post("/api/auth/sign-up", session: tower_sessions::Session)]
pub async fn sign_up(
    email: String,
    password: String,
) -> Result<Result<UserInfo, String>, ServerFnError> {
    let email = email.trim().to_lowercase();

    if !store::validation::is_valid_email(&email) {
        return Ok(Err("Please enter a valid email".to_string()));
    }
    if let Err(issue) = store::auth::check_password_strength(&password) {
        return Ok(Err(issue.to_string()));
    }

    let pool = db::get_pool().await.map_err(server_error)?;

    let existing: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await
        .map_err(server_error)?;
    if existing.is_some() {
        return Ok(Err(DUPLICATE_ACCOUNT_MESSAGE.to_string()));
    }

    let password_hash = auth::hash_password(&password).map_err(server_error)?;

    let inserted: Result<models::User, sqlx::Error> = sqlx::query_as(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING *",
    )
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Ok(Err(DUPLICATE_ACCOUNT_MESSAGE.to_string()));
        }
        Err(e) => return Err(server_error(e)),
    };

    auth::sign_in_session(&session, user.id)
        .await
        .map_err(server_error)?;
    tracing::info!(user_id = %user.id, "account created");

    Ok(Ok(user.to_info()))
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/sign-up")]
pub async fn sign_up(
    email: String,
    password: String,
) -> Result<Result<UserInfo, String>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Sign in with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/sign-in", session: tower_sessions::Session)]
pub async fn sign_in(
    email: String,
    password: String,
) -> Result<Result<UserInfo, String>, ServerFnError> {
    let email = email.trim().to_lowercase();
    let pool = db::get_pool().await.map_err(server_error)?;

    let user: Option<models::User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await
        .map_err(server_error)?;

    let Some(user) = user else {
        return Ok(Err(INVALID_CREDENTIALS_MESSAGE.to_string()));
    };

    let valid = auth::verify_password(&password, &user.password_hash).map_err(server_error)?;
    if !valid {
        return Ok(Err(INVALID_CREDENTIALS_MESSAGE.to_string()));
    }

    auth::sign_in_session(&session, user.id)
        .await
        .map_err(server_error)?;

    Ok(Ok(user.to_info()))
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/sign-in")]
pub async fn sign_in(
    email: String,
    password: String,
) -> Result<Result<UserInfo, String>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Sign out by clearing the session.
#[cfg(feature = "server")]
#[post("/api/auth/sign-out", session: tower_sessions::Session)]
pub async fn sign_out() -> Result<(), ServerFnError> {
    session.flush().await.map_err(server_error)?;
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/sign-out")]
pub async fn sign_out() -> Result<(), ServerFnError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Dashboard tunables from the server settings.
#[cfg(feature = "server")]
#[get("/api/config/dashboard")]
pub async fn get_dashboard_config() -> Result<DashboardConfig, ServerFnError> {
    Ok(settings::settings().dashboard.clone())
}

#[cfg(not(feature = "server"))]
#[get("/api/config/dashboard")]
pub async fn get_dashboard_config() -> Result<DashboardConfig, ServerFnError> {
    Ok(DashboardConfig::default())
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[cfg(feature = "server")]
#[post("/api/students/list", session: tower_sessions::Session)]
pub async fn list_students(order_by: SortKey) -> Result<TableReply<Vec<Student>>, ServerFnError> {
    Ok(student_op(&session, |pool| async move {
        Ok(students::select_all(pool, order_by).await?)
    })
    .await)
}

#[cfg(not(feature = "server"))]
#[post("/api/students/list")]
pub async fn list_students(order_by: SortKey) -> Result<TableReply<Vec<Student>>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/students/insert", session: tower_sessions::Session)]
pub async fn insert_student(fields: StudentFields) -> Result<TableReply<Student>, ServerFnError> {
    Ok(student_op(&session, |pool| async move {
        let fields = validated(&fields)?;
        let student = students::insert(pool, &fields).await?;
        feed::feed().publish(store::ChangeEvent::insert(student.clone()));
        Ok(student)
    })
    .await)
}

#[cfg(not(feature = "server"))]
#[post("/api/students/insert")]
pub async fn insert_student(fields: StudentFields) -> Result<TableReply<Student>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/students/update", session: tower_sessions::Session)]
pub async fn update_student(
    id: String,
    fields: StudentFields,
) -> Result<TableReply<Student>, ServerFnError> {
    Ok(student_op(&session, |pool| async move {
        let id = parse_id(&id)?;
        let fields = validated(&fields)?;
        let student = students::update(pool, id, &fields)
            .await?
            .ok_or_else(|| ApiError::Rejected("Student not found".to_string()))?;
        feed::feed().publish(store::ChangeEvent::update(student.clone()));
        Ok(student)
    })
    .await)
}

#[cfg(not(feature = "server"))]
#[post("/api/students/update")]
pub async fn update_student(
    id: String,
    fields: StudentFields,
) -> Result<TableReply<Student>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Deleting an id that no longer exists succeeds without publishing.
#[cfg(feature = "server")]
#[post("/api/students/delete", session: tower_sessions::Session)]
pub async fn delete_student(id: String) -> Result<TableReply<()>, ServerFnError> {
    Ok(student_op(&session, |pool| async move {
        let Ok(id) = uuid::Uuid::parse_str(&id) else {
            return Ok(());
        };
        if let Some(student) = students::delete(pool, id).await? {
            feed::feed().publish(store::ChangeEvent::delete(student));
        }
        Ok(())
    })
    .await)
}

#[cfg(not(feature = "server"))]
#[post("/api/students/delete")]
pub async fn delete_student(id: String) -> Result<TableReply<()>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/students/email-exists", session: tower_sessions::Session)]
pub async fn student_email_exists(
    email: String,
    excluding_id: Option<String>,
) -> Result<TableReply<bool>, ServerFnError> {
    Ok(student_op(&session, |pool| async move {
        let excluding = excluding_id.as_deref().map(parse_id).transpose()?;
        Ok(students::email_exists(pool, &email, excluding).await?)
    })
    .await)
}

#[cfg(not(feature = "server"))]
#[post("/api/students/email-exists")]
pub async fn student_email_exists(
    email: String,
    excluding_id: Option<String>,
) -> Result<TableReply<bool>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Long-poll the change feed. See [`feed`] for the cursor protocol.
#[cfg(feature = "server")]
#[post("/api/students/changes", session: tower_sessions::Session)]
pub async fn poll_student_changes(
    after: Option<FeedCursor>,
) -> Result<TableReply<ChangeBatch>, ServerFnError> {
    Ok(student_op(&session, |_| async move {
        let timeout = std::time::Duration::from_secs(settings::settings().feed.poll_timeout_secs);
        Ok(feed::feed().poll(after, timeout).await)
    })
    .await)
}

#[cfg(not(feature = "server"))]
#[post("/api/students/changes")]
pub async fn poll_student_changes(
    after: Option<FeedCursor>,
) -> Result<TableReply<ChangeBatch>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
