//! Queries against the `students` table.
//!
//! Each write returns the confirmed row (`RETURNING *`) so the caller can
//! publish it on the change feed. Names are trimmed and emails lower-cased
//! before they reach the database; `students_email_key` enforces uniqueness.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use store::{SortKey, Student, StudentFields};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
        }
    }
}

fn select_sql(order_by: SortKey) -> &'static str {
    match order_by {
        SortKey::Name => "SELECT * FROM students ORDER BY lower(name), id",
        SortKey::Email => "SELECT * FROM students ORDER BY lower(email), id",
    }
}

pub async fn select_all(pool: &PgPool, order_by: SortKey) -> Result<Vec<Student>, sqlx::Error> {
    let rows: Vec<StudentRow> = sqlx::query_as(select_sql(order_by)).fetch_all(pool).await?;
    Ok(rows.into_iter().map(Student::from).collect())
}

pub async fn insert(pool: &PgPool, fields: &StudentFields) -> Result<Student, sqlx::Error> {
    let fields = fields.normalized();
    let row: StudentRow =
        sqlx::query_as("INSERT INTO students (name, email) VALUES ($1, $2) RETURNING *")
            .bind(&fields.name)
            .bind(&fields.email)
            .fetch_one(pool)
            .await?;
    Ok(row.into())
}

/// `None` when no row has this id.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    fields: &StudentFields,
) -> Result<Option<Student>, sqlx::Error> {
    let fields = fields.normalized();
    let row: Option<StudentRow> = sqlx::query_as(
        "UPDATE students SET name = $2, email = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Student::from))
}

/// Returns the deleted row, or `None` if it was already gone.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Student>, sqlx::Error> {
    let row: Option<StudentRow> = sqlx::query_as("DELETE FROM students WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Student::from))
}

pub async fn email_exists(
    pool: &PgPool,
    email: &str,
    excluding: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM students WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(email.trim().to_lowercase())
    .bind(excluding)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_orders_case_insensitively() {
        assert!(select_sql(SortKey::Name).contains("ORDER BY lower(name)"));
        assert!(select_sql(SortKey::Email).contains("ORDER BY lower(email)"));
    }

    #[test]
    fn test_row_conversion_stringifies_id() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let student: Student = StudentRow {
            id,
            name: "Ada".into(),
            email: "ada@x.com".into(),
            created_at: now,
            updated_at: now,
        }
        .into();
        assert_eq!(student.id, id.to_string());
        assert_eq!(student.email, "ada@x.com");
    }
}
