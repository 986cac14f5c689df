//! # Domain models for the student roster
//!
//! Defines the data structures exchanged between the dashboard controller, the
//! remote table client and the server functions. Every type here is
//! `Serialize + Deserialize` so it can cross the server/client boundary.
//!
//! ## Types
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`Student`] | A row of the `students` table as confirmed by the backend. |
//! | [`StudentFields`] | The mutable part of a student (`name`, `email`), used as the insert/update payload. |
//! | [`ChangeEvent`] | A row-level change delivered by the change feed. |
//! | [`SortKey`] / [`SortDirection`] | The ordering applied to the derived view and to `select_all`. |

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A student record owned by the backend table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Opaque identifier assigned by the backend. Never changes.
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Student {
    pub fn fields(&self) -> StudentFields {
        StudentFields {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Case-insensitive substring match on name or email.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.email.to_lowercase().contains(needle_lower)
    }
}

/// Payload for inserting or updating a student.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    pub name: String,
    pub email: String,
}

impl StudentFields {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Backend normalisation: trimmed name, trimmed lower-case email.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change pushed by the backend for the `students` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub row: Student,
}

impl ChangeEvent {
    pub fn insert(row: Student) -> Self {
        Self {
            kind: ChangeKind::Insert,
            row,
        }
    }

    pub fn update(row: Student) -> Self {
        Self {
            kind: ChangeKind::Update,
            row,
        }
    }

    pub fn delete(row: Student) -> Self {
        Self {
            kind: ChangeKind::Delete,
            row,
        }
    }
}

/// Column used to order students.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Email,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Email => "email",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SortKey::Name),
            "email" => Some(SortKey::Email),
            _ => None,
        }
    }

    /// Case-insensitive lexicographic comparison on this column.
    pub fn compare(&self, a: &Student, b: &Student) -> Ordering {
        match self {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}
