//! Field validation for the student form.

use crate::models::StudentFields;

/// Message shown when an email is already used by another student.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "A student with this email already exists.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required.")]
    NameRequired,
    #[error("Email is required.")]
    EmailRequired,
    #[error("Please enter a valid email address.")]
    EmailInvalid,
    #[error("A student with this email already exists.")]
    DuplicateEmail,
}

/// Inline errors for the student form; each persists until corrected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<ValidationError>,
    pub email: Option<ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Simple `local@domain.tld` check: no whitespace, exactly one `@`, and a
/// `.` in the domain with characters on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Returns the trimmed name.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(name.to_string())
}

/// Returns the trimmed email.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::EmailInvalid);
    }
    Ok(email.to_string())
}

pub fn validate_fields(name: &str, email: &str) -> Result<StudentFields, FieldErrors> {
    match (validate_name(name), validate_email(email)) {
        (Ok(name), Ok(email)) => Ok(StudentFields { name, email }),
        (name, email) => Err(FieldErrors {
            name: name.err(),
            email: email.err(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_simple_addresses() {
        for email in ["a@x.com", "first.last@school.edu", "a+b@sub.domain.org"] {
            assert!(is_valid_email(email), "{email}");
        }
    }

    #[test]
    fn test_rejects_missing_at_or_dot() {
        for email in [
            "plainaddress",
            "no-at.example.com",
            "a@nodot",
            "a@.com",
            "a@com.",
            "@x.com",
            "a@@x.com",
            "a b@x.com",
            "",
        ] {
            assert!(!is_valid_email(email), "{email}");
        }
    }

    #[test]
    fn test_validate_fields_collects_both_errors() {
        let errors = validate_fields("   ", "nope").unwrap_err();
        assert_eq!(errors.name, Some(ValidationError::NameRequired));
        assert_eq!(errors.email, Some(ValidationError::EmailInvalid));

        let errors = validate_fields("Ada", "").unwrap_err();
        assert_eq!(errors.name, None);
        assert_eq!(errors.email, Some(ValidationError::EmailRequired));
    }

    #[test]
    fn test_validate_fields_trims() {
        let fields = validate_fields("  Ada ", " ada@x.com ").unwrap();
        assert_eq!(fields, StudentFields::new("Ada", "ada@x.com"));
    }

    #[test]
    fn test_duplicate_message_matches_error() {
        assert_eq!(
            ValidationError::DuplicateEmail.to_string(),
            DUPLICATE_EMAIL_MESSAGE
        );
    }
}
