//! # Session / auth gate state
//!
//! [`AuthGate`] holds the sign-in / sign-up form and turns it into an
//! [`AuthAttempt`] once the client-side checks pass. The attempt is sent to
//! the backend by the UI; the outcome comes back through
//! [`AuthGate::finish_attempt`].
//!
//! The password policy ([`check_password_strength`]) applies to sign-up only
//! and is re-checked by the server.
//!
//! Errors from the backend expire like dashboard notices; the UI clears them
//! with [`AuthGate::expire_error`]. Client-side check errors stay until the
//! next attempt.

use crate::clock::now_millis;
use crate::config::DashboardConfig;
use crate::validation::is_valid_email;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Symbols accepted by the password policy.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Shown when an auth attempt fails for a reason other than a backend rejection.
pub const UNEXPECTED_AUTH_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PasswordIssue {
    #[error("Password must be at least 8 characters")]
    TooShort,
    #[error("Password must contain an uppercase letter")]
    MissingUppercase,
    #[error("Password must contain a lowercase letter")]
    MissingLowercase,
    #[error("Password must contain a number")]
    MissingDigit,
    #[error("Password must contain a special character")]
    MissingSymbol,
}

pub fn check_password_strength(password: &str) -> Result<(), PasswordIssue> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordIssue::TooShort);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordIssue::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(PasswordIssue::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordIssue::MissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(PasswordIssue::MissingSymbol);
    }
    Ok(())
}

/// How an auth attempt failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The backend refused the credentials; its message is shown as is.
    #[error("{0}")]
    Rejected(String),
    /// Transport or server fault; the detail is logged, not shown.
    #[error("Something went wrong. Please try again.")]
    Unexpected(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

/// Credentials that passed client-side checks, ready for the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthAttempt {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthGate {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub loading: bool,
    error_expires_at_ms: Option<i64>,
    error_ttl_ms: i64,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            email: String::new(),
            password: String::new(),
            error: None,
            loading: false,
            error_expires_at_ms: None,
            error_ttl_ms: DashboardConfig::default().notices.ttl_ms as i64,
        }
    }
}

impl AuthGate {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn set_error_ttl_ms(&mut self, ttl_ms: u64) {
        self.error_ttl_ms = ttl_ms as i64;
    }

    /// When the current error disappears, if it expires at all.
    pub fn error_expires_at_ms(&self) -> Option<i64> {
        self.error_expires_at_ms
    }

    /// Drop a backend error once `now_ms` has reached its expiry.
    pub fn expire_error(&mut self, now_ms: i64) -> bool {
        match self.error_expires_at_ms {
            Some(expires_at) if expires_at <= now_ms => {
                self.clear_error();
                true
            }
            _ => false,
        }
    }

    fn clear_error(&mut self) {
        self.error = None;
        self.error_expires_at_ms = None;
    }

    fn fail_check(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.error_expires_at_ms = None;
    }

    fn fail_remote(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.error_expires_at_ms = Some(now_millis() + self.error_ttl_ms);
    }

    /// Switch between sign-in and sign-up; clears the password and any error.
    pub fn set_mode(&mut self, mode: AuthMode) {
        if self.mode != mode {
            self.mode = mode;
            self.password.clear();
            self.clear_error();
        }
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    pub fn begin_attempt(&mut self) -> Option<AuthAttempt> {
        if self.loading {
            return None;
        }
        self.clear_error();

        let email = self.email.trim().to_string();
        if email.is_empty() || self.password.is_empty() {
            self.fail_check("Email and password are required");
            return None;
        }
        if self.mode == AuthMode::SignUp {
            if !is_valid_email(&email) {
                self.fail_check("Please enter a valid email");
                return None;
            }
            if let Err(issue) = check_password_strength(&self.password) {
                self.fail_check(issue.to_string());
                return None;
            }
        }

        self.loading = true;
        Some(AuthAttempt {
            mode: self.mode,
            email,
            password: self.password.clone(),
        })
    }

    /// Apply the backend's answer. Returns the session value on success.
    pub fn finish_attempt<U>(&mut self, result: Result<U, AuthError>) -> Option<U> {
        self.loading = false;
        match result {
            Ok(user) => {
                self.password.clear();
                self.clear_error();
                Some(user)
            }
            Err(AuthError::Rejected(message)) => {
                self.fail_remote(message);
                None
            }
            Err(AuthError::Unexpected(detail)) => {
                tracing::warn!("auth attempt failed: {detail}");
                self.fail_remote(UNEXPECTED_AUTH_MESSAGE);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy_reports_each_missing_class() {
        assert_eq!(check_password_strength("Ab1!"), Err(PasswordIssue::TooShort));
        assert_eq!(
            check_password_strength("abcdefg1!"),
            Err(PasswordIssue::MissingUppercase)
        );
        assert_eq!(
            check_password_strength("ABCDEFG1!"),
            Err(PasswordIssue::MissingLowercase)
        );
        assert_eq!(
            check_password_strength("Abcdefgh!"),
            Err(PasswordIssue::MissingDigit)
        );
        assert_eq!(
            check_password_strength("Abcdefgh1"),
            Err(PasswordIssue::MissingSymbol)
        );
        assert_eq!(check_password_strength("Abcdefg1!"), Ok(()));
        assert_eq!(check_password_strength("Secure#2024"), Ok(()));
    }

    #[test]
    fn test_sign_in_skips_password_policy() {
        let mut gate = AuthGate::new(AuthMode::SignIn);
        gate.email = " ada@x.com ".into();
        gate.password = "weak".into();

        let attempt = gate.begin_attempt().unwrap();
        assert_eq!(attempt.email, "ada@x.com");
        assert_eq!(attempt.mode, AuthMode::SignIn);
        assert!(gate.loading);
        // A second attempt while one is in flight is ignored.
        assert!(gate.begin_attempt().is_none());
    }

    #[test]
    fn test_sign_up_enforces_policy() {
        let mut gate = AuthGate::new(AuthMode::SignUp);
        gate.email = "ada@x.com".into();
        gate.password = "weakpassword".into();

        assert!(gate.begin_attempt().is_none());
        assert_eq!(
            gate.error.as_deref(),
            Some("Password must contain an uppercase letter")
        );
        assert!(!gate.loading);

        gate.email = "not-an-email".into();
        gate.password = "Strong#Pass1".into();
        assert!(gate.begin_attempt().is_none());
        assert_eq!(gate.error.as_deref(), Some("Please enter a valid email"));
    }

    #[test]
    fn test_empty_fields_rejected_in_both_modes() {
        for mode in [AuthMode::SignIn, AuthMode::SignUp] {
            let mut gate = AuthGate::new(mode);
            assert!(gate.begin_attempt().is_none());
            assert_eq!(
                gate.error.as_deref(),
                Some("Email and password are required")
            );
        }
    }

    #[test]
    fn test_finish_attempt_messages() {
        let mut gate = AuthGate::new(AuthMode::SignIn);
        gate.email = "ada@x.com".into();
        gate.password = "whatever".into();

        gate.begin_attempt().unwrap();
        let rejected: Option<()> =
            gate.finish_attempt(Err(AuthError::Rejected("Invalid email or password".into())));
        assert!(rejected.is_none());
        assert_eq!(gate.error.as_deref(), Some("Invalid email or password"));
        assert!(!gate.loading);

        gate.begin_attempt().unwrap();
        let failed: Option<()> =
            gate.finish_attempt(Err(AuthError::Unexpected("connection reset".into())));
        assert!(failed.is_none());
        assert_eq!(gate.error.as_deref(), Some(UNEXPECTED_AUTH_MESSAGE));

        gate.begin_attempt().unwrap();
        assert_eq!(gate.finish_attempt(Ok(42)), Some(42));
        assert!(gate.error.is_none());
        assert!(gate.password.is_empty());
    }

    #[test]
    fn test_backend_errors_expire_after_ttl() {
        let mut gate = AuthGate::new(AuthMode::SignIn);
        gate.email = "ada@x.com".into();
        gate.password = "whatever".into();

        gate.begin_attempt().unwrap();
        let _: Option<()> =
            gate.finish_attempt(Err(AuthError::Rejected("Invalid email or password".into())));
        let expires_at = gate.error_expires_at_ms().unwrap();

        assert!(!gate.expire_error(expires_at - 1));
        assert_eq!(gate.error.as_deref(), Some("Invalid email or password"));
        assert!(gate.expire_error(expires_at));
        assert!(gate.error.is_none());
        assert!(gate.error_expires_at_ms().is_none());

        gate.begin_attempt().unwrap();
        let _: Option<()> = gate.finish_attempt(Err(AuthError::Unexpected("timeout".into())));
        let expires_at = gate.error_expires_at_ms().unwrap();
        assert!(gate.expire_error(expires_at));
        assert!(gate.error.is_none());
    }

    #[test]
    fn test_error_ttl_is_configurable() {
        let mut gate = AuthGate::new(AuthMode::SignIn);
        gate.set_error_ttl_ms(50);
        gate.email = "ada@x.com".into();
        gate.password = "whatever".into();

        let before = now_millis();
        gate.begin_attempt().unwrap();
        let _: Option<()> = gate.finish_attempt(Err(AuthError::Rejected("nope".into())));
        let expires_at = gate.error_expires_at_ms().unwrap();
        assert!(expires_at >= before + 50);
        assert!(expires_at <= now_millis() + 50);
    }

    #[test]
    fn test_check_errors_do_not_expire() {
        let mut gate = AuthGate::new(AuthMode::SignUp);
        assert!(gate.begin_attempt().is_none());
        assert!(gate.error_expires_at_ms().is_none());
        assert!(!gate.expire_error(i64::MAX));
        assert_eq!(
            gate.error.as_deref(),
            Some("Email and password are required")
        );
    }

    #[test]
    fn test_toggle_mode_clears_password_and_error() {
        let mut gate = AuthGate::new(AuthMode::SignIn);
        gate.password = "secret".into();
        gate.error = Some("boom".into());
        gate.toggle_mode();
        assert_eq!(gate.mode, AuthMode::SignUp);
        assert!(gate.password.is_empty());
        assert!(gate.error.is_none());
    }
}
