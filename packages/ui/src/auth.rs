//! Authentication context, the sign-in / sign-up screen and sign-out.

use std::time::Duration;

use api::UserInfo;
use dioxus::prelude::*;
use store::clock::now_millis;
use store::{AuthAttempt, AuthError, AuthGate, AuthMode};

use crate::timer::sleep;

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserInfo>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Returns a signal that updates when the user signs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Provider component that manages authentication state.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let mut auth_state = use_signal(AuthState::default);

    // Fetch the current user on mount
    let _ = use_resource(move || async move {
        let user = match api::get_current_user().await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("failed to fetch current user: {e}");
                None
            }
        };
        auth_state.set(AuthState {
            user,
            loading: false,
        });
    });

    use_context_provider(|| auth_state);

    rsx! {
        {children}
    }
}

async fn send_attempt(attempt: AuthAttempt) -> Result<UserInfo, AuthError> {
    let reply = match attempt.mode {
        AuthMode::SignIn => api::sign_in(attempt.email, attempt.password).await,
        AuthMode::SignUp => api::sign_up(attempt.email, attempt.password).await,
    };
    match reply {
        Ok(Ok(user)) => Ok(user),
        Ok(Err(message)) => Err(AuthError::Rejected(message)),
        Err(e) => Err(AuthError::Unexpected(e.to_string())),
    }
}

/// Clear a backend error from the form once it expires.
fn schedule_error_expiry(mut gate: Signal<AuthGate>) {
    let Some(expires_at) = gate.peek().error_expires_at_ms() else {
        return;
    };
    let wait = (expires_at - now_millis()).max(0) as u64;
    spawn(async move {
        sleep(Duration::from_millis(wait)).await;
        gate.write().expire_error(now_millis());
    });
}

/// Sign-in / sign-up form. Calls `on_authenticated` once a session exists.
#[component]
pub fn AuthScreen(on_authenticated: EventHandler<UserInfo>) -> Element {
    let mut gate = use_signal(AuthGate::default);
    let mut auth_state = use_auth();

    let onsubmit = move |evt: FormEvent| async move {
        evt.prevent_default();
        let Some(attempt) = gate.write().begin_attempt() else {
            return;
        };
        let result = send_attempt(attempt).await;
        let signed_in = gate.write().finish_attempt(result);
        let Some(user) = signed_in else {
            schedule_error_expiry(gate);
            return;
        };
        tracing::info!(email = %user.email, "signed in");
        auth_state.set(AuthState {
            user: Some(user.clone()),
            loading: false,
        });
        on_authenticated.call(user);
    };

    let state = gate();
    let (title, submit_label, switch_prompt, switch_label) = match state.mode {
        AuthMode::SignIn => ("Sign in", "Sign in", "No account yet?", "Create one"),
        AuthMode::SignUp => (
            "Create an account",
            "Sign up",
            "Already registered?",
            "Sign in",
        ),
    };

    rsx! {
        div {
            class: "auth-card",
            h1 { class: "auth-title", "Student Roster" }
            h2 { class: "auth-subtitle", "{title}" }

            form {
                class: "auth-form",
                onsubmit: onsubmit,

                label { r#for: "auth-email", "Email" }
                input {
                    id: "auth-email",
                    r#type: "email",
                    autocomplete: "email",
                    value: "{state.email}",
                    oninput: move |evt: FormEvent| gate.write().email = evt.value(),
                }

                label { r#for: "auth-password", "Password" }
                input {
                    id: "auth-password",
                    r#type: "password",
                    autocomplete: if state.mode == AuthMode::SignUp { "new-password" } else { "current-password" },
                    value: "{state.password}",
                    oninput: move |evt: FormEvent| gate.write().password = evt.value(),
                }

                if state.mode == AuthMode::SignUp {
                    p {
                        class: "field-hint",
                        "At least 8 characters with upper and lower case letters, a number and a symbol."
                    }
                }

                if let Some(error) = &state.error {
                    p { class: "auth-error", role: "alert", "{error}" }
                }

                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: state.loading,
                    if state.loading { "Please wait..." } else { "{submit_label}" }
                }
            }

            p {
                class: "auth-switch",
                "{switch_prompt} "
                button {
                    class: "link-btn",
                    r#type: "button",
                    disabled: state.loading,
                    onclick: move |_| gate.write().toggle_mode(),
                    "{switch_label}"
                }
            }
        }
    }
}

/// Button to sign out the current user.
#[component]
pub fn SignOutButton(
    #[props(default = "Sign out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
    on_signed_out: EventHandler<()>,
) -> Element {
    let mut auth_state = use_auth();

    let onclick = move |_| async move {
        match api::sign_out().await {
            Ok(()) => {
                auth_state.set(AuthState {
                    user: None,
                    loading: false,
                });
                on_signed_out.call(());
            }
            Err(e) => tracing::warn!("sign out failed: {e}"),
        }
    };

    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            onclick: onclick,
            "{label}"
        }
    }
}
