//! Sign-in / sign-up page.

use dioxus::prelude::*;
use ui::{use_auth, AuthScreen};

use crate::Route;

#[component]
pub fn Login() -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    // Already signed in: go straight to the dashboard.
    use_effect(move || {
        let state = auth();
        if !state.loading && state.user.is_some() {
            nav.replace(Route::Dashboard {});
        }
    });

    rsx! {
        main {
            class: "login-page",
            AuthScreen {
                on_authenticated: move |_| {
                    nav.replace(Route::Dashboard {});
                },
            }
        }
    }
}
