use dioxus::prelude::*;
use ui::{use_auth, DashboardView, SignOutButton, ThemeToggle};

use crate::Route;

/// Signed-in area; anonymous visitors are sent to `/login`.
#[component]
pub fn Dashboard() -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    use_effect(move || {
        let state = auth();
        if !state.loading && state.user.is_none() {
            nav.replace(Route::Login {});
        }
    });

    let state = auth();
    let Some(user) = state.user else {
        return rsx! {
            main { class: "page-loading", "Loading..." }
        };
    };

    rsx! {
        header {
            class: "app-header",
            h1 { class: "app-title", "Student Roster" }
            div {
                class: "app-header-actions",
                span { class: "app-user", "{user.email}" }
                ThemeToggle {}
                SignOutButton {
                    class: "btn",
                    on_signed_out: move |_| {
                        nav.replace(Route::Login {});
                    },
                }
            }
        }
        main {
            class: "app-main",
            DashboardView {}
        }
    }
}
