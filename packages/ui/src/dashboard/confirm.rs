use dioxus::prelude::*;
use store::Dashboard;

use crate::modal::ModalOverlay;
use crate::table::ApiTable;

use super::schedule_notice_expiry;

/// Asks before deleting the student picked in the list.
#[component]
pub fn ConfirmDeleteDialog(mut dashboard: Signal<Dashboard>) -> Element {
    let Some(student) = dashboard.read().pending_delete().cloned() else {
        return rsx! {};
    };

    let confirm = move |_| async move {
        let Some(request) = dashboard.write().begin_remove() else {
            return;
        };
        let result = request.run(&ApiTable).await;
        dashboard.write().finish_remove(result);
        schedule_notice_expiry(dashboard);
    };

    rsx! {
        ModalOverlay {
            on_close: move |_| dashboard.write().cancel_remove(),
            div {
                class: "confirm-dialog",
                h2 { "Delete student?" }
                p {
                    "This permanently removes "
                    strong { "{student.name}" }
                    " ({student.email})."
                }
                div {
                    class: "confirm-actions",
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| dashboard.write().cancel_remove(),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-danger",
                        r#type: "button",
                        onclick: confirm,
                        "Delete"
                    }
                }
            }
        }
    }
}
