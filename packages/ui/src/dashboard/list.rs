use dioxus::prelude::*;
use store::{Dashboard, PageView};

use crate::icons::{FaPen, FaTrashCan};
use crate::Icon;

#[component]
pub fn StudentList(mut dashboard: Signal<Dashboard>, page: PageView) -> Element {
    if dashboard.read().is_loading() && dashboard.read().students().is_empty() {
        return rsx! {
            p { class: "list-empty", "Loading students..." }
        };
    }
    if page.rows.is_empty() {
        let message = if dashboard.read().students().is_empty() {
            "No students yet. Add the first one above."
        } else {
            "No students match your search."
        };
        return rsx! {
            p { class: "list-empty", "{message}" }
        };
    }

    let editing = dashboard.read().form().editing.clone();

    rsx! {
        table {
            class: "student-table",
            thead {
                tr {
                    th { "Name" }
                    th { "Email" }
                    th { class: "actions-col", span { class: "sr-only", "Actions" } }
                }
            }
            tbody {
                for student in page.rows {
                    tr {
                        key: "{student.id}",
                        class: if editing.as_deref() == Some(student.id.as_str()) { "row--editing" } else { "" },
                        td { "{student.name}" }
                        td { "{student.email}" }
                        td {
                            class: "actions-col",
                            button {
                                class: "icon-btn",
                                r#type: "button",
                                title: "Edit",
                                onclick: {
                                    let student = student.clone();
                                    move |_| dashboard.write().begin_edit(&student)
                                },
                                Icon { icon: FaPen, width: 14, height: 14 }
                            }
                            button {
                                class: "icon-btn icon-btn--danger",
                                r#type: "button",
                                title: "Delete",
                                onclick: {
                                    let id = student.id.clone();
                                    move |_| {
                                        dashboard.write().request_remove(&id);
                                    }
                                },
                                Icon { icon: FaTrashCan, width: 14, height: 14 }
                            }
                        }
                    }
                }
            }
        }
    }
}
