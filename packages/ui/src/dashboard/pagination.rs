use dioxus::prelude::*;
use store::{Dashboard, PageView};

#[component]
pub fn Pagination(mut dashboard: Signal<Dashboard>, page: PageView) -> Element {
    rsx! {
        nav {
            class: "pagination",
            aria_label: "Pagination",
            button {
                class: "btn",
                r#type: "button",
                disabled: !page.has_prev(),
                onclick: move |_| dashboard.write().prev_page(),
                "Previous"
            }
            span {
                class: "page-info",
                "Page {page.page} of {page.total_pages} · {page.filtered_count} students"
            }
            button {
                class: "btn",
                r#type: "button",
                disabled: !page.has_next(),
                onclick: move |_| dashboard.write().next_page(),
                "Next"
            }
        }
    }
}
