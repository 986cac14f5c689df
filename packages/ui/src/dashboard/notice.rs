use dioxus::prelude::*;
use store::{Dashboard, NoticeLevel};

#[component]
pub fn NoticeBanner(mut dashboard: Signal<Dashboard>) -> Element {
    let Some(notice) = dashboard.read().notice().cloned() else {
        return rsx! {};
    };
    let class = match notice.level {
        NoticeLevel::Success => "notice notice--success",
        NoticeLevel::Error => "notice notice--error",
    };

    rsx! {
        div {
            class: class,
            role: if notice.level == NoticeLevel::Error { "alert" } else { "status" },
            span { "{notice.message}" }
            button {
                class: "notice-close",
                r#type: "button",
                aria_label: "Dismiss",
                onclick: move |_| dashboard.write().dismiss_notice(),
                "×"
            }
        }
    }
}
