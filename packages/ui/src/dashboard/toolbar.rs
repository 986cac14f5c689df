use dioxus::prelude::*;
use store::{Dashboard, Debouncer, SortDirection, SortKey};

use crate::timer::sleep;

/// Search box and sort selectors.
///
/// The search text is echoed immediately but applied to the dashboard only
/// after the debounce delay has passed without further typing.
#[component]
pub fn Toolbar(mut dashboard: Signal<Dashboard>, mut debouncer: Signal<Debouncer>) -> Element {
    let mut search = use_signal(|| dashboard.peek().view_state().search.clone());

    let oninput = move |evt: FormEvent| {
        let value = evt.value();
        search.set(value.clone());
        let ticket = debouncer.write().schedule();
        let delay = debouncer.peek().delay();
        let task = spawn(async move {
            sleep(delay).await;
            if debouncer.write().fire(ticket) {
                dashboard.write().set_search(value);
            }
        });
        debouncer.write().set_pending(ticket, move || task.cancel());
    };

    let view = dashboard.read().view_state().clone();

    rsx! {
        div {
            class: "toolbar",
            input {
                class: "input search-input",
                r#type: "search",
                placeholder: "Search by name or email",
                aria_label: "Search students",
                value: "{search}",
                oninput: oninput,
            }
            label {
                class: "sort-label",
                "Sort by"
                select {
                    class: "select",
                    value: view.sort_key.as_str(),
                    onchange: move |evt: FormEvent| {
                        if let Some(key) = SortKey::parse(&evt.value()) {
                            dashboard.write().set_sort_key(key);
                        }
                    },
                    option { value: "name", "Name" }
                    option { value: "email", "Email" }
                }
            }
            select {
                class: "select",
                aria_label: "Sort direction",
                value: view.direction.as_str(),
                onchange: move |evt: FormEvent| {
                    if let Some(direction) = SortDirection::parse(&evt.value()) {
                        dashboard.write().set_sort_direction(direction);
                    }
                },
                option { value: "asc", "Ascending" }
                option { value: "desc", "Descending" }
            }
        }
    }
}
