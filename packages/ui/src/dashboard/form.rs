use dioxus::prelude::*;
use store::{Dashboard, SubmitOutcome};

use crate::table::ApiTable;

use super::schedule_notice_expiry;

/// Create / edit form. Field errors stay until the field is corrected.
#[component]
pub fn StudentFormPanel(mut dashboard: Signal<Dashboard>) -> Element {
    let onsubmit = move |evt: FormEvent| async move {
        evt.prevent_default();
        // Invalid input and busy submits are reflected in the dashboard state.
        let Ok(request) = dashboard.write().begin_submit() else {
            return;
        };
        let result = request.run(&ApiTable).await;
        if let SubmitOutcome::Created(student) | SubmitOutcome::Updated(student) =
            dashboard.write().finish_submit(result)
        {
            tracing::info!(id = %student.id, "student saved");
        }
        schedule_notice_expiry(dashboard);
    };

    let (form, errors, submitting) = {
        let state = dashboard.read();
        (
            state.form().clone(),
            state.field_errors().clone(),
            state.is_submitting(),
        )
    };

    let editing = form.is_editing();
    let submit_label = match (editing, submitting) {
        (_, true) => "Saving...",
        (true, false) => "Update student",
        (false, false) => "Add student",
    };

    rsx! {
        form {
            class: "student-form",
            novalidate: true,
            onsubmit: onsubmit,

            h2 { if editing { "Edit student" } else { "Add student" } }

            div {
                class: "field",
                label { r#for: "student-name", "Name" }
                input {
                    id: "student-name",
                    class: if errors.name.is_some() { "input input--invalid" } else { "input" },
                    r#type: "text",
                    placeholder: "Ada Lovelace",
                    value: "{form.name}",
                    oninput: move |evt: FormEvent| dashboard.write().set_name(evt.value()),
                }
                if let Some(error) = errors.name {
                    p { class: "field-error", "{error}" }
                }
            }

            div {
                class: "field",
                label { r#for: "student-email", "Email" }
                input {
                    id: "student-email",
                    class: if errors.email.is_some() { "input input--invalid" } else { "input" },
                    r#type: "email",
                    placeholder: "ada@example.com",
                    value: "{form.email}",
                    oninput: move |evt: FormEvent| dashboard.write().set_email(evt.value()),
                }
                if let Some(error) = errors.email {
                    p { class: "field-error", "{error}" }
                }
            }

            div {
                class: "form-actions",
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting,
                    "{submit_label}"
                }
                if editing {
                    button {
                        class: "btn",
                        r#type: "button",
                        disabled: submitting,
                        onclick: move |_| dashboard.write().cancel_edit(),
                        "Cancel"
                    }
                }
            }
        }
    }
}
