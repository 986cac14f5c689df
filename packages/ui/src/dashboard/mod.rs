//! # Student dashboard screen
//!
//! [`DashboardView`] owns a `Signal<Dashboard>` and wires it to the server:
//!
//! - on mount it fetches the dashboard configuration, subscribes to the change
//!   feed and loads the list;
//! - each remote operation runs the controller's begin / run / finish steps,
//!   so no signal borrow is held across an await;
//! - notices are cleared by a timer once their TTL has passed.
//!
//! The child components only render controller state and forward events.

use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::*;
use store::clock::now_millis;
use store::{ChangeEvent, Dashboard, Debouncer, DashboardConfig};

use crate::table::ApiTable;
use crate::timer::sleep;

mod confirm;
mod form;
mod list;
mod notice;
mod pagination;
mod toolbar;

pub use confirm::ConfirmDeleteDialog;
pub use form::StudentFormPanel;
pub use list::StudentList;
pub use notice::NoticeBanner;
pub use pagination::Pagination;
pub use toolbar::Toolbar;

/// Reload the whole list from the backend.
pub async fn reload(mut dashboard: Signal<Dashboard>) {
    let request = dashboard.write().begin_load();
    let result = request.run(&ApiTable).await;
    dashboard.write().finish_load(result);
    schedule_notice_expiry(dashboard);
}

/// Clear the current notice once it expires.
pub fn schedule_notice_expiry(mut dashboard: Signal<Dashboard>) {
    let Some(expires_at) = dashboard.peek().notice().map(|n| n.expires_at_ms) else {
        return;
    };
    let wait = (expires_at - now_millis()).max(0) as u64;
    spawn(async move {
        sleep(Duration::from_millis(wait)).await;
        dashboard.write().expire_notice(now_millis());
    });
}

#[component]
pub fn DashboardView() -> Element {
    let mut dashboard = use_signal(Dashboard::default);
    let mut debouncer = use_signal(|| {
        Debouncer::new(DashboardConfig::default().search_debounce())
    });

    // Held for the lifetime of the screen; dropping it stops the feed.
    let _subscription = use_hook(move || {
        let on_change = Rc::new(move |event: &ChangeEvent| {
            let mut dashboard = dashboard;
            dashboard.write().on_remote_change(event.clone());
        });
        let on_resync = Rc::new(move || {
            spawn(reload(dashboard));
        });
        Rc::new(ApiTable.subscribe_with_resync(on_change, on_resync))
    });

    use_future(move || async move {
        match api::get_dashboard_config().await {
            Ok(config) => {
                dashboard.write().apply_config(&config);
                debouncer.write().set_delay(config.search_debounce());
            }
            Err(e) => tracing::warn!("using default dashboard config: {e}"),
        }
        reload(dashboard).await;
    });

    let page = dashboard.read().derived_view();

    rsx! {
        section {
            class: "dashboard",
            NoticeBanner { dashboard }
            StudentFormPanel { dashboard }
            div {
                class: "roster",
                Toolbar { dashboard, debouncer }
                StudentList { dashboard, page: page.clone() }
                Pagination { dashboard, page }
            }
            ConfirmDeleteDialog { dashboard }
        }
    }
}
