//! Shared UI for the student roster: auth screens, theme handling, the
//! server-backed table client and the dashboard components.

use dioxus::prelude::*;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub const DASHBOARD_CSS: Asset = asset!("/assets/dashboard.css");

mod auth;
pub use auth::{use_auth, AuthProvider, AuthScreen, AuthState, SignOutButton};

pub mod dashboard;
pub use dashboard::DashboardView;

mod modal;
pub use modal::ModalOverlay;

mod table;
pub use table::ApiTable;

mod theme;
pub use theme::{apply_theme, load_theme_from_storage, save_theme, ThemeProvider, ThemeSignal, ThemeToggle};

mod timer;
