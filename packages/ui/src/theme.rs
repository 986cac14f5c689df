//! Light/dark theme: persisted in `localStorage` under `theme` and applied as
//! a `data-theme` attribute on the document element.

use dioxus::prelude::*;
use store::theme::THEME_STORAGE_KEY;
use store::Theme;

use crate::icons::{FaMoon, FaSun};
use crate::Icon;

pub type ThemeSignal = Signal<Theme>;

/// Read the saved theme; anything missing or unknown is the default.
pub fn load_theme_from_storage() -> Theme {
    #[cfg(target_arch = "wasm32")]
    {
        let saved = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(THEME_STORAGE_KEY).ok().flatten());
        if let Some(saved) = saved {
            match saved.parse() {
                Ok(theme) => return theme,
                Err(e) => tracing::debug!("ignoring saved theme: {e}"),
            }
        }
    }
    Theme::default()
}

pub fn save_theme(theme: Theme) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(THEME_STORAGE_KEY, theme.as_str());
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::trace!(key = THEME_STORAGE_KEY, %theme, "theme not persisted off the web");
    }
}

pub fn apply_theme(theme: Theme) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = theme;
    }
}

/// Load the saved theme, apply it and share it as a [`ThemeSignal`].
#[component]
pub fn ThemeProvider(children: Element) -> Element {
    let theme: ThemeSignal = use_signal(load_theme_from_storage);

    use_effect(move || apply_theme(theme()));
    use_context_provider(|| theme);

    rsx! {
        {children}
    }
}

#[component]
pub fn ThemeToggle() -> Element {
    let mut theme = use_context::<ThemeSignal>();
    let current = theme();
    let label = match current {
        Theme::Light => "Switch to dark theme",
        Theme::Dark => "Switch to light theme",
    };

    rsx! {
        button {
            class: "icon-btn theme-toggle",
            r#type: "button",
            title: label,
            aria_label: label,
            onclick: move |_| {
                let next = theme().toggled();
                save_theme(next);
                theme.set(next);
            },
            match current {
                Theme::Light => rsx! { Icon { icon: FaMoon, width: 16, height: 16 } },
                Theme::Dark => rsx! { Icon { icon: FaSun, width: 16, height: 16 } },
            }
        }
    }
}
