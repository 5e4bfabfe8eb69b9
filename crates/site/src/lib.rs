//! Portfolio site rendered as a retro desktop.
//!
//! Pages emit the canvas/placeholder/window markup; [`retro::RetroWindowsProvider`] attaches the
//! browser runtime from `platform_host_web` on mount and detaches it on cleanup.

mod content;
mod pages;
pub mod retro;
mod web_app;

pub use content::{filter_projects, find_project, Project, PROJECTS};
pub use web_app::{SiteApp, SITE_TITLE};

/// Installs the panic hook and console logging, then mounts [`SiteApp`] on `<body>`.
#[cfg(all(feature = "csr", target_arch = "wasm32"))]
pub fn mount() {
    console_error_panic_hook::set_once();
    platform_host_web::init_console_logging();
    leptos::mount_to_body(|| leptos::view! { <SiteApp /> })
}
