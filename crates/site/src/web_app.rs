use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::pages::{HomeDesktop, ProjectDetail, ProjectIndex};
use crate::retro::RetroWindowsProvider;

/// Document title shown in the browser tab.
pub const SITE_TITLE: &str = "Retro Desk Portfolio";

/// Root component: meta tags, router, the retro window runtime and the page routes.
#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text=SITE_TITLE />
        <Meta name="description" content="Projects laid out on a retro desktop." />

        <Router>
            <RetroWindowsProvider>
                <main class="site-root">
                    <nav class="site-nav">
                        <A href="/">"Desktop"</A>
                        <A href="/projects">"Projects"</A>
                    </nav>
                    <Routes>
                        <Route path="" view=HomeDesktop />
                        <Route path="/projects" view=ProjectIndex />
                        <Route path="/projects/:slug" view=ProjectDetail />
                    </Routes>
                </main>
            </RetroWindowsProvider>
        </Router>
    }
}
