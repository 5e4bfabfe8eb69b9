//! Leptos adapter for the retro window runtime and the markup it expects.

use leptos::*;
use leptos_router::use_location;
use retro_windows::GridScope;

/// Handle to the attached runtime, provided by [`RetroWindowsProvider`].
#[derive(Debug, Clone, Copy)]
pub struct RetroWindows {
    attached: RwSignal<bool>,
}

impl RetroWindows {
    /// Whether the browser runtime attached successfully.
    pub fn is_attached(self) -> ReadSignal<bool> {
        self.attached.read_only()
    }

    /// Docks (`true`) or re-floats and re-scatters (`false`) every window, after the current
    /// render has reached the DOM.
    pub fn set_grid_mode(self, on: bool) {
        request_animation_frame(move || {
            if let Err(err) = platform_host_web::rescan() {
                logging::warn!("retro windows rescan failed: {err}");
                return;
            }
            if let Err(err) = platform_host_web::set_grid_mode(GridScope::All, on) {
                logging::warn!("retro windows grid mode failed: {err}");
            }
        });
    }

    /// Throws every window back onto the desk at fresh positions.
    pub fn rescatter(self) {
        if let Err(err) = platform_host_web::rescatter() {
            logging::warn!("retro windows rescatter failed: {err}");
        }
    }
}

/// Returns the [`RetroWindows`] handle.
///
/// # Panics
///
/// Panics if called outside [`RetroWindowsProvider`].
pub fn use_retro_windows() -> RetroWindows {
    use_context::<RetroWindows>().expect("RetroWindows not provided")
}

fn attach_or_rescan(attached: RwSignal<bool>) {
    if platform_host_web::is_attached() {
        if let Err(err) = platform_host_web::rescan() {
            logging::warn!("retro windows rescan failed: {err}");
        }
        return;
    }
    match platform_host_web::config_from_document().and_then(platform_host_web::attach) {
        Ok(()) => attached.set(true),
        Err(err) => logging::warn!("retro windows attach failed: {err}"),
    }
}

/// Attaches the runtime once the first page is in the DOM, rescans on every route change, and
/// detaches on cleanup. Must sit inside the router.
#[component]
pub fn RetroWindowsProvider(children: Children) -> impl IntoView {
    let attached = create_rw_signal(false);
    provide_context(RetroWindows { attached });

    let location = use_location();
    create_effect(move |_| {
        location.pathname.with(|_| ());
        request_animation_frame(move || attach_or_rescan(attached));
    });
    on_cleanup(platform_host_web::detach);

    children().into_view()
}

/// Layout container whose windows float and scatter. Images inside it are pixelation candidates.
#[component]
pub fn RetroCanvas(
    #[prop(optional, into)] label: Option<String>,
    children: Children,
) -> impl IntoView {
    view! {
        <section
            class="retro-canvas"
            aria-label=label
            data-retro-canvas=""
            data-pixelate-root=""
        >
            {children()}
        </section>
    }
}

/// One draggable window inside its grid placeholder.
#[component]
pub fn RetroWindow(
    #[prop(into)] title: String,
    #[prop(optional, into)] hidden: MaybeSignal<bool>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="retro-placeholder" data-retro-placeholder="" class:is-filtered=move || hidden.get()>
            <article class="retro-window" data-retro-window="">
                <header class="retro-window__bar" data-retro-drag-handle="">
                    <span class="retro-window__title">{title}</span>
                    <button
                        type="button"
                        class="retro-window__close"
                        aria-label="Close window"
                        data-retro-close=""
                    >
                        "x"
                    </button>
                </header>
                <div class="retro-window__body">{children()}</div>
                <div class="retro-window__resize" aria-hidden="true" data-retro-resize=""></div>
            </article>
        </div>
    }
}

/// Image revealed with the pixelation effect unless `no_pixelate` is set.
#[component]
pub fn PixelImage(
    #[prop(into)] src: String,
    #[prop(into)] alt: String,
    #[prop(optional)] no_pixelate: bool,
) -> impl IntoView {
    view! {
        <span class="pixel-frame">
            <img
                src=src
                alt=alt
                loading="lazy"
                decoding="async"
                data-no-pixelate=no_pixelate.then_some("")
            />
        </span>
    }
}
