use std::{
    cell::{Cell, RefCell, RefMut},
    rc::{Rc, Weak},
};

use platform_host::{
    entropy_seed, Point, TimerHost, CLOSE_CONTROL_ATTR, DRAG_HANDLE_ATTR, NO_PIXELATE_ATTR,
    PIXELATE_ROOT_ATTR, RESIZE_HANDLE_ATTR, WINDOW_ID_ATTR, WINDOW_MARKER_ATTR,
};
use retro_windows::{
    Debouncer, EngineError, InteractionEffect, PixelateConfig, PixelationDriver,
    PresentationEngine,
};
use tracing::warn;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Element, Event, EventTarget, HtmlImageElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, Node, PointerEvent, ResizeObserver,
    ResizeObserverEntry,
};

use super::*;
use crate::dom_tree::DomElementTree;
use crate::gesture::{click_action, pointer_action, PointerPhase, PointerTarget};
use crate::surface::CanvasPixelSurface;
use crate::timer::WebTimerHost;
use crate::visibility::SeenRoots;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
const LINK_SELECTOR: &str = "a[href]";

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
}

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;
type ResizeCallback = Closure<dyn FnMut(js_sys::Array, ResizeObserver)>;

/// Event listener that unregisters itself when dropped.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn add(
        target: &EventTarget,
        kind: &'static str,
        capture: bool,
        once: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, String> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_capture(capture);
        options.set_once(once);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|err| format!("add {kind} listener failed: {err:?}"))?;
        Ok(Self {
            target: target.clone(),
            kind,
            capture,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

struct ImageBinding {
    image: HtmlImageElement,
    root: Element,
    opted_out: bool,
    visible: bool,
    driver: PixelationDriver<CanvasPixelSurface>,
    _on_load: Option<Listener>,
}

/// State reachable from event callbacks. Callbacks hold it weakly.
struct Shared {
    engine: RefCell<PresentationEngine>,
    tree: RefCell<DomElementTree>,
    images: RefCell<Vec<ImageBinding>>,
    seen_roots: RefCell<SeenRoots<Element>>,
    timers: Rc<dyn TimerHost>,
    reduced_motion: bool,
    /// Set once a `ResizeObserver` tracks image boxes; otherwise viewport resizes redraw.
    images_observed: Cell<bool>,
}

impl Shared {
    fn borrow_both(
        &self,
    ) -> Result<(RefMut<'_, PresentationEngine>, RefMut<'_, DomElementTree>), String> {
        let engine = self
            .engine
            .try_borrow_mut()
            .map_err(|_| "engine busy".to_string())?;
        let tree = self
            .tree
            .try_borrow_mut()
            .map_err(|_| "element tree busy".to_string())?;
        Ok((engine, tree))
    }

    fn pixelate_config(&self) -> PixelateConfig {
        self.engine.borrow().config().pixelate.clone()
    }
}

struct Runtime {
    shared: Rc<Shared>,
    reflow: Rc<Debouncer>,
    observer: Option<IntersectionObserver>,
    _observer_callback: Option<ObserverCallback>,
    resize_observer: Option<ResizeObserver>,
    _resize_callback: Option<ResizeCallback>,
    _listeners: Vec<Listener>,
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.reflow.cancel();
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
        if let Some(observer) = &self.resize_observer {
            observer.disconnect();
        }
        if let Ok(mut images) = self.shared.images.try_borrow_mut() {
            for binding in images.drain(..) {
                binding.driver.teardown();
            }
        }
    }
}

fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

fn marker(name: &str) -> String {
    format!("[{name}]")
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

/// Resolves the event target against the window markup.
fn pointer_target(event: &Event) -> PointerTarget {
    let Some(element) = event_element(event) else {
        return PointerTarget::default();
    };
    let Some(window) = closest(&element, &marker(WINDOW_MARKER_ATTR)) else {
        return PointerTarget::default();
    };
    let inside = |selector: &str| {
        closest(&element, selector)
            .is_some_and(|found| window.contains(Some(AsRef::<Node>::as_ref(&found))))
    };
    PointerTarget {
        window_id: window
            .get_attribute(WINDOW_ID_ATTR)
            .and_then(|value| retro_windows::WindowId::parse_attr(&value)),
        on_drag_handle: inside(&marker(DRAG_HANDLE_ATTR)),
        on_resize_handle: inside(&marker(RESIZE_HANDLE_ATTR)),
        on_close: inside(&marker(CLOSE_CONTROL_ATTR)),
        on_link: inside(LINK_SELECTOR),
    }
}

fn apply_effects(event: &Event, effects: &[InteractionEffect]) {
    let pointer_id = event.dyn_ref::<PointerEvent>().map(PointerEvent::pointer_id);
    for effect in effects {
        match effect {
            InteractionEffect::CancelNavigation => {
                event.prevent_default();
                event.stop_immediate_propagation();
            }
            InteractionEffect::CapturePointer => {
                event.prevent_default();
                if let (Some(element), Some(id)) = (event_element(event), pointer_id) {
                    let _ = element.set_pointer_capture(id);
                }
            }
            InteractionEffect::ReleasePointer => {
                if let (Some(element), Some(id)) = (event_element(event), pointer_id) {
                    let _ = element.release_pointer_capture(id);
                }
            }
        }
    }
}

fn on_pointer(shared: &Weak<Shared>, phase: PointerPhase, event: &Event) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
        return;
    };
    if phase == PointerPhase::Down && pointer.button() != 0 {
        return;
    }
    let position = Point::new(f64::from(pointer.client_x()), f64::from(pointer.client_y()));
    let target = match phase {
        PointerPhase::Down => pointer_target(event),
        PointerPhase::Move | PointerPhase::Up => PointerTarget::default(),
    };
    let Ok((mut engine, mut tree)) = shared.borrow_both() else {
        return;
    };
    let Some(action) = pointer_action(phase, &target, position, engine.interaction()) else {
        return;
    };
    match engine.dispatch(&mut *tree, action) {
        Ok(effects) => apply_effects(event, &effects),
        Err(err) => warn!(%err, "retro windows interaction failed"),
    }
}

fn on_click(shared: &Weak<Shared>, event: &Event) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let Some(action) = click_action(&pointer_target(event)) else {
        return;
    };
    let Ok((mut engine, mut tree)) = shared.borrow_both() else {
        return;
    };
    match engine.dispatch(&mut *tree, action) {
        Ok(effects) => apply_effects(event, &effects),
        Err(err) => warn!(%err, "retro windows interaction failed"),
    }
}

fn on_viewport_resize(shared: &Weak<Shared>) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    if let Ok((mut engine, mut tree)) = shared.borrow_both() {
        engine.reflow(&mut *tree);
    }
    if shared.images_observed.get() {
        return;
    }
    if let Ok(images) = shared.images.try_borrow() {
        for binding in images.iter() {
            binding.driver.on_resize();
        }
    }
}

fn on_intersection(shared: &Weak<Shared>, entries: &js_sys::Array) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let targets: Vec<Element> = entries
        .iter()
        .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
        .filter(IntersectionObserverEntry::is_intersecting)
        .map(|entry| entry.target())
        .collect();
    if let Ok(mut seen) = shared.seen_roots.try_borrow_mut() {
        for target in &targets {
            seen.mark(target);
        }
    }
    let Ok(mut images) = shared.images.try_borrow_mut() else {
        return;
    };
    for target in targets {
        for binding in images
            .iter_mut()
            .filter(|binding| binding.root.is_same_node(Some(AsRef::<Node>::as_ref(&target))))
        {
            binding.visible = true;
            binding.driver.on_visible();
        }
    }
}

/// Image boxes changed size: scatter width, grid toggles, filtering or a viewport resize.
fn on_image_resize(shared: &Weak<Shared>, entries: &js_sys::Array) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let Ok(images) = shared.images.try_borrow() else {
        return;
    };
    for entry in entries.iter() {
        let Ok(entry) = entry.dyn_into::<ResizeObserverEntry>() else {
            continue;
        };
        let target = entry.target();
        let target: &Node = &target;
        for binding in images
            .iter()
            .filter(|binding| binding.image.is_same_node(Some(target)))
        {
            binding.driver.on_resize();
        }
    }
}

fn on_image_loaded(shared: &Weak<Shared>, image: &HtmlImageElement) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let Ok(images) = shared.images.try_borrow() else {
        return;
    };
    let image: &Node = image;
    if let Some(binding) = images
        .iter()
        .find(|binding| binding.image.is_same_node(Some(image)))
    {
        binding
            .driver
            .on_loaded(binding.opted_out, shared.reduced_motion);
        if binding.visible {
            binding.driver.on_visible();
        }
    }
}

fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|window| window.match_media(REDUCED_MOTION_QUERY).ok().flatten())
        .is_some_and(|query| query.matches())
}

fn build_observer(
    shared: &Rc<Shared>,
    config: &PixelateConfig,
) -> Result<(IntersectionObserver, ObserverCallback), String> {
    let weak = Rc::downgrade(shared);
    let callback: ObserverCallback = Closure::new(
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            on_intersection(&weak, &entries)
        },
    );
    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config.threshold));
    options.set_root_margin(&config.root_margin());
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(|err| format!("intersection observer failed: {err:?}"))?;
    Ok((observer, callback))
}

fn build_resize_observer(shared: &Rc<Shared>) -> Result<(ResizeObserver, ResizeCallback), String> {
    let weak = Rc::downgrade(shared);
    let callback: ResizeCallback =
        Closure::new(move |entries: js_sys::Array, _observer: ResizeObserver| {
            on_image_resize(&weak, &entries)
        });
    let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|err| format!("resize observer failed: {err:?}"))?;
    Ok((observer, callback))
}

/// Creates drivers for images not seen before and drops bindings whose image left the page.
fn bind_images(runtime: &Runtime) {
    let shared = &runtime.shared;
    let config = shared.pixelate_config();
    let candidates = shared
        .tree
        .borrow()
        .select_all(None, &format!("[{PIXELATE_ROOT_ATTR}] img"));
    let Ok(mut images) = shared.images.try_borrow_mut() else {
        return;
    };

    images.retain(|binding| {
        let connected = binding.image.is_connected();
        if !connected {
            binding.driver.teardown();
            if let Some(observer) = &runtime.resize_observer {
                observer.unobserve(&binding.image);
            }
        }
        connected
    });
    let Ok(mut seen) = shared.seen_roots.try_borrow_mut() else {
        return;
    };
    seen.retain(|root| root.is_connected());

    let mut fresh = Vec::new();
    for candidate in candidates {
        let Ok(image) = candidate.dyn_into::<HtmlImageElement>() else {
            continue;
        };
        let image_node: &Node = &image;
        if images
            .iter()
            .any(|binding| binding.image.is_same_node(Some(image_node)))
        {
            continue;
        }
        let Some(root) = closest(&image, &marker(PIXELATE_ROOT_ATTR)) else {
            continue;
        };
        let opted_out = closest(&image, &marker(NO_PIXELATE_ATTR)).is_some();
        let driver = PixelationDriver::new(
            CanvasPixelSurface::new(image.clone()),
            config.clone(),
            Rc::clone(&shared.timers),
            entropy_seed(),
        );

        let on_load = if opted_out || image.complete() {
            driver.on_loaded(opted_out, shared.reduced_motion);
            None
        } else {
            let weak = Rc::downgrade(shared);
            let loaded = image.clone();
            Listener::add(&image, "load", false, true, move |_| {
                on_image_loaded(&weak, &loaded)
            })
            .map_err(|err| warn!(%err, "pixelation load listener failed"))
            .ok()
        };

        // The root may already be on screen, in which case the observer will not report it again.
        let visible = seen.starts_on_bind(&root, opted_out);
        if visible {
            driver.on_visible();
        }
        if !opted_out {
            if let Some(observer) = &runtime.observer {
                observer.observe(&root);
            }
            if let Some(observer) = &runtime.resize_observer {
                observer.observe(&image);
            }
        }
        fresh.push(ImageBinding {
            image,
            root,
            opted_out,
            visible,
            driver,
            _on_load: on_load,
        });
    }
    images.extend(fresh);
}

fn install_listeners(
    shared: &Rc<Shared>,
    reflow: &Rc<Debouncer>,
) -> Result<Vec<Listener>, String> {
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
    let document: EventTarget = shared.tree.borrow().document().clone().into();

    let mut listeners = Vec::new();
    for (kind, phase) in [
        ("pointerdown", PointerPhase::Down),
        ("pointermove", PointerPhase::Move),
        ("pointerup", PointerPhase::Up),
        ("pointercancel", PointerPhase::Up),
    ] {
        let weak = Rc::downgrade(shared);
        listeners.push(Listener::add(&document, kind, false, false, move |event| {
            on_pointer(&weak, phase, &event)
        })?);
    }

    let weak = Rc::downgrade(shared);
    listeners.push(Listener::add(&document, "click", true, false, move |event| {
        on_click(&weak, &event)
    })?);

    let weak = Rc::downgrade(shared);
    let debouncer = Rc::downgrade(reflow);
    listeners.push(Listener::add(&window, "resize", false, false, move |_| {
        if let Some(debouncer) = debouncer.upgrade() {
            let weak = weak.clone();
            debouncer.call(move || on_viewport_resize(&weak));
        }
    })?);
    Ok(listeners)
}

pub fn config_script_text() -> Option<String> {
    web_sys::window()?
        .document()?
        .get_element_by_id(CONFIG_SCRIPT_ID)?
        .text_content()
}

pub fn attach(config: EngineConfig) -> Result<(), String> {
    if is_attached() {
        return rescan().map(|_| ());
    }
    let mut tree = DomElementTree::from_window()?;
    let mut engine = PresentationEngine::new(config).map_err(|err| err.to_string())?;
    engine.mount(&mut tree);

    let pixelate = engine.config().pixelate.clone();
    let reflow_ms = engine.config().layer.reflow_debounce_ms;
    let timers: Rc<dyn TimerHost> = Rc::new(WebTimerHost);
    let shared = Rc::new(Shared {
        engine: RefCell::new(engine),
        tree: RefCell::new(tree),
        images: RefCell::new(Vec::new()),
        seen_roots: RefCell::new(SeenRoots::default()),
        timers: Rc::clone(&timers),
        reduced_motion: prefers_reduced_motion(),
        images_observed: Cell::new(false),
    });
    let reflow = Rc::new(Debouncer::new(timers, reflow_ms));
    let listeners = install_listeners(&shared, &reflow)?;
    let (observer, observer_callback) = match build_observer(&shared, &pixelate) {
        Ok((observer, callback)) => (Some(observer), Some(callback)),
        Err(err) => {
            warn!(%err, "pixelation disabled: no intersection observer");
            (None, None)
        }
    };
    let (resize_observer, resize_callback) = match build_resize_observer(&shared) {
        Ok((observer, callback)) => {
            shared.images_observed.set(true);
            (Some(observer), Some(callback))
        }
        Err(err) => {
            warn!(%err, "image resizes fall back to viewport resize events");
            (None, None)
        }
    };

    let runtime = Runtime {
        shared,
        reflow,
        observer,
        _observer_callback: observer_callback,
        resize_observer,
        _resize_callback: resize_callback,
        _listeners: listeners,
    };
    bind_images(&runtime);
    RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime));
    Ok(())
}

pub fn detach() {
    let runtime = RUNTIME.with(|slot| slot.borrow_mut().take());
    drop(runtime);
}

pub fn is_attached() -> bool {
    RUNTIME.with(|slot| slot.borrow().is_some())
}

fn with_runtime<R>(run: impl FnOnce(&Runtime) -> Result<R, String>) -> Result<R, String> {
    RUNTIME.with(|slot| {
        let slot = slot.borrow();
        let runtime = slot
            .as_ref()
            .ok_or_else(|| "retro window runtime is not attached".to_string())?;
        run(runtime)
    })
}

pub fn rescan() -> Result<RescanReport, String> {
    with_runtime(|runtime| {
        let report = {
            let (mut engine, mut tree) = runtime.shared.borrow_both()?;
            engine.rescan(&mut *tree)
        };
        bind_images(runtime);
        Ok(report)
    })
}

pub fn rescatter() -> Result<(), String> {
    with_runtime(|runtime| {
        let (mut engine, mut tree) = runtime.shared.borrow_both()?;
        engine.rescatter_all(&mut *tree);
        Ok(())
    })
}

pub fn set_grid_mode(scope: GridScope, on: bool) -> Result<(), String> {
    with_runtime(|runtime| {
        let (mut engine, mut tree) = runtime.shared.borrow_both()?;
        let errors = engine.set_grid_mode(&mut *tree, scope, on);
        match errors
            .into_iter()
            .find(|err| matches!(err, EngineError::CanvasNotFound(_)))
        {
            Some(err) => Err(err.to_string()),
            None => Ok(()),
        }
    })
}

pub fn float_window(window_id: WindowId) -> Result<(), String> {
    with_runtime(|runtime| {
        let (mut engine, mut tree) = runtime.shared.borrow_both()?;
        engine
            .float_window(&mut *tree, window_id)
            .map_err(|err| err.to_string())
    })
}

pub fn dock_window(window_id: WindowId) -> Result<(), String> {
    with_runtime(|runtime| {
        let (mut engine, mut tree) = runtime.shared.borrow_both()?;
        engine
            .dock_window(&mut *tree, window_id)
            .map_err(|err| err.to_string())
    })
}

pub fn snapshot() -> Result<StoreSnapshot, String> {
    with_runtime(|runtime| {
        let engine = runtime
            .shared
            .engine
            .try_borrow()
            .map_err(|_| "engine busy".to_string())?;
        Ok(engine.snapshot())
    })
}
