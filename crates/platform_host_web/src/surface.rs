//! `<canvas>` overlay implementation of [`PixelSurface`].

use platform_host::{FramePlan, ObjectFit, PixelSurface, Size};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

const OVERLAY_STYLE: &str = "position:absolute;pointer-events:none;image-rendering:pixelated";

/// Draws pixelated frames of one `<img>` onto a sibling canvas laid over it.
pub struct CanvasPixelSurface {
    image: HtmlImageElement,
    overlay: Option<HtmlCanvasElement>,
    scratch: Option<HtmlCanvasElement>,
}

impl CanvasPixelSurface {
    /// Creates a surface for `image`. Nothing is inserted until the overlay is shown.
    pub fn new(image: HtmlImageElement) -> Self {
        Self {
            image,
            overlay: None,
            scratch: None,
        }
    }

    fn document(&self) -> Result<Document, String> {
        self.image
            .owner_document()
            .ok_or_else(|| "image has no owner document".to_string())
    }

    fn create_canvas(&self) -> Result<HtmlCanvasElement, String> {
        self.document()?
            .create_element("canvas")
            .map_err(|err| format!("create canvas failed: {err:?}"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "created element is not a canvas".to_string())
    }

    fn ensure_overlay(&mut self) -> Result<HtmlCanvasElement, String> {
        if let Some(overlay) = &self.overlay {
            return Ok(overlay.clone());
        }
        let overlay = self.create_canvas()?;
        overlay
            .set_attribute("style", OVERLAY_STYLE)
            .map_err(|err| format!("style overlay failed: {err:?}"))?;
        overlay
            .set_attribute("aria-hidden", "true")
            .map_err(|err| format!("style overlay failed: {err:?}"))?;
        let parent = self
            .image
            .parent_node()
            .ok_or_else(|| "image is detached".to_string())?;
        parent
            .insert_before(&overlay, self.image.next_sibling().as_ref())
            .map_err(|err| format!("insert overlay failed: {err:?}"))?;
        self.overlay = Some(overlay.clone());
        Ok(overlay)
    }

    fn ensure_scratch(&mut self) -> Result<HtmlCanvasElement, String> {
        if let Some(scratch) = &self.scratch {
            return Ok(scratch.clone());
        }
        let scratch = self.create_canvas()?;
        self.scratch = Some(scratch.clone());
        Ok(scratch)
    }

    /// Keeps the overlay glued to the image box, which may move between steps.
    fn align_overlay(&self, overlay: &HtmlCanvasElement) {
        let style = overlay.style();
        let rendered = self.rendered_size().unwrap_or_default();
        let _ = style.set_property("left", &format!("{}px", self.image.offset_left()));
        let _ = style.set_property("top", &format!("{}px", self.image.offset_top()));
        let _ = style.set_property("width", &format!("{}px", rendered.w));
        let _ = style.set_property("height", &format!("{}px", rendered.h));
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
    let context = canvas
        .get_context("2d")
        .map_err(|err| format!("2d context failed: {err:?}"))?
        .ok_or_else(|| "2d context unavailable".to_string())?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "context is not 2d".to_string())?;
    context.set_image_smoothing_enabled(false);
    Ok(context)
}

fn draw_error(stage: &str, err: JsValue) -> String {
    format!("{stage} draw failed: {err:?}")
}

impl PixelSurface for CanvasPixelSurface {
    fn rendered_size(&self) -> Option<Size> {
        if !self.image.is_connected() {
            return None;
        }
        let rect = self.image.get_bounding_client_rect();
        Some(Size::new(rect.width(), rect.height()))
    }

    fn natural_size(&self) -> Option<Size> {
        if !self.image.complete() {
            return None;
        }
        Some(Size::new(
            f64::from(self.image.natural_width()),
            f64::from(self.image.natural_height()),
        ))
    }

    fn object_fit(&self) -> ObjectFit {
        web_sys::window()
            .and_then(|window| window.get_computed_style(&self.image).ok().flatten())
            .and_then(|style| style.get_property_value("object-fit").ok())
            .map(|value| ObjectFit::from_css(&value))
            .unwrap_or_default()
    }

    fn show_overlay(&mut self) {
        let Ok(overlay) = self.ensure_overlay() else {
            return;
        };
        self.align_overlay(&overlay);
        let _ = self.image.style().set_property("opacity", "0");
    }

    fn draw(&mut self, frame: &FramePlan) -> Result<(), String> {
        let overlay = self.ensure_overlay()?;
        let scratch = self.ensure_scratch()?;
        self.align_overlay(&overlay);

        scratch.set_width(frame.small.0);
        scratch.set_height(frame.small.1);
        let small = context_2d(&scratch)?;
        let (src, dst) = (frame.source, frame.small_dest);
        small.clear_rect(0.0, 0.0, f64::from(frame.small.0), f64::from(frame.small.1));
        small
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &self.image,
                src.x,
                src.y,
                src.w,
                src.h,
                dst.x,
                dst.y,
                dst.w,
                dst.h,
            )
            .map_err(|err| draw_error("downscale", err))?;

        overlay.set_width(frame.canvas.0);
        overlay.set_height(frame.canvas.1);
        let visible = context_2d(&overlay)?;
        let (width, height) = (f64::from(frame.canvas.0), f64::from(frame.canvas.1));
        visible.clear_rect(0.0, 0.0, width, height);
        visible
            .draw_image_with_html_canvas_element_and_dw_and_dh(&scratch, 0.0, 0.0, width, height)
            .map_err(|err| draw_error("upscale", err))
    }

    fn reveal(&mut self) {
        if let Some(overlay) = self.overlay.take() {
            overlay.remove();
        }
        self.scratch = None;
        let _ = self.image.style().remove_property("opacity");
    }
}
