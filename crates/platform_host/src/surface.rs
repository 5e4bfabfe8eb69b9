//! Drawing contract for the pixelation reveal effect.

use std::{cell::RefCell, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size};

/// How an image's content box maps natural pixels onto its rendered box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectFit {
    /// Stretch to the rendered box (`fill` and anything unrecognised).
    #[default]
    Fill,
    /// Scale up and crop to cover the box.
    Cover,
    /// Scale down and letterbox inside the box.
    Contain,
}

impl ObjectFit {
    /// Parses a computed `object-fit` value.
    pub fn from_css(value: &str) -> Self {
        match value.trim() {
            "cover" => Self::Cover,
            "contain" => Self::Contain,
            _ => Self::Fill,
        }
    }
}

/// One nearest-neighbour double-resample: natural image -> small canvas -> visible overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePlan {
    /// Downscale factor is `2^exponent`.
    pub exponent: u32,
    /// Backing size of the visible overlay canvas.
    pub canvas: (u32, u32),
    /// Backing size of the temporary downscale canvas.
    pub small: (u32, u32),
    /// Region of the natural image that is sampled.
    pub source: Rect,
    /// Where the sampled region lands inside the temporary canvas.
    pub small_dest: Rect,
}

/// Per-image drawing target owned by one pixelation session.
pub trait PixelSurface {
    /// Current rendered (CSS) size of the image box.
    fn rendered_size(&self) -> Option<Size>;

    /// Natural image dimensions; `None` until decoded.
    fn natural_size(&self) -> Option<Size>;

    /// Computed `object-fit` of the image.
    fn object_fit(&self) -> ObjectFit;

    /// Creates or resizes the overlay canvas and hides the image underneath it.
    fn show_overlay(&mut self);

    /// Draws one frame. Errors are per-frame and never fatal.
    fn draw(&mut self, frame: &FramePlan) -> Result<(), String>;

    /// Removes the overlay and shows the image at full opacity.
    fn reveal(&mut self);
}

/// Events recorded by [`RecordingPixelSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The image was hidden behind the overlay.
    OverlayShown,
    /// A frame was drawn.
    Drew(FramePlan),
    /// Drawing the frame with this exponent failed.
    DrawFailed(u32),
    /// The overlay was removed and the image shown.
    Revealed,
}

#[derive(Debug, Default)]
struct RecordingState {
    rendered: Option<Size>,
    natural: Option<Size>,
    fit: ObjectFit,
    failures_left: usize,
    events: Vec<SurfaceEvent>,
}

/// Test surface that records every call. Clones share state so a test can keep a handle while
/// the session owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingPixelSurface {
    inner: Rc<RefCell<RecordingState>>,
}

impl RecordingPixelSurface {
    /// Surface reporting the given sizes and fit.
    pub fn new(rendered: Size, natural: Size, fit: ObjectFit) -> Self {
        let surface = Self::default();
        {
            let mut state = surface.inner.borrow_mut();
            state.rendered = Some(rendered);
            state.natural = Some(natural);
            state.fit = fit;
        }
        surface
    }

    /// Changes the size reported for the next measurement.
    pub fn set_rendered_size(&self, size: Size) {
        self.inner.borrow_mut().rendered = Some(size);
    }

    /// Makes the next `count` draws fail.
    pub fn fail_next_draws(&self, count: usize) {
        self.inner.borrow_mut().failures_left = count;
    }

    /// Every call recorded so far.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.inner.borrow().events.clone()
    }

    /// Exponents of every successful draw, in order.
    pub fn drawn_exponents(&self) -> Vec<u32> {
        self.inner
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Drew(frame) => Some(frame.exponent),
                _ => None,
            })
            .collect()
    }
}

impl PixelSurface for RecordingPixelSurface {
    fn rendered_size(&self) -> Option<Size> {
        self.inner.borrow().rendered
    }

    fn natural_size(&self) -> Option<Size> {
        self.inner.borrow().natural
    }

    fn object_fit(&self) -> ObjectFit {
        self.inner.borrow().fit
    }

    fn show_overlay(&mut self) {
        self.inner.borrow_mut().events.push(SurfaceEvent::OverlayShown);
    }

    fn draw(&mut self, frame: &FramePlan) -> Result<(), String> {
        let mut state = self.inner.borrow_mut();
        if state.failures_left > 0 {
            state.failures_left -= 1;
            state.events.push(SurfaceEvent::DrawFailed(frame.exponent));
            return Err("image not decodable yet".to_string());
        }
        state.events.push(SurfaceEvent::Drew(*frame));
        Ok(())
    }

    fn reveal(&mut self) {
        self.inner.borrow_mut().events.push(SurfaceEvent::Revealed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_fit_parses_computed_values() {
        assert_eq!(ObjectFit::from_css("cover"), ObjectFit::Cover);
        assert_eq!(ObjectFit::from_css(" contain "), ObjectFit::Contain);
        assert_eq!(ObjectFit::from_css("scale-down"), ObjectFit::Fill);
    }

    #[test]
    fn recording_surface_fails_the_requested_number_of_draws() {
        let mut surface = RecordingPixelSurface::new(
            Size::new(100.0, 100.0),
            Size::new(200.0, 200.0),
            ObjectFit::Fill,
        );
        let frame = FramePlan {
            exponent: 2,
            canvas: (100, 100),
            small: (25, 25),
            source: Rect::new(0.0, 0.0, 200.0, 200.0),
            small_dest: Rect::new(0.0, 0.0, 25.0, 25.0),
        };
        surface.fail_next_draws(1);

        assert!(surface.draw(&frame).is_err());
        assert!(surface.draw(&frame).is_ok());
        assert_eq!(surface.drawn_exponents(), vec![2]);
    }
}
