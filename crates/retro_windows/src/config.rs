//! Engine configuration.
//!
//! Every field has a default so a partial JSON object (or none at all) yields a usable config.
//! The bounds group is the single source of overflow and padding margins for drag, float and
//! scatter clamping.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::scatter::ScatterMode;

/// Deepest pixelation accepted by [`EngineConfig::validate`]; `2^16` already reduces any
/// on-screen image to a single block.
pub const MAX_PIXELATE_STEPS: u32 = 16;

/// Upper bound for every pixelation timing field, in milliseconds.
pub const MAX_PIXELATE_DURATION_MS: u32 = 60_000;

/// Margins that bound where a window may sit relative to its canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    /// How far a window may extend past the left/right canvas edges.
    pub allow_overflow_x: f64,
    /// How far a window may extend past the top/bottom canvas edges.
    pub allow_overflow_y: f64,
    /// Inset from the left/right edges applied to scattered windows.
    pub safe_side_padding: f64,
    /// Inset from the bottom edge applied to scattered windows, keeping footer chrome clear.
    pub safe_bottom_padding: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            allow_overflow_x: 60.0,
            allow_overflow_y: 80.0,
            safe_side_padding: 8.0,
            safe_bottom_padding: 48.0,
        }
    }
}

/// Scatter ("messy desktop") parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Scatter every canvas when the engine mounts.
    pub enabled_on_load: bool,
    /// Narrowest scattered window width.
    pub min_width: f64,
    /// Widest scattered window width, further capped by the canvas.
    pub max_width: f64,
    /// Horizontal jitter magnitude; offsets are drawn from `[-jitter_x, jitter_x]`.
    pub jitter_x: f64,
    /// Vertical jitter magnitude; offsets are drawn from `[-jitter_y, jitter_y]`.
    pub jitter_y: f64,
    /// Lowest z-index handed out by scatter.
    pub min_z: i32,
    /// Highest z-index handed out by scatter.
    pub max_z: i32,
    /// Seed string for reproducible layouts. `None` reseeds on every call.
    pub seed: Option<String>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            enabled_on_load: true,
            min_width: 260.0,
            max_width: 420.0,
            jitter_x: 80.0,
            jitter_y: 60.0,
            min_z: 1,
            max_z: 40,
            seed: None,
        }
    }
}

impl ScatterConfig {
    /// Seeded mode for a non-empty seed, random otherwise.
    pub fn mode(&self) -> ScatterMode {
        match &self.seed {
            Some(seed) if !seed.is_empty() => ScatterMode::Seeded(seed.clone()),
            _ => ScatterMode::Random,
        }
    }
}

/// Resize floor for user resizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Narrowest width a user resize can reach.
    pub min_width: f64,
    /// Lowest height a user resize can reach.
    pub min_height: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            min_width: 200.0,
            min_height: 100.0,
        }
    }
}

/// Float/dock layer behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Float windows into the overlay layer when the engine mounts.
    pub float_on_load: bool,
    /// Quiet period before a viewport resize triggers a reflow.
    pub reflow_debounce_ms: u32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            float_on_load: true,
            reflow_debounce_ms: 150,
        }
    }
}

/// Pixelation reveal parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelateConfig {
    /// Master switch for the reveal.
    pub enabled: bool,
    /// Number of halvings in the most pixelated frame.
    pub steps: u32,
    /// Target duration of the whole reveal.
    pub total_duration_ms: u32,
    /// Lower bound of each per-step delay; the upper bound is derived from it.
    pub min_step_delay_ms: u32,
    /// Delay between viewport entry and the first animation step.
    pub settle_delay_ms: u32,
    /// Intersection ratio that counts as visible.
    pub threshold: f64,
    /// Look-ahead margin so the reveal starts slightly before the image is on screen.
    pub look_ahead_px: u32,
    /// Skip the effect entirely when the host prefers reduced motion.
    pub respect_reduced_motion: bool,
}

impl Default for PixelateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            steps: 5,
            total_duration_ms: 900,
            min_step_delay_ms: 60,
            settle_delay_ms: 120,
            threshold: 0.05,
            look_ahead_px: 120,
            respect_reduced_motion: true,
        }
    }
}

impl PixelateConfig {
    /// Intersection observer root margin, e.g. `"120px 0px"`.
    pub fn root_margin(&self) -> String {
        format!("{}px 0px", self.look_ahead_px)
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Overflow and padding margins.
    pub bounds: BoundsConfig,
    /// Scatter layout.
    pub scatter: ScatterConfig,
    /// Resize floor.
    pub drag: DragConfig,
    /// Float/dock layer.
    pub layer: LayerConfig,
    /// Pixelation reveal.
    pub pixelate: PixelateConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON config object.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] for malformed JSON or inconsistent ranges.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| EngineError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects inverted or negative ranges and pixelation settings past the step and timing caps.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        let scatter = &self.scatter;
        if scatter.min_width <= 0.0 || scatter.min_width > scatter.max_width {
            return Err(EngineError::InvalidConfig(format!(
                "scatter width range {}..{} is empty",
                scatter.min_width, scatter.max_width
            )));
        }
        if scatter.min_z > scatter.max_z {
            return Err(EngineError::InvalidConfig(format!(
                "scatter z range {}..{} is empty",
                scatter.min_z, scatter.max_z
            )));
        }
        if scatter.jitter_x < 0.0 || scatter.jitter_y < 0.0 {
            return Err(EngineError::InvalidConfig(
                "scatter jitter must not be negative".to_string(),
            ));
        }
        let bounds = &self.bounds;
        if [
            bounds.allow_overflow_x,
            bounds.allow_overflow_y,
            bounds.safe_side_padding,
            bounds.safe_bottom_padding,
        ]
        .iter()
        .any(|value| *value < 0.0)
        {
            return Err(EngineError::InvalidConfig(
                "bounds margins must not be negative".to_string(),
            ));
        }
        if self.drag.min_width <= 0.0 || self.drag.min_height <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "resize floor must be positive".to_string(),
            ));
        }
        let pixelate = &self.pixelate;
        if pixelate.steps > MAX_PIXELATE_STEPS {
            return Err(EngineError::InvalidConfig(format!(
                "pixelate steps {} above {MAX_PIXELATE_STEPS}",
                pixelate.steps
            )));
        }
        for (field, value) in [
            ("total_duration_ms", pixelate.total_duration_ms),
            ("min_step_delay_ms", pixelate.min_step_delay_ms),
            ("settle_delay_ms", pixelate.settle_delay_ms),
        ] {
            if value > MAX_PIXELATE_DURATION_MS {
                return Err(EngineError::InvalidConfig(format!(
                    "pixelate {field} {value} above {MAX_PIXELATE_DURATION_MS}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.pixelate.threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "pixelate threshold {} outside 0..=1",
                self.pixelate.threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = EngineConfig::from_json(
            r#"{ "scatter": { "seed": "portfolio", "max_width": 500 }, "bounds": { "allow_overflow_x": 100 } }"#,
        )
        .expect("valid config");

        assert_eq!(config.scatter.seed.as_deref(), Some("portfolio"));
        assert_eq!(config.scatter.max_width, 500.0);
        assert_eq!(config.scatter.min_width, 260.0);
        assert_eq!(config.bounds.allow_overflow_x, 100.0);
        assert_eq!(config.bounds.allow_overflow_y, 80.0);
        assert_eq!(config.pixelate, PixelateConfig::default());
        assert_eq!(
            config.scatter.mode(),
            ScatterMode::Seeded("portfolio".to_string())
        );
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let err = EngineConfig::from_json(r#"{ "scatter": { "min_z": 9, "max_z": 2 } }"#)
            .expect_err("inverted z range");
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let err = EngineConfig::from_json("{ not json").expect_err("malformed");
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn oversized_pixelation_settings_are_rejected() {
        for raw in [
            r#"{ "pixelate": { "steps": 4294967295 } }"#,
            r#"{ "pixelate": { "steps": 17 } }"#,
            r#"{ "pixelate": { "steps": 0, "total_duration_ms": 4000000000 } }"#,
            r#"{ "pixelate": { "settle_delay_ms": 60001 } }"#,
        ] {
            let err = EngineConfig::from_json(raw).expect_err(raw);
            assert!(matches!(err, EngineError::InvalidConfig(_)), "{raw}");
        }

        let deepest = EngineConfig::from_json(
            r#"{ "pixelate": { "steps": 16, "total_duration_ms": 60000 } }"#,
        )
        .expect("caps are inclusive");
        assert_eq!(deepest.pixelate.steps, MAX_PIXELATE_STEPS);
    }

    #[test]
    fn default_bounds_are_the_canonical_margins() {
        assert_eq!(
            BoundsConfig::default(),
            BoundsConfig {
                allow_overflow_x: 60.0,
                allow_overflow_y: 80.0,
                safe_side_padding: 8.0,
                safe_bottom_padding: 48.0,
            }
        );
    }

    #[test]
    fn empty_seed_means_random_mode() {
        let config = ScatterConfig {
            seed: Some(String::new()),
            ..ScatterConfig::default()
        };
        assert_eq!(config.mode(), ScatterMode::Random);
        assert_eq!(PixelateConfig::default().root_margin(), "120px 0px");
    }
}
