//! Tunable constants for the flipbook engine.
//!
//! Every field has a default matching the reference behavior; callers may load
//! overrides from JSON and from a small set of `FLIPBOOK_*` environment variables.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Root configuration object.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FlipbookConfig {
    pub gesture: GestureConfig,
    pub curl: CurlConfig,
    pub animation: AnimationConfig,
    pub layout: LayoutConfig,
    pub palette: PaletteConfig,
    pub audio: AudioConfig,
}

/// Gesture classification and release decision.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Width of the leading/trailing edge zone as a fraction of page width.
    pub edge_zone_fraction: f64,
    /// Progress above which a released drag completes the flip.
    pub complete_threshold: f64,
    /// How far the fold midpoint may sit outside the page box.
    pub clamp_margin: f64,
    /// Pointer offset from the corner used by programmatic navigation.
    pub nav_start_offset: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            edge_zone_fraction: 0.30,
            complete_threshold: 0.18,
            clamp_margin: 30.0,
            nav_start_offset: 3.0,
        }
    }
}

/// Curvature heuristic parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CurlConfig {
    /// Peak curvature as a fraction of page width.
    pub curvature_scale: f64,
    /// Curvature at or below which the fold boundary stays a straight line.
    pub curve_threshold: f64,
}

impl Default for CurlConfig {
    fn default() -> Self {
        Self {
            curvature_scale: 0.06,
            curve_threshold: 0.5,
        }
    }
}

/// Durations and targets of the three scheduled animations.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub complete_ms: f64,
    pub snap_back_ms: f64,
    pub hint_ms: f64,
    /// Delay between session start and the hint peek.
    pub hint_delay_ms: f64,
    /// Hint peak as fractions of page width and height.
    pub hint_peak: [f64; 2],
    /// Fraction of the hint duration spent travelling out to the peak.
    pub hint_split: f64,
    /// How far past the opposite edge a completing flip travels, as a fraction of width.
    pub complete_overshoot: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            complete_ms: 480.0,
            snap_back_ms: 320.0,
            hint_ms: 900.0,
            hint_delay_ms: 600.0,
            hint_peak: [0.78, 0.82],
            hint_split: 0.45,
            complete_overshoot: 0.35,
        }
    }
}

/// Page box fitting against the host viewport.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub desktop_width_fraction: f64,
    pub mobile_width_fraction: f64,
    /// Viewports at most this wide use the mobile fraction.
    pub mobile_breakpoint: f64,
    pub max_height_fraction: f64,
    pub min_page_width: f64,
    /// Aspect ratio used until the first page reports its own (A4 portrait).
    pub default_aspect_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            desktop_width_fraction: 0.85,
            mobile_width_fraction: 0.93,
            mobile_breakpoint: 768.0,
            max_height_fraction: 0.82,
            min_page_width: 260.0,
            default_aspect_ratio: 21.0 / 29.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Fill used where a page index is out of range.
    pub placeholder: Rgba8,
    /// Flat tint of the back of a curled page.
    pub paper_back: Rgba8,
    /// Fold edge stroke color; alpha is driven by progress.
    pub fold_edge: Rgba8,
    /// Surface clear color before the page box is drawn.
    pub clear: Option<Rgba8>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            placeholder: Rgba8::rgb(0xf5, 0xf0, 0xe8),
            paper_back: Rgba8::rgb(0xef, 0xe9, 0xdf),
            fold_edge: Rgba8::rgb(80, 70, 60),
            clear: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: 48_000,
        }
    }
}

impl FlipbookConfig {
    pub fn from_json_str(s: &str) -> FlipbookResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse flipbook config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> FlipbookResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FlipbookError::io(format!("failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Apply `FLIPBOOK_HINT_DELAY_MS`, `FLIPBOOK_AUDIO` and `FLIPBOOK_SAMPLE_RATE`.
    ///
    /// Unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ms) = lookup("FLIPBOOK_HINT_DELAY_MS")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
        {
            self.animation.hint_delay_ms = ms;
        }
        if let Some(enabled) = lookup("FLIPBOOK_AUDIO").and_then(|v| match v.trim() {
            "0" | "false" | "off" => Some(false),
            "1" | "true" | "on" => Some(true),
            _ => None,
        }) {
            self.audio.enabled = enabled;
        }
        if let Some(rate) = lookup("FLIPBOOK_SAMPLE_RATE")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            self.audio.sample_rate = rate;
        }
    }

    pub fn validate(&self) -> FlipbookResult<()> {
        fn unit(name: &str, v: f64) -> FlipbookResult<()> {
            if !(v.is_finite() && (0.0..=1.0).contains(&v)) {
                return Err(FlipbookError::validation(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
            Ok(())
        }
        fn non_negative(name: &str, v: f64) -> FlipbookResult<()> {
            if !(v.is_finite() && v >= 0.0) {
                return Err(FlipbookError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
            Ok(())
        }
        fn positive(name: &str, v: f64) -> FlipbookResult<()> {
            if !(v.is_finite() && v > 0.0) {
                return Err(FlipbookError::validation(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
            Ok(())
        }

        unit("gesture.edge_zone_fraction", self.gesture.edge_zone_fraction)?;
        unit("gesture.complete_threshold", self.gesture.complete_threshold)?;
        non_negative("gesture.clamp_margin", self.gesture.clamp_margin)?;
        non_negative("gesture.nav_start_offset", self.gesture.nav_start_offset)?;
        non_negative("curl.curvature_scale", self.curl.curvature_scale)?;
        non_negative("curl.curve_threshold", self.curl.curve_threshold)?;
        positive("animation.complete_ms", self.animation.complete_ms)?;
        positive("animation.snap_back_ms", self.animation.snap_back_ms)?;
        positive("animation.hint_ms", self.animation.hint_ms)?;
        non_negative("animation.hint_delay_ms", self.animation.hint_delay_ms)?;
        unit("animation.hint_peak[0]", self.animation.hint_peak[0])?;
        unit("animation.hint_peak[1]", self.animation.hint_peak[1])?;
        non_negative("animation.complete_overshoot", self.animation.complete_overshoot)?;
        if !(self.animation.hint_split > 0.0 && self.animation.hint_split < 1.0) {
            return Err(FlipbookError::validation(format!(
                "animation.hint_split must be within (0, 1), got {}",
                self.animation.hint_split
            )));
        }
        positive("layout.desktop_width_fraction", self.layout.desktop_width_fraction)?;
        positive("layout.mobile_width_fraction", self.layout.mobile_width_fraction)?;
        non_negative("layout.mobile_breakpoint", self.layout.mobile_breakpoint)?;
        positive("layout.max_height_fraction", self.layout.max_height_fraction)?;
        positive("layout.min_page_width", self.layout.min_page_width)?;
        positive("layout.default_aspect_ratio", self.layout.default_aspect_ratio)?;
        if self.audio.sample_rate == 0 {
            return Err(FlipbookError::validation("audio.sample_rate must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
