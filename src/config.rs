use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::layout::LayoutConfig;
use crate::render::easing::Easing;

/// Every tunable of the engine and its collaborators. Missing fields in a config
/// file fall back to [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Padding, canvas floor and squarify ratio.
    pub layout: LayoutConfig,
    /// Enter/update transition length (ms)
    pub update_duration_ms: u32,
    /// Exit shrink length (ms)
    pub exit_duration_ms: u32,
    /// Per-tile delay step (ms). Cosmetic only.
    pub stagger_ms: u32,
    pub easing: Easing,
    /// Tile corner radius used by the reference painter (px)
    pub corner_radius: f32,
    /// Names longer than this many characters get an ellipsis.
    pub name_char_budget: usize,
    /// Maximum entries in the topic side list
    pub topic_limit: usize,
    /// Topic text longer than this is cut with "..."
    pub topic_text_budget: usize,
    pub topic_fade_ms: u32,
    /// Quiet window before a burst of resize events triggers one relayout (ms)
    pub resize_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            update_duration_ms: 620,
            exit_duration_ms: 420,
            stagger_ms: 6,
            easing: Easing::CubicInOut,
            corner_radius: 6.0,
            name_char_budget: 48,
            topic_limit: 10,
            topic_text_budget: 80,
            topic_fade_ms: 420,
            resize_debounce_ms: 100,
        }
    }
}

impl EngineConfig {
    /// Load overrides from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Clamp values that would break layout (negative padding, zero floors).
    pub fn sanitized(mut self) -> Self {
        let layout = &mut self.layout;
        layout.padding = layout.padding.max(0.0);
        layout.min_width = layout.min_width.max(1.0);
        layout.min_height = layout.min_height.max(1.0);
        if layout.ratio.is_nan() || layout.ratio < 1.0 {
            layout.ratio = 1.0;
        }
        self.name_char_budget = self.name_char_budget.max(4);
        self
    }
}
