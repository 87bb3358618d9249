mod squarify;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use self::squarify::{squarify, Positioned};
use crate::tree::{NormalizedLeaf, Tree};

/// Axis-aligned rectangle in canvas pixels. `x1 >= x0`, `y1 >= y0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Zero-area rectangle at this rectangle's centroid ("grow from center" start).
    pub fn collapsed_to_center(&self) -> Self {
        let (cx, cy) = self.center();
        Self::new(cx, cy, cx, cy)
    }

    /// Zero-area rectangle pinned at the top-left corner ("shrink in place" end).
    pub fn collapsed_to_origin(&self) -> Self {
        Self::new(self.x0, self.y0, self.x0, self.y0)
    }

    /// Linear interpolation between two rectangles, `t` in `[0, 1]`.
    pub fn lerp(&self, to: &Rect, t: f32) -> Self {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self::new(
            mix(self.x0, to.x0),
            mix(self.y0, to.y0),
            mix(self.x1, to.x1),
            mix(self.y1, to.y1),
        )
    }

    /// Strict interior intersection; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

/// A positioned tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutLeaf {
    pub key: CompactString,
    pub name: CompactString,
    pub category: CompactString,
    pub value: f64,
    /// `value / total`, where total is the tree's value sum.
    pub pct: f64,
    pub rect: Rect,
}

/// Canvas size after clamping to the configured floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    /// Round the reported container size to whole pixels and clamp it to the floor.
    /// Non-finite sizes (detached containers) are treated as zero.
    pub fn clamped(width: f32, height: f32, config: &LayoutConfig) -> Self {
        let floor = |v: f32, min: f32| {
            let v = if v.is_finite() { round_px(v as f64) as f32 } else { 0.0 };
            v.max(min)
        };
        Self {
            width: floor(width, config.min_width),
            height: floor(height, config.min_height),
        }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Configuration for treemap layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between adjacent tiles (px); the canvas edge gets none.
    pub padding: f32,
    /// Canvas floor (px)
    pub min_width: f32,
    pub min_height: f32,
    /// Target aspect ratio for squarified rows (1.0 = square-ish)
    pub ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 6.0,
            min_width: 200.0,
            min_height: 200.0,
            ratio: 1.0,
        }
    }
}

/// Lay out `tree` on a `width × height` canvas with `padding` between tiles, using
/// the default floor and ratio.
pub fn layout(tree: &Tree, width: f32, height: f32, padding: f32) -> Vec<LayoutLeaf> {
    let config = LayoutConfig {
        padding,
        ..LayoutConfig::default()
    };
    compute_layout(tree, width, height, &config)
}

/// Squarified layout of a flat tree.
///
/// Leaves come back sorted by descending value (ties by key), each rectangle rounded to
/// whole pixels. An empty or all-zero tree lays out the "no data" placeholder over the
/// whole canvas.
pub fn compute_layout(tree: &Tree, width: f32, height: f32, config: &LayoutConfig) -> Vec<LayoutLeaf> {
    let canvas = Canvas::clamped(width, height, config);
    if canvas.width != width || canvas.height != height {
        tracing::debug!(
            "Canvas {}x{} clamped to {}x{}",
            width,
            height,
            canvas.width,
            canvas.height
        );
    }

    let placeholder;
    let leaves: &[NormalizedLeaf] = if tree.is_degenerate() {
        tracing::debug!("Tree has no positive values ({} leaves); using placeholder", tree.len());
        placeholder = [NormalizedLeaf::no_data()];
        &placeholder
    } else {
        &tree.children
    };

    // Collect + sort by value descending (critical for good squarified layout)
    let mut order: Vec<&NormalizedLeaf> = leaves.iter().collect();
    order.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));

    let total: f64 = order.iter().map(|l| l.value).sum();
    let total = if total > 0.0 { total } else { 1.0 };

    // Inner padding: grow the tiling region by half a gap on every side, then shrink
    // each tile by the same amount. Outer edges land flush on the canvas.
    let half = (config.padding.max(0.0) / 2.0) as f64;
    let bounds = Positioned::new(-half, -half, canvas.width as f64 + half, canvas.height as f64 + half);
    let values: Vec<f64> = order.iter().map(|l| l.value).collect();
    let positioned = squarify(&values, config.ratio.max(1.0), bounds);

    let result: Vec<LayoutLeaf> = order
        .iter()
        .zip(positioned)
        .map(|(leaf, pos)| {
            let p = pos.inset(half).clamp_to(canvas.width as f64, canvas.height as f64);
            LayoutLeaf {
                key: leaf.key.clone(),
                name: leaf.name.clone(),
                category: leaf.category.clone(),
                value: leaf.value,
                pct: leaf.value / total,
                rect: Rect::new(
                    round_px(p.x0) as f32,
                    round_px(p.y0) as f32,
                    round_px(p.x1) as f32,
                    round_px(p.y1) as f32,
                ),
            }
        })
        .collect();

    tracing::debug!(
        "Laid out {} tiles in {:.0}x{:.0} (padding {})",
        result.len(),
        canvas.width,
        canvas.height,
        config.padding
    );
    result
}

/// Round half up to a whole pixel.
fn round_px(v: f64) -> f64 {
    (v + 0.5).floor()
}
