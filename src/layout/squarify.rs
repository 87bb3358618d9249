/// An axis-aligned box in layout space (f64 until the final pixel rounding).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Positioned {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Positioned {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Shrink by `pad` on every side; an axis that would invert collapses to its midpoint.
    pub fn inset(self, pad: f64) -> Self {
        let (mut x0, mut y0, mut x1, mut y1) =
            (self.x0 + pad, self.y0 + pad, self.x1 - pad, self.y1 - pad);
        if x1 < x0 {
            x0 = (x0 + x1) / 2.0;
            x1 = x0;
        }
        if y1 < y0 {
            y0 = (y0 + y1) / 2.0;
            y1 = y0;
        }
        Self { x0, y0, x1, y1 }
    }

    /// Clamp into `[0, width] × [0, height]`.
    pub fn clamp_to(self, width: f64, height: f64) -> Self {
        Self {
            x0: self.x0.clamp(0.0, width),
            y0: self.y0.clamp(0.0, height),
            x1: self.x1.clamp(0.0, width),
            y1: self.y1.clamp(0.0, height),
        }
    }
}

/// Squarified layout over `values`, which must already be sorted descending.
///
/// Rows are grown greedily while the worst aspect ratio in the row keeps improving.
/// A row is laid along the shorter side of the remaining space, so orientation flips
/// as the remainder changes shape. Returns one box per value, in input order.
pub(crate) fn squarify(values: &[f64], ratio: f64, bounds: Positioned) -> Vec<Positioned> {
    let n = values.len();
    let mut result = vec![Positioned::default(); n];
    let Positioned { mut x0, mut y0, x1, y1 } = bounds;
    let mut remaining: f64 = values.iter().sum();
    let mut i0 = 0;

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Everything left is zero-valued (values are sorted) or the space is gone:
        // collapse the tail onto the current corner.
        if values[i0] <= 0.0 || remaining <= 0.0 || dx <= 0.0 || dy <= 0.0 {
            for slot in &mut result[i0..] {
                *slot = Positioned::new(x0, y0, x0, y0);
            }
            break;
        }

        let mut row_sum = values[i0];
        let mut min_value = row_sum;
        let mut max_value = row_sum;
        let alpha = (dy / dx).max(dx / dy) / (remaining * ratio);
        let mut min_ratio = worst_aspect_ratio(row_sum, min_value, max_value, alpha);
        let mut i1 = i0 + 1;

        while i1 < n {
            let value = values[i1];
            let sum = row_sum + value;
            let lo = min_value.min(value);
            let hi = max_value.max(value);
            let score = worst_aspect_ratio(sum, lo, hi, alpha);
            if score > min_ratio {
                break;
            }
            row_sum = sum;
            min_value = lo;
            max_value = hi;
            min_ratio = score;
            i1 += 1;
        }

        let last_row = i1 == n;
        if dx < dy {
            // Horizontal strip across the top of a tall remainder.
            let y_edge = if last_row { y1 } else { y0 + dy * row_sum / remaining };
            dice(&values[i0..i1], row_sum, x0, y0, x1, y_edge, &mut result[i0..i1]);
            y0 = y_edge;
        } else {
            // Vertical strip down the left of a wide remainder.
            let x_edge = if last_row { x1 } else { x0 + dx * row_sum / remaining };
            slice(&values[i0..i1], row_sum, x0, y0, x_edge, y1, &mut result[i0..i1]);
            x0 = x_edge;
        }

        remaining -= row_sum;
        i0 = i1;
    }

    result
}

/// Worst aspect ratio of a candidate row, in the normalized form where
/// `alpha` folds in the strip length and the remaining total.
fn worst_aspect_ratio(sum: f64, min_value: f64, max_value: f64, alpha: f64) -> f64 {
    let beta = sum * sum * alpha;
    if min_value <= 0.0 || beta <= 0.0 {
        return f64::INFINITY;
    }
    (max_value / beta).max(beta / min_value)
}

/// Partition `[x0, x1]` left to right in proportion to `row`.
fn dice(row: &[f64], row_sum: f64, x0: f64, y0: f64, x1: f64, y1: f64, out: &mut [Positioned]) {
    let k = if row_sum > 0.0 { (x1 - x0) / row_sum } else { 0.0 };
    let mut x = x0;
    for (slot, &value) in out.iter_mut().zip(row) {
        let next = x + value * k;
        *slot = Positioned::new(x, y0, next, y1);
        x = next;
    }
    // Close the row exactly on its edge so neighbours round to the same pixel.
    if let Some(last) = out.last_mut() {
        last.x1 = x1;
    }
}

/// Partition `[y0, y1]` top to bottom in proportion to `row`.
fn slice(row: &[f64], row_sum: f64, x0: f64, y0: f64, x1: f64, y1: f64, out: &mut [Positioned]) {
    let k = if row_sum > 0.0 { (y1 - y0) / row_sum } else { 0.0 };
    let mut y = y0;
    for (slot, &value) in out.iter_mut().zip(row) {
        let next = y + value * k;
        *slot = Positioned::new(x0, y, x1, next);
        y = next;
    }
    if let Some(last) = out.last_mut() {
        last.y1 = y1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(p: &Positioned) -> f64 {
        (p.x1 - p.x0) * (p.y1 - p.y0)
    }

    #[test]
    fn single_item_fills_viewport_without_axis_swap() {
        let rects = squarify(&[5.0], 1.0, Positioned::new(0.0, 0.0, 1920.0, 1080.0));
        assert_eq!(rects.len(), 1);
        let r = rects[0];
        assert!((r.x1 - 1920.0).abs() < 1e-9);
        assert!((r.y1 - 1080.0).abs() < 1e-9);
    }

    #[test]
    fn layout_preserves_area_for_simple_case() {
        let values = [400.0, 300.0, 200.0, 100.0];
        let rects = squarify(&values, 1.0, Positioned::new(0.0, 0.0, 50.0, 20.0));
        let total_out: f64 = rects.iter().map(area).sum();
        assert!((total_out - 1000.0).abs() < 1e-6);
        for (r, v) in rects.iter().zip(values) {
            assert!((area(r) - v).abs() < 1e-6, "{r:?} should have area {v}");
        }
    }

    #[test]
    fn wide_canvas_splits_along_width_first() {
        let rects = squarify(&[3.0, 1.0], 1.0, Positioned::new(0.0, 0.0, 400.0, 200.0));
        assert_eq!(rects[0], Positioned::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(rects[1], Positioned::new(300.0, 0.0, 400.0, 200.0));
    }

    #[test]
    fn zero_tail_collapses() {
        let rects = squarify(&[2.0, 0.0, 0.0], 1.0, Positioned::new(0.0, 0.0, 100.0, 100.0));
        assert!((area(&rects[0]) - 10_000.0).abs() < 1e-9);
        assert_eq!(area(&rects[1]), 0.0);
        assert_eq!(area(&rects[2]), 0.0);
    }

    #[test]
    fn clamp_keeps_collapsed_tail_on_canvas() {
        let p = Positioned::new(403.0, -3.0, 403.0, -3.0).inset(3.0).clamp_to(400.0, 200.0);
        assert_eq!(p, Positioned::new(400.0, 0.0, 400.0, 0.0));
    }

    #[test]
    fn inset_collapses_to_midpoint() {
        let p = Positioned::new(10.0, 0.0, 12.0, 50.0).inset(3.0);
        assert_eq!(p.x0, 11.0);
        assert_eq!(p.x1, 11.0);
        assert_eq!(p.y0, 3.0);
        assert_eq!(p.y1, 47.0);
    }
}
