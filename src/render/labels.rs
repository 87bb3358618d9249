use compact_str::CompactString;
use serde::Serialize;

use crate::layout::Rect;

/// Which text a tile shows, chosen from its final geometry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelMode {
    /// Name on the first line, percentage below, left-aligned near the top.
    NameAndPercent,
    /// Percentage only, left-aligned.
    Percent,
    /// Percentage only, centred in the tile.
    PercentCentered,
    Hidden,
}

impl LabelMode {
    /// Strict thresholds: a 141×71 tile gets the full label, 140×71 does not.
    pub fn for_size(w: f32, h: f32) -> Self {
        if w > 140.0 && h > 70.0 {
            LabelMode::NameAndPercent
        } else if w > 80.0 && h > 40.0 {
            LabelMode::Percent
        } else if w > 54.0 && h > 32.0 {
            LabelMode::PercentCentered
        } else {
            LabelMode::Hidden
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
}

/// A positioned line of label text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLine {
    pub text: CompactString,
    pub x: f32,
    pub y: f32,
    pub anchor: TextAnchor,
}

/// Resolved label for one tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub mode: LabelMode,
    pub name: Option<LabelLine>,
    pub percent: Option<LabelLine>,
}

impl Label {
    pub fn hidden() -> Self {
        Self {
            mode: LabelMode::Hidden,
            name: None,
            percent: None,
        }
    }

    /// Flattened text ("name\npct", "pct" or "").
    pub fn text(&self) -> String {
        let parts: Vec<&str> = [&self.name, &self.percent]
            .into_iter()
            .flatten()
            .map(|line| line.text.as_str())
            .collect();
        parts.join("\n")
    }
}

/// Horizontal inset of start-aligned labels (px)
const TEXT_INSET: f32 = 8.0;

/// Decide label mode, text and anchor points for a tile's final rectangle.
pub fn label_for(rect: &Rect, name: &str, pct: f64, name_budget: usize) -> Label {
    let (w, h) = (rect.width(), rect.height());
    let mode = LabelMode::for_size(w, h);

    let tx = rect.x0 + TEXT_INSET;
    let name_y = (rect.y0 + 18.0).min(rect.y0 + 16.0_f32.max(h - 16.0));
    let pct_y = (name_y + 16.0).min(rect.y0 + h - 6.0);
    let pct_text = format_pct(pct);

    let line = |text: CompactString, x: f32, y: f32, anchor: TextAnchor| LabelLine { text, x, y, anchor };

    match mode {
        LabelMode::NameAndPercent => Label {
            mode,
            name: Some(line(truncate_name(name, name_budget), tx, name_y, TextAnchor::Start)),
            percent: Some(line(pct_text, tx, pct_y, TextAnchor::Start)),
        },
        LabelMode::Percent => Label {
            mode,
            name: None,
            percent: Some(line(pct_text, tx, name_y, TextAnchor::Start)),
        },
        LabelMode::PercentCentered => {
            let (cx, cy) = rect.center();
            Label {
                mode,
                name: None,
                percent: Some(line(pct_text, cx, cy, TextAnchor::Middle)),
            }
        }
        LabelMode::Hidden => Label::hidden(),
    }
}

/// `0.1234` → `"12.3%"`.
pub fn format_pct(fraction: f64) -> CompactString {
    let pct = if fraction.is_finite() { fraction * 100.0 } else { 0.0 };
    compact_str::format_compact!("{:.1}%", pct)
}

/// Cut names over `budget` characters to `budget - 3` characters plus an ellipsis.
pub fn truncate_name(name: &str, budget: usize) -> CompactString {
    if name.chars().count() <= budget {
        return CompactString::new(name);
    }
    let keep = budget.saturating_sub(3);
    let mut out: CompactString = name.chars().take(keep).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_boundaries_are_strict() {
        assert_eq!(LabelMode::for_size(141.0, 71.0), LabelMode::NameAndPercent);
        assert_eq!(LabelMode::for_size(140.0, 71.0), LabelMode::Percent);
        assert_eq!(LabelMode::for_size(141.0, 70.0), LabelMode::Percent);
        assert_eq!(LabelMode::for_size(81.0, 41.0), LabelMode::Percent);
        assert_eq!(LabelMode::for_size(80.0, 41.0), LabelMode::PercentCentered);
        assert_eq!(LabelMode::for_size(55.0, 33.0), LabelMode::PercentCentered);
        assert_eq!(LabelMode::for_size(54.0, 33.0), LabelMode::Hidden);
        assert_eq!(LabelMode::for_size(0.0, 0.0), LabelMode::Hidden);
    }

    #[test]
    fn full_label_positions() {
        let label = label_for(&Rect::new(10.0, 20.0, 210.0, 120.0), "Legal", 0.125, 48);
        assert_eq!(label.mode, LabelMode::NameAndPercent);
        let name = label.name.as_ref().unwrap();
        assert_eq!(name.text, "Legal");
        assert_eq!((name.x, name.y), (18.0, 38.0));
        let pct = label.percent.as_ref().unwrap();
        assert_eq!(pct.text, "12.5%");
        assert_eq!(pct.y, 54.0);
        assert_eq!(label.text(), "Legal\n12.5%");
    }

    #[test]
    fn centered_label_sits_on_centroid() {
        let label = label_for(&Rect::new(0.0, 0.0, 60.0, 40.0), "Sales", 0.02, 48);
        assert_eq!(label.mode, LabelMode::PercentCentered);
        let pct = label.percent.unwrap();
        assert_eq!((pct.x, pct.y, pct.anchor), (30.0, 20.0, TextAnchor::Middle));
        assert_eq!(pct.text, "2.0%");
    }

    #[test]
    fn hidden_label_has_no_text() {
        let label = label_for(&Rect::new(0.0, 0.0, 20.0, 20.0), "Sales", 0.02, 48);
        assert_eq!(label, Label::hidden());
        assert_eq!(label.text(), "");
    }

    #[test]
    fn long_names_get_ellipsis() {
        let long = "Provide comprehensive software development assistance across domains";
        let cut = truncate_name(long, 48);
        assert_eq!(cut.chars().count(), 46);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate_name("short", 48), "short");
    }
}
