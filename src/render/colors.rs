use std::collections::HashMap;
use std::fmt;

use compact_str::CompactString;
use serde::{Serialize, Serializer};
use vello::peniko::Color;

/// Pastel palette cycled through in first-seen category order.
pub const PALETTE: [u32; 14] = [
    0xcde7f0, 0xe6acbe, 0xe8f7bf, 0xbcd7b4, 0xf5b7a6, 0xc8d3ff, 0xb3c7e6, 0xe9e0d3, 0xc7f0e6,
    0xdbd7f0, 0xf2c28b, 0xd4d8f7, 0xf1d5e5, 0xc9eadf,
];

/// Occupational groups seen across the job-group feeds, plus the catch-all.
/// Seeding the domain with these keeps their colours identical across datasets.
pub const DEFAULT_CATEGORIES: [&str; 15] = [
    "Computer and Mathematical",
    "Arts, Design, Entertainment, Sports, and Media",
    "Office and Administrative Support",
    "Educational Instruction and Library",
    "Life, Physical, and Social",
    "Community and Social Service",
    "Sales and Related",
    "Farming, Fishing, and Forestry",
    "Management",
    "Business and Financial Operations",
    "Architecture and Engineering",
    "Production",
    "Legal",
    "Healthcare Practitioners and Technical",
    "Other",
];

/// An opaque sRGB colour token (`0xRRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorToken(pub u32);

impl ColorToken {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }

    /// Convert to vello's peniko Color with the given alpha.
    pub fn to_peniko(self, alpha: f32) -> Color {
        let (r, g, b) = self.rgb();
        Color::new([
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            alpha.clamp(0.0, 1.0),
        ])
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xFF_FFFF)
    }
}

impl Serialize for ColorToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordinal mapping from category names to palette slots.
///
/// The domain only ever grows: it is the union of every category observed, in
/// first-seen order, so a category that disappears and later returns keeps its colour.
/// Once there are more categories than palette entries, colours repeat.
#[derive(Debug, Clone, Default)]
pub struct ColorDomain {
    order: Vec<CompactString>,
    index: HashMap<CompactString, usize>,
}

impl ColorDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A domain pre-populated with [`DEFAULT_CATEGORIES`].
    pub fn seeded() -> Self {
        let mut domain = Self::new();
        domain.observe(DEFAULT_CATEGORIES);
        domain
    }

    /// Add any unseen categories, preserving first-seen order. Returns how many were new.
    pub fn observe<I, S>(&mut self, categories: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.order.len();
        for category in categories {
            self.slot(category.as_ref());
        }
        self.order.len() - before
    }

    /// Colour for `category`, registering it if it has not been seen yet.
    pub fn color_for(&mut self, category: &str) -> ColorToken {
        let slot = self.slot(category);
        ColorToken(PALETTE[slot % PALETTE.len()])
    }

    /// Colour for an already-registered category, without mutating the domain.
    pub fn peek(&self, category: &str) -> Option<ColorToken> {
        self.index
            .get(category)
            .map(|&slot| ColorToken(PALETTE[slot % PALETTE.len()]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|c| c.as_str())
    }

    fn slot(&mut self, category: &str) -> usize {
        if let Some(&slot) = self.index.get(category) {
            return slot;
        }
        let slot = self.order.len();
        let name = CompactString::new(category);
        self.order.push(name.clone());
        self.index.insert(name, slot);
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_survive_category_churn() {
        let mut domain = ColorDomain::new();
        let a = domain.color_for("directive");
        let b = domain.color_for("learning");
        assert_ne!(a, b);

        // A render that only has "learning" plus a newcomer must not reshuffle.
        domain.observe(["learning", "validation"]);
        assert_eq!(domain.color_for("learning"), b);
        // "directive" retired for a render and comes back with its original colour.
        assert_eq!(domain.color_for("directive"), a);
        assert_eq!(domain.len(), 3);
    }

    #[test]
    fn palette_wraps() {
        let mut domain = ColorDomain::new();
        let first = domain.color_for("c0");
        for i in 1..PALETTE.len() {
            domain.color_for(&format!("c{i}"));
        }
        assert_eq!(domain.color_for("overflow"), first);
    }

    #[test]
    fn seeded_domain_is_stable() {
        let domain = ColorDomain::seeded();
        assert_eq!(domain.peek("Computer and Mathematical"), Some(ColorToken(PALETTE[0])));
        assert_eq!(domain.peek("Other"), Some(ColorToken(PALETTE[0])));
        assert_eq!(domain.peek("unknown"), None);
    }

    #[test]
    fn token_formats_as_hex() {
        assert_eq!(ColorToken(0xcde7f0).to_string(), "#cde7f0");
        assert_eq!(ColorToken(0x0000ff).rgb(), (0, 0, 255));
    }
}
