use compact_str::{format_compact, CompactString};
use serde::Serialize;

/// Name used for the synthetic tile shown when an entity has no usable breakdown.
pub const NO_DATA_NAME: &str = "No data";

/// A single tile-to-be: one child of the flat treemap root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedLeaf {
    /// Stable identity across renders of the same logical entity (see [`canonical_key`]).
    pub key: CompactString,
    /// Display name.
    pub name: CompactString,
    /// Colour category. Equal to the group name; there is no separate taxonomy.
    pub category: CompactString,
    /// Non-negative weight. Zero is legal and collapses to a zero-area tile.
    pub value: f64,
}

impl NormalizedLeaf {
    /// Build a leaf from a display name, deriving key and category from it.
    /// Negative and non-finite values are clamped to zero.
    pub fn new(name: &str, value: f64) -> Self {
        let name = CompactString::new(name.trim());
        Self {
            key: leaf_key(&name),
            category: name.clone(),
            name,
            value: sanitize_value(value),
        }
    }

    /// The placeholder leaf used when nothing else can be rendered.
    pub fn no_data() -> Self {
        Self::new(NO_DATA_NAME, 1.0)
    }

    pub fn is_placeholder(&self) -> bool {
        self.key == canonical_key(NO_DATA_NAME)
    }
}

/// Root of a one-level treemap. Built fresh per selection; only its leaves carry identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Tree {
    pub name: CompactString,
    pub children: Vec<NormalizedLeaf>,
}

impl Tree {
    /// Build a tree from leaves, merging duplicates that share a key (values summed,
    /// first-seen name wins) so keys stay unique within the tree.
    pub fn from_leaves<I>(leaves: I) -> Self
    where
        I: IntoIterator<Item = NormalizedLeaf>,
    {
        let mut children: Vec<NormalizedLeaf> = Vec::new();
        for mut leaf in leaves {
            if leaf.key.is_empty() {
                leaf.key = leaf_key(&leaf.name);
                tracing::debug!("Leaf '{}' had no key, using '{}'", leaf.name, leaf.key);
            }
            match children.iter_mut().find(|c| c.key == leaf.key) {
                Some(existing) => existing.value += leaf.value,
                None => children.push(leaf),
            }
        }
        Self {
            name: CompactString::new("root"),
            children,
        }
    }

    /// A tree holding only the "no data" placeholder.
    pub fn no_data() -> Self {
        Self::from_leaves([NormalizedLeaf::no_data()])
    }

    /// Sum of leaf values.
    pub fn total(&self) -> f64 {
        self.children.iter().map(|c| c.value).sum()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// True when the tree has no leaf with a positive value.
    pub fn is_degenerate(&self) -> bool {
        self.total() <= 0.0
    }
}

/// Canonical token form of a name: lowercase alphanumerics (any script), with every
/// run of other characters collapsed to a single `_`. Leading/trailing separators are
/// dropped.
///
/// `"Computer and Mathematical"` → `"computer_and_mathematical"`, `"Éducation"` → `"éducation"`.
pub fn canonical_key(name: &str) -> CompactString {
    let mut key = CompactString::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    key
}

/// Key for a leaf. Names without a single alphanumeric (`"—"`, `"★★"`) are keyed by
/// their code points so they still get a stable, non-empty identity.
fn leaf_key(name: &str) -> CompactString {
    let key = canonical_key(name);
    if !key.is_empty() {
        return key;
    }
    let mut key = CompactString::new("u");
    for ch in name.chars().filter(|c| !c.is_whitespace()) {
        key.push_str(&format_compact!("_{:x}", ch as u32));
    }
    key
}

fn sanitize_value(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_collapses_separators_and_case() {
        assert_eq!(canonical_key("Computer and Mathematical"), "computer_and_mathematical");
        assert_eq!(
            canonical_key("Arts, Design, Entertainment, Sports, and Media"),
            "arts_design_entertainment_sports_and_media"
        );
        assert_eq!(canonical_key("  task -- ITERATION "), "task_iteration");
        assert_eq!(canonical_key("..."), "");
    }

    #[test]
    fn canonical_key_keeps_non_ascii_letters() {
        assert_eq!(canonical_key("日本語教育"), "日本語教育");
        assert_eq!(canonical_key("Éducation"), "éducation");
        assert_eq!(canonical_key("Straße & Verkehr"), "straße_verkehr");
    }

    #[test]
    fn symbol_only_names_still_get_a_key() {
        let leaf = NormalizedLeaf::new("★ ★", 2.0);
        assert_eq!(leaf.key, "u_2605_2605");
        assert_eq!(NormalizedLeaf::new("★★", 1.0).key, leaf.key);
        assert_ne!(NormalizedLeaf::new("—", 1.0).key, leaf.key);

        let tree = Tree::from_leaves([leaf, NormalizedLeaf::new("Sales", 2.0)]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.total(), 4.0);
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        assert_eq!(NormalizedLeaf::new("A", -4.0).value, 0.0);
        assert_eq!(NormalizedLeaf::new("A", f64::NAN).value, 0.0);
    }

    #[test]
    fn duplicate_keys_merge() {
        let tree = Tree::from_leaves([
            NormalizedLeaf::new("Sales", 2.0),
            NormalizedLeaf::new("sales", 3.0),
            NormalizedLeaf::new("Legal", 1.0),
        ]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children[0].name, "Sales");
        assert_eq!(tree.children[0].value, 5.0);
    }

    #[test]
    fn no_data_tree_is_single_placeholder() {
        let tree = Tree::no_data();
        assert_eq!(tree.len(), 1);
        assert!(tree.children[0].is_placeholder());
        assert_eq!(tree.total(), 1.0);
    }
}
