use compact_str::{format_compact, CompactString};
use serde::Serialize;
use serde_json::Value;

use super::shapes::{as_json_number, as_number, as_text, FieldShape};
use crate::tree::NormalizedLeaf;

/// Keys that mark a lone object as a topic.
pub(crate) const TOPIC_MARKERS: [&str; 3] = ["text", "share", "value"];

/// One row of the topic side list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicEntry {
    /// Stable id used to key the list's enter/exit transitions.
    pub id: CompactString,
    pub text: String,
    /// Pre-formatted share (`"12.7%"`), empty when the feed gave none.
    pub pct: CompactString,
    #[serde(skip)]
    pub share: Option<f64>,
}

impl TopicEntry {
    pub fn new(id: impl Into<CompactString>, text: impl Into<String>, share: Option<f64>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            pct: share.map(|s| format_compact!("{:.1}%", s)).unwrap_or_default(),
            share,
        }
    }

    /// Text cut to `budget` characters, with `...` appended when shortened.
    pub fn display_text(&self, budget: usize) -> String {
        if self.text.chars().count() <= budget {
            return self.text.clone();
        }
        let mut out: String = self.text.chars().take(budget).collect();
        out.push_str("...");
        out
    }
}

/// Topic entries from a `most_frequent_topics`-style field: sorted by share (largest
/// first, entries without a share last, ties in feed order), truncated to `limit`.
pub fn topic_entries(field: Option<&Value>, code: &str, limit: usize) -> Vec<TopicEntry> {
    let mut entries: Vec<TopicEntry> = FieldShape::inspect(field, &TOPIC_MARKERS)
        .items()
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| topic_entry(item, code, i))
        .collect();
    sort_by_share(&mut entries);
    entries.truncate(limit);
    entries
}

/// The topics as treemap leaves (the alternate facet). Only entries with a numeric
/// `share` or `value` qualify.
pub fn topic_leaves(field: Option<&Value>) -> Vec<NormalizedLeaf> {
    FieldShape::inspect(field, &TOPIC_MARKERS)
        .items()
        .into_iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            let text = as_text(map.get("text"))?;
            let value = as_json_number(map.get("share")).or_else(|| as_json_number(map.get("value")))?;
            Some(NormalizedLeaf::new(&text, value))
        })
        .collect()
}

pub(crate) fn sort_by_share(entries: &mut [TopicEntry]) {
    // Stable: equal shares keep feed order.
    entries.sort_by(|a, b| match (a.share, b.share) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

fn topic_entry(item: &Value, code: &str, index: usize) -> Option<TopicEntry> {
    let fallback_id = || format_compact!("{}_t_{}", code, index + 1);
    match item {
        Value::Object(map) => {
            let text = as_text(map.get("text")).unwrap_or_default();
            let share = as_json_number(map.get("share"))
                .or_else(|| as_number(map.get("pct")))
                .or_else(|| as_json_number(map.get("value")));
            if text.is_empty() && share.is_none() {
                return None;
            }
            let id = as_text(map.get("id"))
                .map(CompactString::from)
                .unwrap_or_else(fallback_id);
            Some(TopicEntry::new(id, text, share))
        }
        other => as_text(Some(other)).map(|text| TopicEntry::new(fallback_id(), text, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_sorted_and_limited() {
        let field = json!([
            { "text": "Tutoring", "share": 12.7 },
            { "text": "Software", "share": 14.0 },
            { "text": "Editing", "pct": "8.25" },
            { "text": "Unscored" }
        ]);
        let entries = topic_entries(Some(&field), "CA", 3);
        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["Software", "Tutoring", "Editing"]);
        assert_eq!(entries[0].pct, "14.0%");
        assert_eq!(entries[0].id, "CA_t_2");
        assert_eq!(entries[2].pct, "8.2%");
    }

    #[test]
    fn single_topic_object_is_wrapped() {
        let field = json!({ "text": "Only one", "share": 3 });
        let entries = topic_entries(Some(&field), "NY", 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pct, "3.0%");
        assert_eq!(topic_leaves(Some(&field)).len(), 1);
    }

    #[test]
    fn explicit_ids_are_kept() {
        let field = json!([{ "id": "t-9", "text": "X", "share": 1 }]);
        assert_eq!(topic_entries(Some(&field), "NY", 10)[0].id, "t-9");
    }

    #[test]
    fn leaves_need_numeric_share() {
        let field = json!([{ "text": "A", "share": "5" }, { "text": "B", "value": 2 }]);
        let leaves = topic_leaves(Some(&field));
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].name, "B");
    }

    #[test]
    fn display_text_is_truncated() {
        let entry = TopicEntry::new("x", "a".repeat(90), None);
        assert_eq!(entry.display_text(80).len(), 83);
        assert_eq!(entry.pct, "");
    }
}
