//! Schema normalizer: heterogeneous feed records → one canonical [`NormalizedEntity`].
//!
//! Three input shapes are accepted: nested JSON records with a `job_groups` array,
//! the same with a single `job_groups` object, and flat facet/variable rows. Shape
//! detection happens once, at this boundary; nothing past it sees raw JSON.

pub mod rows;
pub mod shapes;
pub mod topics;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::tree::{NormalizedLeaf, Tree};
use shapes::{first_number, first_text, FieldShape};
use topics::{topic_entries, topic_leaves, TopicEntry};

/// Keys that mark a lone `job_groups` object as a group.
const GROUP_MARKERS: [&str; 1] = ["name"];

/// Fields tried, in order, for a group's weight.
const GROUP_VALUE_FIELDS: [&str; 4] = ["share", "pct", "value", "count"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    State,
    Country,
}

impl EntityKind {
    fn code_fields(self) -> [&'static str; 2] {
        match self {
            EntityKind::State => ["state_code", "code"],
            EntityKind::Country => ["country_code", "code"],
        }
    }

    fn title_fields(self) -> [&'static str; 2] {
        match self {
            EntityKind::State => ["state", "name"],
            EntityKind::Country => ["country", "name"],
        }
    }

    /// Entity selected first when nothing was requested.
    pub fn default_code(self) -> &'static str {
        match self {
            EntityKind::State => "CA",
            EntityKind::Country => "USA",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::State => "states",
            EntityKind::Country => "countries",
        }
    }
}

/// A breakdown dimension an entity can be drawn by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    JobGroups,
    Topics,
    Collaboration,
    OnetTask,
}

impl Facet {
    /// The facet used when this one is too thin to draw.
    pub fn alternate(self) -> Facet {
        match self {
            Facet::JobGroups => Facet::Topics,
            Facet::Topics => Facet::JobGroups,
            Facet::Collaboration => Facet::OnetTask,
            Facet::OnetTask => Facet::Collaboration,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Facet::JobGroups => "job_groups",
            Facet::Topics => "topics",
            Facet::Collaboration => "collaboration",
            Facet::OnetTask => "onet_task",
        }
    }
}

/// Headline numbers shown next to the treemap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub count: Option<f64>,
    /// Already scaled to percent (`31.2` means 31.2%).
    pub pct: Option<f64>,
}

impl UsageSummary {
    pub fn count_text(&self) -> String {
        match self.count {
            Some(c) => format!("{}", c.round() as i64),
            None => "—".to_string(),
        }
    }

    pub fn pct_text(&self) -> String {
        match self.pct {
            Some(p) => format!("{:.1}%", p),
            None => "—".to_string(),
        }
    }
}

/// One facet's leaves, duplicates already merged.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetTree {
    pub facet: Facet,
    pub tree: Tree,
}

impl FacetTree {
    pub fn new(facet: Facet, tree: Tree) -> Self {
        Self { facet, tree }
    }
}

/// Everything the dashboard needs about one country/state.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntity {
    pub code: CompactString,
    pub title: String,
    pub kind: EntityKind,
    pub usage: UsageSummary,
    pub topics: Vec<TopicEntry>,
    /// Preferred facet first.
    pub facets: [FacetTree; 2],
}

impl NormalizedEntity {
    pub fn preferred_facet(&self) -> Facet {
        self.facets[0].facet
    }

    pub fn facet_tree(&self, facet: Facet) -> Option<&Tree> {
        self.facets.iter().find(|f| f.facet == facet).map(|f| &f.tree)
    }

    /// The tree drawn by the preferred facet.
    pub fn tree(&self) -> Tree {
        self.tree_for(self.preferred_facet())
    }

    /// The tree to draw when `facet` is requested.
    ///
    /// A facet with fewer than two leaves gives way to the alternate facet if that one
    /// has two or more; otherwise the first non-empty of the two wins; if both are
    /// empty the result is the "no data" tree.
    pub fn tree_for(&self, facet: Facet) -> Tree {
        let empty = Tree::default();
        let wanted = self.facet_tree(facet).unwrap_or(&empty);
        let other = self.facet_tree(facet.alternate()).unwrap_or(&empty);

        let chosen = [wanted, other]
            .into_iter()
            .find(|t| t.len() >= 2)
            .or_else(|| [wanted, other].into_iter().find(|t| !t.is_empty()));
        match chosen {
            Some(tree) => tree.clone(),
            None => Tree::no_data(),
        }
    }

    /// Observation count used to pick a default selection.
    pub fn observations(&self) -> f64 {
        self.usage.count.unwrap_or(0.0)
    }

    /// Every category this entity can show, across both facets.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.facets
            .iter()
            .flat_map(|f| f.tree.children.iter().map(|l| l.category.as_str()))
    }
}

/// Why a record was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record {index} has no {kind:?} code")]
    MissingIdentity { index: usize, kind: EntityKind },
    #[error("record {index} is not an object")]
    NotAnObject { index: usize },
    #[error("row {index} has an empty geo_id")]
    MissingGeoId { index: usize },
    #[error("row {index} is malformed: {reason}")]
    MalformedRow { index: usize, reason: String },
}

/// A parsed feed, classified by its structure.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecordSet {
    /// Nested per-entity records (`job_groups`, `most_frequent_topics`, ...).
    Records(Vec<Value>),
    /// Flat facet/variable rows keyed by `geo_id`.
    Rows(Vec<Value>),
}

impl RawRecordSet {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Value>(text).map(Self::from_value)
    }

    /// A CSV document is always a flat-row feed.
    pub fn from_csv_str(text: &str) -> csv::Result<Self> {
        rows::rows_from_csv(text.as_bytes()).map(RawRecordSet::Rows)
    }

    /// Classify a parsed document. An array is rows when its first object carries a
    /// `geo_id`; a lone object is a one-record set; anything else is empty.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                let is_rows = items
                    .iter()
                    .find_map(Value::as_object)
                    .is_some_and(|o| o.contains_key("geo_id"));
                if is_rows {
                    RawRecordSet::Rows(items)
                } else {
                    RawRecordSet::Records(items)
                }
            }
            object @ Value::Object(_) => RawRecordSet::Records(vec![object]),
            _ => RawRecordSet::Records(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawRecordSet::Records(v) | RawRecordSet::Rows(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of normalizing a whole feed.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSet {
    pub entities: Vec<NormalizedEntity>,
    pub skipped: Vec<RecordError>,
}

/// Normalize one nested JSON record. `index` is only used for error reporting.
pub fn normalize(
    record: &Value,
    index: usize,
    kind: EntityKind,
    topic_limit: usize,
) -> Result<NormalizedEntity, RecordError> {
    let map = record.as_object().ok_or(RecordError::NotAnObject { index })?;

    let code = first_text(map, &kind.code_fields())
        .map(|c| CompactString::new(c.to_uppercase()))
        .ok_or(RecordError::MissingIdentity { index, kind })?;
    let title = first_text(map, &kind.title_fields()).unwrap_or_else(|| code.to_string());

    let usage = UsageSummary {
        count: first_number(map, &["total_observations"]),
        pct: first_number(map, &["usage_index"]).map(|u| u * 100.0),
    };

    let topics_field = map.get("most_frequent_topics");
    let topics = topic_entries(topics_field, &code, topic_limit);

    let groups = Tree::from_leaves(group_leaves(map.get("job_groups")));
    let topic_tree = Tree::from_leaves(topic_leaves(topics_field));

    Ok(NormalizedEntity {
        code,
        title,
        kind,
        usage,
        topics,
        facets: [
            FacetTree::new(Facet::JobGroups, groups),
            FacetTree::new(Facet::Topics, topic_tree),
        ],
    })
}

/// Normalize a feed. Malformed records are logged and skipped, never fatal.
/// Flat rows always describe countries; `kind` applies to nested records.
pub fn normalize_set(raw: &RawRecordSet, kind: EntityKind, topic_limit: usize) -> NormalizedSet {
    let (entities, skipped) = match raw {
        RawRecordSet::Records(records) => {
            let mut entities = Vec::with_capacity(records.len());
            let mut skipped = Vec::new();
            for (index, record) in records.iter().enumerate() {
                match normalize(record, index, kind, topic_limit) {
                    Ok(entity) => entities.push(entity),
                    Err(e) => skipped.push(e),
                }
            }
            (entities, skipped)
        }
        RawRecordSet::Rows(rows) => rows::normalize_rows(rows, topic_limit),
    };

    for error in &skipped {
        tracing::debug!("Skipping {}: {}", kind.name(), error);
    }
    tracing::info!(
        "Normalized {} {} ({} skipped)",
        entities.len(),
        kind.name(),
        skipped.len()
    );
    NormalizedSet { entities, skipped }
}

fn group_leaves(field: Option<&Value>) -> Vec<NormalizedLeaf> {
    FieldShape::inspect(field, &GROUP_MARKERS)
        .items()
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => {
                let name = first_text(map, &["name"]).unwrap_or_else(|| "Other".to_string());
                let value = first_number(map, &GROUP_VALUE_FIELDS).unwrap_or(0.0);
                Some(NormalizedLeaf::new(&name, value))
            }
            Value::String(name) => Some(NormalizedLeaf::new(name, 0.0)),
            _ => None,
        })
        .collect()
}
