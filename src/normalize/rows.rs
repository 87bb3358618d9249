//! Flat, CSV-style feeds: one row per `(geo_id, facet, variable, cluster)` cell.

use std::collections::BTreeMap;
use std::io;

use compact_str::{format_compact, CompactString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::shapes::{as_number, as_text};
use super::topics::{sort_by_share, TopicEntry};
use super::{EntityKind, Facet, FacetTree, NormalizedEntity, RecordError, UsageSummary};
use crate::data::iso;
use crate::tree::{NormalizedLeaf, Tree};

const USAGE_FACET: &str = "country";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    pub geo_id: String,
    #[serde(default)]
    pub facet: String,
    #[serde(default)]
    pub variable: String,
    #[serde(default)]
    pub cluster_name: Option<Value>,
    #[serde(default)]
    pub value: Value,
}

impl FlatRow {
    fn is(&self, facet: &str, variable: &str) -> bool {
        self.facet == facet && self.variable == variable
    }

    fn cluster(&self) -> Option<String> {
        as_text(self.cluster_name.as_ref())
    }

    fn number(&self) -> Option<f64> {
        as_number(Some(&self.value))
    }
}

/// Read a CSV feed with a header row into row objects. Cells that look numeric become
/// numbers and empty cells read as missing. A record the reader rejects becomes a
/// `null` row, so [`normalize_rows`] reports it at its original index.
pub fn rows_from_csv<R: io::Read>(input: R) -> csv::Result<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    reader.headers()?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<FlatRow>().enumerate() {
        match record {
            Ok(row) => rows.push(serde_json::to_value(row).unwrap_or(Value::Null)),
            Err(e) => {
                tracing::debug!("CSV row {} unreadable: {}", index, e);
                rows.push(Value::Null);
            }
        }
    }
    Ok(rows)
}

/// Parse raw row values, then group them into one entity per `geo_id` (sorted by code).
/// Rows that don't parse or carry no `geo_id` are reported and skipped.
pub fn normalize_rows(rows: &[Value], topic_limit: usize) -> (Vec<NormalizedEntity>, Vec<RecordError>) {
    let mut skipped = Vec::new();
    let mut by_code: BTreeMap<CompactString, Vec<FlatRow>> = BTreeMap::new();

    for (index, raw) in rows.iter().enumerate() {
        let row = match FlatRow::deserialize(raw) {
            Ok(row) => row,
            Err(e) => {
                skipped.push(RecordError::MalformedRow {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let code = CompactString::new(row.geo_id.trim().to_ascii_uppercase());
        if code.is_empty() {
            skipped.push(RecordError::MissingGeoId { index });
            continue;
        }
        by_code.entry(code).or_default().push(row);
    }

    let entities = by_code
        .into_iter()
        .map(|(code, rows)| entity_from_rows(code, &rows, topic_limit))
        .collect();
    (entities, skipped)
}

/// Build one entity from all rows sharing a `geo_id`.
pub fn entity_from_rows(code: CompactString, rows: &[FlatRow], topic_limit: usize) -> NormalizedEntity {
    let find = |variable: &str| {
        rows.iter()
            .find(|r| r.is(USAGE_FACET, variable))
            .and_then(FlatRow::number)
    };
    let usage = UsageSummary {
        count: find("usage_count"),
        pct: find("usage_pct").map(|v| v * 100.0),
    };

    let mut topics: Vec<TopicEntry> = rows
        .iter()
        .filter(|r| r.is("onet_task", "onet_task_pct"))
        .filter_map(|r| Some((r.cluster()?, r.number()?)))
        .map(|(text, v)| TopicEntry::new(CompactString::default(), text, Some(v * 100.0)))
        .collect();
    sort_by_share(&mut topics);
    topics.truncate(topic_limit);
    for (i, topic) in topics.iter_mut().enumerate() {
        topic.id = format_compact!("{}_t_{}", code, i + 1);
    }

    let leaves = |facet: &str, variable: &str| -> Tree {
        Tree::from_leaves(
            rows.iter()
                .filter(|r| r.is(facet, variable))
                .filter_map(|r| Some(NormalizedLeaf::new(&r.cluster()?, r.number().unwrap_or(0.0)))),
        )
    };

    NormalizedEntity {
        title: iso::country_name(&code).to_string(),
        code,
        kind: EntityKind::Country,
        usage,
        topics,
        facets: [
            FacetTree::new(Facet::Collaboration, leaves("collaboration", "collaboration_count")),
            FacetTree::new(Facet::OnetTask, leaves("onet_task", "onet_task_count")),
        ],
    }
}
