pub mod fallback;
pub mod iso;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::normalize::{normalize_set, EntityKind, NormalizedEntity, RawRecordSet};

/// Where each feed comes from. `None` means the feed is not configured.
#[derive(Debug, Clone, Default)]
pub struct DatasetSources {
    pub states: Option<PathBuf>,
    pub countries: Option<PathBuf>,
    /// Optional flat-row feed, merged into the countries.
    pub rows: Option<PathBuf>,
}

/// Normalized entities for both modes, ready for an entity bank.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub states: Vec<NormalizedEntity>,
    pub countries: Vec<NormalizedEntity>,
    /// True when nothing could be loaded and the built-in samples stand in.
    pub used_fallback: bool,
    /// Records dropped during normalization, across all feeds.
    pub skipped: usize,
}

impl Dataset {
    /// Load every configured feed. A feed that is missing, unreadable, unparsable or
    /// normalizes to nothing contributes no entities. Only when no feed yields a single
    /// entity is the whole dataset replaced by the built-in samples; loaded and sample
    /// entities are never mixed. This never fails.
    pub fn load(sources: &DatasetSources, topic_limit: usize) -> Self {
        let mut dataset = Dataset::default();

        dataset.states = dataset.feed(sources.states.as_deref(), EntityKind::State, topic_limit);
        dataset.countries = dataset.feed(sources.countries.as_deref(), EntityKind::Country, topic_limit);
        let rows = dataset.feed(sources.rows.as_deref(), EntityKind::Country, topic_limit);
        dataset.merge_countries(rows);

        if dataset.states.is_empty() && dataset.countries.is_empty() {
            tracing::warn!("No feed produced any entities, using built-in sample data");
            let skipped = dataset.skipped;
            dataset = Dataset::builtin(topic_limit);
            dataset.skipped = skipped;
        }

        tracing::info!(
            "Dataset ready: {} states, {} countries, {} skipped records{}",
            dataset.states.len(),
            dataset.countries.len(),
            dataset.skipped,
            if dataset.used_fallback { " (fallback in use)" } else { "" }
        );
        dataset
    }

    /// Every built-in sample, including the flat-row one.
    pub fn builtin(topic_limit: usize) -> Self {
        let mut dataset = Dataset {
            states: normalize_set(&fallback::states(), EntityKind::State, topic_limit).entities,
            countries: normalize_set(&fallback::countries(), EntityKind::Country, topic_limit).entities,
            used_fallback: true,
            skipped: 0,
        };
        let rows = normalize_set(&fallback::rows(), EntityKind::Country, topic_limit).entities;
        dataset.merge_countries(rows);
        dataset
    }

    pub fn entities(&self, kind: EntityKind) -> &[NormalizedEntity] {
        match kind {
            EntityKind::State => &self.states,
            EntityKind::Country => &self.countries,
        }
    }

    fn feed(&mut self, path: Option<&Path>, kind: EntityKind, topic_limit: usize) -> Vec<NormalizedEntity> {
        let Some(path) = path else {
            return Vec::new();
        };
        match load_raw(path) {
            Ok(raw) => {
                let set = normalize_set(&raw, kind, topic_limit);
                self.skipped += set.skipped.len();
                if set.entities.is_empty() {
                    tracing::warn!("{} has no usable {}", path.display(), kind.name());
                }
                set.entities
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {:#}", kind.name(), e);
                Vec::new()
            }
        }
    }

    /// Add countries whose code is not present yet.
    fn merge_countries(&mut self, extra: Vec<NormalizedEntity>) {
        for entity in extra {
            if self.countries.iter().any(|c| c.code == entity.code) {
                tracing::debug!("Duplicate country {} ignored", entity.code);
                continue;
            }
            self.countries.push(entity);
        }
    }
}

/// Read and classify one feed file. `.csv` files are flat rows; anything else is JSON.
pub fn load_raw(path: &Path) -> Result<RawRecordSet> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let raw = if is_csv {
        RawRecordSet::from_csv_str(&text).with_context(|| format!("Failed to parse CSV {}", path.display()))?
    } else {
        RawRecordSet::from_json_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?
    };
    if raw.is_empty() {
        bail!("{} contains no records", path.display());
    }
    tracing::debug!("Loaded {} raw records from {}", raw.len(), path.display());
    Ok(raw)
}
