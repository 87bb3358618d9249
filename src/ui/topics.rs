use std::collections::HashSet;

use compact_str::CompactString;
use serde::Serialize;

use crate::normalize::topics::TopicEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicPhase {
    /// New row, fades in from transparent.
    Entering,
    /// Already on screen; text refreshed in place.
    Kept,
    /// Removed immediately.
    Exiting,
}

/// One row instruction for the topic side list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicCommand {
    pub id: CompactString,
    pub phase: TopicPhase,
    pub text: String,
    pub pct: CompactString,
    pub from_opacity: f32,
    pub to_opacity: f32,
    pub duration_ms: u32,
}

/// Keyed enter/keep/exit tracking for the topic side list. Much simpler than the
/// treemap: no geometry, only opacity.
#[derive(Debug, Clone, Default)]
pub struct TopicList {
    shown: Vec<CompactString>,
}

impl TopicList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids currently on screen, in display order.
    pub fn shown(&self) -> &[CompactString] {
        &self.shown
    }

    /// Diff `entries` against what is shown. Returns rows in display order followed by
    /// removals in their previous order.
    pub fn update(&mut self, entries: &[TopicEntry], text_budget: usize, fade_ms: u32) -> Vec<TopicCommand> {
        let previous: HashSet<&str> = self.shown.iter().map(|id| id.as_str()).collect();
        let mut next_ids: Vec<CompactString> = Vec::with_capacity(entries.len());
        let mut commands = Vec::with_capacity(entries.len() + self.shown.len());

        for entry in entries {
            if next_ids.contains(&entry.id) {
                tracing::debug!("Duplicate topic id {} ignored", entry.id);
                continue;
            }
            let (phase, from_opacity, duration_ms) = if previous.contains(entry.id.as_str()) {
                (TopicPhase::Kept, 1.0, 0)
            } else {
                (TopicPhase::Entering, 0.0, fade_ms)
            };
            commands.push(TopicCommand {
                id: entry.id.clone(),
                phase,
                text: entry.display_text(text_budget),
                pct: entry.pct.clone(),
                from_opacity,
                to_opacity: 1.0,
                duration_ms,
            });
            next_ids.push(entry.id.clone());
        }

        for id in &self.shown {
            if !next_ids.contains(id) {
                commands.push(TopicCommand {
                    id: id.clone(),
                    phase: TopicPhase::Exiting,
                    text: String::new(),
                    pct: CompactString::default(),
                    from_opacity: 1.0,
                    to_opacity: 0.0,
                    duration_ms: 0,
                });
            }
        }

        self.shown = next_ids;
        commands
    }
}
