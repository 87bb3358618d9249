pub mod colors;
pub mod easing;
pub mod labels;
pub mod paint;
pub mod reconcile;

use compact_str::CompactString;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::layout::{self, Canvas, LayoutLeaf, Rect};
use crate::tree::Tree;
use colors::{ColorDomain, ColorToken};
use easing::{progress, stagger_delay, Easing};
use labels::{label_for, Label, LabelMode};
use reconcile::{reconcile, LayoutState, TilePhase};

/// Paint instruction for one tile. The painter animates `from_rect` → `to_rect` over
/// `duration_ms` after `delay_ms`, using `easing`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderCommand {
    pub key: CompactString,
    pub phase: TilePhase,
    pub from_rect: Rect,
    pub to_rect: Rect,
    pub delay_ms: u32,
    pub duration_ms: u32,
    pub easing: Easing,
    /// Resolved against `to_rect`, never against intermediate geometry.
    pub label: Label,
    pub color: ColorToken,
}

impl RenderCommand {
    pub fn label_mode(&self) -> LabelMode {
        self.label.mode
    }

    pub fn label_text(&self) -> String {
        self.label.text()
    }

    /// Interpolated rectangle `elapsed_ms` after the pass started.
    pub fn rect_at(&self, elapsed_ms: f32) -> Rect {
        let t = self
            .easing
            .apply(progress(elapsed_ms, self.delay_ms, self.duration_ms));
        self.from_rect.lerp(&self.to_rect, t)
    }

    /// When this tile's transition is over (ms after the pass started).
    pub fn end_ms(&self) -> u32 {
        self.delay_ms.saturating_add(self.duration_ms)
    }

    /// True if painting this command produces no motion.
    pub fn is_static(&self) -> bool {
        self.from_rect == self.to_rect
    }
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    /// 1-based pass counter of the engine that produced this plan.
    pub pass: u64,
    pub canvas: Canvas,
    /// Final layout, sorted by descending value.
    pub leaves: Vec<LayoutLeaf>,
    /// One command per tile: layout order first, then exiting tiles.
    pub commands: Vec<RenderCommand>,
}

impl RenderPlan {
    pub fn count(&self, phase: TilePhase) -> usize {
        self.commands.iter().filter(|c| c.phase == phase).count()
    }

    /// Time until every transition in the pass has finished.
    pub fn total_duration_ms(&self) -> u32 {
        self.commands.iter().map(|c| c.end_ms()).max().unwrap_or(0)
    }
}

/// The incremental treemap engine.
///
/// Owns the only cross-pass state: the last committed [`LayoutState`] and the
/// [`ColorDomain`]. `render` takes `&mut self`, so one engine instance can never run two
/// passes at once; hosts that share an engine across threads put it behind a lock or
/// feed it through a single request queue (see `ui::dashboard`).
#[derive(Debug)]
pub struct RenderEngine {
    config: EngineConfig,
    state: LayoutState,
    colors: ColorDomain,
    passes: u64,
}

impl RenderEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_colors(config, ColorDomain::new())
    }

    pub fn with_colors(config: EngineConfig, colors: ColorDomain) -> Self {
        Self {
            config,
            state: LayoutState::new(),
            colors,
            passes: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The snapshot the next pass will diff against.
    pub fn layout_state(&self) -> &LayoutState {
        &self.state
    }

    pub fn colors(&self) -> &ColorDomain {
        &self.colors
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Lay out `tree`, diff against the previous pass and emit one command per tile.
    ///
    /// Runs to completion synchronously; the layout state is swapped in one step at the
    /// end, so a pass always diffs against a consistent snapshot.
    pub fn render(&mut self, tree: &Tree, width: f32, height: f32) -> RenderPlan {
        let canvas = Canvas::clamped(width, height, &self.config.layout);
        let leaves = layout::compute_layout(tree, width, height, &self.config.layout);
        self.colors.observe(leaves.iter().map(|l| l.category.as_str()));

        let reconciliation = reconcile(&self.state, &leaves);
        let config = &self.config;
        let colors = &mut self.colors;

        let commands: Vec<RenderCommand> = reconciliation
            .transitions
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let (delay_ms, duration_ms) = match t.phase {
                    TilePhase::Entering | TilePhase::Updating => {
                        (stagger_delay(i, config.stagger_ms), config.update_duration_ms)
                    }
                    TilePhase::Steady => (0, 0),
                    TilePhase::Exiting => (0, config.exit_duration_ms),
                };
                let label = match t.phase {
                    TilePhase::Exiting => Label::hidden(),
                    _ => label_for(&t.to, &t.name, t.pct, config.name_char_budget),
                };
                RenderCommand {
                    key: t.key.clone(),
                    phase: t.phase,
                    from_rect: t.from,
                    to_rect: t.to,
                    delay_ms,
                    duration_ms,
                    easing: config.easing,
                    label,
                    color: colors.color_for(&t.category),
                }
            })
            .collect();

        self.passes += 1;
        tracing::info!(
            "Render pass {}: {} tiles ({} enter, {} update, {} steady, {} exit) on {}x{}",
            self.passes,
            commands.len(),
            reconciliation.count(TilePhase::Entering),
            reconciliation.count(TilePhase::Updating),
            reconciliation.count(TilePhase::Steady),
            reconciliation.count(TilePhase::Exiting),
            canvas.width,
            canvas.height
        );

        // Commit point: replace the snapshot wholesale.
        self.state = reconciliation.next_state;

        RenderPlan {
            pass: self.passes,
            canvas,
            leaves,
            commands,
        }
    }
}
