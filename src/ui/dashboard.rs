use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use compact_str::CompactString;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::data::Dataset;
use crate::layout::Canvas;
use crate::normalize::{EntityKind, Facet, NormalizedEntity, UsageSummary};
use crate::render::colors::ColorDomain;
use crate::render::{RenderCommand, RenderEngine};
use crate::tree::{Tree, NO_DATA_NAME};
use crate::ui::debounce::ResizeDebouncer;
use crate::ui::topics::{TopicCommand, TopicList};

/// Initial viewport before the host reports a size.
const DEFAULT_VIEWPORT: (f32, f32) = (800.0, 600.0);

/// Input events for a [`Dashboard`], applied strictly one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderRequest {
    SetMode(EntityKind),
    Select(CompactString),
    SetFacet(Facet),
    /// Debounced; takes effect on the first `Tick` after the quiet window.
    Resize { width: f32, height: f32 },
    Tick,
}

/// Selector entry: code plus display title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankOption {
    pub code: CompactString,
    pub title: String,
}

/// All entities of one kind, by code.
#[derive(Debug, Clone)]
pub struct EntityBank {
    kind: EntityKind,
    entities: BTreeMap<CompactString, NormalizedEntity>,
    /// Sorted by title, then code.
    options: Vec<BankOption>,
}

impl EntityBank {
    /// Later entities with an already-seen code are dropped.
    pub fn new(kind: EntityKind, entities: impl IntoIterator<Item = NormalizedEntity>) -> Self {
        let mut map = BTreeMap::new();
        for entity in entities {
            if map.contains_key(&entity.code) {
                tracing::debug!("Duplicate {} code {} ignored", kind.name(), entity.code);
                continue;
            }
            map.insert(entity.code.clone(), entity);
        }
        let mut options: Vec<BankOption> = map
            .values()
            .map(|e| BankOption {
                code: e.code.clone(),
                title: e.title.clone(),
            })
            .collect();
        options.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.code.cmp(&b.code)));
        Self {
            kind,
            entities: map,
            options,
        }
    }

    pub fn get(&self, code: &str) -> Option<&NormalizedEntity> {
        self.entities.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entities.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn options(&self) -> &[BankOption] {
        &self.options
    }

    pub fn entities(&self) -> impl Iterator<Item = &NormalizedEntity> {
        self.entities.values()
    }

    /// Pick the entity to show first: `requested` if present, else the mode default,
    /// else the one with most observations, else the first by title.
    pub fn initial_selection(&self, requested: Option<&str>) -> Option<CompactString> {
        if let Some(code) = requested.map(|c| c.trim().to_uppercase()) {
            if self.contains(&code) {
                return Some(CompactString::new(code));
            }
            tracing::warn!("Requested {} code {} not found", self.kind.name(), code);
        }
        if self.contains(self.kind.default_code()) {
            return Some(CompactString::new(self.kind.default_code()));
        }
        let busiest = self
            .options
            .iter()
            .filter_map(|o| self.get(&o.code))
            .filter(|e| e.observations() > 0.0)
            .fold(None::<&NormalizedEntity>, |best, e| match best {
                Some(b) if b.observations() >= e.observations() => Some(b),
                _ => Some(e),
            });
        busiest
            .map(|e| e.code.clone())
            .or_else(|| self.options.first().map(|o| o.code.clone()))
    }
}

/// Everything a host needs to draw after one handled request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub pass: u64,
    pub mode: EntityKind,
    pub code: Option<CompactString>,
    pub facet: Option<Facet>,
    pub title: String,
    pub usage: UsageSummary,
    pub usage_count: String,
    pub usage_pct: String,
    pub canvas: Canvas,
    pub topics: Vec<TopicCommand>,
    pub tiles: Vec<RenderCommand>,
}

/// One dashboard session: the entity banks, the current selection and the render
/// engine that animates between selections. Nothing here is global; several
/// dashboards can live in one process.
#[derive(Debug)]
pub struct Dashboard {
    config: EngineConfig,
    states: EntityBank,
    countries: EntityBank,
    mode: EntityKind,
    code: Option<CompactString>,
    /// `None` draws the entity's preferred facet.
    facet: Option<Facet>,
    viewport: (f32, f32),
    engine: RenderEngine,
    topics: TopicList,
    resize: ResizeDebouncer,
    used_fallback: bool,
}

impl Dashboard {
    pub fn new(config: EngineConfig, dataset: Dataset) -> Self {
        let states = EntityBank::new(EntityKind::State, dataset.states);
        let countries = EntityBank::new(EntityKind::Country, dataset.countries);

        // Colours are fixed up front from every category either bank can show, so the
        // order a user navigates in never changes them.
        let mut colors = ColorDomain::seeded();
        for bank in [&states, &countries] {
            for entity in bank.entities() {
                colors.observe(entity.categories());
            }
        }
        tracing::info!("Color domain seeded with {} categories", colors.len());

        let mode = if states.is_empty() && !countries.is_empty() {
            EntityKind::Country
        } else {
            EntityKind::State
        };
        let resize = ResizeDebouncer::new(Duration::from_millis(config.resize_debounce_ms));
        let mut dashboard = Self {
            engine: RenderEngine::with_colors(config.clone(), colors),
            config,
            states,
            countries,
            mode,
            code: None,
            facet: None,
            viewport: DEFAULT_VIEWPORT,
            topics: TopicList::new(),
            resize,
            used_fallback: dataset.used_fallback,
        };
        dashboard.code = dashboard.bank().initial_selection(None);
        dashboard
    }

    /// Start in `kind`, with that bank's default selection.
    pub fn with_mode(mut self, kind: EntityKind) -> Self {
        self.mode = kind;
        self.facet = None;
        self.code = self.bank().initial_selection(None);
        self
    }

    /// Override the initial selection (e.g. from a command-line argument).
    pub fn with_selection(mut self, requested: Option<&str>) -> Self {
        self.code = self.bank().initial_selection(requested);
        self
    }

    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = (width, height);
        self
    }

    /// `None` keeps each entity's preferred facet.
    pub fn with_facet(mut self, facet: Option<Facet>) -> Self {
        self.facet = facet;
        self
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    pub fn mode(&self) -> EntityKind {
        self.mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn bank(&self) -> &EntityBank {
        self.bank_for(self.mode)
    }

    pub fn bank_for(&self, kind: EntityKind) -> &EntityBank {
        match kind {
            EntityKind::State => &self.states,
            EntityKind::Country => &self.countries,
        }
    }

    /// Time until a pending resize settles, if one is pending.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.resize.remaining(now)
    }

    /// Apply one request. Returns a frame when what is displayed changed.
    pub fn handle(&mut self, request: RenderRequest, now: Instant) -> Option<Frame> {
        tracing::debug!("Handling {:?}", request);
        match request {
            RenderRequest::SetMode(kind) => {
                if kind == self.mode {
                    return None;
                }
                self.mode = kind;
                self.facet = None;
                self.code = self.bank().initial_selection(None);
                Some(self.render_current())
            }
            RenderRequest::Select(code) => {
                let code = code.trim().to_uppercase();
                if !self.bank().contains(&code) {
                    tracing::warn!("Unknown {} code {}", self.mode.name(), code);
                    return None;
                }
                self.code = Some(CompactString::new(code));
                Some(self.render_current())
            }
            RenderRequest::SetFacet(facet) => {
                self.facet = Some(facet);
                Some(self.render_current())
            }
            RenderRequest::Resize { width, height } => {
                self.resize.push(width, height, now);
                None
            }
            RenderRequest::Tick => {
                let (width, height) = self.resize.poll(now)?;
                tracing::debug!("Viewport settled at {}x{}", width, height);
                self.viewport = (width, height);
                Some(self.render_current())
            }
        }
    }

    /// Handle every request already queued on `rx`, without blocking.
    pub fn drain(&mut self, rx: &Receiver<RenderRequest>, now: Instant) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(request) = rx.try_recv() {
            frames.extend(self.handle(request, now));
        }
        frames
    }

    /// Render the current selection. A selection that no longer resolves draws the
    /// "no data" tree.
    pub fn render_current(&mut self) -> Frame {
        let (width, height) = self.viewport;
        let entity = self.code.as_deref().and_then(|code| self.bank().get(code)).cloned();

        let (title, usage, tree, topic_entries) = match &entity {
            Some(e) => {
                let facet = self.facet.unwrap_or_else(|| e.preferred_facet());
                (e.title.clone(), e.usage, e.tree_for(facet), e.topics.as_slice())
            }
            None => (NO_DATA_NAME.to_string(), UsageSummary::default(), Tree::no_data(), &[][..]),
        };

        let plan = self.engine.render(&tree, width, height);
        let topics = self.topics.update(
            topic_entries,
            self.config.topic_text_budget,
            self.config.topic_fade_ms,
        );

        Frame {
            pass: plan.pass,
            mode: self.mode,
            code: self.code.clone(),
            facet: self.facet,
            title,
            usage_count: usage.count_text(),
            usage_pct: usage.pct_text(),
            usage,
            canvas: plan.canvas,
            topics,
            tiles: plan.commands,
        }
    }
}

/// Run `dashboard` on its own thread. Requests are handled in arrival order; a
/// pending resize is settled automatically once its quiet window elapses. Dropping
/// the sender stops the worker, which hands the dashboard back through the join handle.
pub fn spawn(mut dashboard: Dashboard) -> (Sender<RenderRequest>, Receiver<Frame>, JoinHandle<Dashboard>) {
    let (request_tx, request_rx) = mpsc::channel::<RenderRequest>();
    let (frame_tx, frame_rx) = mpsc::channel::<Frame>();

    let handle = std::thread::spawn(move || {
        let emit = |frame: Option<Frame>| match frame {
            Some(frame) => frame_tx.send(frame).is_ok(),
            None => true,
        };

        loop {
            let request = match dashboard.next_deadline(Instant::now()) {
                Some(wait) => match request_rx.recv_timeout(wait) {
                    Ok(request) => request,
                    Err(RecvTimeoutError::Timeout) => RenderRequest::Tick,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match request_rx.recv() {
                    Ok(request) => request,
                    Err(_) => break,
                },
            };
            if !emit(dashboard.handle(request, Instant::now())) {
                break;
            }
        }

        // Settle a resize still in flight when the sender went away.
        if let Some(wait) = dashboard.next_deadline(Instant::now()) {
            std::thread::sleep(wait);
            emit(dashboard.handle(RenderRequest::Tick, Instant::now()));
        }
        tracing::debug!("Dashboard worker stopped after {} passes", dashboard.engine().passes());
        dashboard
    });

    (request_tx, frame_rx, handle)
}
