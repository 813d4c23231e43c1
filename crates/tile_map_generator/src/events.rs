//! Event types and sinks for observing generation runs.
//!
//! This module defines [`GenerationEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while a [`crate::generator::MapGenerator`] builds a map.
//! Sinks may opt out of event kinds via [`EventSink::wants`] so the generator can skip
//! building payloads nobody listens to.
use glam::UVec2;

use crate::placement::Placement;

/// Pipeline stage reported by [`GenerationEvent::StageFinished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Spots,
    Sizing,
    Borders,
    MainPath,
    Placement,
    Connection,
    Autotile,
    Points,
    Composition,
}

/// Describes events emitted while generating a map.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// Emitted once the map size is known.
    RunStarted {
        /// Map width in tiles.
        width: u32,
        /// Map height in tiles.
        height: u32,
        /// Number of element definitions, spot elements included.
        element_count: usize,
    },

    /// Emitted after each pipeline stage.
    StageFinished {
        stage: Stage,
    },

    /// Emitted when an element instance was stamped into the map.
    ElementPlaced {
        placement: Placement,
    },

    /// Emitted when no legal position was found for an element instance.
    PlacementSkipped {
        /// Element name.
        element: String,
        /// One-based instance number.
        instance: u32,
    },

    /// Emitted when a centered element could not be placed near the map centre.
    CenteredPlacementFailed {
        /// Element name.
        element: String,
        /// One-based instance number.
        instance: u32,
    },

    /// Emitted when a path target could not be linked to the network.
    RouteFailed {
        /// Cell the route started from.
        target: UVec2,
    },

    /// Non-fatal warning generated during generation.
    Warning {
        /// Context string (e.g. element name, layer name).
        context: String,
        /// Human-readable message.
        message: String,
    },

    /// Emitted when the map is complete.
    RunFinished {
        /// Number of layers after composition.
        layer_count: usize,
        /// Element instances placed.
        placed: usize,
        /// Element instances skipped.
        skipped: usize,
        /// Targets that could not be routed.
        failed_routes: usize,
    },
}

/// Discriminant of [`GenerationEvent`], used for sink filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationEventKind {
    RunStarted,
    StageFinished,
    ElementPlaced,
    PlacementSkipped,
    CenteredPlacementFailed,
    RouteFailed,
    Warning,
    RunFinished,
}

impl GenerationEvent {
    pub fn kind(&self) -> GenerationEventKind {
        match self {
            GenerationEvent::RunStarted { .. } => GenerationEventKind::RunStarted,
            GenerationEvent::StageFinished { .. } => GenerationEventKind::StageFinished,
            GenerationEvent::ElementPlaced { .. } => GenerationEventKind::ElementPlaced,
            GenerationEvent::PlacementSkipped { .. } => GenerationEventKind::PlacementSkipped,
            GenerationEvent::CenteredPlacementFailed { .. } => GenerationEventKind::CenteredPlacementFailed,
            GenerationEvent::RouteFailed { .. } => GenerationEventKind::RouteFailed,
            GenerationEvent::Warning { .. } => GenerationEventKind::Warning,
            GenerationEvent::RunFinished { .. } => GenerationEventKind::RunFinished,
        }
    }
}

/// A generic event sink that accepts [`GenerationEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: GenerationEvent);

    /// Whether the sink is interested in events of `kind`. Defaults to all kinds.
    #[inline]
    fn wants(&self, _kind: GenerationEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = GenerationEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: GenerationEvent) {}

    #[inline]
    fn wants(&self, _kind: GenerationEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    #[inline]
    fn send(&mut self, event: GenerationEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<GenerationEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<GenerationEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[GenerationEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of collected events of the given kind.
    pub fn count(&self, kind: GenerationEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: GenerationEvent) {
        self.events.push(event);
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: GenerationEvent) {
        let kind = event.kind();
        let interested: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = interested.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: GenerationEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

/// Minimal adapter trait for types that can expose an [`EventSink`].
pub trait AsEventSink {
    fn as_event_sink(&mut self) -> &mut dyn EventSink;
}

impl AsEventSink for VecSink {
    fn as_event_sink(&mut self) -> &mut dyn EventSink {
        self
    }
}

/// Sends a warning to `sink` if it listens for warnings.
pub(crate) fn warn_to(sink: &mut dyn EventSink, context: &str, message: impl Into<String>) {
    if sink.wants(GenerationEventKind::Warning) {
        sink.send(GenerationEvent::Warning {
            context: context.to_owned(),
            message: message.into(),
        });
    }
}
