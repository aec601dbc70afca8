//! Simulation events and the explicitly constructed event bus.
//!
//! Subsystems push [`SimEvent`]s into the world during a tick; the bus
//! dispatches them after the tick's publish step.  Handlers are registered
//! by [`EventKind`] and kept sorted by priority (highest first, then
//! registration order), so dispatch never sorts.

use std::collections::BTreeMap;
use std::fmt;

use tf_agent::TargetRef;
use tf_core::EntityId;

/// Something observable that happened during a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    AgentSpawned { agent: EntityId, kind: String },
    AgentDied { agent: EntityId, kind: String },
    TargetAcquired { agent: EntityId, target: TargetRef },
    TargetLost { agent: EntityId, target: TargetRef },
    AbilityUsed { agent: EntityId, ability: &'static str },
    /// `dealt` is after armor for agent targets, the raw amount otherwise.
    Attacked { attacker: EntityId, target: EntityId, dealt: f32 },
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::AgentSpawned { .. } => EventKind::AgentSpawned,
            SimEvent::AgentDied { .. } => EventKind::AgentDied,
            SimEvent::TargetAcquired { .. } => EventKind::TargetAcquired,
            SimEvent::TargetLost { .. } => EventKind::TargetLost,
            SimEvent::AbilityUsed { .. } => EventKind::AbilityUsed,
            SimEvent::Attacked { .. } => EventKind::Attacked,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum EventKind {
    AgentSpawned,
    AgentDied,
    TargetAcquired,
    TargetLost,
    AbilityUsed,
    Attacked,
}

pub type EventHandler = Box<dyn FnMut(&SimEvent)>;

struct Subscription {
    priority: i32,
    handler:  EventHandler,
}

/// Dispatch table from event kind to handlers.
#[derive(Default)]
pub struct EventBus {
    handlers: BTreeMap<EventKind, Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`.  Higher `priority` runs first; equal
    /// priorities run in registration order.
    pub fn subscribe<F>(&mut self, kind: EventKind, priority: i32, handler: F)
    where
        F: FnMut(&SimEvent) + 'static,
    {
        let subs = self.handlers.entry(kind).or_default();
        let at = subs.partition_point(|s| s.priority >= priority);
        subs.insert(at, Subscription { priority, handler: Box::new(handler) });
    }

    /// Deliver each event, in order, to every handler of its kind.
    pub fn dispatch(&mut self, events: &[SimEvent]) {
        for event in events {
            if let Some(subs) = self.handlers.get_mut(&event.kind()) {
                for sub in subs.iter_mut() {
                    (sub.handler)(event);
                }
            }
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<EventKind, usize> =
            self.handlers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}
