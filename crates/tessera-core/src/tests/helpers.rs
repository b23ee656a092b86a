//! Test doubles and factories for the integration tests.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::backend::{BackendError, DrawBackend, InputEvent, InputSource};
use crate::entity::{Behavior, EntityId, EntitySpec, Solidness};
use crate::event::GameEvent;
use crate::world::{EngineContext, World};

// =============================================================================
// Backend doubles
// =============================================================================

/// Draw backend that accepts everything and remembers nothing.
pub struct NullBackend;

impl DrawBackend for NullBackend {
    fn draw_entity(&mut self, _entity: &crate::entity::Entity) -> Result<(), BackendError> {
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Draw backend that records draw order per frame and counts swaps.
pub struct RecordingBackend {
    /// IDs in the order they were drawn, across all frames.
    pub drawn: Vec<EntityId>,
    /// Number of buffer swaps seen.
    pub swaps: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            drawn: Vec::new(),
            swaps: 0,
        }
    }
}

impl DrawBackend for RecordingBackend {
    fn draw_entity(&mut self, entity: &crate::entity::Entity) -> Result<(), BackendError> {
        self.drawn.push(entity.id());
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        self.swaps += 1;
        Ok(())
    }
}

// =============================================================================
// Input doubles
// =============================================================================

/// Input source with nothing to report.
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        Vec::new()
    }
}

/// Input source that plays back one scripted batch per poll.
pub struct ScriptedInput {
    batches: Vec<Vec<InputEvent>>,
}

impl ScriptedInput {
    /// First batch is returned by the first poll, and so on; polls past the
    /// end return nothing.
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        let mut batches = batches;
        batches.reverse(); // pop from the back
        Self { batches }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.batches.pop().unwrap_or_default()
    }
}

// =============================================================================
// Behaviors
// =============================================================================

/// Ends the run after seeing a fixed number of step events.
pub struct StepProbe {
    limit: u64,
    seen: Rc<Cell<u64>>,
}

impl StepProbe {
    pub fn new(limit: u64) -> (Self, Rc<Cell<u64>>) {
        let seen = Rc::new(Cell::new(0));
        (
            Self {
                limit,
                seen: seen.clone(),
            },
            seen,
        )
    }
}

impl Behavior for StepProbe {
    fn on_event(&mut self, _me: EntityId, event: &GameEvent, ctx: &mut EngineContext<'_>) -> bool {
        if matches!(event, GameEvent::Step { .. }) {
            self.seen.set(self.seen.get() + 1);
            if self.seen.get() >= self.limit {
                ctx.control.set_game_over(true);
            }
            return true;
        }
        false
    }
}

/// Records every event kind delivered to it.
pub struct EventLog {
    log: Rc<std::cell::RefCell<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> (Self, Rc<std::cell::RefCell<Vec<GameEvent>>>) {
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));
        (Self { log: log.clone() }, log)
    }
}

impl Behavior for EventLog {
    fn on_event(&mut self, _me: EntityId, event: &GameEvent, _ctx: &mut EngineContext<'_>) -> bool {
        self.log.borrow_mut().push(event.clone());
        true
    }
}

// =============================================================================
// Factories
// =============================================================================

/// Spawns a hard entity of the given kind at a position.
pub fn spawn_at(world: &mut World, kind: &str, x: f32, y: f32) -> EntityId {
    world
        .spawn(EntitySpec::new(kind).position(Vec2::new(x, y)))
        .unwrap()
}

/// Spawns an entity with a velocity and solidness.
pub fn spawn_mover(
    world: &mut World,
    kind: &str,
    position: Vec2,
    velocity: Vec2,
    solidness: Solidness,
) -> EntityId {
    world
        .spawn(
            EntitySpec::new(kind)
                .position(position)
                .velocity(velocity)
                .solidness(solidness),
        )
        .unwrap()
}
