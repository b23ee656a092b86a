//! The world coordinator.
//!
//! [`World`] owns every live entity and resolves the per-frame simulation:
//! movement with bounds and collision checks, solidness blocking, deferred
//! deletion, event dispatch, and draw-order traversal.
//!
//! # Storage
//!
//! Entities live in a `BTreeMap` keyed by [`EntityId`], which gives
//! deterministic iteration in ID order. Because IDs are assigned
//! monotonically and never reused, ID order equals spawn order. Alongside
//! the storage the world keeps two [`HandleList`]s: the capacity-bounded
//! live-set and the deduplicated pending-deletion set.
//!
//! # Dispatch and the snapshot rule
//!
//! Event handlers may mutate the world: spawn entities, mark others for
//! deletion, change velocities. Every phase that iterates entities while
//! dispatching (broadcast, the movement pass, drawing) therefore iterates a
//! snapshot taken at phase start and tolerates handles that went stale in
//! the meantime. Entities spawned during a phase become visible to the next
//! phase, never the current one.
//!
//! # Invariants
//!
//! - The pending-deletion set is always a subset of the live-set before
//!   [`World::update`]; afterwards it is empty and every member has been
//!   removed and destroyed exactly once.
//! - An entity marked for deletion stays visible in [`World::live_handles`]
//!   until the next `update`.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::backend::DrawBackend;
use crate::entity::{Entity, EntityId, EntitySpec};
use crate::event::GameEvent;
use crate::game_loop::LoopControl;
use crate::registry::{HandleList, MAX_ENTITIES};

/// Default world width in grid units.
pub const DEFAULT_WORLD_WIDTH: i32 = 80;
/// Default world height in grid units.
pub const DEFAULT_WORLD_HEIGHT: i32 = 24;

// =============================================================================
// Bounds
// =============================================================================

/// Rectangular world extent in grid units.
///
/// Both dimensions are silently clamped to a minimum of 1; a degenerate
/// configuration is never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    width: i32,
    height: i32,
}

impl Bounds {
    /// Creates bounds of `width × height`, clamping each dimension to ≥ 1.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Returns the width in grid units.
    #[must_use]
    pub const fn width(self) -> i32 {
        self.width
    }

    /// Returns the height in grid units.
    #[must_use]
    pub const fn height(self) -> i32 {
        self.height
    }

    /// Returns `true` iff the integer-truncated position lies in
    /// `[0, width) × [0, height)`.
    #[must_use]
    pub fn contains(self, pos: Vec2) -> bool {
        let (cx, cy) = cell_of(pos);
        cx >= 0 && cx < self.width && cy >= 0 && cy < self.height
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT)
    }
}

/// Maps a continuous position onto its grid cell by integer truncation.
#[allow(clippy::cast_possible_truncation)]
fn cell_of(pos: Vec2) -> (i32, i32) {
    (pos.x.trunc() as i32, pos.y.trunc() as i32)
}

// =============================================================================
// Errors and outcomes
// =============================================================================

/// Errors from world operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The live-set is full; the spawn was rejected.
    #[error("world is at capacity ({0})")]
    CapacityExceeded(usize),
    /// The handle does not name a live entity.
    #[error("no such entity: {0}")]
    NoSuchEntity(EntityId),
}

/// Result of a movement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The position was updated to the target.
    Committed,
    /// The target lies outside the world; one out-of-bounds event was
    /// delivered to the mover and the position is unchanged.
    OutOfBounds,
    /// A solid pair blocked the move; collision events fired for every hit
    /// and the position is unchanged.
    Blocked,
}

impl MoveOutcome {
    /// Returns `true` if the move was committed.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

// =============================================================================
// EngineContext
// =============================================================================

/// Mutable engine access handed to behaviors during dispatch.
///
/// The world and loop control are threaded in explicitly rather than held
/// in globals, so a behavior can do anything the embedding program can:
/// spawn, mark for deletion, adjust velocities, or end the run.
pub struct EngineContext<'a> {
    /// The world the receiving entity lives in.
    pub world: &'a mut World,
    /// Loop control; `ctx.control.set_game_over(true)` ends the run.
    pub control: &'a mut LoopControl,
}

// =============================================================================
// World
// =============================================================================

/// Owner of all live entities and resolver of per-frame simulation.
///
/// See the [module docs](self) for storage layout and iteration rules.
pub struct World {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    live: HandleList,
    doomed: HandleList,
    bounds: Bounds,
}

impl World {
    /// Creates an empty world with the default capacity ([`MAX_ENTITIES`])
    /// and default bounds (80 × 24).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTITIES)
    }

    /// Creates an empty world holding at most `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            live: HandleList::with_capacity(capacity),
            doomed: HandleList::with_capacity(capacity),
            bounds: Bounds::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Spawns an entity described by `spec`: allocates it, assigns the next
    /// ID, and registers it in the live-set in one step.
    ///
    /// # Errors
    ///
    /// [`WorldError::CapacityExceeded`] if the live-set is full; the world
    /// is unchanged and the ID counter does not advance.
    pub fn spawn(&mut self, spec: EntitySpec) -> Result<EntityId, WorldError> {
        if self.live.len() >= self.live.capacity() {
            return Err(WorldError::CapacityExceeded(self.live.capacity()));
        }

        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::from_spec(id, spec);
        debug!(%id, kind = entity.kind(), "spawned entity");

        // Capacity was checked above; the insert cannot fail.
        let _ = self.live.insert(id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Removes an entity immediately, returning it.
    ///
    /// Also purges the handle from the pending-deletion set, preserving the
    /// subset invariant. This is the explicit deregistration path; entities
    /// ending their own life use [`mark_for_delete`](Self::mark_for_delete)
    /// instead.
    ///
    /// # Errors
    ///
    /// [`WorldError::NoSuchEntity`] if the handle is stale.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity, WorldError> {
        let _ = self.doomed.remove(id);
        self.live
            .remove(id)
            .map_err(|_| WorldError::NoSuchEntity(id))?;
        let entity = self
            .entities
            .remove(&id)
            .ok_or(WorldError::NoSuchEntity(id))?;
        debug!(%id, kind = entity.kind(), "removed entity");
        Ok(entity)
    }

    /// Schedules an entity for destruction at the end of the next
    /// [`update`](Self::update). Idempotent: marking twice is one deletion.
    ///
    /// The entity stays in the live-set (and keeps receiving events) until
    /// the update runs.
    ///
    /// # Errors
    ///
    /// [`WorldError::NoSuchEntity`] if the handle is stale.
    pub fn mark_for_delete(&mut self, id: EntityId) -> Result<(), WorldError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(WorldError::NoSuchEntity(id))?;
        entity.set_marked();
        // doomed ⊆ live and both share a capacity, so this cannot overflow.
        self.doomed
            .insert_unique(id)
            .map_err(|_| WorldError::CapacityExceeded(self.doomed.capacity()))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns a reference to a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to a live entity.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns `true` if the handle names a live entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if the world has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Returns a snapshot copy of the live-set.
    ///
    /// The copy is stable: callers iterate it untroubled by spawns or
    /// deletions their own handling triggers within the same frame.
    #[must_use]
    pub fn live_handles(&self) -> HandleList {
        self.live.clone()
    }

    /// Returns a new list of the live entities whose kind equals `kind`,
    /// preserving live-set order.
    #[must_use]
    pub fn handles_of_kind(&self, kind: &str) -> HandleList {
        let mut list = HandleList::with_capacity(self.live.capacity());
        for id in &self.live {
            if self.entities.get(&id).is_some_and(|e| e.kind() == kind) {
                // A filtered subset of live cannot exceed live's capacity.
                let _ = list.insert(id);
            }
        }
        list
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Replaces the world bounds, clamping both dimensions to ≥ 1.
    pub fn set_bounds(&mut self, width: i32, height: i32) {
        self.bounds = Bounds::new(width, height);
    }

    /// Returns the current world bounds.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns `true` iff `pos` truncates into the world rectangle.
    #[must_use]
    pub fn within_bounds(&self, pos: Vec2) -> bool {
        self.bounds.contains(pos)
    }

    /// Returns every live entity other than `mover` whose position occupies
    /// the same grid cell as `target`, in live-set order.
    ///
    /// Linear scan; the engine's reference scale is small enough that an
    /// O(n) probe per mover per frame is the intended cost model.
    #[must_use]
    pub fn collisions_at(&self, mover: EntityId, target: Vec2) -> Vec<EntityId> {
        let cell = cell_of(target);
        self.live
            .iter()
            .filter(|&id| id != mover)
            .filter(|id| {
                self.entities
                    .get(id)
                    .is_some_and(|e| cell_of(e.position()) == cell)
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Movement resolution
    // -------------------------------------------------------------------------

    /// Attempts to move an entity to `target`, resolving bounds and
    /// collisions.
    ///
    /// - Out-of-bounds targets block the move and deliver exactly one
    ///   [`GameEvent::OutOfBounds`] to the mover.
    /// - Every occupant of the target cell produces one
    ///   [`GameEvent::Collision`] delivered to *both* parties, whatever
    ///   their solidness. Blocking never short-circuits notification: all
    ///   hits are informed even after a block is established.
    /// - The move is blocked iff some hit pairs a solid mover with a solid
    ///   occupant; otherwise the position commits to `target`.
    ///
    /// Solidness is read fresh per hit, after that hit's events fired, so a
    /// handler that changes solidness mid-resolution influences the
    /// blocking decision of its own pair.
    ///
    /// # Errors
    ///
    /// [`WorldError::NoSuchEntity`] if the handle is stale at entry, or if
    /// a collision handler removed the mover before commit.
    pub fn move_entity(
        &mut self,
        id: EntityId,
        target: Vec2,
        control: &mut LoopControl,
    ) -> Result<MoveOutcome, WorldError> {
        if !self.contains(id) {
            return Err(WorldError::NoSuchEntity(id));
        }

        if !self.within_bounds(target) {
            trace!(%id, ?target, "move blocked at world edge");
            self.dispatch(id, &GameEvent::OutOfBounds, control);
            return Ok(MoveOutcome::OutOfBounds);
        }

        let hits = self.collisions_at(id, target);
        let mut blocked = false;
        for other in hits {
            let event = GameEvent::Collision {
                first: id,
                second: other,
                position: target,
            };
            self.dispatch(id, &event, control);
            self.dispatch(other, &event, control);

            let mover_solid = self.get(id).is_some_and(|e| e.solidness().is_solid());
            let other_solid = self.get(other).is_some_and(|e| e.solidness().is_solid());
            if mover_solid && other_solid {
                blocked = true;
            }
        }

        if blocked {
            return Ok(MoveOutcome::Blocked);
        }

        match self.get_mut(id) {
            Some(entity) => {
                entity.set_position(target);
                Ok(MoveOutcome::Committed)
            }
            // A collision handler removed the mover mid-resolution.
            None => Err(WorldError::NoSuchEntity(id)),
        }
    }

    /// Runs the per-frame resolution pass.
    ///
    /// 1. Movement: every entity with a non-zero velocity at phase start is
    ///    moved to `position + velocity` via
    ///    [`move_entity`](Self::move_entity). The mover list is a snapshot;
    ///    entities spawned during the pass wait until the next frame. A
    ///    mover whose velocity was zeroed by an earlier handler this pass is
    ///    skipped.
    /// 2. Deletion: every entity in the pending-deletion set is removed from
    ///    the live-set and destroyed, then the set is cleared.
    pub fn update(&mut self, control: &mut LoopControl) {
        let movers: Vec<EntityId> = self
            .live
            .iter()
            .filter(|id| {
                self.entities
                    .get(id)
                    .is_some_and(|e| e.velocity() != Vec2::ZERO)
            })
            .collect();

        for id in movers {
            let Some(entity) = self.entities.get(&id) else {
                continue; // removed by an earlier mover's handler
            };
            let velocity = entity.velocity();
            if velocity == Vec2::ZERO {
                continue;
            }
            let target = entity.position() + velocity;
            // Outcome is already signaled to the parties through events.
            let _ = self.move_entity(id, target, control);
        }

        let doomed: Vec<EntityId> = self.doomed.iter().collect();
        for id in doomed {
            if self.live.remove(id).is_ok() {
                if let Some(entity) = self.entities.remove(&id) {
                    debug!(%id, kind = entity.kind(), "destroyed entity");
                }
            }
        }
        self.doomed.clear();
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    /// Draws all live entities in order of ascending altitude, ties broken
    /// by ascending ID.
    ///
    /// Draw failures are logged and skipped; drawing never mutates engine
    /// state and never aborts the frame.
    pub fn draw(&self, backend: &mut dyn DrawBackend) {
        let mut order: Vec<(i32, EntityId)> = self
            .live
            .iter()
            .filter_map(|id| self.entities.get(&id).map(|e| (e.altitude(), id)))
            .collect();
        order.sort_unstable(); // (altitude, id); the id makes keys unique

        for (_, id) in order {
            if let Some(entity) = self.entities.get(&id) {
                if let Err(err) = backend.draw_entity(entity) {
                    warn!(%id, %err, "draw hook failed");
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Delivers one event to one entity's behavior.
    ///
    /// Returns `true` if the behavior consumed the event; `false` if it
    /// ignored it or the handle is stale. The behavior is detached from its
    /// entity for the duration of the call, so it receives full mutable
    /// world access through the [`EngineContext`].
    pub fn dispatch(&mut self, id: EntityId, event: &GameEvent, control: &mut LoopControl) -> bool {
        let Some(mut behavior) = self.entities.get_mut(&id).and_then(|e| e.behavior.take())
        else {
            return false;
        };

        let handled = {
            let mut ctx = EngineContext {
                world: self,
                control,
            };
            behavior.on_event(id, event, &mut ctx)
        };

        // Reattach unless the entity was removed during its own callback.
        if let Some(entity) = self.entities.get_mut(&id) {
            if entity.behavior.is_none() {
                entity.behavior = Some(behavior);
            }
        }
        handled
    }

    /// Delivers one event to every live entity, iterating a snapshot taken
    /// before the first delivery. Returns the number of entities that
    /// consumed the event.
    pub fn broadcast(&mut self, event: &GameEvent, control: &mut LoopControl) -> usize {
        let snapshot = self.live_handles();
        let mut handled = 0;
        for id in &snapshot {
            if self.dispatch(id, event, control) {
                handled += 1;
            }
        }
        handled
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("next_id", &self.next_id)
            .field("live", &self.live)
            .field("doomed", &self.doomed)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
