//! Entity types for the simulation engine.
//!
//! This module provides the building blocks every simulation participant is
//! made of:
//! - [`EntityId`]: Unique, monotonically assigned identifier
//! - [`Solidness`]: How an entity participates in collision blocking
//! - [`Entity`]: The complete entity record (identity, spatial state, behavior)
//! - [`EntitySpec`]: Builder-style description consumed by [`World::spawn`]
//! - [`Behavior`]: The per-entity event handler trait
//!
//! # Lifecycle
//!
//! Entities are created through [`World::spawn`], which both allocates the
//! record and registers it in the live-set in one step. The world is the only
//! party that destroys an entity: either explicitly via [`World::remove`] or,
//! for entities marked for deletion, at the end of the next
//! [`World::update`].
//!
//! # Example
//!
//! ```
//! use tessera_core::entity::{EntitySpec, Solidness};
//! use tessera_core::world::World;
//! use glam::Vec2;
//!
//! let mut world = World::new();
//! let id = world
//!     .spawn(
//!         EntitySpec::new("saucer")
//!             .position(Vec2::new(10.0, 5.0))
//!             .solidness(Solidness::Soft)
//!             .altitude(2),
//!     )
//!     .unwrap();
//!
//! assert_eq!(world.get(id).unwrap().kind(), "saucer");
//! ```
//!
//! [`World::spawn`]: crate::world::World::spawn
//! [`World::remove`]: crate::world::World::remove
//! [`World::update`]: crate::world::World::update

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::event::GameEvent;
use crate::world::EngineContext;

// =============================================================================
// EntityId
// =============================================================================

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Identifiers are assigned by
/// the world from a monotonically increasing counter at spawn time, are never
/// reused for the lifetime of the process, and are immutable once assigned.
///
/// # Ordering
///
/// Entity IDs order by their numeric value. Because assignment is monotonic,
/// ID order equals spawn order, which the engine relies on for deterministic
/// iteration and for the draw-order tie-break.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

// =============================================================================
// Solidness
// =============================================================================

/// How an entity participates in movement blocking.
///
/// All three variants receive collision notifications; solidness only decides
/// whether movement is *blocked* when two entities meet in the same cell.
///
/// - `Hard` blocks movement against other solid entities.
/// - `Soft` never blocks movement but counts as solid for the blocking test,
///   so a hard mover stepping onto a soft occupant is stopped.
/// - `Spectral` never blocks and is excluded from the solid predicate
///   entirely; spectral movers pass through everything.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Solidness {
    /// Blocks movement against other solid entities.
    #[default]
    Hard,
    /// Solid for draw/blocking purposes but never initiates a block.
    Soft,
    /// Ghost-like; collides (notifies) but never blocks and is never blocked.
    Spectral,
}

impl Solidness {
    /// Returns `true` for `Hard` and `Soft`, `false` for `Spectral`.
    ///
    /// Movement between two entities is blocked only when *both* parties are
    /// solid by this predicate.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(self, Self::Spectral)
    }
}

impl fmt::Display for Solidness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hard => write!(f, "hard"),
            Self::Soft => write!(f, "soft"),
            Self::Spectral => write!(f, "spectral"),
        }
    }
}

// =============================================================================
// Behavior
// =============================================================================

/// Per-entity event handler.
///
/// Behaviors are the polymorphic seam of the engine: each entity owns a boxed
/// behavior, and the world delivers every event addressed to the entity
/// through [`Behavior::on_event`]. Dispatch is synchronous and depth-one; the
/// behavior is temporarily detached from its entity for the duration of the
/// call, so it may freely mutate the world (spawn, mark for delete, move
/// other entities) through the [`EngineContext`].
///
/// # Example
///
/// ```
/// use tessera_core::entity::{Behavior, EntityId};
/// use tessera_core::event::GameEvent;
/// use tessera_core::world::EngineContext;
///
/// /// Ends the run once it has seen five step events.
/// struct Countdown(u64);
///
/// impl Behavior for Countdown {
///     fn on_event(
///         &mut self,
///         _me: EntityId,
///         event: &GameEvent,
///         ctx: &mut EngineContext<'_>,
///     ) -> bool {
///         if let GameEvent::Step { count } = event {
///             if *count + 1 >= self.0 {
///                 ctx.control.set_game_over(true);
///             }
///             return true;
///         }
///         false
///     }
/// }
/// ```
pub trait Behavior {
    /// Handles an event addressed to the entity identified by `me`.
    ///
    /// Returns `true` if the event was consumed or acted upon, `false` if it
    /// was ignored.
    fn on_event(&mut self, me: EntityId, event: &GameEvent, ctx: &mut EngineContext<'_>) -> bool;
}

/// Behavior that ignores every event.
///
/// The default behavior for entities spawned from an [`EntitySpec`] that does
/// not name one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inert;

impl Behavior for Inert {
    fn on_event(&mut self, _me: EntityId, _event: &GameEvent, _ctx: &mut EngineContext<'_>) -> bool {
        false
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A simulation participant.
///
/// An entity carries identity (`id`, `kind`), spatial state (`position`,
/// `velocity`), physical attributes (`solidness`, `altitude`), the one-way
/// deletion mark, and its event-handling behavior.
///
/// # Invariants
///
/// - `id` is unique within the world and immutable.
/// - The deletion mark, once set, is never cleared.
pub struct Entity {
    id: EntityId,
    kind: String,
    position: Vec2,
    velocity: Vec2,
    solidness: Solidness,
    altitude: i32,
    marked: bool,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Entity {
    /// Builds an entity from a spec. Only the world hands out IDs.
    pub(crate) fn from_spec(id: EntityId, spec: EntitySpec) -> Self {
        Self {
            id,
            kind: spec.kind,
            position: spec.position,
            velocity: spec.velocity,
            solidness: spec.solidness,
            altitude: spec.altitude,
            marked: false,
            behavior: Some(spec.behavior.unwrap_or_else(|| Box::new(Inert))),
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the programmer-assigned kind label.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Replaces the kind label.
    pub fn set_kind(&mut self, kind: impl Into<String>) {
        self.kind = kind.into();
    }

    /// Returns the current world position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Sets the world position directly, bypassing collision resolution.
    ///
    /// Movement that should respect bounds and solidness goes through
    /// [`World::move_entity`](crate::world::World::move_entity) instead.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Returns the per-frame velocity. Zero means "does not move this frame".
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Sets the per-frame velocity.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Returns the entity's solidness.
    #[must_use]
    pub const fn solidness(&self) -> Solidness {
        self.solidness
    }

    /// Sets the entity's solidness.
    pub fn set_solidness(&mut self, solidness: Solidness) {
        self.solidness = solidness;
    }

    /// Returns the draw-order key. Lower altitudes draw first.
    #[must_use]
    pub const fn altitude(&self) -> i32 {
        self.altitude
    }

    /// Sets the draw-order key.
    pub fn set_altitude(&mut self, altitude: i32) {
        self.altitude = altitude;
    }

    /// Returns `true` once the entity has been marked for deletion.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.marked
    }

    /// Sets the one-way deletion mark. Only the world flips this.
    pub(crate) fn set_marked(&mut self) {
        self.marked = true;
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("solidness", &self.solidness)
            .field("altitude", &self.altitude)
            .field("marked", &self.marked)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// EntitySpec
// =============================================================================

/// Description of an entity to spawn.
///
/// `EntitySpec` is consumed by [`World::spawn`](crate::world::World::spawn).
/// Unset fields take their defaults: origin position, zero velocity,
/// [`Solidness::Hard`], altitude 0, and the [`Inert`] behavior.
pub struct EntitySpec {
    kind: String,
    position: Vec2,
    velocity: Vec2,
    solidness: Solidness,
    altitude: i32,
    behavior: Option<Box<dyn Behavior>>,
}

impl EntitySpec {
    /// Starts a spec with the given kind label.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            solidness: Solidness::default(),
            altitude: 0,
            behavior: None,
        }
    }

    /// Sets the initial position.
    #[must_use]
    pub fn position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the solidness.
    #[must_use]
    pub fn solidness(mut self, solidness: Solidness) -> Self {
        self.solidness = solidness;
        self
    }

    /// Sets the draw-order altitude.
    #[must_use]
    pub fn altitude(mut self, altitude: i32) -> Self {
        self.altitude = altitude;
        self
    }

    /// Attaches an event-handling behavior.
    #[must_use]
    pub fn behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }
}

impl Default for EntitySpec {
    fn default() -> Self {
        Self::new("entity")
    }
}

impl fmt::Debug for EntitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySpec")
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("solidness", &self.solidness)
            .field("altitude", &self.altitude)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
