//! # Tessera Core
//!
//! A small fixed-step 2D simulation engine: a capacity-bounded entity
//! registry, a per-frame movement and collision resolver, and a discrete-step
//! game loop that drives entities through a closed event protocol.
//!
//! ## Architecture
//!
//! - **Entities** ([`entity`]): identity, spatial state, solidness, altitude,
//!   and a boxed [`Behavior`] event handler.
//! - **Registry** ([`registry`]): fixed-capacity, insertion-ordered lists of
//!   entity handles.
//! - **Events** ([`event`]): a closed enum of step, out-of-bounds,
//!   collision, key, and pointer events.
//! - **World** ([`world`]): owns the live-set and pending-deletion set,
//!   resolves movement/collisions, runs deferred deletion, traverses in draw
//!   order.
//! - **Loop** ([`game_loop`]): fixed frame time with oversleep-compensated
//!   pacing.
//! - **Collaborators** ([`backend`]): trait seams for rendering and input;
//!   implementations live outside this crate.
//!
//! Everything is single-threaded and synchronous; the engine is driven by
//! explicitly threaded service objects, not globals.
//!
//! ## Usage
//!
//! ```
//! use tessera_core::{EntitySpec, GameLoop, World};
//! use tessera_core::entity::{Behavior, EntityId};
//! use tessera_core::event::GameEvent;
//! use tessera_core::world::EngineContext;
//!
//! /// Stops the run after three steps.
//! struct Stopwatch;
//!
//! impl Behavior for Stopwatch {
//!     fn on_event(
//!         &mut self,
//!         _me: EntityId,
//!         event: &GameEvent,
//!         ctx: &mut EngineContext<'_>,
//!     ) -> bool {
//!         if let GameEvent::Step { count } = event {
//!             if *count >= 2 {
//!                 ctx.control.set_game_over(true);
//!             }
//!             return true;
//!         }
//!         false
//!     }
//! }
//!
//! let mut world = World::new();
//! world.spawn(EntitySpec::new("stopwatch").behavior(Stopwatch)).unwrap();
//!
//! let mut game_loop = GameLoop::new();
//! game_loop.start_up();
//! // game_loop.run(&mut world, &mut input, &mut backend);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backend;
pub mod entity;
pub mod event;
pub mod game_loop;
pub mod registry;
pub mod world;

#[cfg(test)]
mod tests;

pub use backend::{BackendError, DrawBackend, InputEvent, InputSource};
pub use entity::{Behavior, Entity, EntityId, EntitySpec, Inert, Solidness};
pub use event::{EventKind, GameEvent, PointerAction, PointerButton};
pub use game_loop::{FrameClock, GameLoop, LoopControl, FRAME_TIME_DEFAULT};
pub use registry::{HandleList, ListError, MAX_ENTITIES};
pub use world::{Bounds, EngineContext, MoveOutcome, World, WorldError};
