//! Collaborator traits for rendering and input.
//!
//! The engine core draws nothing and reads no devices. It talks to the
//! outside through two seams: [`DrawBackend`], called once per visible entity
//! in draw order plus once per frame for the buffer swap, and
//! [`InputSource`], polled once per frame for device-state deltas. Real
//! implementations (terminal, window, test doubles) live outside this crate.

use thiserror::Error;

use crate::entity::Entity;
use crate::event::{GameEvent, PointerAction, PointerButton};

/// Error from a rendering collaborator.
///
/// Backend failures are diagnostics, never control flow: the world logs them
/// and carries on with the frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Drawing a single entity failed.
    #[error("draw failed: {0}")]
    Draw(String),
    /// The end-of-frame buffer swap failed.
    #[error("buffer swap failed: {0}")]
    Swap(String),
}

/// Rendering collaborator.
pub trait DrawBackend {
    /// Draws one entity. Invoked once per live entity, in altitude order
    /// (ties broken by ascending ID), during [`World::draw`].
    ///
    /// # Errors
    ///
    /// Implementations report failures with [`BackendError::Draw`]; the
    /// caller logs and continues.
    ///
    /// [`World::draw`]: crate::world::World::draw
    fn draw_entity(&mut self, entity: &Entity) -> Result<(), BackendError>;

    /// Presents the frame. Invoked exactly once per loop iteration, after
    /// all draws.
    ///
    /// # Errors
    ///
    /// Implementations report failures with [`BackendError::Swap`].
    fn swap_buffers(&mut self) -> Result<(), BackendError>;
}

/// A device-state change observed by an input collaborator.
///
/// The loop driver converts each of these into a [`GameEvent`] and
/// broadcasts it to every live entity before the frame's step event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key changed state; positive code = press, negated = release.
    Key {
        /// Signed key code.
        code: i32,
    },
    /// The pointer moved or a button changed state.
    Pointer {
        /// What happened.
        action: PointerAction,
        /// The button involved.
        button: PointerButton,
        /// Screen X coordinate.
        x: i32,
        /// Screen Y coordinate.
        y: i32,
    },
}

impl From<InputEvent> for GameEvent {
    fn from(input: InputEvent) -> Self {
        match input {
            InputEvent::Key { code } => Self::Key { code },
            InputEvent::Pointer {
                action,
                button,
                x,
                y,
            } => Self::Pointer {
                action,
                button,
                x,
                y,
            },
        }
    }
}

/// Input collaborator.
///
/// Each call compares current device state against the previous poll and
/// returns the changes as zero or more events, oldest first.
pub trait InputSource {
    /// Polls the devices once and returns the observed changes.
    fn poll(&mut self) -> Vec<InputEvent>;
}
