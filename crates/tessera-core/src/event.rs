//! The closed set of engine events.
//!
//! Events are ephemeral values: the dispatcher constructs one immediately
//! before delivery, hands the same value by reference to each candidate
//! entity in turn, and drops it afterwards. Nothing retains an event.
//!
//! The original downcast-per-handler protocol becomes a single tagged enum
//! here: behaviors match on [`GameEvent`] once and the discriminant check is
//! free. [`EventKind`] carries the string tag used for identification and
//! debugging.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// What a pointer did.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerAction {
    /// The pointer moved without a button change.
    Moved,
    /// A button went down.
    Pressed,
    /// A button came up.
    Released,
}

/// Which pointer button, if any.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    /// No button involved (plain movement).
    #[default]
    None,
    /// Left button.
    Left,
    /// Right button.
    Right,
    /// Middle button.
    Middle,
}

/// Discriminant tag for a [`GameEvent`].
///
/// `Display` renders the wire-style names ("step", "collision", ...), which
/// is what log lines and debugging output use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A simulation step.
    Step,
    /// A mover attempted to leave the world bounds.
    OutOfBounds,
    /// Two entities met in the same cell.
    Collision,
    /// A key press or release.
    Key,
    /// A pointer movement or button change.
    Pointer,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => write!(f, "step"),
            Self::OutOfBounds => write!(f, "out-of-bounds"),
            Self::Collision => write!(f, "collision"),
            Self::Key => write!(f, "key"),
            Self::Pointer => write!(f, "pointer"),
        }
    }
}

/// An event delivered to entity behaviors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// One tick of the fixed-step loop; carries the step counter.
    Step {
        /// Number of completed loop iterations before this one.
        count: u64,
    },
    /// The receiver tried to move outside the world bounds. The mover is
    /// implicit: only the blocked entity receives this event.
    OutOfBounds,
    /// Two entities occupy the same cell this frame. Both parties receive
    /// the same event.
    Collision {
        /// The entity whose movement triggered the collision.
        first: EntityId,
        /// The entity already occupying the target cell.
        second: EntityId,
        /// The world position where the collision happened.
        position: Vec2,
    },
    /// A key changed state. Positive codes are presses; a release carries
    /// the negated press code.
    Key {
        /// Signed key code.
        code: i32,
    },
    /// The pointer moved or a button changed state.
    Pointer {
        /// What happened.
        action: PointerAction,
        /// The button involved, or [`PointerButton::None`] for movement.
        button: PointerButton,
        /// Screen X coordinate.
        x: i32,
        /// Screen Y coordinate.
        y: i32,
    },
}

impl GameEvent {
    /// Returns the discriminant tag for this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Step { .. } => EventKind::Step,
            Self::OutOfBounds => EventKind::OutOfBounds,
            Self::Collision { .. } => EventKind::Collision,
            Self::Key { .. } => EventKind::Key,
            Self::Pointer { .. } => EventKind::Pointer,
        }
    }

    /// For key events, the unsigned key code. `None` for other events.
    #[must_use]
    pub const fn key_code(&self) -> Option<i32> {
        match self {
            Self::Key { code } => Some(code.abs()),
            _ => None,
        }
    }

    /// For key events, whether this is a press (`true`) or release
    /// (`false`). `None` for other events.
    #[must_use]
    pub const fn is_key_press(&self) -> Option<bool> {
        match self {
            Self::Key { code } => Some(*code > 0),
            _ => None,
        }
    }
}
