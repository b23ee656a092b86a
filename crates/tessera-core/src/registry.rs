//! Bounded, insertion-ordered lists of entity handles.
//!
//! [`HandleList`] is the engine's registry primitive: a fixed-capacity list
//! of [`EntityId`] handles that preserves insertion order. The world keeps
//! two of these (the live-set and the pending-deletion set) and several
//! query operations return fresh lists.
//!
//! Handles rather than references are stored deliberately: a stale handle is
//! harmless (lookups simply miss), where a dangling reference would not be.

use std::fmt;
use std::ops::Index;

use thiserror::Error;

use crate::entity::EntityId;

/// Default registry capacity.
pub const MAX_ENTITIES: usize = 1000;

/// Errors from [`HandleList`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListError {
    /// The list is at capacity; the insert was a no-op.
    #[error("handle list is at capacity ({0})")]
    Full(usize),
    /// The handle was not present; the remove was a no-op.
    #[error("handle {0} not present in list")]
    NotFound(EntityId),
}

/// Fixed-capacity, insertion-ordered list of entity handles.
///
/// Removal is a linear scan for the first occurrence followed by a shift-left
/// of the remaining elements, so relative order is always preserved. Inserting
/// the same handle twice is permitted by [`insert`](Self::insert); callers
/// that need set semantics use [`insert_unique`](Self::insert_unique).
///
/// Indexing with `[]` past the current length is a contract violation and
/// panics; use [`get`](Self::get) for fallible access.
#[derive(Clone, PartialEq, Eq)]
pub struct HandleList {
    handles: Vec<EntityId>,
    capacity: usize,
}

impl HandleList {
    /// Creates an empty list with the default capacity ([`MAX_ENTITIES`]).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTITIES)
    }

    /// Creates an empty list holding at most `capacity` handles.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::new(),
            capacity,
        }
    }

    /// Appends a handle at the end.
    ///
    /// # Errors
    ///
    /// [`ListError::Full`] if the list is at capacity; the list is unchanged.
    pub fn insert(&mut self, id: EntityId) -> Result<(), ListError> {
        if self.handles.len() >= self.capacity {
            return Err(ListError::Full(self.capacity));
        }
        self.handles.push(id);
        Ok(())
    }

    /// Appends a handle only if it is not already present.
    ///
    /// Idempotent: inserting a present handle succeeds without change.
    ///
    /// # Errors
    ///
    /// [`ListError::Full`] if the handle is absent and the list is at
    /// capacity.
    pub fn insert_unique(&mut self, id: EntityId) -> Result<(), ListError> {
        if self.contains(id) {
            return Ok(());
        }
        self.insert(id)
    }

    /// Removes the first occurrence of `id`, preserving relative order.
    ///
    /// # Errors
    ///
    /// [`ListError::NotFound`] if the handle is absent.
    pub fn remove(&mut self, id: EntityId) -> Result<(), ListError> {
        match self.handles.iter().position(|&h| h == id) {
            Some(pos) => {
                // Vec::remove shifts the tail left by one.
                self.handles.remove(pos);
                Ok(())
            }
            None => Err(ListError::NotFound(id)),
        }
    }

    /// Empties the list. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.handles.clear();
    }

    /// Returns the number of handles currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if no handles are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the maximum number of handles the list can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the handle at position `i`, or `None` past the end.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<EntityId> {
        self.handles.get(i).copied()
    }

    /// Returns `true` if `id` is present.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.handles.contains(&id)
    }

    /// Iterates over the handles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.handles.iter().copied()
    }
}

impl Index<usize> for HandleList {
    type Output = EntityId;

    fn index(&self, i: usize) -> &EntityId {
        assert!(
            i < self.handles.len(),
            "handle list index {i} out of range (len {})",
            self.handles.len()
        );
        &self.handles[i]
    }
}

impl Default for HandleList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleList")
            .field("handles", &self.handles)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<'a> IntoIterator for &'a HandleList {
    type Item = EntityId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, EntityId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter().copied()
    }
}

// =============================================================================
// Tests
// =============================================================================
