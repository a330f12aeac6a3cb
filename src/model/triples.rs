use crate::model::ModelError;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identity of one entry in a [`TriplePool`].
///
/// Slots are never renumbered.  A slot freed by a deletion keeps its
/// number and is handed out again by a later add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotId(usize);

impl SlotId {
    pub fn new(index: usize) -> Self {
        SlotId(index)
    }

    /// position in the pool
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for SlotId {
    fn from(index: usize) -> Self {
        SlotId(index)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value carried by a [`Triple`]: a numeric coefficient, or an index into
/// the owning model's string table for a value resolved later.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Payload<T> {
    Value(T),
    String(usize),
}

impl<T: Copy> Payload<T> {
    pub fn is_string(&self) -> bool {
        matches!(self, Payload::String(_))
    }

    /// numeric value, or `None` for a string-valued entry
    pub fn value(&self) -> Option<T> {
        match *self {
            Payload::Value(v) => Some(v),
            Payload::String(_) => None,
        }
    }
}

/// Largest row index a triple may hold.
pub const MAX_ROW: usize = (1 << 31) - 1;

/// Largest column index a triple may hold.
pub const MAX_COLUMN: usize = i32::MAX as usize;

/// One stored sparse entry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triple<T = f64> {
    pub row: usize,
    pub column: usize,
    pub payload: Payload<T>,
}

impl<T: Copy> Triple<T> {
    pub fn new(row: usize, column: usize, value: T) -> Self {
        Triple {
            row,
            column,
            payload: Payload::Value(value),
        }
    }

    pub fn is_string(&self) -> bool {
        self.payload.is_string()
    }

    pub fn value(&self) -> Option<T> {
        self.payload.value()
    }
}

/// Flat pool of triples addressed by [`SlotId`].
///
/// The pool belongs to the owning model.  The linked views and the pair
/// hash only hold slot numbers into it, so every structural operation takes
/// the pool as an explicit argument.  A slot is *vacant* once the second
/// half of a deletion has released it; reading a vacant slot through
/// [`triple`](Self::triple) reports [`ModelError::InvalidSlot`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriplePool<T = f64> {
    slots: Vec<Option<Triple<T>>>,
}

impl<T> Default for TriplePool<T> {
    fn default() -> Self {
        TriplePool { slots: Vec::new() }
    }
}

impl<T: Copy> TriplePool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TriplePool {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Pool built from a list of triples, one slot per entry in order.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple<T>>) -> Self {
        TriplePool {
            slots: triples.into_iter().map(Some).collect(),
        }
    }

    /// number of slots ever written, vacant ones included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Make room for at least `capacity` slots without changing `len`.
    pub fn reserve(&mut self, capacity: usize) {
        self.slots.reserve(capacity.saturating_sub(self.slots.len()));
    }

    pub fn get(&self, slot: SlotId) -> Option<&Triple<T>> {
        self.slots.get(slot.index()).and_then(|t| t.as_ref())
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Triple<T>> {
        self.slots.get_mut(slot.index()).and_then(|t| t.as_mut())
    }

    /// Occupied triple at `slot`, or an invalid-slot error.
    pub fn triple(&self, slot: SlotId) -> Result<&Triple<T>, ModelError> {
        self.get(slot).ok_or(ModelError::InvalidSlot(slot))
    }

    pub fn is_vacant(&self, slot: SlotId) -> bool {
        self.get(slot).is_none()
    }

    /// Write `triple` at `slot`.  Writing one past the end appends; writing
    /// further out fills the gap with vacant slots.
    pub fn put(&mut self, slot: SlotId, triple: Triple<T>) {
        let i = slot.index();
        if i >= self.slots.len() {
            self.slots.resize(i + 1, None);
        }
        self.slots[i] = Some(triple);
    }

    /// Release the triple at `slot`, returning it.
    pub fn vacate(&mut self, slot: SlotId) -> Option<Triple<T>> {
        self.slots.get_mut(slot.index()).and_then(|t| t.take())
    }

    /// Occupied slots with their triples, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Triple<T>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (SlotId(i), t)))
    }
}
