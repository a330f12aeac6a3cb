use super::{fx_hash, grown_capacity, HashChains};
use crate::model::ModelError;
use std::cell::Cell;

/// Owned string → dense index table, used for row, column and string-value
/// names.
///
/// Names live in a positional array indexed by their dense index, so the
/// array may have holes where a name was deleted.  A hole is reused by the
/// next [`add_hash`](Self::add_hash) at that index.
#[derive(Debug, Clone, Default)]
pub struct NameHash {
    names: Vec<Option<String>>,
    chains: HashChains,
    maximum_items: usize,
    last_hit: Cell<Option<usize>>,
}

impl NameHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_items: usize) -> Self {
        NameHash {
            names: Vec::with_capacity(max_items),
            chains: HashChains::with_capacity(max_items),
            maximum_items: max_items,
            last_hit: Cell::new(None),
        }
    }

    /// one past the highest index ever registered
    pub fn number_items(&self) -> usize {
        self.names.len()
    }

    pub fn maximum_items(&self) -> usize {
        self.maximum_items
    }

    /// number of names currently registered
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    /// positional name array, holes included
    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    /// Grows to hold at least `max_items` names and rehashes.  Never
    /// shrinks; asking for less than the current occupancy is an error.
    pub fn resize(&mut self, max_items: usize) -> Result<(), ModelError> {
        if max_items < self.number_items() {
            return Err(ModelError::CapacityBelowOccupancy {
                requested: max_items,
                occupied: self.number_items(),
            });
        }
        if max_items <= self.maximum_items {
            return Ok(());
        }
        log::debug!(
            "name hash resize {} -> {} ({} names)",
            self.maximum_items,
            max_items,
            self.len()
        );
        let names = &self.names;
        self.chains.rehash(max_items, |i| {
            fx_hash(names[i].as_deref().unwrap_or_default())
        });
        self.names.reserve(max_items - self.names.len());
        self.maximum_items = max_items;
        Ok(())
    }

    /// Index registered for `name`, if any.
    pub fn hash(&self, name: &str) -> Option<usize> {
        if let Some(i) = self.last_hit.get() {
            if self.name(i) == Some(name) {
                return Some(i);
            }
        }
        let found = self
            .chains
            .find(fx_hash(name), |i| self.names[i].as_deref() == Some(name));
        if found.is_some() {
            self.last_hit.set(found);
        }
        found
    }

    /// Registers a copy of `name` at `index`.
    pub fn add_hash(&mut self, index: usize, name: &str) -> Result<(), ModelError> {
        if self.name(index).is_some() {
            return Err(ModelError::NameSlotOccupied(index));
        }
        if self.hash(name).is_some() {
            return Err(ModelError::DuplicateName(name.to_string()));
        }
        let occupied = self.number_items().max(index + 1);
        if occupied > self.maximum_items {
            self.resize(grown_capacity(occupied))?;
        }
        if index >= self.names.len() {
            self.names.resize(index + 1, None);
        }
        self.names[index] = Some(name.to_string());
        self.chains.insert(fx_hash(name), index);
        Ok(())
    }

    /// Removes the name registered at `index`, returning it.  Other names
    /// sharing its collision chain are left in place.
    pub fn delete_hash(&mut self, index: usize) -> Option<String> {
        let name = self.names.get_mut(index)?.take()?;
        self.chains.remove(fx_hash(name.as_str()), index);
        if self.last_hit.get() == Some(index) {
            self.last_hit.set(None);
        }
        Some(name)
    }

    /// Name at position `which`, independent of hashing.
    pub fn name(&self, which: usize) -> Option<&str> {
        self.names.get(which).and_then(|n| n.as_deref())
    }
}
