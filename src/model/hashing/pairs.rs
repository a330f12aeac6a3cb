use super::{fx_hash, grown_capacity, HashChains};
use crate::model::{ModelError, SlotId, TriplePool};

/// (row, column) → pool slot table.
///
/// Used to detect duplicate coefficients, and to let one orientation view
/// find the slot that the other view allocated for a pair without walking
/// any chains.  Keys are not stored: a candidate slot matches when the
/// triple it holds carries the probed row and column.
#[derive(Debug, Clone, Default)]
pub struct PairHash {
    chains: HashChains,
    maximum_items: usize,
}

fn pair_hash(row: usize, column: usize) -> u64 {
    fx_hash(&(row, column))
}

impl PairHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_items: usize) -> Self {
        PairHash {
            chains: HashChains::with_capacity(max_items),
            maximum_items: max_items,
        }
    }

    /// Table holding every occupied slot of `triples`.
    pub fn from_triples<T: Copy>(triples: &TriplePool<T>) -> Result<Self, ModelError> {
        let mut hash = PairHash::with_capacity(triples.len());
        for (slot, t) in triples.iter() {
            hash.add_hash(slot, t.row, t.column, triples)?;
        }
        Ok(hash)
    }

    /// number of pairs currently registered
    pub fn number_items(&self) -> usize {
        self.chains.len()
    }

    pub fn maximum_items(&self) -> usize {
        self.maximum_items
    }

    /// Grows to hold at least `max_items` pairs, rehashing against the
    /// current contents of `triples`.
    pub fn resize<T: Copy>(
        &mut self,
        max_items: usize,
        triples: &TriplePool<T>,
    ) -> Result<(), ModelError> {
        if max_items < self.number_items() {
            return Err(ModelError::CapacityBelowOccupancy {
                requested: max_items,
                occupied: self.number_items(),
            });
        }
        if max_items <= self.maximum_items {
            return Ok(());
        }
        // every registered slot must still be readable to be rehashed
        let keys = self
            .chains
            .indices()
            .into_iter()
            .map(|i| triples.triple(SlotId::new(i)).map(|t| (i, pair_hash(t.row, t.column))))
            .collect::<Result<rustc_hash::FxHashMap<_, _>, _>>()?;
        log::debug!(
            "pair hash resize {} -> {} ({} pairs)",
            self.maximum_items,
            max_items,
            keys.len()
        );
        self.chains.rehash(max_items, |i| keys[&i]);
        self.maximum_items = max_items;
        Ok(())
    }

    /// Slot holding `(row, column)`, if registered.
    pub fn hash<T: Copy>(&self, row: usize, column: usize, triples: &TriplePool<T>) -> Option<SlotId> {
        self.chains
            .find(pair_hash(row, column), |i| {
                triples
                    .get(SlotId::new(i))
                    .is_some_and(|t| t.row == row && t.column == column)
            })
            .map(SlotId::new)
    }

    /// Registers `slot` as the holder of `(row, column)`.  The triple at
    /// `slot` must already carry that pair.  Registering the same slot
    /// twice is a no-op; a different slot for a registered pair is a
    /// duplicate.
    pub fn add_hash<T: Copy>(
        &mut self,
        slot: SlotId,
        row: usize,
        column: usize,
        triples: &TriplePool<T>,
    ) -> Result<(), ModelError> {
        match self.hash(row, column, triples) {
            Some(s) if s == slot => return Ok(()),
            Some(_) => return Err(ModelError::DuplicateEntry { row, column }),
            None => {}
        }
        if self.number_items() >= self.maximum_items {
            self.resize(grown_capacity(self.number_items()), triples)?;
        }
        self.chains.insert(pair_hash(row, column), slot.index());
        Ok(())
    }

    /// every registered slot, in no particular order
    pub fn slots(&self) -> impl Iterator<Item = SlotId> {
        self.chains.indices().into_iter().map(SlotId::new)
    }

    /// Unregisters `slot` from the chain for `(row, column)`.  Returns
    /// false if it was not registered there.
    pub fn delete_hash(&mut self, slot: SlotId, row: usize, column: usize) -> bool {
        self.chains.remove(pair_hash(row, column), slot.index())
    }
}
