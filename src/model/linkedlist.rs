use crate::algebra::FloatT;
use crate::model::hashing::grown_capacity;
use crate::model::{ModelError, PairHash, Payload, SlotId, Triple, TriplePool, MAX_COLUMN, MAX_ROW};
use itertools::Itertools;
use std::iter::zip;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which coordinate a [`LinkedList`] groups its chains by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// one chain per row
    Row,
    /// one chain per column
    Column,
}

impl Orientation {
    pub fn other(self) -> Self {
        match self {
            Orientation::Row => Orientation::Column,
            Orientation::Column => Orientation::Row,
        }
    }

    /// chain index of a triple in this orientation
    pub fn major<T>(self, triple: &Triple<T>) -> usize {
        match self {
            Orientation::Row => triple.row,
            Orientation::Column => triple.column,
        }
    }

    /// complementary coordinate of a triple
    pub fn minor<T>(self, triple: &Triple<T>) -> usize {
        match self {
            Orientation::Row => triple.column,
            Orientation::Column => triple.row,
        }
    }

    /// largest major index a view of this orientation accepts
    pub fn max_major(self) -> usize {
        match self {
            Orientation::Row => MAX_ROW,
            Orientation::Column => MAX_COLUMN,
        }
    }

    /// (row, column) of the entry at `major`, `minor`
    pub fn coordinates(self, major: usize, minor: usize) -> (usize, usize) {
        match self {
            Orientation::Row => (major, minor),
            Orientation::Column => (minor, major),
        }
    }
}

/// Head and tail of one doubly linked chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chain {
    pub first: Option<SlotId>,
    pub last: Option<SlotId>,
}

/// The chain a slot is linked into within one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Major(usize),
    Free,
}

// A slot with `chain == None` exists in the pool but is not yet linked
// in this view, i.e. the other view allocated it and has not propagated.
#[derive(Debug, Clone, Copy, Default)]
struct Link {
    previous: Option<SlotId>,
    next: Option<SlotId>,
    chain: Option<Membership>,
}

/// One orientation's view of the matrix: a doubly linked chain per major
/// index threading through pool slots, plus a chain of free slots.
///
/// A model keeps two of these over the same [`TriplePool`], one per
/// orientation.  Each logical edit is applied to the view matching its
/// orientation first (`add_easy`, `delete_same`) and then carried into the
/// other view, either through the [`PairHash`] (`add_hard`,
/// `delete_other`) or by replaying the chain positions the first view
/// produced (`add_hard_propagated`, `update_deleted`).  Nothing keeps the
/// views in step automatically; an owner that skips the second half leaves
/// them disagreeing, which [`check_consistency`](Self::check_consistency)
/// reports.
#[derive(Debug, Clone)]
pub struct LinkedList {
    orientation: Orientation,
    links: Vec<Link>,
    chains: Vec<Chain>,
    free: Chain,
    maximum_major: usize,
    maximum_elements: usize,
}

impl LinkedList {
    pub fn new(orientation: Orientation) -> Self {
        Self::with_capacity(orientation, 0, 0)
    }

    pub fn with_capacity(orientation: Orientation, max_major: usize, max_elements: usize) -> Self {
        LinkedList {
            orientation,
            links: Vec::with_capacity(max_elements),
            chains: Vec::with_capacity(max_major),
            free: Chain::default(),
            maximum_major: max_major,
            maximum_elements: max_elements,
        }
    }

    /// Builds every chain from the first `number_elements` slots of
    /// `triples` in one pass.  Vacant slots go onto the free chain.  The
    /// result is the same as adding the entries one by one in slot order.
    pub fn create<T: FloatT>(
        max_major: usize,
        max_elements: usize,
        number_major: usize,
        number_minor: usize,
        orientation: Orientation,
        number_elements: usize,
        triples: &TriplePool<T>,
    ) -> Result<Self, ModelError> {
        if number_elements > triples.len() {
            return Err(ModelError::IndexOutOfRange {
                index: number_elements,
                limit: triples.len(),
            });
        }
        let extents = [
            (number_major, orientation.max_major()),
            (number_minor, orientation.other().max_major()),
        ];
        for (number, max) in extents {
            if number > max + 1 {
                return Err(ModelError::IndexOutOfRange {
                    index: number,
                    limit: max + 1,
                });
            }
        }
        let mut list = Self::with_capacity(
            orientation,
            max_major.max(number_major),
            max_elements.max(number_elements),
        );
        list.chains = vec![Chain::default(); number_major];
        list.links = vec![Link::default(); number_elements];

        for slot in (0..number_elements).map(SlotId::new) {
            match triples.get(slot) {
                Some(t) => {
                    let (major, minor) = (orientation.major(t), orientation.minor(t));
                    if major >= number_major {
                        return Err(ModelError::IndexOutOfRange {
                            index: major,
                            limit: number_major,
                        });
                    }
                    if minor >= number_minor {
                        return Err(ModelError::IndexOutOfRange {
                            index: minor,
                            limit: number_minor,
                        });
                    }
                    list.push_back(Membership::Major(major), slot);
                }
                None => list.push_back(Membership::Free, slot),
            }
        }
        log::debug!(
            "{:?} view created: {} majors, {} elements",
            orientation,
            number_major,
            number_elements
        );
        Ok(list)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// number of major chains (one past the highest major seen)
    pub fn number_major(&self) -> usize {
        self.chains.len()
    }

    pub fn maximum_major(&self) -> usize {
        self.maximum_major
    }

    /// number of pool slots this view knows about, free ones included
    pub fn number_elements(&self) -> usize {
        self.links.len()
    }

    pub fn maximum_elements(&self) -> usize {
        self.maximum_elements
    }

    pub fn first_free(&self) -> Option<SlotId> {
        self.free.first
    }

    pub fn last_free(&self) -> Option<SlotId> {
        self.free.last
    }

    /// first slot on chain `which`
    pub fn first(&self, which: usize) -> Option<SlotId> {
        self.chains.get(which).and_then(|c| c.first)
    }

    /// last slot on chain `which`
    pub fn last(&self, which: usize) -> Option<SlotId> {
        self.chains.get(which).and_then(|c| c.last)
    }

    pub fn next(&self, slot: SlotId) -> Option<SlotId> {
        self.links.get(slot.index()).and_then(|l| l.next)
    }

    pub fn previous(&self, slot: SlotId) -> Option<SlotId> {
        self.links.get(slot.index()).and_then(|l| l.previous)
    }

    /// chain `slot` is linked into, if any
    pub fn membership(&self, slot: SlotId) -> Option<Membership> {
        self.links.get(slot.index()).and_then(|l| l.chain)
    }

    /// slots on chain `which`, first to last
    pub fn chain(&self, which: usize) -> ChainIter<'_> {
        ChainIter {
            list: self,
            pos: self.first(which),
        }
    }

    /// slots on the free chain, in the order they will be reused
    pub fn free_chain(&self) -> ChainIter<'_> {
        ChainIter {
            list: self,
            pos: self.free.first,
        }
    }

    /// Grows capacity without touching existing chains.  Asking for less
    /// than what is in use is an error.
    pub fn resize(&mut self, max_major: usize, max_elements: usize) -> Result<(), ModelError> {
        if max_major < self.number_major() {
            return Err(ModelError::CapacityBelowOccupancy {
                requested: max_major,
                occupied: self.number_major(),
            });
        }
        if max_elements < self.number_elements() {
            return Err(ModelError::CapacityBelowOccupancy {
                requested: max_elements,
                occupied: self.number_elements(),
            });
        }
        if max_major > self.maximum_major {
            self.chains.reserve(max_major - self.chains.len());
            self.maximum_major = max_major;
        }
        if max_elements > self.maximum_elements {
            self.links.reserve(max_elements - self.links.len());
            self.maximum_elements = max_elements;
        }
        Ok(())
    }

    /// Appends one whole major line in this view's own orientation, e.g.
    /// a row to the row view.  Slots come off the head of the free chain
    /// before the pool grows, and every new pair is registered in `hash`.
    /// A pair the hash already knows but this view has not linked yet is
    /// taken over in place.
    ///
    /// Returns the first slot of the new run, which the other view can
    /// replay with [`add_hard_propagated`](Self::add_hard_propagated).
    pub fn add_easy<T: FloatT>(
        &mut self,
        major_index: usize,
        indices: &[usize],
        elements: &[T],
        triples: &mut TriplePool<T>,
        hash: &mut PairHash,
    ) -> Result<Option<SlotId>, ModelError> {
        check_lengths(indices, elements)?;
        self.check_major(major_index)?;
        let coords = indices
            .iter()
            .map(|&minor| self.orientation.coordinates(major_index, minor))
            .collect_vec();
        self.check_new(&coords, triples, hash)?;

        self.ensure_major(major_index);
        let mut first = None;
        for (&(row, column), &value) in zip(&coords, elements) {
            let slot = self.place(major_index, row, column, Payload::Value(value), triples, hash)?;
            first.get_or_insert(slot);
        }
        log::trace!(
            "{:?} view: added {} elements to major {}",
            self.orientation,
            indices.len(),
            major_index
        );
        Ok(first)
    }

    /// Adds one line of the *other* orientation, e.g. a row to the column
    /// view.  Each element goes to the tail of its own major chain.  The
    /// pair hash decides whether an element reuses a slot the other view
    /// already allocated or gets a fresh one.
    pub fn add_hard<T: FloatT>(
        &mut self,
        minor_index: usize,
        indices: &[usize],
        elements: &[T],
        triples: &mut TriplePool<T>,
        hash: &mut PairHash,
    ) -> Result<(), ModelError> {
        check_lengths(indices, elements)?;
        let coords = indices
            .iter()
            .map(|&major| self.orientation.coordinates(major, minor_index))
            .collect_vec();
        for &major in indices {
            self.check_major(major)?;
        }
        self.check_new(&coords, triples, hash)?;

        for ((&major, &(row, column)), &value) in zip(zip(indices, &coords), elements) {
            self.place(major, row, column, Payload::Value(value), triples, hash)?;
        }
        log::trace!(
            "{:?} view: added {} elements across minor {}",
            self.orientation,
            indices.len(),
            minor_index
        );
        Ok(())
    }

    /// Replays an `add_easy` already done on `other`: the run starting at
    /// `first` in `other`'s chain is linked into this view's chains
    /// without any hashing.
    pub fn add_hard_propagated<T: FloatT>(
        &mut self,
        first: Option<SlotId>,
        triples: &TriplePool<T>,
        other: &LinkedList,
    ) -> Result<(), ModelError> {
        if other.orientation == self.orientation {
            return Err(ModelError::OrientationMismatch);
        }
        let Some(first) = first else {
            return Ok(());
        };
        let Some(Membership::Major(minor)) = other.membership(first) else {
            return Err(ModelError::ChainMismatch(first));
        };

        let mut pos = Some(first);
        while let Some(slot) = pos {
            let t = triples.triple(slot)?;
            if self.orientation.minor(t) != minor {
                return Err(ModelError::ChainMismatch(slot));
            }
            let major = self.orientation.major(t);
            self.ensure_slot(slot);
            match self.membership(slot) {
                Some(Membership::Major(_)) => return Err(ModelError::ChainMismatch(slot)),
                Some(Membership::Free) => {
                    self.unlink(slot);
                }
                None => {}
            }
            self.ensure_major(major);
            self.push_back(Membership::Major(major), slot);
            pos = other.next(slot);
        }
        Ok(())
    }

    /// Removes major chain `which` entirely: its slots are appended to the
    /// free chain in chain order and their pairs leave `hash`.  The triples
    /// stay readable so the other view can follow with
    /// [`update_deleted`](Self::update_deleted) or
    /// [`delete_other`](Self::delete_other).
    ///
    /// Returns the number of slots freed.
    pub fn delete_same<T: FloatT>(
        &mut self,
        which: usize,
        triples: &TriplePool<T>,
        hash: &mut PairHash,
    ) -> Result<usize, ModelError> {
        if which >= self.number_major() {
            return Err(ModelError::MajorOutOfRange {
                index: which,
                number_major: self.number_major(),
            });
        }
        let chain = std::mem::take(&mut self.chains[which]);
        let mut count = 0;
        let mut pos = chain.first;
        while let Some(slot) = pos {
            pos = self.links[slot.index()].next;
            if let Some(t) = triples.get(slot) {
                hash.delete_hash(slot, t.row, t.column);
            }
            self.links[slot.index()] = Link::default();
            self.push_back(Membership::Free, slot);
            count += 1;
        }
        log::trace!(
            "{:?} view: deleted major {} ({} elements)",
            self.orientation,
            which,
            count
        );
        Ok(count)
    }

    /// Removes every member whose minor coordinate is `which` (a major of
    /// the other orientation) by scanning this view's chains.  Pairs still
    /// registered are dropped from `hash` and the pool slots are vacated.
    /// Costs O(number of elements + number of majors) per call.
    ///
    /// Returns the number of slots freed.
    pub fn delete_other<T: FloatT>(
        &mut self,
        which: usize,
        triples: &mut TriplePool<T>,
        hash: &mut PairHash,
    ) -> Result<usize, ModelError> {
        let mut count = 0;
        for major in 0..self.number_major() {
            let mut pos = self.chains[major].first;
            while let Some(slot) = pos {
                pos = self.links[slot.index()].next;
                let t = *triples.triple(slot)?;
                if self.orientation.minor(&t) == which {
                    self.unlink(slot);
                    self.push_back(Membership::Free, slot);
                    hash.delete_hash(slot, t.row, t.column);
                    triples.vacate(slot);
                    count += 1;
                }
            }
        }
        log::trace!(
            "{:?} view: deleted minor {} ({} elements)",
            self.orientation,
            which,
            count
        );
        Ok(count)
    }

    /// Replays a `delete_same(which, ..)` already done on `other`.  The
    /// slots it freed form the tail of `other`'s free chain, back to the
    /// first slot this view already has free; those are unlinked here,
    /// appended to this view's free chain in the same order, and vacated.
    ///
    /// Returns the number of slots freed.
    pub fn update_deleted<T: FloatT>(
        &mut self,
        which: usize,
        triples: &mut TriplePool<T>,
        other: &LinkedList,
    ) -> Result<usize, ModelError> {
        if other.orientation == self.orientation {
            return Err(ModelError::OrientationMismatch);
        }
        let mut run = Vec::new();
        let mut pos = other.last_free();
        while let Some(slot) = pos {
            if self.membership(slot) == Some(Membership::Free) {
                break;
            }
            run.push(slot);
            pos = other.previous(slot);
        }
        run.reverse();

        for &slot in &run {
            if self.orientation.minor(triples.triple(slot)?) != which {
                return Err(ModelError::ChainMismatch(slot));
            }
        }
        for &slot in &run {
            self.ensure_slot(slot);
            self.unlink(slot);
            self.push_back(Membership::Free, slot);
            triples.vacate(slot);
        }
        log::trace!(
            "{:?} view: replayed deletion of minor {} ({} elements)",
            self.orientation,
            which,
            run.len()
        );
        Ok(run.len())
    }

    /// Checks that every known slot sits on exactly one chain, that links
    /// run both ways, and that each member of chain `m` holds a triple with
    /// major coordinate `m`.
    pub fn check_consistency<T: FloatT>(&self, triples: &TriplePool<T>) -> Result<(), ModelError> {
        let mut seen = vec![false; self.links.len()];
        let chains = self
            .chains
            .iter()
            .enumerate()
            .map(|(m, c)| (Membership::Major(m), c))
            .chain(std::iter::once((Membership::Free, &self.free)));

        for (membership, chain) in chains {
            let mut previous = None;
            let mut pos = chain.first;
            while let Some(slot) = pos {
                let link = self
                    .links
                    .get(slot.index())
                    .ok_or(ModelError::InvalidSlot(slot))?;
                if seen[slot.index()] || link.chain != Some(membership) || link.previous != previous
                {
                    return Err(ModelError::ChainMismatch(slot));
                }
                seen[slot.index()] = true;
                if let Membership::Major(m) = membership {
                    if self.orientation.major(triples.triple(slot)?) != m {
                        return Err(ModelError::ChainMismatch(slot));
                    }
                }
                previous = pos;
                pos = link.next;
            }
            if chain.last != previous {
                let slot = chain.last.or(previous).unwrap_or_default();
                return Err(ModelError::ChainMismatch(slot));
            }
        }
        match seen.iter().position(|s| !s) {
            Some(i) => Err(ModelError::ChainMismatch(SlotId::new(i))),
            None => Ok(()),
        }
    }

    // ---------------------------------------------------------
    // internal chain surgery
    // ---------------------------------------------------------

    fn check_major(&self, major: usize) -> Result<(), ModelError> {
        let limit = self.orientation.max_major();
        if major > limit {
            return Err(ModelError::IndexOutOfRange {
                index: major,
                limit: limit + 1,
            });
        }
        Ok(())
    }

    // New entries must be distinct and not already linked in this view.
    fn check_new<T: FloatT>(
        &self,
        coords: &[(usize, usize)],
        triples: &TriplePool<T>,
        hash: &PairHash,
    ) -> Result<(), ModelError> {
        if let Some(&(row, column)) = coords.iter().duplicates().next() {
            return Err(ModelError::DuplicateEntry { row, column });
        }
        for &(row, column) in coords {
            if row > MAX_ROW {
                return Err(ModelError::IndexOutOfRange {
                    index: row,
                    limit: MAX_ROW + 1,
                });
            }
            if column > MAX_COLUMN {
                return Err(ModelError::IndexOutOfRange {
                    index: column,
                    limit: MAX_COLUMN + 1,
                });
            }
            if let Some(slot) = hash.hash(row, column, triples) {
                if let Some(Membership::Major(_)) = self.membership(slot) {
                    return Err(ModelError::DuplicateEntry { row, column });
                }
            }
        }
        Ok(())
    }

    fn place<T: FloatT>(
        &mut self,
        major: usize,
        row: usize,
        column: usize,
        payload: Payload<T>,
        triples: &mut TriplePool<T>,
        hash: &mut PairHash,
    ) -> Result<SlotId, ModelError> {
        let triple = Triple {
            row,
            column,
            payload,
        };
        let slot = match hash.hash(row, column, triples) {
            // allocated by the other view, not linked here yet
            Some(slot) => {
                self.ensure_slot(slot);
                if self.membership(slot) == Some(Membership::Free) {
                    self.unlink(slot);
                }
                triples.put(slot, triple);
                slot
            }
            None => {
                let slot = self.allocate(triples.len());
                triples.put(slot, triple);
                hash.add_hash(slot, row, column, triples)?;
                slot
            }
        };
        self.ensure_major(major);
        self.push_back(Membership::Major(major), slot);
        Ok(slot)
    }

    fn allocate(&mut self, pool_len: usize) -> SlotId {
        if let Some(slot) = self.free.first {
            self.unlink(slot);
            return slot;
        }
        let slot = SlotId::new(self.links.len().max(pool_len));
        self.ensure_slot(slot);
        slot
    }

    fn ensure_major(&mut self, major: usize) {
        if major >= self.maximum_major {
            let grown = grown_capacity(major + 1);
            log::debug!(
                "{:?} view: majors {} -> {}",
                self.orientation,
                self.maximum_major,
                grown
            );
            self.chains.reserve(grown - self.chains.len());
            self.maximum_major = grown;
        }
        if major >= self.chains.len() {
            self.chains.resize(major + 1, Chain::default());
        }
    }

    fn ensure_slot(&mut self, slot: SlotId) {
        let i = slot.index();
        if i >= self.maximum_elements {
            let grown = grown_capacity(i + 1);
            log::debug!(
                "{:?} view: elements {} -> {}",
                self.orientation,
                self.maximum_elements,
                grown
            );
            self.links.reserve(grown - self.links.len());
            self.maximum_elements = grown;
        }
        if i >= self.links.len() {
            self.links.resize(i + 1, Link::default());
        }
    }

    fn chain_mut(&mut self, membership: Membership) -> &mut Chain {
        match membership {
            Membership::Major(m) => &mut self.chains[m],
            Membership::Free => &mut self.free,
        }
    }

    // `slot` must not be linked anywhere in this view
    fn push_back(&mut self, membership: Membership, slot: SlotId) {
        let last = self.chain_mut(membership).last;
        match last {
            Some(l) => self.links[l.index()].next = Some(slot),
            None => self.chain_mut(membership).first = Some(slot),
        }
        self.chain_mut(membership).last = Some(slot);
        self.links[slot.index()] = Link {
            previous: last,
            next: None,
            chain: Some(membership),
        };
    }

    fn unlink(&mut self, slot: SlotId) -> Option<Membership> {
        let link = self.links[slot.index()];
        let membership = link.chain?;
        match link.previous {
            Some(p) => self.links[p.index()].next = link.next,
            None => self.chain_mut(membership).first = link.next,
        }
        match link.next {
            Some(n) => self.links[n.index()].previous = link.previous,
            None => self.chain_mut(membership).last = link.previous,
        }
        self.links[slot.index()] = Link::default();
        Some(membership)
    }
}

fn check_lengths<T>(indices: &[usize], elements: &[T]) -> Result<(), ModelError> {
    if indices.len() != elements.len() {
        return Err(ModelError::LengthMismatch {
            indices: indices.len(),
            elements: elements.len(),
        });
    }
    Ok(())
}

/// Iterator over the slots of one chain.
#[derive(Debug, Clone)]
pub struct ChainIter<'a> {
    list: &'a LinkedList,
    pos: Option<SlotId>,
}

impl Iterator for ChainIter<'_> {
    type Item = SlotId;

    fn next(&mut self) -> Option<SlotId> {
        let slot = self.pos?;
        self.pos = self.list.next(slot);
        Some(slot)
    }
}
