//! Chained hash tables used by the model: [`NameHash`] resolves row and
//! column names to dense indices, [`PairHash`] resolves a (row, column)
//! pair to the pool slot holding it.
//!
//! Both are built on the same skeleton.  Buckets hold the head of a
//! collision chain of [`HashLink`] nodes, and every node records the item
//! index it stands for.  Keys are never stored in the chains: equality is
//! decided by reading the key back from the owner (the name array, or the
//! triple pool), so a table is only as large as its item count.

mod names;
pub use names::*;
mod pairs;
pub use pairs::*;

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Collision-chain node shared by both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashLink {
    /// item index this node stands for
    pub index: usize,
    /// next node in the same bucket
    pub next: Option<usize>,
}

/// Buckets per item of capacity.
const BUCKETS_PER_ITEM: usize = 4;

/// Capacity to grow to once `occupied` items no longer fit.
pub(crate) fn grown_capacity(occupied: usize) -> usize {
    1000 + (3 * occupied) / 2
}

pub(crate) fn fx_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone, Default)]
pub(crate) struct HashChains {
    buckets: Vec<Option<usize>>,
    links: Vec<HashLink>,
    // reclaimed link nodes
    vacant: Vec<usize>,
    len: usize,
}

impl HashChains {
    pub(crate) fn with_capacity(max_items: usize) -> Self {
        HashChains {
            buckets: vec![None; max_items * BUCKETS_PER_ITEM],
            links: Vec::with_capacity(max_items),
            vacant: Vec::new(),
            len: 0,
        }
    }

    /// number of items currently linked
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn number_buckets(&self) -> usize {
        self.buckets.len()
    }

    fn bucket(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// First item in the bucket for `hash` accepted by `is_match`.
    pub(crate) fn find(&self, hash: u64, mut is_match: impl FnMut(usize) -> bool) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        let mut pos = self.buckets[self.bucket(hash)];
        while let Some(p) = pos {
            let link = &self.links[p];
            if is_match(link.index) {
                return Some(link.index);
            }
            pos = link.next;
        }
        None
    }

    /// Links `index` at the head of the bucket for `hash`.  The caller
    /// guarantees there is room (buckets exist) and no duplicate.
    pub(crate) fn insert(&mut self, hash: u64, index: usize) {
        let b = self.bucket(hash);
        let node = HashLink {
            index,
            next: self.buckets[b],
        };
        let p = match self.vacant.pop() {
            Some(p) => {
                self.links[p] = node;
                p
            }
            None => {
                self.links.push(node);
                self.links.len() - 1
            }
        };
        self.buckets[b] = Some(p);
        self.len += 1;
    }

    /// Unlinks the node for `index` from the bucket for `hash`, leaving
    /// its siblings chained.  Returns false if it was not there.
    pub(crate) fn remove(&mut self, hash: u64, index: usize) -> bool {
        if self.buckets.is_empty() {
            return false;
        }
        let b = self.bucket(hash);
        let mut previous: Option<usize> = None;
        let mut pos = self.buckets[b];
        while let Some(p) = pos {
            let link = self.links[p];
            if link.index == index {
                match previous {
                    Some(q) => self.links[q].next = link.next,
                    None => self.buckets[b] = link.next,
                }
                self.vacant.push(p);
                self.len -= 1;
                return true;
            }
            previous = pos;
            pos = link.next;
        }
        false
    }

    /// Items currently linked, in no particular order.
    pub(crate) fn indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len);
        for head in &self.buckets {
            let mut pos = *head;
            while let Some(p) = pos {
                out.push(self.links[p].index);
                pos = self.links[p].next;
            }
        }
        out
    }

    /// Rebuilds the chains for `max_items` of capacity, rehashing every
    /// linked item with `hash_of`.
    pub(crate) fn rehash(&mut self, max_items: usize, hash_of: impl Fn(usize) -> u64) {
        let items = self.indices();
        *self = HashChains::with_capacity(max_items);
        for index in items {
            self.insert(hash_of(index), index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_survive_sibling_removal() {
        // a single bucket forces every item onto one chain
        let mut chains = HashChains {
            buckets: vec![None; 1],
            ..Default::default()
        };
        for i in 0..5 {
            chains.insert(0, i);
        }
        assert_eq!(chains.len(), 5);

        assert!(chains.remove(0, 2));
        assert!(!chains.remove(0, 2));
        assert_eq!(chains.len(), 4);
        for i in [0, 1, 3, 4] {
            assert_eq!(chains.find(0, |j| j == i), Some(i));
        }
        assert_eq!(chains.find(0, |j| j == 2), None);

        // the reclaimed node is reused
        chains.insert(0, 9);
        assert_eq!(chains.links.len(), 5);
        assert_eq!(chains.find(0, |j| j == 9), Some(9));
    }

    #[test]
    fn rehash_keeps_items() {
        let mut chains = HashChains::with_capacity(2);
        for i in 0..8 {
            chains.insert(fx_hash(&i), i);
        }
        chains.rehash(16, |i| fx_hash(&i));
        assert_eq!(chains.number_buckets(), 64);
        let mut items = chains.indices();
        items.sort();
        assert_eq!(items, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn empty_table_finds_nothing() {
        let mut chains = HashChains::default();
        assert_eq!(chains.find(7, |_| true), None);
        assert!(!chains.remove(7, 0));
    }
}
