//! Bucket cursor
//!
//! Positioned walk over one bucket. `seek` lands on the first key ≥ the
//! target; every move returns the entry it lands on, or `None` past either end.

use std::collections::BTreeMap;
use std::ops::Bound;

/// A (key, value) pair borrowed from a bucket
pub type Item<'a> = (&'a [u8], &'a [u8]);

/// Cursor over a bucket's records
pub struct Cursor<'a> {
    entries: &'a BTreeMap<Vec<u8>, Vec<u8>>,
    current: Option<&'a [u8]>,
}

#[allow(clippy::should_implement_trait)]
impl<'a> Cursor<'a> {
    pub(crate) fn new(entries: &'a BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Self {
            entries,
            current: None,
        }
    }

    /// Move to the first record
    pub fn first(&mut self) -> Option<Item<'a>> {
        let entries = self.entries;
        let item = entries.iter().next();
        self.land(item)
    }

    /// Move to the last record
    pub fn last(&mut self) -> Option<Item<'a>> {
        let entries = self.entries;
        let item = entries.iter().next_back();
        self.land(item)
    }

    /// Move to the first record whose key is ≥ `target`
    pub fn seek(&mut self, target: &[u8]) -> Option<Item<'a>> {
        let entries = self.entries;
        let item = entries
            .range::<[u8], _>((Bound::Included(target), Bound::Unbounded))
            .next();
        self.land(item)
    }

    /// Step forward one record
    pub fn next(&mut self) -> Option<Item<'a>> {
        let current = self.current?;
        let entries = self.entries;
        let item = entries
            .range::<[u8], _>((Bound::Excluded(current), Bound::Unbounded))
            .next();
        self.land(item)
    }

    /// Step back one record
    pub fn prev(&mut self) -> Option<Item<'a>> {
        let current = self.current?;
        let entries = self.entries;
        let item = entries
            .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(current)))
            .next_back();
        self.land(item)
    }

    fn land(&mut self, item: Option<(&'a Vec<u8>, &'a Vec<u8>)>) -> Option<Item<'a>> {
        self.current = item.map(|(k, _)| k.as_slice());
        item.map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
