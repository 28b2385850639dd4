//! The `patch` module provides the [`Patch`] record and the [`PatchSet`] contract of an
//! externally owned patch collection keyed by start address.
//!
//! [`PatchMap`] is the default `BTreeMap`-backed implementation. Only
//! [`PatchStore`](crate::PatchStore) mutates a patch set.

use std::collections::BTreeMap;

/// Pending byte-level overwrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub addr: usize,
    pub new_bytes: Vec<u8>,
    pub comment: Option<String>,
}

impl Patch {
    #[must_use]
    pub const fn new(addr: usize, new_bytes: Vec<u8>) -> Self {
        Self {
            addr,
            new_bytes,
            comment: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.new_bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_bytes.is_empty()
    }

    /// Exclusive end address
    #[must_use]
    pub fn end(&self) -> usize {
        self.addr + self.new_bytes.len()
    }

    /// Last patched address. Only meaningful for non-empty patches.
    #[must_use]
    pub fn last(&self) -> usize {
        self.end().saturating_sub(1)
    }

    #[must_use]
    pub fn contains(&self, addr: usize) -> bool {
        self.addr <= addr && addr < self.end()
    }

    #[must_use]
    pub fn byte_at(&self, addr: usize) -> Option<u8> {
        self.new_bytes.get(addr.checked_sub(self.addr)?).copied()
    }
}

pub trait PatchSet {
    /// Start addresses of patches intersecting `[addr, addr + size)`, ascending
    fn overlapping(&self, addr: usize, size: usize) -> Vec<usize>;

    fn get(&self, addr: usize) -> Option<&Patch>;

    fn get_mut(&mut self, addr: usize) -> Option<&mut Patch>;

    /// Insert a patch, replacing any patch with the same start address
    fn add(&mut self, patch: Patch);

    fn remove(&mut self, addr: usize) -> Option<Patch>;

    /// Patches in ascending address order
    fn iter(&self) -> Box<dyn Iterator<Item = &Patch> + '_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start addresses in ascending order
    fn addrs(&self) -> Vec<usize> {
        self.iter().map(|p| p.addr).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchMap {
    patches: BTreeMap<usize, Patch>,
}

impl PatchMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            patches: BTreeMap::new(),
        }
    }
}

impl PatchSet for PatchMap {
    fn overlapping(&self, addr: usize, size: usize) -> Vec<usize> {
        if size == 0 {
            return Vec::new();
        }
        let last = addr.saturating_add(size - 1);
        // Patches never overlap, so scanning back from the range end can stop at the
        // first one that ends before `addr`
        let mut found: Vec<usize> = self
            .patches
            .range(..=last)
            .rev()
            .take_while(|(_, p)| p.end() > addr)
            .map(|(a, _)| *a)
            .collect();
        found.reverse();
        found
    }

    fn get(&self, addr: usize) -> Option<&Patch> {
        self.patches.get(&addr)
    }

    fn get_mut(&mut self, addr: usize) -> Option<&mut Patch> {
        self.patches.get_mut(&addr)
    }

    fn add(&mut self, patch: Patch) {
        self.patches.insert(patch.addr, patch);
    }

    fn remove(&mut self, addr: usize) -> Option<Patch> {
        self.patches.remove(&addr)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Patch> + '_> {
        Box::new(self.patches.values())
    }

    fn len(&self) -> usize {
        self.patches.len()
    }
}
