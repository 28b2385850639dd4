//! The `patchstore` module provides [`PatchStore`], the only writer of the patch set.
//!
//! A byte write `(addr, new_bytes)` is resolved against every intersecting patch in
//! ascending address order. Each intersection is exactly one of:
//! 1. the patch contains the target range: splice the bytes in,
//! 2. the target range contains the patch: remove it,
//! 3. the patch starts inside the target and extends past it: drop its prefix,
//! 4. the patch starts before the target and ends inside it: drop its suffix.
//!
//! Anything else means the set was already corrupt, and the write is refused before any
//! mutation. After resolution the write either extends the patch owning `addr - 1` or
//! becomes a new patch.
//!
//! Every successful mutation ends with exactly one [`PatchEvent::Changed`]. A failed one
//! changes nothing and emits nothing.

use crate::error::PatchError;
use crate::events::EventHub;
use crate::patch::{Patch, PatchMap, PatchSet};
use crossbeam_channel::Receiver;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchEvent {
    Changed,
}

/// Resolution of one intersecting patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Contain { patch_addr: usize },
    Remove { patch_addr: usize },
    /// Drop the prefix, re-add at `end`
    ShrinkFront { patch_addr: usize },
    /// Drop the suffix from `addr` on
    ShrinkBack { patch_addr: usize },
}

#[derive(Debug)]
pub struct PatchStore<S: PatchSet = PatchMap> {
    set: S,
    events: EventHub<PatchEvent>,
}

impl Default for PatchStore<PatchMap> {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchStore<PatchMap> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_set(PatchMap::new())
    }
}

impl<S: PatchSet> PatchStore<S> {
    #[must_use]
    pub fn with_set(set: S) -> Self {
        Self {
            set,
            events: EventHub::new(),
        }
    }

    /// Read-only access to the underlying set
    #[must_use]
    pub const fn set(&self) -> &S {
        &self.set
    }

    pub fn subscribe(&mut self) -> Receiver<PatchEvent> {
        self.events.subscribe()
    }

    fn changed(&mut self) {
        self.events.emit(&PatchEvent::Changed);
    }

    /// Patched byte at `addr`, if any patch covers it
    #[must_use]
    pub fn read(&self, addr: usize) -> Option<u8> {
        self.patch_at(addr)?.byte_at(addr)
    }

    /// Patch containing `addr`
    #[must_use]
    pub fn patch_at(&self, addr: usize) -> Option<&Patch> {
        let start = *self.set.overlapping(addr, 1).first()?;
        self.set.get(start)
    }

    #[must_use]
    pub fn get(&self, addr: usize) -> Option<&Patch> {
        self.set.get(addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.set.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    fn resolve(&self, addr: usize, end: usize) -> Result<Vec<Resolution>, PatchError> {
        let last = end - 1;
        let intersecting = self.set.overlapping(addr, end - addr);
        let mut plan = Vec::with_capacity(intersecting.len());
        let mut prev_end = None;

        for patch_addr in intersecting {
            let (p_addr, p_end) = self
                .set
                .get(patch_addr)
                .map_or((patch_addr, patch_addr), |p| (p.addr, p.end()));
            // Zero-length, non-intersecting, and mutually overlapping patches fall
            // through to the error
            let intersects = p_addr < p_end && p_addr <= last && addr < p_end;
            let disjoint = prev_end.is_none_or(|e| e <= p_addr);
            let resolution = if !intersects || !disjoint {
                None
            } else if p_addr <= addr && end <= p_end {
                Some(Resolution::Contain { patch_addr })
            } else if addr <= p_addr && p_end <= end {
                Some(Resolution::Remove { patch_addr })
            } else if addr <= p_addr && end < p_end {
                Some(Resolution::ShrinkFront { patch_addr })
            } else if p_addr < addr && p_end <= end {
                Some(Resolution::ShrinkBack { patch_addr })
            } else {
                None
            };
            let Some(resolution) = resolution else {
                error!(
                    target: "hexgrid.patch",
                    patch_addr = p_addr,
                    patch_end = p_end,
                    addr,
                    end,
                    "patch overlap invariant violated"
                );
                return Err(PatchError::OverlapInvariant {
                    patch_addr: p_addr,
                    patch_last: p_end.saturating_sub(1),
                    addr,
                    last,
                });
            };
            plan.push(resolution);
            prev_end = Some(p_end);
        }
        Ok(plan)
    }

    /// Write `new_bytes` at `addr`, creating, extending, splicing, shrinking, or removing
    /// patches so the set stays free of overlaps.
    ///
    /// An empty write is a no-op.
    ///
    /// # Errors
    /// - Returns an error if `addr + new_bytes.len()` overflows
    /// - Returns an error if an existing patch intersects the write in a way none of the
    ///   four resolution cases cover. Nothing is mutated in that case.
    ///
    /// # Examples
    /// ```
    /// use hexgridlib::PatchStore;
    ///
    /// let mut store = PatchStore::new();
    /// store.write(0x10, &[1, 2, 3, 4]).unwrap();
    /// // Right after the existing patch: it is extended
    /// store.write(0x14, &[5]).unwrap();
    ///
    /// assert_eq!(store.len(), 1);
    /// assert_eq!(store.get(0x10).unwrap().new_bytes, [1, 2, 3, 4, 5]);
    /// ```
    pub fn write(&mut self, addr: usize, new_bytes: &[u8]) -> Result<(), PatchError> {
        if new_bytes.is_empty() {
            return Ok(());
        }
        let end = addr
            .checked_add(new_bytes.len())
            .ok_or(PatchError::AddressOverflow {
                addr,
                len: new_bytes.len(),
            })?;

        let plan = self.resolve(addr, end)?;

        for resolution in plan {
            match resolution {
                Resolution::Contain { patch_addr } => {
                    if let Some(patch) = self.set.get_mut(patch_addr) {
                        let offset = addr - patch.addr;
                        patch.new_bytes[offset..offset + new_bytes.len()].copy_from_slice(new_bytes);
                    }
                    debug!(target: "hexgrid.patch", patch_addr, addr, len = new_bytes.len(), "spliced into patch");
                    self.changed();
                    return Ok(());
                }
                Resolution::Remove { patch_addr } => {
                    self.set.remove(patch_addr);
                    debug!(target: "hexgrid.patch", patch_addr, "removed overwritten patch");
                }
                Resolution::ShrinkFront { patch_addr } => {
                    if let Some(mut patch) = self.set.remove(patch_addr) {
                        patch.new_bytes.drain(..end - patch.addr);
                        patch.addr = end;
                        debug!(target: "hexgrid.patch", patch_addr, new_addr = end, "dropped patch prefix");
                        self.set.add(patch);
                    }
                }
                Resolution::ShrinkBack { patch_addr } => {
                    if let Some(mut patch) = self.set.remove(patch_addr) {
                        patch.new_bytes.truncate(addr - patch.addr);
                        debug!(target: "hexgrid.patch", patch_addr, new_len = patch.len(), "dropped patch suffix");
                        self.set.add(patch);
                    }
                }
            }
        }

        let previous = addr
            .checked_sub(1)
            .and_then(|prev| self.set.overlapping(prev, 1).first().copied());
        match previous.and_then(|prev| self.set.get_mut(prev)) {
            Some(patch) => {
                patch.new_bytes.extend_from_slice(new_bytes);
                debug!(target: "hexgrid.patch", patch_addr = patch.addr, len = patch.len(), "extended adjacent patch");
            }
            None => {
                self.set.add(Patch::new(addr, new_bytes.to_vec()));
                debug!(target: "hexgrid.patch", addr, len = new_bytes.len(), "created patch");
            }
        }

        self.changed();
        Ok(())
    }

    /// True if `at` lies strictly inside the patch starting at `addr`
    #[must_use]
    pub fn can_split(&self, addr: usize, at: usize) -> bool {
        self.set.get(addr).is_some_and(|p| p.addr < at && at < p.end())
    }

    /// Split the patch at `addr` into `[addr, at)` and `[at, end)`. The right half carries
    /// the comment.
    ///
    /// # Errors
    /// - Returns an error if no patch starts at `addr`
    /// - Returns an error if `at` is not strictly inside the patch
    pub fn split(&mut self, addr: usize, at: usize) -> Result<(), PatchError> {
        if self.set.get(addr).is_none() {
            return Err(PatchError::NotFound(addr));
        }
        if !self.can_split(addr, at) {
            return Err(PatchError::InvalidSplit { addr, at });
        }
        let patch = self.set.get_mut(addr).ok_or(PatchError::NotFound(addr))?;
        let right = Patch {
            addr: at,
            new_bytes: patch.new_bytes.split_off(at - addr),
            comment: patch.comment.clone(),
        };
        self.set.add(right);
        debug!(target: "hexgrid.patch", addr, at, "split patch");
        self.changed();
        Ok(())
    }

    /// True if both patches exist and `other` starts right where `addr` ends
    #[must_use]
    pub fn can_merge(&self, addr: usize, other: usize) -> bool {
        self.set
            .get(addr)
            .is_some_and(|p| p.end() == other && self.set.get(other).is_some())
    }

    /// Append the patch at `other` to the patch at `addr` and remove `other`.
    ///
    /// # Errors
    /// - Returns an error if either patch does not exist
    /// - Returns an error if `other` does not start right after `addr`
    pub fn merge(&mut self, addr: usize, other: usize) -> Result<(), PatchError> {
        self.merge_run(&[addr, other])
    }

    /// Merge a run of patches `addrs[0]`, `addrs[1]`, ... into the first one. Every
    /// consecutive pair must be exactly adjacent. Emits a single event.
    ///
    /// # Errors
    /// - Returns an error if any patch does not exist
    /// - Returns an error if any consecutive pair is not adjacent. Nothing is merged then.
    pub fn merge_run(&mut self, addrs: &[usize]) -> Result<(), PatchError> {
        if let Some(&missing) = addrs.iter().find(|a| self.set.get(**a).is_none()) {
            return Err(PatchError::NotFound(missing));
        }
        if let Some(pair) = addrs.windows(2).find(|w| !self.can_merge(w[0], w[1])) {
            return Err(PatchError::NotAdjacent {
                addr: pair[0],
                other: pair[1],
            });
        }
        let Some((&head, rest)) = addrs.split_first() else {
            return Ok(());
        };
        if rest.is_empty() {
            return Ok(());
        }
        for &other in rest {
            let tail = self.set.remove(other).ok_or(PatchError::NotFound(other))?;
            let patch = self.set.get_mut(head).ok_or(PatchError::NotFound(head))?;
            patch.new_bytes.extend_from_slice(&tail.new_bytes);
        }
        debug!(target: "hexgrid.patch", head, merged = rest.len(), "merged patches");
        self.changed();
        Ok(())
    }

    /// Remove the patch at `addr` and return it.
    ///
    /// # Errors
    /// Returns an error if no patch starts at `addr`.
    pub fn revert(&mut self, addr: usize) -> Result<Patch, PatchError> {
        let patch = self.set.remove(addr).ok_or(PatchError::NotFound(addr))?;
        debug!(target: "hexgrid.patch", addr, len = patch.len(), "reverted patch");
        self.changed();
        Ok(patch)
    }

    /// Remove every listed patch. Emits a single event.
    ///
    /// # Errors
    /// Returns an error if any listed patch does not exist. Nothing is removed then.
    pub fn revert_all(&mut self, addrs: &[usize]) -> Result<(), PatchError> {
        if let Some(&missing) = addrs.iter().find(|a| self.set.get(**a).is_none()) {
            return Err(PatchError::NotFound(missing));
        }
        if addrs.is_empty() {
            return Ok(());
        }
        for &addr in addrs {
            self.set.remove(addr);
        }
        debug!(target: "hexgrid.patch", count = addrs.len(), "reverted patches");
        self.changed();
        Ok(())
    }

    /// Set or clear the comment of the patch at `addr`.
    ///
    /// # Errors
    /// Returns an error if no patch starts at `addr`.
    pub fn set_comment(&mut self, addr: usize, comment: Option<String>) -> Result<(), PatchError> {
        let patch = self.set.get_mut(addr).ok_or(PatchError::NotFound(addr))?;
        patch.comment = comment.filter(|c| !c.is_empty());
        self.changed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::collections::BTreeMap;

    fn shape(store: &PatchStore) -> Vec<(usize, usize)> {
        store.iter().map(|p| (p.addr, p.len())).collect()
    }

    fn store_with(patches: &[(usize, &[u8])]) -> PatchStore {
        let mut set = PatchMap::new();
        for (addr, bytes) in patches {
            set.add(Patch::new(*addr, bytes.to_vec()));
        }
        PatchStore::with_set(set)
    }

    #[test]
    fn test_write_creates_patch() {
        // Arrange
        let mut store = PatchStore::new();
        let rx = store.subscribe();

        // Act
        store.write(0x1010, &[1, 2, 3, 4]).unwrap();

        // Assert
        assert_eq!(shape(&store), [(0x1010, 4)]);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_write_inside_patch_splices() {
        // Arrange
        let mut store = store_with(&[(0x10, &[0, 1, 2, 3, 4, 5])]);

        // Act
        store.write(0x12, &[0xAA, 0xBB]).unwrap();

        // Assert
        assert_eq!(shape(&store), [(0x10, 6)]);
        assert_eq!(store.get(0x10).unwrap().new_bytes, [0, 1, 0xAA, 0xBB, 4, 5]);
    }

    #[test]
    fn test_write_covering_patch_removes_it() {
        // Arrange
        let mut store = store_with(&[(0x12, &[1, 1]), (0x40, &[9])]);

        // Act
        store.write(0x10, &[7; 6]).unwrap();

        // Assert
        assert_eq!(shape(&store), [(0x10, 6), (0x40, 1)]);
        assert_eq!(store.get(0x10).unwrap().new_bytes, [7; 6]);
    }

    #[test]
    fn test_write_shrinks_both_neighbours() {
        // Arrange
        let mut store = store_with(&[(0x10, &[1, 2, 3, 4]), (0x16, &[5, 6, 7, 8])]);

        // Act
        store.write(0x12, &[0xEE; 6]).unwrap();

        // Assert
        // The left patch loses its suffix and then absorbs the write
        assert_eq!(shape(&store), [(0x10, 8), (0x18, 2)]);
        assert_eq!(store.get(0x10).unwrap().new_bytes, [1, 2, 0xEE, 0xEE, 0xEE, 0xEE, 0xEE, 0xEE]);
        assert_eq!(store.get(0x18).unwrap().new_bytes, [7, 8]);
    }

    #[test]
    fn test_write_adjacent_extends_previous() {
        // Arrange
        let mut store = store_with(&[(0x20, &[1, 2])]);

        // Act
        store.write(0x22, &[3]).unwrap();
        store.write(0x30, &[4]).unwrap();

        // Assert
        assert_eq!(shape(&store), [(0x20, 3), (0x30, 1)]);
    }

    #[test]
    fn test_write_before_patch_keeps_two() {
        // Arrange
        let mut store = store_with(&[(0x20, &[1, 2])]);

        // Act
        store.write(0x1E, &[3, 4]).unwrap();

        // Assert
        assert_eq!(shape(&store), [(0x1E, 2), (0x20, 2)]);
    }

    #[test]
    fn test_write_at_zero_creates_patch() {
        // Arrange
        let mut store = PatchStore::new();

        // Act
        store.write(0, &[1]).unwrap();

        // Assert
        assert_eq!(shape(&store), [(0, 1)]);
    }

    #[test]
    fn test_empty_write_is_noop() {
        // Arrange
        let mut store = PatchStore::new();
        let rx = store.subscribe();

        // Act
        store.write(0x10, &[]).unwrap();

        // Assert
        assert!(store.is_empty());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_overflowing_write_is_rejected() {
        // Arrange
        let mut store = PatchStore::new();

        // Act
        let result = store.write(usize::MAX, &[1, 2]);

        // Assert
        assert_eq!(
            result,
            Err(PatchError::AddressOverflow {
                addr: usize::MAX,
                len: 2
            })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_set_fails_without_mutation() {
        // Arrange
        // Two overlapping patches cannot come from PatchStore itself
        let mut store = store_with(&[(0x10, &[0; 8]), (0x14, &[0; 8])]);
        let rx = store.subscribe();
        let before = shape(&store);

        // Act
        let result = store.write(0x12, &[1; 4]);

        // Assert
        assert!(matches!(result, Err(PatchError::OverlapInvariant { .. })));
        assert_eq!(shape(&store), before);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_split_partitions_bytes() {
        // Arrange
        let mut store = store_with(&[(0x10, &[1, 2, 3, 4, 5])]);
        store.set_comment(0x10, Some("entry".into())).unwrap();

        // Act
        store.split(0x10, 0x12).unwrap();

        // Assert
        assert_eq!(shape(&store), [(0x10, 2), (0x12, 3)]);
        let left = store.get(0x10).unwrap();
        let right = store.get(0x12).unwrap();
        assert_eq!([left.new_bytes.clone(), right.new_bytes.clone()].concat(), [1, 2, 3, 4, 5]);
        assert_eq!(right.comment.as_deref(), Some("entry"));
    }

    #[test]
    fn test_split_rejects_endpoints() {
        // Arrange
        let mut store = store_with(&[(0x10, &[1, 2, 3])]);
        let rx = store.subscribe();

        // Act & Assert
        assert_eq!(
            store.split(0x10, 0x10),
            Err(PatchError::InvalidSplit { addr: 0x10, at: 0x10 })
        );
        assert_eq!(
            store.split(0x10, 0x13),
            Err(PatchError::InvalidSplit { addr: 0x10, at: 0x13 })
        );
        assert_eq!(store.split(0x11, 0x12), Err(PatchError::NotFound(0x11)));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_merge_requires_adjacency() {
        // Arrange
        let mut store = store_with(&[(0x10, &[1, 2]), (0x12, &[3]), (0x14, &[4])]);

        // Act & Assert
        assert_eq!(
            store.merge(0x12, 0x14),
            Err(PatchError::NotAdjacent {
                addr: 0x12,
                other: 0x14
            })
        );
        store.merge(0x10, 0x12).unwrap();
        assert_eq!(shape(&store), [(0x10, 3), (0x14, 1)]);
        assert_eq!(store.get(0x10).unwrap().new_bytes, [1, 2, 3]);
    }

    #[test]
    fn test_merge_run_is_all_or_nothing() {
        // Arrange
        let mut store = store_with(&[(0x10, &[1]), (0x11, &[2]), (0x13, &[3])]);
        let rx = store.subscribe();

        // Act
        let result = store.merge_run(&[0x10, 0x11, 0x13]);

        // Assert
        assert!(result.is_err());
        assert_eq!(store.len(), 3);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_revert_and_read() {
        // Arrange
        let mut store = store_with(&[(0x10, &[0xAB, 0xCD])]);

        // Act & Assert
        assert_eq!(store.read(0x11), Some(0xCD));
        assert_eq!(store.read(0x12), None);
        assert_eq!(store.revert(0x10).unwrap().new_bytes, [0xAB, 0xCD]);
        assert_eq!(store.read(0x11), None);
        assert_eq!(store.revert(0x10), Err(PatchError::NotFound(0x10)));
    }

    #[test]
    fn test_random_writes_never_overlap() {
        // Arrange
        let mut rng = rand::rng();
        let mut store = PatchStore::new();
        let mut model: BTreeMap<usize, u8> = BTreeMap::new();

        for _ in 0..500 {
            let addr = rng.random_range(0..0x200);
            let len = rng.random_range(1..24);
            let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();

            // Act
            store.write(addr, &bytes).unwrap();
            for (i, b) in bytes.iter().enumerate() {
                model.insert(addr + i, *b);
            }

            // Assert
            let patches: Vec<_> = store.iter().collect();
            assert!(patches.iter().all(|p| !p.is_empty()));
            assert!(patches.windows(2).all(|w| w[0].end() <= w[1].addr));
        }

        // Assert
        for (addr, byte) in &model {
            assert_eq!(store.read(*addr), Some(*byte));
        }
        let covered: usize = store.iter().map(Patch::len).sum();
        assert_eq!(covered, model.len());
    }
}
