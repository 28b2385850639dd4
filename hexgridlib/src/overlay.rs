//! The `overlay` module provides [`HighlightOverlay`], which merges the three independently
//! sourced region lists into one render list and tracks which regions are active.

use crate::region::HighlightRegion;
use std::ops::RangeInclusive;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct HighlightOverlay {
    classification: Vec<HighlightRegion>,
    synchronized: Vec<HighlightRegion>,
    patches: Vec<HighlightRegion>,
    /// Render list: classification, then synchronized, then patch regions
    merged: Vec<HighlightRegion>,
}

impl HighlightOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_classification(&mut self, regions: Vec<HighlightRegion>, span: &RangeInclusive<usize>) {
        self.classification = regions;
        self.rebuild(span);
    }

    pub fn set_synchronized(&mut self, regions: Vec<HighlightRegion>, span: &RangeInclusive<usize>) {
        self.synchronized = regions;
        self.rebuild(span);
    }

    pub fn set_patches(&mut self, regions: Vec<HighlightRegion>, span: &RangeInclusive<usize>) {
        self.patches = regions;
        self.rebuild(span);
    }

    fn rebuild(&mut self, span: &RangeInclusive<usize>) {
        self.merged = self
            .classification
            .iter()
            .chain(&self.synchronized)
            .chain(&self.patches)
            .cloned()
            .collect();
        self.update_active(span);
        trace!(target: "hexgrid.overlay", regions = self.merged.len(), "rebuilt render list");
    }

    /// Recompute `active` on every region against the inclusive cursor/selection `span`
    pub fn update_active(&mut self, span: &RangeInclusive<usize>) {
        let (min, max) = (*span.start(), *span.end());
        for region in &mut self.merged {
            region.set_active(region.overlaps(min, max));
        }
    }

    #[must_use]
    pub fn regions(&self) -> &[HighlightRegion] {
        &self.merged
    }

    pub fn active_regions(&self) -> impl Iterator<Item = &HighlightRegion> {
        self.merged.iter().filter(|r| r.is_active())
    }

    /// Regions containing `addr`, nearest start first
    #[must_use]
    pub fn regions_under(&self, addr: usize) -> Vec<&HighlightRegion> {
        let mut found: Vec<_> = self.merged.iter().filter(|r| r.contains(addr)).collect();
        found.sort_by_key(|r| addr - r.addr());
        found
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionCategory;

    fn plain(category: RegionCategory, addr: usize, size: usize) -> HighlightRegion {
        HighlightRegion::new(category, addr, size).unwrap()
    }

    #[test]
    fn test_merged_order_is_classification_sync_patch() {
        // Arrange
        let mut overlay = HighlightOverlay::new();
        let span = 0..=0;

        // Act
        overlay.set_patches(vec![HighlightRegion::patch(0x30, 1).unwrap()], &span);
        overlay.set_synchronized(vec![plain(RegionCategory::Synchronized, 0x20, 1)], &span);
        overlay.set_classification(vec![plain(RegionCategory::Data, 0x10, 1)], &span);

        // Assert
        let categories: Vec<_> = overlay.regions().iter().map(|r| r.category()).collect();
        assert_eq!(
            categories,
            [
                RegionCategory::Data,
                RegionCategory::Synchronized,
                RegionCategory::Patch
            ]
        );
    }

    #[test]
    fn test_active_follows_span() {
        // Arrange
        let mut overlay = HighlightOverlay::new();
        let regions = vec![
            plain(RegionCategory::Data, 0x00, 4), // entirely below
            plain(RegionCategory::Data, 0x08, 4), // straddles min
            plain(RegionCategory::Data, 0x10, 2), // inside
            plain(RegionCategory::Data, 0x13, 4), // straddles max
            plain(RegionCategory::Data, 0x20, 4), // entirely above
        ];

        // Act
        overlay.set_classification(regions, &(0x0A..=0x14));

        // Assert
        let active: Vec<_> = overlay.regions().iter().map(HighlightRegion::is_active).collect();
        assert_eq!(active, [false, true, true, true, false]);

        // Act
        overlay.update_active(&(0x21..=0x21));

        // Assert
        let active: Vec<_> = overlay.active_regions().map(HighlightRegion::addr).collect();
        assert_eq!(active, [0x20]);
    }

    #[test]
    fn test_regions_under_nearest_start_first() {
        // Arrange
        let mut overlay = HighlightOverlay::new();
        let span = 0..=0;
        overlay.set_classification(
            vec![
                plain(RegionCategory::Instruction, 0x100, 0x40),
                plain(RegionCategory::Instruction, 0x110, 8),
            ],
            &span,
        );
        overlay.set_patches(vec![HighlightRegion::patch(0x112, 2).unwrap()], &span);

        // Act
        let under: Vec<_> = overlay.regions_under(0x113).iter().map(|r| r.addr()).collect();
        let none = overlay.regions_under(0x200);

        // Assert
        assert_eq!(under, [0x112, 0x110, 0x100]);
        assert!(none.is_empty());
    }
}
