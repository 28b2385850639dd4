//! The `region` module provides [`HighlightRegion`], an address range tagged with a
//! category that is painted over the byte grid.
//!
//! Plain regions (classification- and sync-derived) are immutable and offer no actions.
//! Patch regions mirror a record in the patch set and offer split, comment, and revert.

/// Category of a highlight region. Used by the renderer to pick a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionCategory {
    String,
    Data,
    Instruction,
    Patch,
    Synchronized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Plain,
    /// Backed by the patch starting at `patch_addr`
    Patch { patch_addr: usize },
}

/// Action offered by a region's context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionAction {
    Split,
    SetComment,
    Revert,
}

impl RegionAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Split => "Split",
            Self::SetComment => "Set Comment...",
            Self::Revert => "Revert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMenuItem {
    pub action: RegionAction,
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMenu {
    pub title: String,
    pub patch_addr: usize,
    pub items: Vec<RegionMenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRegion {
    category: RegionCategory,
    addr: usize,
    size: usize,
    active: bool,
    kind: RegionKind,
}

impl HighlightRegion {
    /// Create a plain region. Returns `None` when `size` is 0 or the last address does
    /// not fit in `usize`.
    #[must_use]
    pub fn new(category: RegionCategory, addr: usize, size: usize) -> Option<Self> {
        let fits = size > 0 && addr.checked_add(size - 1).is_some();
        fits.then_some(Self {
            category,
            addr,
            size,
            active: false,
            kind: RegionKind::Plain,
        })
    }

    /// Create a region mirroring the patch at `addr`. Returns `None` under the same
    /// conditions as [`HighlightRegion::new`].
    #[must_use]
    pub fn patch(addr: usize, size: usize) -> Option<Self> {
        let mut region = Self::new(RegionCategory::Patch, addr, size)?;
        region.kind = RegionKind::Patch { patch_addr: addr };
        Some(region)
    }

    #[must_use]
    pub const fn category(&self) -> RegionCategory {
        self.category
    }

    #[must_use]
    pub const fn addr(&self) -> usize {
        self.addr
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Exclusive end address
    #[must_use]
    pub const fn end(&self) -> usize {
        self.addr.saturating_add(self.size)
    }

    /// Last address covered by the region
    #[must_use]
    pub const fn last(&self) -> usize {
        self.addr + (self.size - 1)
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) const fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[must_use]
    pub const fn contains(&self, addr: usize) -> bool {
        self.addr <= addr && addr <= self.last()
    }

    /// True if the region intersects the inclusive range `[min, max]` by at least one address
    #[must_use]
    pub const fn overlaps(&self, min: usize, max: usize) -> bool {
        self.addr <= max && min <= self.last()
    }

    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        matches!(self.kind, RegionKind::Patch { .. })
    }

    /// True if `cursor` lies strictly inside a patch region
    #[must_use]
    pub const fn can_split(&self, cursor: usize) -> bool {
        self.is_mutable() && self.addr < cursor && cursor < self.end()
    }

    /// True if both are patch regions and `other` starts right after `self`
    #[must_use]
    pub const fn can_merge_with(&self, other: &Self) -> bool {
        self.is_mutable() && other.is_mutable() && other.addr == self.end()
    }

    /// Context actions for this region. Plain regions have none.
    ///
    /// # Example
    /// ```
    /// use hexgridlib::{HighlightRegion, RegionAction};
    ///
    /// let region = HighlightRegion::patch(0x1010, 8).unwrap();
    /// let menu = region.context_menu(0x1010).unwrap();
    ///
    /// assert_eq!(menu.title, "Patch 0x1010 (8 bytes)");
    /// assert_eq!(menu.items[0].action, RegionAction::Split);
    /// assert!(!menu.items[0].enabled);
    /// ```
    #[must_use]
    pub fn context_menu(&self, cursor: usize) -> Option<RegionMenu> {
        let RegionKind::Patch { patch_addr } = self.kind else {
            return None;
        };
        let item = |action: RegionAction, enabled: bool| RegionMenuItem {
            action,
            label: action.label(),
            enabled,
        };
        Some(RegionMenu {
            title: format!("Patch 0x{:x} ({} bytes)", self.addr, self.size),
            patch_addr,
            items: vec![
                item(RegionAction::Split, self.can_split(cursor)),
                item(RegionAction::SetComment, true),
                item(RegionAction::Revert, true),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_region_is_rejected() {
        assert!(HighlightRegion::new(RegionCategory::Data, 0x10, 0).is_none());
        assert!(HighlightRegion::patch(0x10, 0).is_none());
    }

    #[test]
    fn test_region_reaching_past_address_space_is_rejected() {
        // Arrange
        let addr = usize::MAX - 3;

        // Act
        let fits = HighlightRegion::new(RegionCategory::Synchronized, addr, 4);
        let overflows = HighlightRegion::new(RegionCategory::Synchronized, addr, 5);

        // Assert
        assert_eq!(fits.map(|r| r.last()), Some(usize::MAX));
        assert!(overflows.is_none());
        assert!(HighlightRegion::patch(usize::MAX, 2).is_none());
    }

    #[test]
    fn test_overlaps_boundaries() {
        // Arrange
        let region = HighlightRegion::new(RegionCategory::Data, 0x10, 4).unwrap();

        // Assert
        // Fully inside
        assert!(region.overlaps(0x11, 0x12));
        // Fully covering
        assert!(region.overlaps(0x00, 0x20));
        // Straddling either boundary
        assert!(region.overlaps(0x08, 0x10));
        assert!(region.overlaps(0x13, 0x18));
        // Entirely below / above
        assert!(!region.overlaps(0x00, 0x0F));
        assert!(!region.overlaps(0x14, 0x20));
    }

    #[test]
    fn test_plain_region_has_no_actions() {
        // Arrange
        let region = HighlightRegion::new(RegionCategory::String, 0, 8).unwrap();

        // Assert
        assert!(!region.is_mutable());
        assert!(region.context_menu(2).is_none());
        assert!(!region.can_split(2));
    }

    #[test]
    fn test_patch_split_only_strictly_inside() {
        // Arrange
        let region = HighlightRegion::patch(0x100, 4).unwrap();

        // Assert
        assert!(!region.can_split(0x100));
        assert!(region.can_split(0x101));
        assert!(region.can_split(0x103));
        assert!(!region.can_split(0x104));
    }

    #[test]
    fn test_merge_requires_exact_adjacency() {
        // Arrange
        let a = HighlightRegion::patch(0x100, 4).unwrap();
        let b = HighlightRegion::patch(0x104, 2).unwrap();
        let c = HighlightRegion::patch(0x105, 2).unwrap();
        let plain = HighlightRegion::new(RegionCategory::Data, 0x104, 2).unwrap();

        // Assert
        assert!(a.can_merge_with(&b));
        assert!(!b.can_merge_with(&a));
        assert!(!a.can_merge_with(&c));
        assert!(!a.can_merge_with(&plain));
    }

    #[test]
    fn test_patch_menu_layout() {
        // Arrange
        let region = HighlightRegion::patch(0x2a, 3).unwrap();

        // Act
        let menu = region.context_menu(0x2b).unwrap();

        // Assert
        assert_eq!(menu.title, "Patch 0x2a (3 bytes)");
        assert_eq!(menu.patch_addr, 0x2a);
        let labels: Vec<_> = menu.items.iter().map(|i| i.label).collect();
        assert_eq!(labels, ["Split", "Set Comment...", "Revert"]);
        assert!(menu.items.iter().all(|i| i.enabled));
    }
}
