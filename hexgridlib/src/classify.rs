//! Classification-derived highlight regions ("smart highlighting").
//!
//! The knowledge index is external. The grid only asks for the item at or below an
//! address and turns it into regions.

use crate::region::{HighlightRegion, RegionCategory};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSort {
    String,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub addr: usize,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzedItem {
    Data {
        addr: usize,
        size: usize,
        sort: DataSort,
    },
    Block {
        addr: usize,
        size: usize,
        instructions: Vec<Instruction>,
    },
}

impl AnalyzedItem {
    #[must_use]
    pub const fn addr(&self) -> usize {
        match self {
            Self::Data { addr, .. } | Self::Block { addr, .. } => *addr,
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Data { size, .. } | Self::Block { size, .. } => *size,
        }
    }
}

pub trait ClassificationIndex {
    /// Item with the greatest start address `<= addr`
    fn floor_item(&self, addr: usize) -> Option<(usize, AnalyzedItem)>;
}

/// `BTreeMap`-backed classification index
#[derive(Debug, Clone, Default)]
pub struct ItemMap {
    items: BTreeMap<usize, AnalyzedItem>,
}

impl ItemMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, item: AnalyzedItem) {
        self.items.insert(item.addr(), item);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ClassificationIndex for ItemMap {
    fn floor_item(&self, addr: usize) -> Option<(usize, AnalyzedItem)> {
        self.items
            .range(..=addr)
            .next_back()
            .map(|(a, item)| (*a, item.clone()))
    }
}

/// Regions for the item enclosing `cursor`.
///
/// Data items give one region. Instruction blocks give one region per instruction.
/// No enclosing item gives none.
///
/// # Example
/// ```
/// use hexgridlib::{AnalyzedItem, DataSort, ItemMap, RegionCategory, smart_highlights};
///
/// let mut items = ItemMap::new();
/// items.insert(AnalyzedItem::Data { addr: 0x40, size: 8, sort: DataSort::String });
///
/// let regions = smart_highlights(&items, 0x44);
/// assert_eq!(regions.len(), 1);
/// assert_eq!(regions[0].category(), RegionCategory::String);
/// assert!(smart_highlights(&items, 0x48).is_empty());
/// ```
#[must_use]
pub fn smart_highlights(index: &dyn ClassificationIndex, cursor: usize) -> Vec<HighlightRegion> {
    let Some((item_addr, item)) = index.floor_item(cursor) else {
        return Vec::new();
    };
    if cursor >= item_addr.saturating_add(item.size()) {
        return Vec::new();
    }
    match item {
        AnalyzedItem::Data { size, sort, .. } => {
            let category = match sort {
                DataSort::String => RegionCategory::String,
                DataSort::Data => RegionCategory::Data,
            };
            HighlightRegion::new(category, item_addr, size).into_iter().collect()
        }
        AnalyzedItem::Block { instructions, .. } => instructions
            .iter()
            .filter_map(|insn| HighlightRegion::new(RegionCategory::Instruction, insn.addr, insn.size))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> ItemMap {
        let mut items = ItemMap::new();
        items.insert(AnalyzedItem::Data {
            addr: 0x100,
            size: 0x10,
            sort: DataSort::Data,
        });
        items.insert(AnalyzedItem::Block {
            addr: 0x200,
            size: 7,
            instructions: vec![
                Instruction { addr: 0x200, size: 1 },
                Instruction { addr: 0x201, size: 0 },
                Instruction { addr: 0x201, size: 3 },
                Instruction { addr: 0x204, size: 3 },
            ],
        });
        items
    }

    #[test]
    fn test_block_yields_one_region_per_instruction() {
        // Act
        let regions = smart_highlights(&index(), 0x205);

        // Assert
        let spans: Vec<_> = regions.iter().map(|r| (r.addr(), r.size())).collect();
        assert_eq!(spans, [(0x200, 1), (0x201, 3), (0x204, 3)]);
        assert!(regions.iter().all(|r| r.category() == RegionCategory::Instruction));
    }

    #[test]
    fn test_data_item_region() {
        // Act
        let regions = smart_highlights(&index(), 0x100);

        // Assert
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].category(), RegionCategory::Data);
        assert_eq!((regions[0].addr(), regions[0].size()), (0x100, 0x10));
    }

    #[test]
    fn test_no_enclosing_item() {
        // Arrange
        let items = index();

        // Assert
        assert!(smart_highlights(&items, 0x0FF).is_empty());
        assert!(smart_highlights(&items, 0x110).is_empty());
        assert!(smart_highlights(&items, 0x207).is_empty());
        assert!(smart_highlights(&ItemMap::new(), 0).is_empty());
    }
}
