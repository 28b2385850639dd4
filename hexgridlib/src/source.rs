//! The `source` module defines the [`ByteSource`] contract the grid reads and writes
//! through, and [`MemoryImage`], a sparse segment map standing in for loader memory.

use crate::error::HexGridError;
use std::collections::BTreeMap;
use std::path::Path;

/// Value of a single address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteValue {
    Known(u8),
    /// Address is not backed by loaded memory
    Unavailable,
}

impl ByteValue {
    #[must_use]
    pub const fn known(self) -> Option<u8> {
        match self {
            Self::Known(b) => Some(b),
            Self::Unavailable => None,
        }
    }
}

impl From<Option<u8>> for ByteValue {
    fn from(value: Option<u8>) -> Self {
        value.map_or(Self::Unavailable, Self::Known)
    }
}

/// Single-address read/write callback pair
pub trait ByteSource {
    fn read(&self, addr: usize) -> ByteValue;

    /// Write one byte. Returns false if the write was refused.
    fn write(&mut self, addr: usize, value: u8) -> bool;
}

/// Sparse memory made of non-overlapping segments keyed by start address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryImage {
    segments: BTreeMap<usize, Vec<u8>>,
}

impl<'a> IntoIterator for &'a MemoryImage {
    type Item = (&'a usize, &'a Vec<u8>);
    type IntoIter = std::collections::btree_map::Iter<'a, usize, Vec<u8>>;
    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl MemoryImage {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: BTreeMap::new(),
        }
    }

    /// Creates an image with a single segment.
    ///
    /// # Examples
    /// ```
    /// use hexgridlib::MemoryImage;
    ///
    /// let image = MemoryImage::from_bytes(0x400, vec![0xDE, 0xAD]);
    /// assert_eq!(image.get(0x401), Some(0xAD));
    /// assert_eq!(image.get(0x402), None);
    /// ```
    #[must_use]
    pub fn from_bytes(base: usize, bytes: Vec<u8>) -> Self {
        let mut image = Self::new();
        image.add_segment(base, bytes);
        image
    }

    /// Load a raw binary file at address `base`.
    ///
    /// # Errors
    /// - Returns an error if the file cannot be read
    /// - Returns an error if the file is empty
    pub fn from_file<P: AsRef<Path>>(path: P, base: usize) -> Result<Self, HexGridError> {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(HexGridError::EmptyImage);
        }
        Ok(Self::from_bytes(base, bytes))
    }

    /// Add a segment at `base`. Empty segments are ignored. A segment starting at an
    /// existing base replaces it.
    pub fn add_segment(&mut self, base: usize, bytes: Vec<u8>) {
        if !bytes.is_empty() {
            self.segments.insert(base, bytes);
        }
    }

    #[must_use]
    pub fn min_addr(&self) -> Option<usize> {
        self.segments.keys().next().copied()
    }

    /// Last loaded address (inclusive)
    #[must_use]
    pub fn max_addr(&self) -> Option<usize> {
        self.segments
            .iter()
            .map(|(base, bytes)| base + (bytes.len() - 1))
            .max()
    }

    /// Number of loaded bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn get(&self, addr: usize) -> Option<u8> {
        let (base, bytes) = self.segments.range(..=addr).next_back()?;
        bytes.get(addr - base).copied()
    }

    pub fn get_mut(&mut self, addr: usize) -> Option<&mut u8> {
        let (base, bytes) = self.segments.range_mut(..=addr).next_back()?;
        bytes.get_mut(addr - *base)
    }
}

impl ByteSource for MemoryImage {
    fn read(&self, addr: usize) -> ByteValue {
        self.get(addr).into()
    }

    fn write(&mut self, addr: usize, value: u8) -> bool {
        self.get_mut(addr).map(|b| *b = value).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_segments() {
        // Arrange
        let mut image = MemoryImage::from_bytes(0x100, vec![1, 2, 3]);
        image.add_segment(0x200, vec![4, 5]);
        image.add_segment(0x300, vec![]);

        // Assert
        assert_eq!(image.min_addr(), Some(0x100));
        assert_eq!(image.max_addr(), Some(0x201));
        assert_eq!(image.len(), 5);
        assert_eq!(image.read(0x102), ByteValue::Known(3));
        assert_eq!(image.read(0x103), ByteValue::Unavailable);
        assert_eq!(image.read(0x0FF), ByteValue::Unavailable);
        assert_eq!(image.read(0x200), ByteValue::Known(4));
    }

    #[test]
    fn test_write_refuses_unbacked_address() {
        // Arrange
        let mut image = MemoryImage::from_bytes(0x10, vec![0; 4]);

        // Act & Assert
        assert!(image.write(0x12, 0xAA));
        assert_eq!(image.get(0x12), Some(0xAA));
        assert!(!image.write(0x14, 0xAA));
        assert_eq!(image.len(), 4);
    }

    #[test]
    fn test_empty_image() {
        // Arrange
        let image = MemoryImage::new();

        // Assert
        assert!(image.is_empty());
        assert_eq!(image.min_addr(), None);
        assert_eq!(image.max_addr(), None);
    }
}
