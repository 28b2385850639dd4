//! The `cursor` module holds [`CursorState`], the authoritative cursor, nibble, and
//! selection anchor of a hex grid.
//!
//! The cursor stays inside `[start_addr, end_addr)`. Moves are performed by
//! [`HexGrid::set_cursor`](crate::HexGrid::set_cursor), which holds the `moving` guard for
//! the whole transition.

use std::ops::RangeInclusive;

/// Half of a byte being edited in hex-entry mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nibble {
    Low,
    High,
}

impl Nibble {
    #[must_use]
    pub const fn shift(self) -> u32 {
        match self {
            Self::Low => 0,
            Self::High => 4,
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }

    /// Replace this nibble of `byte` with the low 4 bits of `value`
    #[must_use]
    pub const fn apply(self, byte: u8, value: u8) -> u8 {
        let shift = self.shift();
        (byte & !(0xF << shift)) | ((value & 0xF) << shift)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorState {
    start_addr: usize,
    end_addr: usize,
    cursor: usize,
    nibble: Option<Nibble>,
    selection_start: Option<usize>,
    ascii_column_active: bool,
    /// Held for the duration of a cursor transition
    moving: bool,
}

impl CursorState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the addressable region and reset the cursor to its start.
    /// Returns whether anything changed.
    pub fn set_bounds(&mut self, start_addr: usize, end_addr: usize) -> bool {
        let changed = self.start_addr != start_addr
            || self.end_addr != end_addr
            || self.cursor != start_addr
            || self.selection_start.is_some()
            || self.nibble.is_some();
        self.start_addr = start_addr;
        self.end_addr = end_addr;
        self.cursor = start_addr;
        self.nibble = None;
        self.selection_start = None;
        changed
    }

    #[must_use]
    pub const fn in_bounds(&self, addr: usize) -> bool {
        self.start_addr <= addr && addr < self.end_addr
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn nibble(&self) -> Option<Nibble> {
        self.nibble
    }

    #[must_use]
    pub const fn ascii_column_active(&self) -> bool {
        self.ascii_column_active
    }

    #[must_use]
    pub const fn selection_start(&self) -> Option<usize> {
        self.selection_start
    }

    #[must_use]
    pub const fn is_selecting(&self) -> bool {
        self.selection_start.is_some()
    }

    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    pub const fn begin_selection(&mut self) {
        self.selection_start = Some(self.cursor);
    }

    pub const fn clear_selection(&mut self) {
        self.selection_start = None;
    }

    /// Inclusive selection range, or `None` when not selecting
    #[must_use]
    pub fn selection(&self) -> Option<RangeInclusive<usize>> {
        let anchor = self.selection_start?;
        Some(anchor.min(self.cursor)..=anchor.max(self.cursor))
    }

    /// Selection range, or the cursor alone when not selecting
    #[must_use]
    pub fn span(&self) -> RangeInclusive<usize> {
        self.selection().unwrap_or(self.cursor..=self.cursor)
    }

    /// Number of selected bytes (0 when not selecting)
    #[must_use]
    pub fn selected_len(&self) -> usize {
        self.selection().map_or(0, |r| r.end() - r.start() + 1)
    }

    /// Acquire the transition guard. Returns false if a move is already in progress.
    pub(crate) const fn begin_move(&mut self) -> bool {
        if self.moving {
            return false;
        }
        self.moving = true;
        true
    }

    /// Apply a move. Returns whether the address changed.
    pub(crate) const fn apply(
        &mut self,
        addr: usize,
        ascii_column: Option<bool>,
        nibble: Option<Nibble>,
    ) -> bool {
        let changed = self.cursor != addr;
        self.cursor = addr;
        self.nibble = nibble;
        if let Some(ascii) = ascii_column {
            self.ascii_column_active = ascii;
        }
        changed
    }

    pub(crate) const fn end_move(&mut self) {
        self.moving = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_apply() {
        assert_eq!(Nibble::High.apply(0x00, 0xA), 0xA0);
        assert_eq!(Nibble::Low.apply(0xA0, 0x5), 0xA5);
        assert_eq!(Nibble::High.apply(0xA5, 0x3), 0x35);
        assert_eq!(Nibble::Low.apply(0x35, 0xFF), 0x3F);
    }

    #[test]
    fn test_selection_is_ordered_pair() {
        // Arrange
        let mut state = CursorState::new();
        state.set_bounds(0x100, 0x200);
        state.apply(0x150, None, None);

        // Act
        state.begin_selection();
        state.apply(0x120, None, None);

        // Assert
        assert_eq!(state.selection(), Some(0x120..=0x150));
        assert_eq!(state.selected_len(), 0x31);

        // Act
        state.clear_selection();

        // Assert
        assert_eq!(state.selection(), None);
        assert_eq!(state.span(), 0x120..=0x120);
        assert_eq!(state.selected_len(), 0);
    }

    #[test]
    fn test_set_bounds_resets() {
        // Arrange
        let mut state = CursorState::new();
        state.set_bounds(0, 0x10);
        state.apply(5, Some(true), Some(Nibble::Low));
        state.begin_selection();

        // Act
        let changed = state.set_bounds(0x20, 0x30);

        // Assert
        assert!(changed);
        assert_eq!(state.cursor(), 0x20);
        assert_eq!(state.nibble(), None);
        assert!(!state.is_selecting());
        assert!(!state.set_bounds(0x20, 0x30));
    }

    #[test]
    fn test_move_guard_is_exclusive() {
        // Arrange
        let mut state = CursorState::new();

        // Act & Assert
        assert!(!state.is_moving());
        assert!(state.begin_move());
        assert!(state.is_moving());
        assert!(!state.begin_move());
        state.end_move();
        assert!(!state.is_moving());
        assert!(state.begin_move());
    }
}
