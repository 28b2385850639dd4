//! The `grid` module provides [`HexGrid`], the stateful hex surface.
//!
//! `HexGrid` ties the [`Geometry`] of a region to its [`CursorState`], the
//! [`HighlightOverlay`] painted over it, the cursor blink timer, and the [`ByteSource`] that
//! edits are written through. It knows nothing about windows or painters: the adapter
//! feeds it pointer and key events and renders [`RowView`]s and [`CursorMarks`].

use crate::blink::CursorBlink;
use crate::cursor::{CursorState, Nibble};
use crate::geometry::{BYTES_PER_ROW, CellMetrics, Geometry, Point, Rect};
use crate::overlay::HighlightOverlay;
use crate::region::HighlightRegion;
use crate::source::{ByteSource, ByteValue};
use std::ops::{Range, RangeInclusive};
use std::time::Instant;
use tracing::trace;

/// Observer called after every accepted cursor move that changed the address
pub type CursorListener = Box<dyn FnMut(&mut HexGrid)>;

const ROW_DELTA: isize = BYTES_PER_ROW as isize;
const PAGE_DELTA: isize = 8 * ROW_DELTA;

/// Key events routed to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Space,
    /// Single character of typed text
    Text(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Range-extend modifier
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    Printable,
    Unprintable,
    Unknown,
}

impl CellClass {
    #[must_use]
    pub const fn of(value: ByteValue) -> Self {
        match value {
            ByteValue::Known(b) if is_printable(b) => Self::Printable,
            ByteValue::Known(_) => Self::Unprintable,
            ByteValue::Unavailable => Self::Unknown,
        }
    }
}

#[must_use]
pub const fn is_printable(b: u8) -> bool {
    matches!(b, 0x20..=0x7E)
}

/// One addressable cell of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub col: usize,
    pub addr: usize,
    /// Two hex digits, or `??`
    pub hex_text: String,
    /// The character itself, `.` when unprintable, `?` when unknown
    pub ascii: char,
    pub class: CellClass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub row: usize,
    pub addr: usize,
    pub addr_text: String,
    /// Odd rows use the alternate background
    pub alternate: bool,
    /// Only cells within the region. Leading and trailing columns may be missing.
    pub cells: Vec<CellView>,
}

/// Cursor rectangles for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMarks {
    pub byte: Rect,
    pub ascii: Rect,
    pub ascii_active: bool,
    /// Blink phase of the active column's cursor
    pub phase_on: bool,
}

pub struct HexGrid {
    geometry: Geometry,
    metrics: CellMetrics,
    cursor: CursorState,
    overlay: HighlightOverlay,
    blink: CursorBlink,
    source: Option<Box<dyn ByteSource>>,
    listeners: Vec<CursorListener>,
    mouse_pressed: bool,
    focused: bool,
}

impl Default for HexGrid {
    fn default() -> Self {
        Self::new(CellMetrics::default())
    }
}

impl HexGrid {
    #[must_use]
    pub fn new(metrics: CellMetrics) -> Self {
        Self {
            geometry: Geometry::new(0, 0, metrics),
            metrics,
            cursor: CursorState::new(),
            overlay: HighlightOverlay::new(),
            blink: CursorBlink::default(),
            source: None,
            listeners: Vec::new(),
            mouse_pressed: false,
            focused: false,
        }
    }

    pub fn set_metrics(&mut self, metrics: CellMetrics) {
        if self.metrics != metrics {
            self.metrics = metrics;
            self.geometry.set_metrics(metrics);
        }
    }

    /// Display `size` bytes of `source` starting at `start_addr`. The cursor moves to the
    /// start of the region and the selection is cleared.
    pub fn set_region(&mut self, source: Box<dyn ByteSource>, start_addr: usize, size: usize) {
        self.geometry = Geometry::new(start_addr, size, self.metrics);
        self.source = Some(source);
        self.cursor
            .set_bounds(self.geometry.start_addr(), self.geometry.end_addr());
        self.overlay.update_active(&self.cursor.span());
        trace!(target: "hexgrid.cursor", start_addr, size, "region set");
    }

    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub const fn cursor_state(&self) -> &CursorState {
        &self.cursor
    }

    #[must_use]
    pub const fn overlay(&self) -> &HighlightOverlay {
        &self.overlay
    }

    #[must_use]
    pub const fn blink(&self) -> &CursorBlink {
        &self.blink
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor.cursor()
    }

    #[must_use]
    pub const fn nibble(&self) -> Option<Nibble> {
        self.cursor.nibble()
    }

    #[must_use]
    pub const fn ascii_column_active(&self) -> bool {
        self.cursor.ascii_column_active()
    }

    #[must_use]
    pub fn selection(&self) -> Option<RangeInclusive<usize>> {
        self.cursor.selection()
    }

    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn add_cursor_listener(&mut self, listener: CursorListener) {
        self.listeners.push(listener);
    }

    fn notify_cursor_changed(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener(self);
        }
        // Listeners registered during dispatch go after the existing ones
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }

    /// Move the cursor to `addr`. `ascii_column` switches the active column when given.
    ///
    /// Returns false, changing nothing, if `addr` is outside the region or another move
    /// is in progress (e.g. a listener moving the cursor from inside its callback).
    pub fn set_cursor(&mut self, addr: usize, ascii_column: Option<bool>, nibble: Option<Nibble>) -> bool {
        if !self.cursor.in_bounds(addr) {
            trace!(target: "hexgrid.cursor", addr, "rejected out-of-bounds move");
            return false;
        }
        if !self.cursor.begin_move() {
            trace!(target: "hexgrid.cursor", addr, "dropped nested move");
            return false;
        }
        if self.focused {
            self.blink.restart(Instant::now());
        }
        let changed = self.cursor.apply(addr, ascii_column, nibble);
        if changed {
            trace!(target: "hexgrid.cursor", addr, "cursor moved");
            self.overlay.update_active(&self.cursor.span());
            self.notify_cursor_changed();
        }
        self.cursor.end_move();
        true
    }

    pub fn begin_selection(&mut self) {
        self.cursor.begin_selection();
        self.overlay.update_active(&self.cursor.span());
    }

    pub fn clear_selection(&mut self) {
        self.cursor.clear_selection();
        self.overlay.update_active(&self.cursor.span());
    }

    /// Move by a signed byte delta. With `extend` the selection is anchored first (if not
    /// already selecting), otherwise it is cleared.
    pub fn move_by(&mut self, delta: isize, extend: bool) -> bool {
        if extend {
            if !self.cursor.is_selecting() {
                self.begin_selection();
            }
        } else {
            self.clear_selection();
        }
        self.cursor
            .cursor()
            .checked_add_signed(delta)
            .is_some_and(|target| self.set_cursor(target, None, None))
    }

    /// Primary button pressed at point `p`
    pub fn press(&mut self, p: Point, extend: bool) -> bool {
        let Some((addr, ascii_column)) = self.geometry.point_to_addr(p) else {
            return false;
        };
        self.mouse_pressed = true;
        if extend {
            if !self.cursor.is_selecting() {
                self.begin_selection();
            }
        } else {
            self.clear_selection();
        }
        self.set_cursor(addr, Some(ascii_column), None)
    }

    /// Pointer moved to `p`. Selects from the press point while the button is held.
    pub fn drag(&mut self, p: Point) -> bool {
        if !self.mouse_pressed {
            return false;
        }
        let Some((addr, ascii_column)) = self.geometry.point_to_addr(p) else {
            return false;
        };
        if !self.cursor.is_selecting() {
            self.begin_selection();
        }
        self.set_cursor(addr, Some(ascii_column), None)
    }

    pub const fn release(&mut self) {
        self.mouse_pressed = false;
    }

    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.mouse_pressed
    }

    /// Select the whole region under the cursor that starts nearest to it
    pub fn double_click(&mut self) -> bool {
        let Some((addr, last)) = self
            .overlay
            .regions_under(self.cursor())
            .first()
            .map(|r| (r.addr(), r.last()))
        else {
            return false;
        };
        self.clear_selection();
        self.set_cursor(last, None, None);
        self.begin_selection();
        self.set_cursor(addr, None, None);
        true
    }

    /// Handle a key. Returns whether the key was consumed.
    pub fn key(&mut self, input: KeyInput, modifiers: Modifiers) -> bool {
        let delta = match input {
            KeyInput::Up => -ROW_DELTA,
            KeyInput::Down => ROW_DELTA,
            KeyInput::Left => -1,
            KeyInput::Right => 1,
            KeyInput::PageUp => -PAGE_DELTA,
            KeyInput::PageDown => PAGE_DELTA,
            KeyInput::Space if modifiers.ctrl => {
                let ascii = !self.ascii_column_active();
                self.set_cursor(self.cursor(), Some(ascii), None);
                return true;
            }
            KeyInput::Space => return self.type_char(' ', modifiers),
            KeyInput::Text(c) => return self.type_char(c, modifiers),
        };
        self.move_by(delta, modifiers.shift);
        true
    }

    fn type_char(&mut self, c: char, modifiers: Modifiers) -> bool {
        if modifiers.ctrl {
            return false;
        }
        if self.ascii_column_active() {
            match u8::try_from(c) {
                Ok(b) if is_printable(b) => {
                    self.set_byte_value(b);
                    true
                }
                _ => false,
            }
        } else {
            match c.to_digit(16).and_then(|d| u8::try_from(d).ok()) {
                Some(v) => {
                    self.set_nibble_value(v);
                    true
                }
                None => false,
            }
        }
    }

    #[must_use]
    pub fn value_at(&self, addr: usize) -> ByteValue {
        self.source
            .as_ref()
            .map_or(ByteValue::Unavailable, |src| src.read(addr))
    }

    fn write(&mut self, addr: usize, value: u8) -> bool {
        self.source.as_mut().is_some_and(|src| src.write(addr, value))
    }

    /// Write a whole byte at the cursor and advance by one. A refused write changes nothing.
    pub fn set_byte_value(&mut self, value: u8) -> bool {
        let addr = self.cursor();
        if !self.write(addr, value) {
            trace!(target: "hexgrid.cursor", addr, "byte write refused");
            return false;
        }
        if let Some(next) = addr.checked_add(1) {
            self.set_cursor(next, None, None);
        }
        true
    }

    /// Write one nibble at the cursor. The high nibble is written first: the cursor then
    /// stays on the byte with the low nibble pending. After the low nibble the cursor
    /// advances to the next byte, high nibble pending.
    pub fn set_nibble_value(&mut self, value: u8) -> bool {
        let addr = self.cursor();
        let nibble = self.nibble().unwrap_or(Nibble::High);
        let current = self.value_at(addr).known().unwrap_or(0);
        if !self.write(addr, nibble.apply(current, value)) {
            trace!(target: "hexgrid.cursor", addr, "nibble write refused");
            return false;
        }
        let next = match nibble {
            Nibble::High => Some(addr),
            Nibble::Low => addr.checked_add(1),
        };
        if let Some(next) = next {
            self.set_cursor(next, None, Some(nibble.other()));
        }
        true
    }

    pub fn focus_in(&mut self, now: Instant) {
        self.focused = true;
        self.blink.focus_in(now);
    }

    pub fn focus_out(&mut self) {
        self.focused = false;
        self.mouse_pressed = false;
        self.blink.focus_out();
    }

    /// Advance the blink timer. Returns true if a repaint is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.blink.tick(now)
    }

    pub fn set_always_show_cursor(&mut self, always_show: bool) {
        self.blink.set_always_show(always_show);
    }

    pub const fn set_blink_interval(&mut self, interval: std::time::Duration) {
        self.blink.set_interval(interval);
    }

    pub fn set_classification_regions(&mut self, regions: Vec<HighlightRegion>) {
        let span = self.cursor.span();
        self.overlay.set_classification(regions, &span);
    }

    pub fn set_sync_regions(&mut self, regions: Vec<HighlightRegion>) {
        let span = self.cursor.span();
        self.overlay.set_synchronized(regions, &span);
    }

    pub fn set_patch_regions(&mut self, regions: Vec<HighlightRegion>) {
        let span = self.cursor.span();
        self.overlay.set_patches(regions, &span);
    }

    /// Regions under the cursor, nearest start first
    #[must_use]
    pub fn highlight_regions_under_cursor(&self) -> Vec<&HighlightRegion> {
        self.overlay.regions_under(self.cursor())
    }

    /// Render model for `rows`, clamped to the region
    #[must_use]
    pub fn visible_rows(&self, rows: Range<usize>) -> Vec<RowView> {
        let end = rows.end.min(self.geometry.num_rows());
        (rows.start..end)
            .map(|row| {
                let row_addr = self.geometry.row_to_addr(row);
                let cells = (0..BYTES_PER_ROW)
                    .filter_map(|col| {
                        let addr = self.geometry.row_col_to_addr(row, col);
                        self.geometry.contains(addr).then(|| self.cell(col, addr))
                    })
                    .collect();
                RowView {
                    row,
                    addr: row_addr,
                    addr_text: format!("{row_addr:08x}"),
                    alternate: row % 2 == 1,
                    cells,
                }
            })
            .collect()
    }

    fn cell(&self, col: usize, addr: usize) -> CellView {
        let value = self.value_at(addr);
        let class = CellClass::of(value);
        let (hex_text, ascii) = match value {
            ByteValue::Known(b) => (
                format!("{b:02x}"),
                if is_printable(b) { char::from(b) } else { '.' },
            ),
            ByteValue::Unavailable => ("??".to_owned(), '?'),
        };
        CellView {
            col,
            addr,
            hex_text,
            ascii,
            class,
        }
    }

    /// Cursor rects for the current frame, or `None` when the cursor is hidden
    #[must_use]
    pub fn cursor_marks(&self) -> Option<CursorMarks> {
        let addr = self.cursor();
        if !self.blink.show_cursor() || !self.geometry.contains(addr) {
            return None;
        }
        let layout = self.geometry.layout();
        let height = layout.row_padding / 2.0;
        let base_y = layout.row_height - height;

        let mut byte_left = self.geometry.addr_to_point(addr, false);
        let mut byte_width = layout.byte_width;
        if let Some(nibble) = self.nibble() {
            byte_width /= 2.0;
            if nibble == Nibble::Low {
                byte_left.x += byte_width;
            }
        }
        let ascii_left = self.geometry.addr_to_point(addr, true);

        Some(CursorMarks {
            byte: Rect::from_min_size(byte_left, byte_width, height).translate(0.0, base_y),
            ascii: Rect::from_min_size(ascii_left, layout.ascii_width, height).translate(0.0, base_y),
            ascii_active: self.ascii_column_active(),
            phase_on: self.blink.phase_on(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionCategory;
    use crate::source::MemoryImage;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn grid(start: usize, bytes: Vec<u8>) -> HexGrid {
        let mut grid = HexGrid::default();
        let size = bytes.len();
        grid.set_region(Box::new(MemoryImage::from_bytes(start, bytes)), start, size);
        grid
    }

    /// Source that refuses every write
    struct ReadOnly;

    impl ByteSource for ReadOnly {
        fn read(&self, _addr: usize) -> ByteValue {
            ByteValue::Known(0x41)
        }

        fn write(&mut self, _addr: usize, _value: u8) -> bool {
            false
        }
    }

    #[test]
    fn test_out_of_bounds_moves_are_ignored() {
        // Arrange
        let mut g = grid(0x1000, vec![0; 32]);

        // Act & Assert
        for addr in [0, 0x0FFF, 0x1020, usize::MAX] {
            assert!(!g.set_cursor(addr, None, None));
            assert_eq!(g.cursor(), 0x1000);
        }
        assert!(!g.move_by(-1, false));
        assert_eq!(g.cursor(), 0x1000);
    }

    #[test]
    fn test_arrow_and_page_deltas() {
        // Arrange
        let mut g = grid(0, vec![0; 0x400]);
        g.set_cursor(0x200, None, None);

        // Act & Assert
        g.key(KeyInput::Down, Modifiers::NONE);
        assert_eq!(g.cursor(), 0x210);
        g.key(KeyInput::Left, Modifiers::NONE);
        assert_eq!(g.cursor(), 0x20F);
        g.key(KeyInput::PageUp, Modifiers::NONE);
        assert_eq!(g.cursor(), 0x18F);
        g.key(KeyInput::PageDown, Modifiers::NONE);
        g.key(KeyInput::Up, Modifiers::NONE);
        g.key(KeyInput::Right, Modifiers::NONE);
        assert_eq!(g.cursor(), 0x200);
    }

    #[test]
    fn test_shift_extends_selection() {
        // Arrange
        let mut g = grid(0, vec![0; 0x100]);
        g.set_cursor(0x20, None, None);

        // Act
        g.key(KeyInput::Right, Modifiers::SHIFT);
        g.key(KeyInput::Down, Modifiers::SHIFT);

        // Assert
        assert_eq!(g.selection(), Some(0x20..=0x31));

        // Act
        g.key(KeyInput::Left, Modifiers::NONE);

        // Assert
        assert_eq!(g.selection(), None);
        assert_eq!(g.cursor(), 0x30);
    }

    #[test]
    fn test_nested_move_from_listener_is_dropped() {
        // Arrange
        let mut g = grid(0, vec![0; 0x40]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        g.add_cursor_listener(Box::new(move |grid: &mut HexGrid| {
            let moving = grid.cursor_state().is_moving();
            let nested = grid.set_cursor(0x3F, None, None);
            log.borrow_mut().push((grid.cursor(), moving, nested));
        }));

        // Act
        assert!(g.set_cursor(0x10, None, None));
        // Same address: no notification
        assert!(g.set_cursor(0x10, None, None));

        // Assert
        assert_eq!(*seen.borrow(), [(0x10, true, false)]);
        assert_eq!(g.cursor(), 0x10);
        assert!(!g.cursor_state().is_moving());
    }

    #[test]
    fn test_nibble_entry_sequence() {
        // Arrange
        let mut g = grid(0x10, vec![0x00, 0x00, 0x00]);

        // Act
        g.key(KeyInput::Text('a'), Modifiers::NONE);

        // Assert
        assert_eq!(g.value_at(0x10), ByteValue::Known(0xA0));
        assert_eq!((g.cursor(), g.nibble()), (0x10, Some(Nibble::Low)));

        // Act
        g.key(KeyInput::Text('5'), Modifiers::NONE);

        // Assert
        assert_eq!(g.value_at(0x10), ByteValue::Known(0xA5));
        assert_eq!((g.cursor(), g.nibble()), (0x11, Some(Nibble::High)));

        // Act
        g.key(KeyInput::Text('F'), Modifiers::NONE);
        g.key(KeyInput::Text('g'), Modifiers::NONE);

        // Assert
        assert_eq!(g.value_at(0x11), ByteValue::Known(0xF0));
        assert_eq!(g.cursor(), 0x11);
    }

    #[test]
    fn test_ascii_entry_writes_bytes() {
        // Arrange
        let mut g = grid(0, vec![0; 4]);
        g.key(KeyInput::Space, Modifiers::CTRL);
        assert!(g.ascii_column_active());

        // Act
        g.key(KeyInput::Text('h'), Modifiers::NONE);
        g.key(KeyInput::Space, Modifiers::NONE);
        let consumed = g.key(KeyInput::Text('\u{e9}'), Modifiers::NONE);

        // Assert
        assert!(!consumed);
        assert_eq!(g.value_at(0), ByteValue::Known(b'h'));
        assert_eq!(g.value_at(1), ByteValue::Known(b' '));
        assert_eq!(g.cursor(), 2);
    }

    #[test]
    fn test_refused_write_does_not_advance() {
        // Arrange
        let mut g = HexGrid::default();
        g.set_region(Box::new(ReadOnly), 0, 16);

        // Act
        let written = g.set_byte_value(0x42);
        g.key(KeyInput::Text('7'), Modifiers::NONE);

        // Assert
        assert!(!written);
        assert_eq!(g.cursor(), 0);
        assert_eq!(g.nibble(), None);
    }

    #[test]
    fn test_press_and_drag_select() {
        // Arrange
        let mut g = grid(0, vec![0; 0x40]);
        let layout = g.geometry().layout().clone();
        let at = |row: usize, col: usize| {
            Point::new(layout.byte_columns[col] + 1.0, layout.row_height * row as f32 + 1.0)
        };

        // Act
        g.press(at(0, 4), false);
        g.drag(at(1, 2));
        g.release();
        let after_release = g.drag(at(2, 0));

        // Assert
        assert!(!after_release);
        assert_eq!(g.selection(), Some(0x04..=0x12));

        // Act
        g.press(at(2, 0), false);

        // Assert
        assert_eq!(g.selection(), None);
        assert_eq!(g.cursor(), 0x20);
    }

    #[test]
    fn test_double_click_selects_region() {
        // Arrange
        let mut g = grid(0x2000, vec![0; 0x20]);
        g.set_classification_regions(vec![
            HighlightRegion::new(RegionCategory::Data, 0x2000, 6).unwrap(),
        ]);
        g.set_cursor(0x2003, None, None);

        // Act
        let selected = g.double_click();

        // Assert
        assert!(selected);
        assert_eq!(g.selection(), Some(0x2000..=0x2005));
        assert_eq!(g.cursor(), 0x2000);
    }

    #[test]
    fn test_visible_rows_mask_outside_region() {
        // Arrange
        let mut g = HexGrid::default();
        let mut image = MemoryImage::from_bytes(0x1004, vec![0x41, 0x00]);
        image.add_segment(0x1008, vec![0x7F]);
        g.set_region(Box::new(image), 0x1004, 0x10);

        // Act
        let rows = g.visible_rows(0..10);

        // Assert
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].addr_text, "00001000");
        assert!(!rows[0].alternate);
        assert!(rows[1].alternate);
        assert_eq!(rows[0].cells.len(), 12);
        assert_eq!(rows[1].cells.len(), 4);
        let first = &rows[0].cells[0];
        assert_eq!((first.col, first.addr, first.hex_text.as_str(), first.ascii), (4, 0x1004, "41", 'A'));
        assert_eq!(rows[0].cells[1].class, CellClass::Unprintable);
        assert_eq!(rows[0].cells[1].ascii, '.');
        assert_eq!(rows[0].cells[2].hex_text, "??");
        assert_eq!(rows[0].cells[2].class, CellClass::Unknown);
        assert_eq!(rows[0].cells[4].class, CellClass::Unprintable);
    }

    #[test]
    fn test_active_regions_follow_cursor() {
        // Arrange
        let mut g = grid(0, vec![0; 0x40]);
        g.set_patch_regions(vec![HighlightRegion::patch(0x10, 4).unwrap()]);

        // Assert
        assert_eq!(g.overlay().active_regions().count(), 0);

        // Act
        g.set_cursor(0x13, None, None);

        // Assert
        assert_eq!(g.overlay().active_regions().count(), 1);

        // Act
        g.begin_selection();
        g.set_cursor(0x14, None, None);
        g.clear_selection();

        // Assert
        assert_eq!(g.overlay().active_regions().count(), 0);
    }

    #[test]
    fn test_focus_out_releases_press() {
        // Arrange
        let mut g = grid(0, vec![0; 32]);
        let layout = g.geometry().layout().clone();
        g.focus_in(Instant::now());
        g.press(Point::new(layout.byte_columns[2] + 1.0, 1.0), false);

        // Act
        let focused = g.is_focused();
        let pressed = g.is_pressed();
        g.focus_out();

        // Assert
        assert!(focused);
        assert!(pressed);
        assert!(!g.is_focused());
        assert!(!g.is_pressed());
    }

    #[test]
    fn test_cursor_marks_nibble_halves() {
        // Arrange
        let mut g = grid(0, vec![0; 16]);
        g.focus_in(Instant::now());
        let layout = g.geometry().layout().clone();

        // Act
        let full = g.cursor_marks().unwrap();
        g.set_cursor(0, None, Some(Nibble::High));
        let high = g.cursor_marks().unwrap();
        g.set_cursor(0, None, Some(Nibble::Low));
        let low = g.cursor_marks().unwrap();

        // Assert
        assert_eq!(full.byte.width(), layout.byte_width);
        assert_eq!(high.byte.width(), layout.byte_width / 2.0);
        assert_eq!(high.byte.min.x, layout.byte_columns[0]);
        assert_eq!(low.byte.min.x, layout.byte_columns[0] + layout.byte_width / 2.0);
        assert_eq!(full.byte.max.y, layout.row_height);
        assert!(!full.ascii_active);

        // Act
        g.focus_out();

        // Assert
        assert!(g.cursor_marks().is_none());
    }
}
