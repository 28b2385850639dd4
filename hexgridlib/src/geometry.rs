//! The `geometry` module provides [`Geometry`], the pure coordinate math of the hex grid.
//!
//! A region `[start_addr, end_addr)` is laid out in rows of [`BYTES_PER_ROW`] bytes. Row 0
//! starts at `start_addr` aligned down to the row width, so the first row may contain
//! addresses before `start_addr` that are never rendered or addressable. Each row has three
//! sections: the address, 16 byte slots (with a wider gap after the 8th), and 16 ASCII slots.

/// Fixed number of bytes displayed per row
pub const BYTES_PER_ROW: usize = 16;

const ROW_MASK: usize = BYTES_PER_ROW - 1;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    #[must_use]
    pub const fn from_min_max(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn from_min_size(min: Point, width: f32, height: f32) -> Self {
        Self {
            min,
            max: Point::new(min.x + width, min.y + height),
        }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub const fn left_top(&self) -> Point {
        self.min
    }

    #[must_use]
    pub const fn right_top(&self) -> Point {
        Point::new(self.max.x, self.min.y)
    }

    #[must_use]
    pub const fn left_bottom(&self) -> Point {
        Point::new(self.min.x, self.max.y)
    }

    #[must_use]
    pub const fn right_bottom(&self) -> Point {
        self.max
    }

    /// Shrink the rect by `amount` on every side
    #[must_use]
    pub fn shrink(&self, amount: f32) -> Self {
        Self {
            min: Point::new(self.min.x + amount, self.min.y + amount),
            max: Point::new(self.max.x - amount, self.max.y - amount),
        }
    }

    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            min: Point::new(self.min.x + dx, self.min.y + dy),
            max: Point::new(self.max.x + dx, self.max.y + dy),
        }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x < self.max.x && self.min.y <= p.y && p.y < self.max.y
    }
}

/// Font-derived cell metrics. Every spacing in [`Layout`] is a multiple of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    /// Width of a single monospace glyph
    pub char_width: f32,
    /// Height of a single monospace glyph
    pub char_height: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            char_height: 14.0,
        }
    }
}

/// Pixel layout of a single row
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub char_width: f32,
    pub row_padding: f32,
    pub row_height: f32,
    pub section_space: f32,
    pub addr_offset: f32,
    pub addr_width: f32,
    pub byte_width: f32,
    pub byte_space: f32,
    pub byte_group_space: f32,
    pub ascii_width: f32,
    pub ascii_space: f32,
    /// Left edges of the 16 byte slots, plus the right edge of the last one
    pub byte_columns: [f32; BYTES_PER_ROW + 1],
    /// Left edges of the 16 ASCII slots, plus the right edge of the last one
    pub ascii_columns: [f32; BYTES_PER_ROW + 1],
    /// Right edge of the whole row
    pub max_x: f32,
}

impl Layout {
    #[must_use]
    pub fn new(metrics: CellMetrics) -> Self {
        let cw = metrics.char_width;
        let row_padding = (metrics.char_height * 0.25).floor();
        let section_space = cw * 4.0;
        let addr_offset = cw;
        let addr_width = cw * 8.0;
        let byte_width = cw * 2.0;
        let byte_space = cw;
        let byte_group_space = cw * 2.0;
        let ascii_width = cw;
        let ascii_space = 0.0;

        let mut byte_columns = [0.0; BYTES_PER_ROW + 1];
        byte_columns[0] = addr_offset + addr_width + section_space;
        for i in 1..=BYTES_PER_ROW {
            // Wider gap between the two groups of 8 bytes
            let space = if i == 8 { byte_group_space } else { byte_space };
            byte_columns[i] = byte_columns[i - 1] + byte_width + space;
        }

        let mut ascii_columns = [0.0; BYTES_PER_ROW + 1];
        ascii_columns[0] = byte_columns[BYTES_PER_ROW] + section_space;
        for i in 1..=BYTES_PER_ROW {
            ascii_columns[i] = ascii_columns[i - 1] + ascii_width + ascii_space;
        }

        Self {
            char_width: cw,
            row_padding,
            row_height: metrics.char_height + row_padding,
            section_space,
            addr_offset,
            addr_width,
            byte_width,
            byte_space,
            byte_group_space,
            ascii_width,
            ascii_space,
            max_x: ascii_columns[BYTES_PER_ROW],
            byte_columns,
            ascii_columns,
        }
    }

    /// Column offsets, slot width and inter-slot space of a section
    const fn section(&self, ascii_section: bool) -> (&[f32; BYTES_PER_ROW + 1], f32, f32) {
        if ascii_section {
            (&self.ascii_columns, self.ascii_width, self.ascii_space)
        } else {
            (&self.byte_columns, self.byte_width, self.byte_space)
        }
    }
}

/// Closed outline of an inclusive address range, plus the rects that make up its area.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionPath {
    /// Closed polygons. Two when the first and last row of a two-row range do not touch.
    pub subpaths: Vec<Vec<Point>>,
    /// Top, middle, and bottom rects (only those that exist)
    pub rects: Vec<Rect>,
}

impl SelectionPath {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    /// Smallest rect containing the whole path
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect> {
        let mut iter = self.rects.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, r| Rect {
            min: Point::new(acc.min.x.min(r.min.x), acc.min.y.min(r.min.y)),
            max: Point::new(acc.max.x.max(r.max.x), acc.max.y.max(r.max.y)),
        }))
    }
}

/// Accumulates path points, skipping consecutive duplicates
#[derive(Default)]
struct PathBuilder {
    done: Vec<Vec<Point>>,
    current: Vec<Point>,
}

impl PathBuilder {
    fn line_to(&mut self, p: Point) {
        if self.current.last() != Some(&p) {
            self.current.push(p);
        }
    }

    fn close(&mut self) {
        let mut sub = std::mem::take(&mut self.current);
        if sub.len() > 1 && sub.first() == sub.last() {
            sub.pop();
        }
        if !sub.is_empty() {
            self.done.push(sub);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    start_addr: usize,
    end_addr: usize,
    layout: Layout,
    num_rows: usize,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(0, 0, CellMetrics::default())
    }
}

impl Geometry {
    /// Creates the geometry of `num_bytes` bytes starting at `start_addr`.
    ///
    /// # Example
    /// ```
    /// use hexgridlib::{CellMetrics, Geometry};
    ///
    /// let geom = Geometry::new(0x1004, 32, CellMetrics::default());
    /// assert_eq!(geom.num_rows(), 3);
    /// assert_eq!(geom.addr_to_row_col(0x1004), (0, 4));
    /// ```
    #[must_use]
    pub fn new(start_addr: usize, num_bytes: usize, metrics: CellMetrics) -> Self {
        let end_addr = start_addr.saturating_add(num_bytes);
        let num_rows = if num_bytes > 0 {
            (num_bytes + (start_addr & ROW_MASK)).div_ceil(BYTES_PER_ROW)
        } else {
            0
        };
        Self {
            start_addr,
            end_addr,
            layout: Layout::new(metrics),
            num_rows,
        }
    }

    /// Recompute the pixel layout for new metrics, keeping the address region
    pub fn set_metrics(&mut self, metrics: CellMetrics) {
        self.layout = Layout::new(metrics);
    }

    #[must_use]
    pub const fn start_addr(&self) -> usize {
        self.start_addr
    }

    /// Exclusive end of the region
    #[must_use]
    pub const fn end_addr(&self) -> usize {
        self.end_addr
    }

    #[must_use]
    pub const fn num_bytes(&self) -> usize {
        self.end_addr - self.start_addr
    }

    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub const fn contains(&self, addr: usize) -> bool {
        self.start_addr <= addr && addr < self.end_addr
    }

    /// Address of column 0 of row 0
    #[must_use]
    pub const fn row_aligned_start(&self) -> usize {
        self.start_addr & !ROW_MASK
    }

    #[must_use]
    pub const fn addr_to_row_col(&self, addr: usize) -> (usize, usize) {
        let offset = addr.saturating_sub(self.row_aligned_start());
        (offset >> 4, offset & ROW_MASK)
    }

    #[must_use]
    pub const fn row_col_to_addr(&self, row: usize, col: usize) -> usize {
        self.row_aligned_start() + row * BYTES_PER_ROW + col
    }

    #[must_use]
    pub const fn row_to_addr(&self, row: usize) -> usize {
        self.row_col_to_addr(row, 0)
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    /// Row containing point `p`, or `None` if `p` is above the first or below the last row
    #[must_use]
    pub fn point_to_row(&self, p: Point) -> Option<usize> {
        if !p.y.is_finite() || p.y < 0.0 {
            return None;
        }
        let row = (p.y / self.layout.row_height) as usize;
        (row < self.num_rows).then_some(row)
    }

    /// Index of the slot in `columns` containing `x`
    #[must_use]
    pub fn point_to_column(x: f32, columns: &[f32]) -> Option<usize> {
        columns.windows(2).position(|w| w[0] <= x && x < w[1])
    }

    /// Get the `(address, ascii_column)` under point `p`. `ascii_column` is true when the
    /// point falls within the ASCII section.
    ///
    /// # Example
    /// ```
    /// use hexgridlib::{CellMetrics, Geometry, Point};
    ///
    /// let geom = Geometry::new(0x10, 16, CellMetrics::default());
    /// let x = geom.layout().ascii_columns[3] + 1.0;
    ///
    /// assert_eq!(geom.point_to_addr(Point::new(x, 1.0)), Some((0x13, true)));
    /// assert_eq!(geom.point_to_addr(Point::new(0.0, 1.0)), None);
    /// ```
    #[must_use]
    pub fn point_to_addr(&self, p: Point) -> Option<(usize, bool)> {
        let row = self.point_to_row(p)?;
        let (col, ascii_column) = match Self::point_to_column(p.x, &self.layout.byte_columns) {
            Some(col) => (col, false),
            None => (Self::point_to_column(p.x, &self.layout.ascii_columns)?, true),
        };
        let addr = self.row_col_to_addr(row, col);
        self.contains(addr).then_some((addr, ascii_column))
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn row_to_point(&self, row: usize) -> Point {
        Point::new(0.0, row as f32 * self.layout.row_height)
    }

    #[must_use]
    pub fn row_col_to_point(&self, row: usize, col: usize, ascii_section: bool) -> Point {
        let (columns, _, _) = self.layout.section(ascii_section);
        Point::new(columns[col & ROW_MASK], self.row_to_point(row).y)
    }

    #[must_use]
    pub fn addr_to_point(&self, addr: usize, ascii_section: bool) -> Point {
        let (row, col) = self.addr_to_row_col(addr);
        self.row_col_to_point(row, col, ascii_section)
    }

    /// Rect of the cell at `addr`, widened by half the inter-slot space on each side
    #[must_use]
    pub fn addr_to_rect(&self, addr: usize, ascii_section: bool) -> Rect {
        let (_, width, space) = self.layout.section(ascii_section);
        let pt = self.addr_to_point(addr, ascii_section);
        Rect::from_min_size(
            Point::new(pt.x - space / 2.0, pt.y),
            width + space,
            self.layout.row_height,
        )
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        Rect::from_min_max(
            Point::default(),
            Point::new(
                self.layout.max_x,
                self.num_rows as f32 * self.layout.row_height,
            ),
        )
    }

    #[allow(clippy::cast_precision_loss)]
    /// Build the outline that selects the inclusive address range `[min_addr, max_addr]` in
    /// either the byte or the ASCII section. Every rect is shrunk by `shrink` on each side.
    ///
    /// The range spans a top rect (first row, from the first column), an optional middle
    /// rect (full rows in between), and an optional bottom rect (last row, up to the last
    /// column). When the range covers exactly two rows and the last column is left of the
    /// first one, the top and bottom rects do not touch and become two subpaths.
    #[must_use]
    pub fn selection_path(
        &self,
        min_addr: usize,
        max_addr: usize,
        ascii_section: bool,
        shrink: f32,
    ) -> SelectionPath {
        if max_addr < min_addr || self.num_rows == 0 {
            return SelectionPath::default();
        }

        let (row_start, col_start) = self.addr_to_row_col(min_addr);
        let (row_end, col_end) = self.addr_to_row_col(max_addr);
        let num_selected_rows = row_end - row_start + 1;

        let (columns, width, space) = self.layout.section(ascii_section);
        let half = space / 2.0;
        let row_height = self.layout.row_height;
        let left = columns[0] - half;
        let right = columns[ROW_MASK] + width + half;

        // Top rect
        let top_y = self.row_to_point(row_start).y;
        let top_right = if num_selected_rows == 1 {
            columns[col_end] + width + half
        } else {
            right
        };
        let trect = Rect::from_min_max(
            Point::new(columns[col_start] - half, top_y),
            Point::new(top_right, top_y + row_height),
        )
        .shrink(shrink);

        // Middle rect
        let mrect = (num_selected_rows > 2).then(|| {
            let y = self.row_to_point(row_start + 1).y;
            Rect::from_min_max(
                Point::new(left, y),
                Point::new(right, y + row_height * (num_selected_rows - 2) as f32),
            )
            .shrink(shrink)
        });

        // Bottom rect
        let brect = (num_selected_rows > 1).then(|| {
            let y = self.row_to_point(row_end).y;
            Rect::from_min_max(
                Point::new(left, y),
                Point::new(columns[col_end] + width + half, y + row_height),
            )
            .shrink(shrink)
        });

        let mut path = PathBuilder::default();
        let mut close_to_top = true;

        path.line_to(trect.left_top());
        path.line_to(trect.right_top());
        path.line_to(trect.right_bottom());
        let mut last = trect.right_bottom();

        if let Some(m) = mrect {
            path.line_to(m.right_bottom());
            last = m.right_bottom();
        }

        if let Some(b) = brect {
            if mrect.is_none() && col_end < col_start {
                // Disjoint top and bottom
                path.line_to(trect.left_bottom());
                path.close();
                path.line_to(b.left_top());
                last = b.left_top();
                close_to_top = false;
            }
            path.line_to(Point::new(b.right_top().x, last.y));
            path.line_to(b.right_bottom());
            path.line_to(b.left_bottom());
            path.line_to(b.left_top());
            last = b.left_top();
        }

        if let Some(m) = mrect {
            path.line_to(m.left_top());
            last = m.left_top();
        }

        if close_to_top {
            path.line_to(Point::new(trect.left_bottom().x, last.y));
        }
        path.close();

        SelectionPath {
            subpaths: path.done,
            rects: [Some(trect), mrect, brect].into_iter().flatten().collect(),
        }
    }
}
