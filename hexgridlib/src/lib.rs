//! # `hexgridlib`
//!
//! `hexgridlib` is the view-model behind a classic hex editor surface: 16 bytes per row,
//! an ASCII gutter, a cursor with nibble-level editing, range selection, and highlight
//! regions that overlay the byte grid.
//!
//! The library provides:
//! - Address/grid/pixel coordinate conversion (via [`Geometry`]).
//! - Cursor and selection state machine with a re-entrancy guard (via [`HexGrid`]).
//! - Highlight overlay that merges classification, patch, and synchronized-view regions
//!   (via [`HighlightOverlay`]).
//! - Patch interaction layer that turns byte writes into splits, shrinks, and merges of a
//!   sparse patch set (via [`PatchStore`]).
//! - Integration of all of the above against a project handle (via [`HexView`]).
//!
//! ## Example
//!
//! ```
//! use hexgridlib::{ItemMap, MemoryImage, Project};
//!
//! let project = Project::new(MemoryImage::from_bytes(0x1000, vec![0; 32]), ItemMap::new());
//! project.patches.borrow_mut().write(0x1010, &[1, 2, 3, 4]).unwrap();
//!
//! assert_eq!(project.patches.borrow().read(0x1011), Some(2));
//! ```

mod blink;
mod classify;
mod cursor;
mod error;
mod events;
mod geometry;
mod grid;
mod overlay;
mod patch;
mod patchstore;
mod region;
mod source;
mod sync;
mod view;

// Public APIs
pub use blink::{CursorBlink, DEFAULT_BLINK_INTERVAL};
pub use classify::{AnalyzedItem, ClassificationIndex, DataSort, Instruction, ItemMap, smart_highlights};
pub use cursor::{CursorState, Nibble};
pub use error::{HexGridError, PatchError};
pub use events::EventHub;
pub use geometry::{BYTES_PER_ROW, CellMetrics, Geometry, Layout, Point, Rect, SelectionPath};
pub use grid::{CellClass, CellView, CursorListener, CursorMarks, HexGrid, KeyInput, Modifiers, RowView, is_printable};
pub use overlay::HighlightOverlay;
pub use patch::{Patch, PatchMap, PatchSet};
pub use patchstore::{PatchEvent, PatchStore};
pub use region::{HighlightRegion, RegionAction, RegionCategory, RegionKind, RegionMenu, RegionMenuItem};
pub use source::{ByteSource, ByteValue, MemoryImage};
pub use sync::{AddrRange, SyncEvent, SyncGroup, ViewId};
pub use view::{ContextMenu, HexView, MenuEntry, Project, ProjectMemory, ViewAction, ViewOptions};
