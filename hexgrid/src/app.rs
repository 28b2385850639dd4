use crate::config::{ColorConfig, Config, Rgb};
use crate::events::EventState;
use crate::ui_jumpto::JumpTo;
use crate::ui_popup::Popup;
use eframe::egui::Color32;
use hexgridlib::{HexView, RegionCategory, SyncGroup, ViewAction};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::SystemTime;

pub mod colors {
    use eframe::egui::Color32;

    pub const ROW_ALT: Color32 = Color32::from_rgba_premultiplied(40, 40, 40, 40);
    pub const ADDRESS: Color32 = Color32::from_gray(140);
    pub const PRINTABLE: Color32 = Color32::from_gray(220);
    pub const UNPRINTABLE: Color32 = Color32::from_gray(120);
    pub const UNKNOWN: Color32 = Color32::from_gray(80);
    pub const WARNING: Color32 = Color32::from_rgb(230, 160, 40);
    pub const SHADOW: Color32 = Color32::from_black_alpha(150);
}

const fn rgb(c: Rgb) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

/// Colors resolved from the `[colors]` config section
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub string: Color32,
    pub data: Color32,
    pub instruction: Color32,
    pub patch: Color32,
    pub sync: Color32,
    pub selection: Color32,
    pub selection_alt: Color32,
}

impl From<&ColorConfig> for Palette {
    fn from(c: &ColorConfig) -> Self {
        Self {
            string: rgb(c.string),
            data: rgb(c.data),
            instruction: rgb(c.instruction),
            patch: rgb(c.patch),
            sync: rgb(c.sync),
            selection: rgb(c.selection),
            selection_alt: rgb(c.selection_alt),
        }
    }
}

impl Palette {
    pub const fn region(&self, category: RegionCategory) -> Color32 {
        match category {
            RegionCategory::String => self.string,
            RegionCategory::Data => self.data,
            RegionCategory::Instruction => self.instruction,
            RegionCategory::Patch => self.patch,
            RegionCategory::Synchronized => self.sync,
        }
    }
}

pub struct HexSession {
    /// Tab title
    pub name: String,
    /// Path of the loaded file
    pub path: PathBuf,
    /// Modification time at load
    pub last_modified: SystemTime,
    /// View-model of this tab
    pub view: HexView,
    /// Sync group shared with the other views of the same file
    pub sync: Rc<RefCell<SyncGroup>>,
    /// Handler for GUI feature to jump to selected address
    pub jump_to: JumpTo,
    /// Unique id of the scroll area state
    pub scroll_id: u64,
    /// Cursor the scroll area followed last frame
    pub followed_cursor: usize,
    /// Is the hex canvas focused
    pub has_focus: bool,
    /// Context action that waits for a popup (input or confirmation)
    pub pending_action: Option<ViewAction>,

    // -- Shared UI states
    /// Per-frame state of user inputs
    pub events: Rc<RefCell<EventState>>,
    /// Errors raised by patch edits or file loading
    pub error: Rc<RefCell<Option<String>>>,
}

impl HexSession {
    pub(crate) fn new(
        name: String,
        path: PathBuf,
        last_modified: SystemTime,
        view: HexView,
        sync: Rc<RefCell<SyncGroup>>,
        app: &HexGridApp,
    ) -> Self {
        let followed_cursor = view.grid().cursor();
        Self {
            name,
            path,
            last_modified,
            view,
            sync,
            jump_to: JumpTo::default(),
            scroll_id: app.next_scroll_id,
            followed_cursor,
            has_focus: false,
            pending_action: None,
            events: Rc::clone(&app.events),
            error: Rc::clone(&app.error),
        }
    }

    /// File name without the tab suffix
    pub(crate) fn path_name(&self) -> String {
        self.path.file_name().map_or_else(
            || "Untitled".to_string(),
            |n| n.to_string_lossy().into_owned(),
        )
    }

    /// Store a failed edit in the shared error slot
    pub(crate) fn report<E: std::fmt::Display>(&self, result: Result<(), E>) {
        if let Err(err) = result {
            tracing::warn!(target: "hexgrid.patch", %err, "edit refused");
            self.error.borrow_mut().replace(err.to_string());
        }
    }
}

pub struct HexGridApp {
    /// Vector of opened sessions. Each session is represented by a `HexSession` struct.
    pub sessions: Vec<HexSession>,
    /// Index of the currently active session. If `None`, no session is active.
    pub active_index: Option<usize>,
    /// Maximum number of tabs that can be opened.
    pub max_tabs: usize,
    /// Loaded `hexgrid.toml`
    pub config: Config,
    pub palette: Palette,
    /// Pop up handler
    pub popup: Popup,
    /// Scroll id handed to the next session
    pub next_scroll_id: u64,

    // -- Shared UI states
    /// Per-frame state of user inputs
    pub events: Rc<RefCell<EventState>>,
    /// Errors raised by patch edits or file loading
    pub error: Rc<RefCell<Option<String>>>,
}

impl HexGridApp {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: Vec::new(),
            active_index: None,
            max_tabs: 8,
            palette: Palette::from(&config.colors),
            config,
            popup: Popup::default(),
            next_scroll_id: 0,
            events: Rc::new(RefCell::new(EventState::default())),
            error: Rc::new(RefCell::new(None)),
        }
    }

    /// Get the currently active session, if any
    pub(crate) fn get_curr_session(&self) -> Option<&HexSession> {
        self.active_index.and_then(|i| self.sessions.get(i))
    }

    /// Get a mutable reference to the currently active session, if any
    pub(crate) fn get_curr_session_mut(&mut self) -> Option<&mut HexSession> {
        self.active_index.and_then(|i| self.sessions.get_mut(i))
    }

    /// Drain notifications of every view, so inactive tabs see edits made elsewhere
    pub(crate) fn pump_all(&mut self) {
        for session in &mut self.sessions {
            session.view.pump();
        }
    }
}

impl Default for HexGridApp {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_maps_categories() {
        // Arrange
        let colors = ColorConfig {
            patch: [1, 2, 3],
            ..ColorConfig::default()
        };

        // Act
        let palette = Palette::from(&colors);

        // Assert
        assert_eq!(
            palette.region(RegionCategory::Patch),
            Color32::from_rgb(1, 2, 3)
        );
        assert_eq!(
            palette.region(RegionCategory::String),
            rgb(ColorConfig::default().string)
        );
    }

    #[test]
    fn test_new_app_has_no_session() {
        // Arrange
        let app = HexGridApp::default();

        // Act
        let session = app.get_curr_session();

        // Assert
        assert!(session.is_none());
        assert!(app.error.borrow().is_none());
    }
}
