//! The `view` module provides [`HexView`], a hex grid wired to a project.
//!
//! A [`Project`] bundles the loader memory, the shared [`PatchStore`], and the
//! classification index. Several views may share one project and one [`SyncGroup`].
//! Every input method ends with [`HexView::pump`], which drains patch and sync
//! notifications and regenerates whatever region list they invalidate.

use crate::classify::{ClassificationIndex, smart_highlights};
use crate::error::HexGridError;
use crate::geometry::{CellMetrics, Point};
use crate::grid::{HexGrid, KeyInput, Modifiers};
use crate::patch::Patch;
use crate::patchstore::{PatchEvent, PatchStore};
use crate::region::{HighlightRegion, RegionAction, RegionCategory, RegionKind};
use crate::source::{ByteSource, ByteValue, MemoryImage};
use crate::sync::{AddrRange, SyncEvent, SyncGroup, ViewId};
use crossbeam_channel::Receiver;
use std::cell::{Cell, RefCell};
use std::ops::RangeInclusive;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Shared handles of the project a view displays
#[derive(Clone)]
pub struct Project {
    pub memory: Rc<MemoryImage>,
    pub patches: Rc<RefCell<PatchStore>>,
    pub classification: Rc<dyn ClassificationIndex>,
}

impl Project {
    #[must_use]
    pub fn new(memory: MemoryImage, classification: impl ClassificationIndex + 'static) -> Self {
        Self {
            memory: Rc::new(memory),
            patches: Rc::new(RefCell::new(PatchStore::new())),
            classification: Rc::new(classification),
        }
    }

    /// Inclusive address bounds of the loaded memory
    #[must_use]
    pub fn bounds(&self) -> Option<(usize, usize)> {
        Some((self.memory.min_addr()?, self.memory.max_addr()?))
    }
}

/// Byte source reading patched bytes over loader memory and writing through the patch store
pub struct ProjectMemory {
    memory: Rc<MemoryImage>,
    patches: Rc<RefCell<PatchStore>>,
}

impl ProjectMemory {
    #[must_use]
    pub fn new(project: &Project) -> Self {
        Self {
            memory: Rc::clone(&project.memory),
            patches: Rc::clone(&project.patches),
        }
    }
}

impl ByteSource for ProjectMemory {
    fn read(&self, addr: usize) -> ByteValue {
        if let Ok(store) = self.patches.try_borrow()
            && let Some(b) = store.read(addr)
        {
            return ByteValue::Known(b);
        }
        self.memory.get(addr).into()
    }

    fn write(&mut self, addr: usize, value: u8) -> bool {
        let Ok(mut store) = self.patches.try_borrow_mut() else {
            return false;
        };
        match store.write(addr, &[value]) {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "hexgrid.patch", addr, %err, "byte write refused");
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub metrics: CellMetrics,
    pub smart_highlighting: bool,
    pub blink_interval: Duration,
    /// Move the cursor when another view in the sync group moves its cursor
    pub follow_synchronized_cursor: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            metrics: CellMetrics::default(),
            smart_highlighting: true,
            blink_interval: crate::blink::DEFAULT_BLINK_INTERVAL,
            follow_synchronized_cursor: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    Copy,
    Paste,
    Split { addr: usize, at: usize },
    /// Ask the user for a comment on the patch at `addr`
    EditComment(usize),
    SetComment { addr: usize, comment: Option<String> },
    Revert(usize),
    MergeSelected,
    RevertSelected,
}

impl ViewAction {
    /// Destructive actions the adapter should confirm first
    #[must_use]
    pub const fn needs_confirmation(&self) -> bool {
        matches!(self, Self::RevertSelected)
    }

    /// Actions that need text input before they can be performed
    #[must_use]
    pub const fn needs_input(&self) -> bool {
        matches!(self, Self::EditComment(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Action {
        label: String,
        action: ViewAction,
        enabled: bool,
    },
    Submenu {
        title: String,
        entries: Vec<MenuEntry>,
    },
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextMenu {
    pub entries: Vec<MenuEntry>,
}

impl ContextMenu {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn regenerate_smart_highlights(grid: &mut HexGrid, index: &dyn ClassificationIndex, enabled: bool) {
    let regions = if enabled {
        smart_highlights(index, grid.cursor())
    } else {
        Vec::new()
    };
    grid.set_classification_regions(regions);
}

pub struct HexView {
    id: ViewId,
    project: Project,
    sync: Rc<RefCell<SyncGroup>>,
    grid: HexGrid,
    smart_highlighting: Rc<Cell<bool>>,
    follow_synchronized_cursor: bool,
    clipboard: Option<Vec<u8>>,
    patch_events: Receiver<PatchEvent>,
    sync_events: Receiver<SyncEvent>,
    /// Selection last published to the sync group
    published_selection: Option<RangeInclusive<usize>>,
}

impl HexView {
    #[must_use]
    pub fn new(project: Project, sync: Rc<RefCell<SyncGroup>>, options: ViewOptions) -> Self {
        let (id, sync_events, members) = {
            let mut group = sync.borrow_mut();
            let id = group.join();
            (id, group.subscribe(), group.members())
        };
        let patch_events = project.patches.borrow_mut().subscribe();

        let mut grid = HexGrid::new(options.metrics);
        grid.set_blink_interval(options.blink_interval);
        let (start, size) = project
            .bounds()
            .map_or((0, 0), |(min, max)| (min, max - min + 1));
        grid.set_region(Box::new(ProjectMemory::new(&project)), start, size);
        grid.set_always_show_cursor(members > 1);

        let smart_highlighting = Rc::new(Cell::new(options.smart_highlighting));
        {
            let index = Rc::clone(&project.classification);
            let enabled = Rc::clone(&smart_highlighting);
            let sync = Rc::clone(&sync);
            grid.add_cursor_listener(Box::new(move |grid: &mut HexGrid| {
                regenerate_smart_highlights(grid, index.as_ref(), enabled.get());
                if let Ok(mut group) = sync.try_borrow_mut() {
                    group.set_cursor(id, grid.cursor());
                }
            }));
        }

        let mut view = Self {
            id,
            project,
            sync,
            grid,
            smart_highlighting,
            follow_synchronized_cursor: options.follow_synchronized_cursor,
            clipboard: None,
            patch_events,
            sync_events,
            published_selection: None,
        };
        view.refresh_smart_highlights();
        view.refresh_patch_regions();
        view.refresh_sync_regions();
        debug!(target: "hexgrid.sync", view = id.0, start, size, "view created");
        view
    }

    #[must_use]
    pub const fn id(&self) -> ViewId {
        self.id
    }

    #[must_use]
    pub const fn project(&self) -> &Project {
        &self.project
    }

    #[must_use]
    pub const fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub const fn grid_mut(&mut self) -> &mut HexGrid {
        &mut self.grid
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&[u8]> {
        self.clipboard.as_deref()
    }

    #[must_use]
    pub fn smart_highlighting(&self) -> bool {
        self.smart_highlighting.get()
    }

    fn refresh_smart_highlights(&mut self) {
        regenerate_smart_highlights(
            &mut self.grid,
            self.project.classification.as_ref(),
            self.smart_highlighting.get(),
        );
    }

    fn refresh_patch_regions(&mut self) {
        let regions = self
            .project
            .patches
            .borrow()
            .iter()
            .filter_map(|p| HighlightRegion::patch(p.addr, p.len()))
            .collect();
        self.grid.set_patch_regions(regions);
    }

    fn refresh_sync_regions(&mut self) {
        let regions = self
            .sync
            .borrow()
            .regions_excluding(self.id)
            .into_iter()
            .filter_map(|r| HighlightRegion::new(RegionCategory::Synchronized, r.addr, r.size))
            .collect();
        self.grid.set_sync_regions(regions);
    }

    fn publish_selection(&mut self) {
        let selection = self.grid.selection();
        if selection == self.published_selection {
            return;
        }
        let regions = selection
            .iter()
            .map(|r| AddrRange {
                addr: *r.start(),
                size: r.end() - r.start() + 1,
            })
            .collect();
        if let Ok(mut group) = self.sync.try_borrow_mut() {
            group.publish_regions(self.id, regions);
            self.published_selection = selection;
        }
    }

    /// Drain pending patch and sync notifications. Returns true if anything changed.
    pub fn pump(&mut self) -> bool {
        let patches_changed = self.patch_events.try_iter().count() > 0;
        if patches_changed {
            self.refresh_patch_regions();
        }

        let mut members_changed = false;
        let mut regions_changed = false;
        let mut follow = None;
        for event in self.sync_events.try_iter().collect::<Vec<_>>() {
            match event {
                SyncEvent::MembersChanged => members_changed = true,
                SyncEvent::RegionsChanged { owner } if owner != self.id => regions_changed = true,
                SyncEvent::CursorMoved { owner, addr } if owner != self.id => follow = Some(addr),
                _ => {}
            }
        }
        if members_changed {
            let members = self.sync.borrow().members();
            self.grid.set_always_show_cursor(members > 1);
        }
        if regions_changed {
            self.refresh_sync_regions();
        }
        if self.follow_synchronized_cursor
            && let Some(addr) = follow
            && addr != self.grid.cursor()
        {
            self.grid.clear_selection();
            self.grid.set_cursor(addr, None, None);
        }

        self.publish_selection();
        patches_changed || members_changed || regions_changed || follow.is_some()
    }

    pub fn key(&mut self, input: KeyInput, modifiers: Modifiers) -> bool {
        let consumed = self.grid.key(input, modifiers);
        self.pump();
        consumed
    }

    pub fn press(&mut self, p: Point, extend: bool) -> bool {
        let hit = self.grid.press(p, extend);
        self.pump();
        hit
    }

    pub fn drag(&mut self, p: Point) -> bool {
        let hit = self.grid.drag(p);
        self.pump();
        hit
    }

    pub fn release(&mut self) {
        self.grid.release();
    }

    pub fn double_click(&mut self) -> bool {
        let selected = self.grid.double_click();
        self.pump();
        selected
    }

    pub fn focus_in(&mut self, now: Instant) {
        self.grid.focus_in(now);
    }

    pub fn focus_out(&mut self) {
        self.grid.focus_out();
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.grid.tick(now)
    }

    pub fn set_smart_highlighting(&mut self, enabled: bool) {
        self.smart_highlighting.set(enabled);
        self.refresh_smart_highlights();
    }

    /// Clear the selection and move the cursor to `addr`. Returns false if `addr` is not
    /// displayed by this view.
    pub fn jump_to(&mut self, addr: usize) -> bool {
        self.grid.clear_selection();
        let moved = self.grid.set_cursor(addr, None, None);
        self.pump();
        moved
    }

    #[must_use]
    pub fn status_text(&self) -> String {
        match self.grid.selection() {
            Some(range) => {
                let n = range.end() - range.start() + 1;
                format!(
                    "Address: [{:08x}, {:08x}], {n} byte{} selected",
                    range.start(),
                    range.end(),
                    plural(n)
                )
            }
            None => format!("Address: {:08x}", self.grid.cursor()),
        }
    }

    /// Copy the selection to the view-local clipboard, one address at a time. Unavailable
    /// bytes copy as 0. Returns the number of bytes copied.
    pub fn copy_selection(&mut self) -> usize {
        let Some(range) = self.grid.selection() else {
            self.clipboard = None;
            return 0;
        };
        let bytes: Vec<u8> = range
            .map(|addr| self.grid.value_at(addr).known().unwrap_or(0))
            .collect();
        let n = bytes.len();
        self.clipboard = Some(bytes);
        n
    }

    /// Write the clipboard at the cursor in a single patch write.
    ///
    /// # Errors
    /// Returns an error if the patch store refuses the write.
    pub fn paste_at_cursor(&mut self) -> Result<(), HexGridError> {
        let Some(bytes) = self.clipboard.as_deref() else {
            return Ok(());
        };
        let result = self
            .project
            .patches
            .borrow_mut()
            .write(self.grid.cursor(), bytes);
        self.pump();
        Ok(result?)
    }

    /// Start addresses of the patches behind active regions, ascending
    fn selected_patch_addrs(&self) -> Vec<usize> {
        let mut addrs: Vec<usize> = self
            .grid
            .overlay()
            .active_regions()
            .filter_map(|r| match r.kind() {
                RegionKind::Patch { patch_addr } => Some(patch_addr),
                RegionKind::Plain => None,
            })
            .collect();
        addrs.sort_unstable();
        addrs.dedup();
        addrs
    }

    /// Runs of directly adjacent selected patches
    fn mergeable_runs(&self) -> Vec<Vec<usize>> {
        let store = self.project.patches.borrow();
        let mut runs: Vec<Vec<usize>> = Vec::new();
        for addr in self.selected_patch_addrs() {
            match runs.last_mut() {
                Some(run) if run.last().is_some_and(|&prev| store.can_merge(prev, addr)) => {
                    run.push(addr);
                }
                _ => runs.push(vec![addr]),
            }
        }
        runs.retain(|run| run.len() > 1);
        runs
    }

    #[must_use]
    pub fn can_merge_selected_patches(&self) -> bool {
        !self.mergeable_runs().is_empty()
    }

    /// Merge every run of directly adjacent selected patches. Returns whether anything
    /// was merged.
    ///
    /// # Errors
    /// Returns an error if the patch store refuses a merge.
    pub fn merge_selected_patches(&mut self) -> Result<bool, HexGridError> {
        let runs = self.mergeable_runs();
        let result = runs
            .iter()
            .try_for_each(|run| self.project.patches.borrow_mut().merge_run(run));
        self.pump();
        result?;
        Ok(!runs.is_empty())
    }

    /// Revert every selected patch. Returns the number of patches reverted.
    ///
    /// # Errors
    /// Returns an error if the patch store refuses the revert.
    pub fn revert_selected_patches(&mut self) -> Result<usize, HexGridError> {
        let addrs = self.selected_patch_addrs();
        let result = self.project.patches.borrow_mut().revert_all(&addrs);
        self.pump();
        result?;
        Ok(addrs.len())
    }

    /// Patches containing the cursor, nearest start first
    #[must_use]
    pub fn patches_under_cursor(&self) -> Vec<Patch> {
        let store = self.project.patches.borrow();
        self.grid
            .highlight_regions_under_cursor()
            .into_iter()
            .filter_map(|r| match r.kind() {
                RegionKind::Patch { patch_addr } => store.get(patch_addr).cloned(),
                RegionKind::Plain => None,
            })
            .collect()
    }

    #[must_use]
    pub fn patch_comment(&self, addr: usize) -> Option<String> {
        self.project.patches.borrow().get(addr)?.comment.clone()
    }

    /// Build the context menu for the current cursor and selection
    #[must_use]
    pub fn context_menu(&self) -> ContextMenu {
        let cursor = self.grid.cursor();
        let mut sections: Vec<Vec<MenuEntry>> = Vec::new();

        let mut clipboard = Vec::new();
        let selected = self.grid.cursor_state().selected_len();
        if selected > 0 {
            clipboard.push(MenuEntry::Action {
                label: format!("Copy {selected} byte{}", plural(selected)),
                action: ViewAction::Copy,
                enabled: true,
            });
        }
        if let Some(bytes) = &self.clipboard {
            clipboard.push(MenuEntry::Action {
                label: format!("Paste {} byte{}", bytes.len(), plural(bytes.len())),
                action: ViewAction::Paste,
                enabled: true,
            });
        }
        sections.push(clipboard);

        sections.push(
            self.grid
                .highlight_regions_under_cursor()
                .into_iter()
                .filter_map(|r| r.context_menu(cursor))
                .map(|menu| MenuEntry::Submenu {
                    title: menu.title,
                    entries: menu
                        .items
                        .into_iter()
                        .map(|item| MenuEntry::Action {
                            label: item.label.to_owned(),
                            action: match item.action {
                                RegionAction::Split => ViewAction::Split {
                                    addr: menu.patch_addr,
                                    at: cursor,
                                },
                                RegionAction::SetComment => ViewAction::EditComment(menu.patch_addr),
                                RegionAction::Revert => ViewAction::Revert(menu.patch_addr),
                            },
                            enabled: item.enabled,
                        })
                        .collect(),
                })
                .collect(),
        );

        let mut group = Vec::new();
        if !self.selected_patch_addrs().is_empty() {
            group.push(MenuEntry::Action {
                label: "Merge selected patches".to_owned(),
                action: ViewAction::MergeSelected,
                enabled: self.can_merge_selected_patches(),
            });
            group.push(MenuEntry::Action {
                label: "Revert selected patches".to_owned(),
                action: ViewAction::RevertSelected,
                enabled: true,
            });
        }
        sections.push(group);

        let mut entries = Vec::new();
        for section in sections.into_iter().filter(|s| !s.is_empty()) {
            if !entries.is_empty() {
                entries.push(MenuEntry::Separator);
            }
            entries.extend(section);
        }
        ContextMenu { entries }
    }

    /// Perform a context action. [`ViewAction::EditComment`] only asks for input and does
    /// nothing here.
    ///
    /// # Errors
    /// Returns an error if the patch store refuses the mutation.
    pub fn activate(&mut self, action: ViewAction) -> Result<(), HexGridError> {
        debug!(target: "hexgrid.patch", view = self.id.0, ?action, "activate");
        let result = match action {
            ViewAction::Copy => {
                self.copy_selection();
                Ok(())
            }
            ViewAction::Paste => return self.paste_at_cursor(),
            ViewAction::Split { addr, at } => self.project.patches.borrow_mut().split(addr, at),
            ViewAction::EditComment(_) => Ok(()),
            ViewAction::SetComment { addr, comment } => {
                self.project.patches.borrow_mut().set_comment(addr, comment)
            }
            ViewAction::Revert(addr) => self.project.patches.borrow_mut().revert(addr).map(|_| ()),
            ViewAction::MergeSelected => return self.merge_selected_patches().map(|_| ()),
            ViewAction::RevertSelected => return self.revert_selected_patches().map(|_| ()),
        };
        self.pump();
        Ok(result?)
    }
}

impl Drop for HexView {
    fn drop(&mut self) {
        if let Ok(mut group) = self.sync.try_borrow_mut() {
            group.leave(self.id);
        }
    }
}
