//! Cross-view synchronization bus.
//!
//! Views sharing a [`SyncGroup`] publish the ranges they highlight and the cursor they are
//! on. Each view renders the ranges of every other member as synchronized regions.

use crate::events::EventHub;
use crossbeam_channel::Receiver;
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrRange {
    pub addr: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    MembersChanged,
    RegionsChanged { owner: ViewId },
    CursorMoved { owner: ViewId, addr: usize },
}

#[derive(Debug, Default)]
pub struct SyncGroup {
    next_id: u32,
    members: BTreeMap<ViewId, Vec<AddrRange>>,
    cursor: Option<(ViewId, usize)>,
    events: EventHub<SyncEvent>,
}

impl SyncGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.members.insert(id, Vec::new());
        trace!(target: "hexgrid.sync", view = id.0, members = self.members.len(), "view joined");
        self.events.emit(&SyncEvent::MembersChanged);
        id
    }

    pub fn leave(&mut self, id: ViewId) {
        let Some(regions) = self.members.remove(&id) else {
            return;
        };
        trace!(target: "hexgrid.sync", view = id.0, members = self.members.len(), "view left");
        if self.cursor.is_some_and(|(owner, _)| owner == id) {
            self.cursor = None;
        }
        self.events.emit(&SyncEvent::MembersChanged);
        if !regions.is_empty() {
            self.events.emit(&SyncEvent::RegionsChanged { owner: id });
        }
    }

    #[must_use]
    pub fn members(&self) -> usize {
        self.members.len()
    }

    pub fn publish_regions(&mut self, owner: ViewId, regions: Vec<AddrRange>) {
        let Some(slot) = self.members.get_mut(&owner) else {
            return;
        };
        if *slot == regions {
            return;
        }
        *slot = regions;
        self.events.emit(&SyncEvent::RegionsChanged { owner });
    }

    pub fn set_cursor(&mut self, owner: ViewId, addr: usize) {
        if !self.members.contains_key(&owner) || self.cursor == Some((owner, addr)) {
            return;
        }
        self.cursor = Some((owner, addr));
        trace!(target: "hexgrid.sync", view = owner.0, addr, "shared cursor moved");
        self.events.emit(&SyncEvent::CursorMoved { owner, addr });
    }

    /// Last published cursor and its owner
    #[must_use]
    pub const fn cursor(&self) -> Option<(ViewId, usize)> {
        self.cursor
    }

    /// Regions of every member other than `me`, in ascending owner order
    #[must_use]
    pub fn regions_excluding(&self, me: ViewId) -> Vec<AddrRange> {
        self.members
            .iter()
            .filter(|(id, _)| **id != me)
            .flat_map(|(_, regions)| regions.iter().copied())
            .collect()
    }

    pub fn subscribe(&mut self) -> Receiver<SyncEvent> {
        self.events.subscribe()
    }
}
