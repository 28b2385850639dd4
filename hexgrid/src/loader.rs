use crate::app::{HexGridApp, HexSession};
use hexgridlib::{
    AnalyzedItem, CellMetrics, DataSort, HexView, ItemMap, MemoryImage, Project, SyncGroup,
};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tracing::{info, warn};

/// Shortest run of printable bytes reported as a string
pub const MIN_STRING_LEN: usize = 4;

/// Build a classification index of printable-ASCII runs of at least `min_len` bytes
pub fn scan_strings(memory: &MemoryImage, min_len: usize) -> ItemMap {
    let mut items = ItemMap::new();
    for (&base, bytes) in memory {
        let mut run_start = None;
        // Trailing `None` closes a run that reaches the end of the segment
        for (i, b) in bytes.iter().map(Some).chain(std::iter::once(None)).enumerate() {
            match (b.is_some_and(|&b| hexgridlib::is_printable(b)), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    if i - start >= min_len {
                        items.insert(AnalyzedItem::Data {
                            addr: base + start,
                            size: i - start,
                            sort: DataSort::String,
                        });
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
    }
    items
}

/// Get the last modified time of the file
pub fn get_last_modified(path: &Path) -> std::io::Result<std::time::SystemTime> {
    std::fs::metadata(path)
        .map(|meta| meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH))
}

impl HexGridApp {
    fn can_open_tab(&self) -> bool {
        if self.sessions.len() >= self.max_tabs {
            self.error
                .borrow_mut()
                .replace("Maximum number of tabs reached".into());
            return false;
        }
        true
    }

    fn push_session(&mut self, session: HexSession) {
        self.next_scroll_id += 1;
        self.sessions.push(session);
        self.active_index = Some(self.sessions.len() - 1);
    }

    /// Load a raw binary from disk at base address 0 and open it in a new tab.
    /// If the file is already open, switch to its first tab.
    pub(crate) fn load_file(&mut self, path: &Path) {
        if let Some(index) = self.sessions.iter().position(|s| s.path == path) {
            self.active_index = Some(index);
            return;
        }

        if !self.can_open_tab() {
            return;
        }

        let memory = match MemoryImage::from_file(path, 0) {
            Ok(memory) => memory,
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to load file");
                self.error.borrow_mut().replace(err.to_string());
                return;
            }
        };

        let last_modified = match get_last_modified(path) {
            Ok(time) => time,
            Err(err) => {
                self.error.borrow_mut().replace(err.to_string());
                return;
            }
        };

        let strings = scan_strings(&memory, MIN_STRING_LEN);
        info!(
            path = %path.display(),
            size = memory.len(),
            strings = strings.len(),
            "file loaded"
        );

        let project = Project::new(memory, strings);
        let sync = Rc::new(RefCell::new(SyncGroup::new()));
        let view = HexView::new(
            project,
            Rc::clone(&sync),
            self.config.view_options(CellMetrics::default()),
        );

        let name = path.file_name().map_or_else(
            || "Untitled".to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        let session = HexSession::new(name, path.to_path_buf(), last_modified, view, sync, self);
        self.push_session(session);
    }

    /// Open another view of the active session's project in the same sync group
    pub(crate) fn open_synchronized_view(&mut self) {
        let Some(curr_session) = self.get_curr_session() else {
            return;
        };
        if !self.can_open_tab() {
            return;
        }

        let view = HexView::new(
            curr_session.view.project().clone(),
            Rc::clone(&curr_session.sync),
            self.config.view_options(CellMetrics::default()),
        );
        let members = curr_session.sync.borrow().members();
        let name = format!("{} [{members}]", curr_session.path_name());
        let path = curr_session.path.clone();
        let last_modified = curr_session.last_modified;
        let sync = Rc::clone(&curr_session.sync);

        let session = HexSession::new(name, path, last_modified, view, sync, self);
        self.push_session(session);
    }

    /// Close the tab with the given index and switch to the first one
    pub(crate) fn close_file(&mut self, session_id: usize) {
        if session_id < self.sessions.len() {
            self.sessions.remove(session_id);
        }

        if self.sessions.is_empty() {
            self.active_index = None;
        } else {
            self.active_index = Some(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexgridlib::{ClassificationIndex, HexGridError};
    use std::io::Write;

    #[test]
    fn test_scan_strings_finds_runs() {
        // Arrange
        let mut bytes = vec![0u8; 4];
        bytes.extend_from_slice(b"hello");
        bytes.extend_from_slice(&[0, 1]);
        bytes.extend_from_slice(b"abc");
        bytes.push(0xFF);
        bytes.extend_from_slice(b"tail");
        let memory = MemoryImage::from_bytes(0x100, bytes);

        // Act
        let items = scan_strings(&memory, MIN_STRING_LEN);

        // Assert
        assert_eq!(items.len(), 2);
        assert_eq!(
            items.floor_item(0x106),
            Some((
                0x104,
                AnalyzedItem::Data {
                    addr: 0x104,
                    size: 5,
                    sort: DataSort::String
                }
            ))
        );
        // Run at the very end of the segment
        assert_eq!(items.floor_item(0x111).map(|(a, i)| (a, i.size())), Some((0x10F, 4)));
    }

    #[test]
    fn test_scan_strings_handles_segments_separately() {
        // Arrange
        let mut memory = MemoryImage::from_bytes(0x0, b"ab".to_vec());
        memory.add_segment(0x2, b"cd".to_vec());

        // Act
        let items = scan_strings(&memory, MIN_STRING_LEN);

        // Assert
        assert!(items.is_empty());
    }

    #[test]
    fn test_loaded_file_starts_at_zero() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x00\x01text\x02").unwrap();

        // Act
        let memory = MemoryImage::from_file(file.path(), 0).unwrap();

        // Assert
        assert_eq!(memory.min_addr(), Some(0));
        assert_eq!(memory.max_addr(), Some(6));
        assert_eq!(scan_strings(&memory, MIN_STRING_LEN).len(), 1);
    }

    #[test]
    fn test_empty_file_is_rejected() {
        // Arrange
        let file = tempfile::NamedTempFile::new().unwrap();

        // Act
        let result = MemoryImage::from_file(file.path(), 0);

        // Assert
        assert!(matches!(result, Err(HexGridError::EmptyImage)));
    }
}
