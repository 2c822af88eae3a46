//! Snapshot-based undo history.
//!
//! [`HistoryStack`] is a linear log of full buffer snapshots with a cursor
//! pointing at the entry currently shown. Pushing after an undo drops the
//! redo branch. The log is bounded by an entry count and, optionally, a byte
//! budget; the oldest entries go first and the newest entry is never
//! evicted.
//!
//! ```text
//!   entries:  [loaded] [sepia] [crop] [rotate]
//!                                ^
//!                              cursor      (redo available: rotate)
//! ```
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_session::HistoryStack;
//!
//! let mut history = HistoryStack::default();
//! history.push(PixelBuffer::filled(2, 2, [0; 4]).unwrap(), "Image Loaded");
//! history.push(PixelBuffer::filled(2, 2, [9; 4]).unwrap(), "Applied sepia filter");
//!
//! let prev = history.undo().unwrap();
//! assert_eq!(prev.get(0, 0).unwrap(), [0; 4]);
//! assert!(history.can_redo());
//! assert!(history.undo().is_err());
//! ```

use std::collections::VecDeque;
use std::time::SystemTime;

use retouch_core::PixelBuffer;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace, warn};

use crate::{SessionError, SessionResult};

/// Default number of retained entries.
pub const DEFAULT_CAPACITY: usize = 50;

/// Size limits for a [`HistoryStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryLimits {
    /// Maximum number of entries, at least 1.
    pub capacity: usize,
    /// Optional cap on the summed snapshot bytes.
    pub max_bytes: Option<usize>,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_bytes: None,
        }
    }
}

impl HistoryLimits {
    /// Limits with only an entry count.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            max_bytes: None,
        }
    }
}

/// One committed state.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    description: String,
    buffer: PixelBuffer,
    sequence: u64,
    created: SystemTime,
}

impl HistoryEntry {
    /// What produced this state, e.g. `"Applied sepia filter"`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The snapshot.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Commit number, increasing across the stack's lifetime.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Wall-clock time of the commit.
    pub fn created(&self) -> SystemTime {
        self.created
    }
}

/// A row of the history panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    /// Position in the stack; pass to [`HistoryStack::jump_to`].
    pub index: usize,
    /// Entry description.
    pub description: String,
    /// `true` for the entry under the cursor.
    pub active: bool,
}

/// Bounded linear undo/redo log.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    cursor: Option<usize>,
    limits: HistoryLimits,
    next_sequence: u64,
    total_bytes: usize,
}

impl HistoryStack {
    /// Empty stack with the given limits.
    pub fn new(limits: HistoryLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    /// Empty stack holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(HistoryLimits::with_capacity(capacity))
    }

    /// Records a new state and makes it current.
    ///
    /// Entries after the cursor (the redo branch) are discarded first.
    pub fn push(&mut self, buffer: PixelBuffer, description: impl Into<String>) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        for dropped in self.entries.drain(keep..) {
            self.total_bytes -= dropped.buffer.size_bytes();
        }

        let entry = HistoryEntry {
            description: description.into(),
            buffer,
            sequence: self.next_sequence,
            created: SystemTime::now(),
        };
        debug!(sequence = entry.sequence, description = %entry.description, "history push");
        self.next_sequence += 1;
        self.total_bytes += entry.buffer.size_bytes();
        self.entries.push_back(entry);
        self.cursor = Some(self.entries.len() - 1);

        self.enforce_limits();
    }

    fn pop_oldest(&mut self) -> Option<HistoryEntry> {
        let entry = self.entries.pop_front()?;
        self.total_bytes -= entry.buffer.size_bytes();
        self.cursor = self.cursor.map(|c| c.saturating_sub(1));
        Some(entry)
    }

    fn enforce_limits(&mut self) {
        let capacity = self.limits.capacity.max(1);
        while self.entries.len() > capacity {
            if self.cursor.is_some_and(|c| c > 0) {
                self.pop_oldest();
            } else if let Some(dropped) = self.entries.pop_back() {
                // Cursor is at the front; shed redo entries instead
                self.total_bytes -= dropped.buffer.size_bytes();
            }
        }

        if let Some(max_bytes) = self.limits.max_bytes {
            while self.total_bytes > max_bytes && self.cursor.is_some_and(|c| c > 0) {
                if let Some(evicted) = self.pop_oldest() {
                    warn!(
                        sequence = evicted.sequence,
                        description = %evicted.description,
                        total_bytes = self.total_bytes,
                        max_bytes,
                        "history over byte budget, evicted oldest entry"
                    );
                }
            }
        }
    }

    /// Steps back and returns the now-current snapshot.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoHistory`] when empty or already at the oldest entry.
    pub fn undo(&mut self) -> SessionResult<PixelBuffer> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                trace!(cursor = c - 1, "undo");
                Ok(self.entries[c - 1].buffer.clone())
            }
            _ => Err(SessionError::NoHistory("nothing to undo")),
        }
    }

    /// Steps forward and returns the now-current snapshot.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoHistory`] when empty or already at the newest entry.
    pub fn redo(&mut self) -> SessionResult<PixelBuffer> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                trace!(cursor = c + 1, "redo");
                Ok(self.entries[c + 1].buffer.clone())
            }
            _ => Err(SessionError::NoHistory("nothing to redo")),
        }
    }

    /// Moves the cursor to `index`, as when a history panel row is clicked.
    ///
    /// Nothing is discarded; entries after `index` stay available for redo.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoHistory`] if `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> SessionResult<PixelBuffer> {
        let entry = self
            .entries
            .get(index)
            .ok_or(SessionError::NoHistory("no entry at that index"))?;
        trace!(index, "jump");
        let buffer = entry.buffer.clone();
        self.cursor = Some(index);
        Ok(buffer)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "history cleared");
        self.entries.clear();
        self.cursor = None;
        self.total_bytes = 0;
    }

    /// Clone of the snapshot under the cursor.
    pub fn current(&self) -> Option<PixelBuffer> {
        self.current_entry().map(|e| e.buffer.clone())
    }

    /// Entry under the cursor.
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// `true` if [`undo`](Self::undo) would succeed.
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// `true` if [`redo`](Self::redo) would succeed.
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    /// Descriptions oldest first.
    pub fn descriptions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.description.as_str()).collect()
    }

    /// Rows for a history panel, oldest first.
    pub fn panel(&self) -> Vec<HistoryItem> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, e)| HistoryItem {
                index,
                description: e.description.clone(),
                active: self.cursor == Some(index),
            })
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry, `None` when empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Summed bytes of all retained snapshots.
    pub fn memory_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Active limits.
    pub fn limits(&self) -> HistoryLimits {
        self.limits
    }

    /// Replaces the limits and evicts down to them.
    pub fn set_limits(&mut self, limits: HistoryLimits) {
        self.limits = limits;
        self.enforce_limits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(v: u8) -> PixelBuffer {
        PixelBuffer::filled(2, 2, [v, v, v, 255]).unwrap()
    }

    fn value(b: &PixelBuffer) -> u8 {
        b.get(0, 0).unwrap()[0]
    }

    #[test]
    fn test_empty() {
        let mut h = HistoryStack::default();
        assert!(h.is_empty());
        assert_eq!(h.cursor(), None);
        assert!(h.current().is_none());
        assert!(matches!(h.undo(), Err(SessionError::NoHistory(_))));
        assert!(matches!(h.redo(), Err(SessionError::NoHistory(_))));
        assert!(!h.can_undo() && !h.can_redo());
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut h = HistoryStack::default();
        for v in 0..3 {
            h.push(buf(v), format!("step {v}"));
        }
        assert_eq!(value(&h.undo().unwrap()), 1);
        assert_eq!(value(&h.undo().unwrap()), 0);
        assert!(h.undo().is_err());
        assert_eq!(h.cursor(), Some(0));
        assert_eq!(value(&h.redo().unwrap()), 1);
        assert_eq!(value(&h.redo().unwrap()), 2);
        assert!(h.redo().is_err());
        assert_eq!(value(&h.current().unwrap()), 2);
    }

    #[test]
    fn test_push_after_undo_prunes_redo_branch() {
        let mut h = HistoryStack::default();
        h.push(buf(0), "a");
        h.push(buf(1), "b");
        h.push(buf(2), "c");
        h.undo().unwrap();
        h.undo().unwrap();
        h.push(buf(9), "d");
        assert_eq!(h.descriptions(), vec!["a", "d"]);
        assert!(!h.can_redo());
        assert_eq!(h.memory_bytes(), 2 * buf(0).size_bytes());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = HistoryStack::default();
        for i in 0..51u64 {
            h.push(buf(i as u8), format!("{i}"));
        }
        assert_eq!(h.len(), DEFAULT_CAPACITY);
        assert_eq!(h.cursor(), Some(49));
        assert_eq!(h.entries().next().unwrap().sequence(), 1);
        assert_eq!(value(&h.current().unwrap()), 50);
    }

    #[test]
    fn test_byte_budget_keeps_newest() {
        let one = buf(0).size_bytes();
        let mut h = HistoryStack::new(HistoryLimits {
            capacity: 10,
            max_bytes: Some(one * 2),
        });
        for v in 0..5 {
            h.push(buf(v), "x");
        }
        assert_eq!(h.len(), 2);
        assert_eq!(h.memory_bytes(), one * 2);

        // A single snapshot over budget still stays
        h.set_limits(HistoryLimits {
            capacity: 10,
            max_bytes: Some(1),
        });
        assert_eq!(h.len(), 1);
        assert_eq!(value(&h.current().unwrap()), 4);
    }

    #[test]
    fn test_jump_and_panel() {
        let mut h = HistoryStack::default();
        for v in 0..4 {
            h.push(buf(v), format!("s{v}"));
        }
        assert_eq!(value(&h.jump_to(1).unwrap()), 1);
        let panel = h.panel();
        assert_eq!(panel.len(), 4);
        assert!(panel[1].active);
        assert_eq!(panel.iter().filter(|i| i.active).count(), 1);
        assert!(h.can_redo());
        assert!(h.jump_to(4).is_err());
        assert_eq!(h.cursor(), Some(1));
    }

    #[test]
    fn test_clear() {
        let mut h = HistoryStack::default();
        h.push(buf(1), "a");
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.cursor(), None);
        assert_eq!(h.memory_bytes(), 0);
        // Sequence keeps counting after a clear
        h.push(buf(2), "b");
        assert_eq!(h.current_entry().unwrap().sequence(), 1);
    }

    #[test]
    fn test_shrink_capacity_with_cursor_at_front() {
        let mut h = HistoryStack::default();
        for v in 0..4 {
            h.push(buf(v), "x");
        }
        h.jump_to(0).unwrap();
        h.set_limits(HistoryLimits::with_capacity(2));
        assert_eq!(h.len(), 2);
        assert_eq!(h.cursor(), Some(0));
        assert_eq!(value(&h.current().unwrap()), 0);
    }
}
