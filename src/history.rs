// Linear undo/redo log of full mask snapshots.
// Visual: undo/redo swap the whole painted mask back in one step.

use crate::types::MaskBuffer;

/// Snapshot log with a cursor. Never empty: the snapshot at the cursor is
/// always what the surface is showing.
#[derive(Clone, Debug)]
pub struct StrokeHistory {
    entries: Vec<MaskBuffer>,
    cursor: usize,
    limit: Option<usize>,
}

impl StrokeHistory {
    /// Start a log holding `initial` at cursor 0.
    pub fn new(initial: MaskBuffer) -> Self {
        Self::with_limit(initial, None)
    }

    /// Like `new`, but keep at most `limit` snapshots (oldest dropped first).
    pub fn with_limit(initial: MaskBuffer, limit: Option<usize>) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            limit: limit.map(|l| l.max(1)),
        }
    }

    /// Forget everything and start over from `initial`.
    pub fn reset(&mut self, initial: MaskBuffer) {
        self.entries.clear();
        self.entries.push(initial);
        self.cursor = 0;
    }

    /// Record a new state. Anything that could have been redone is discarded.
    pub fn push(&mut self, snapshot: MaskBuffer) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if let Some(limit) = self.limit {
            let excess = self.entries.len().saturating_sub(limit);
            if excess > 0 {
                self.entries.drain(..excess);
                self.cursor -= excess;
            }
        }
        tracing::debug!(len = self.entries.len(), cursor = self.cursor, "history push");
    }

    /// Step back one snapshot. `None` means there was nothing to undo.
    pub fn undo(&mut self) -> Option<&MaskBuffer> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        tracing::debug!(cursor = self.cursor, "history undo");
        Some(&self.entries[self.cursor])
    }

    /// Step forward one snapshot. `None` means there was nothing to redo.
    pub fn redo(&mut self) -> Option<&MaskBuffer> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, "history redo");
        Some(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> &MaskBuffer {
        &self.entries[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn memory_bytes(&self) -> usize {
        self.entries.iter().map(MaskBuffer::byte_len).sum()
    }
}
