//! Buffer of frame insertions not yet paired with a removal

use std::collections::HashMap;

use super::events::FrameInsertion;
use crate::inspector::NodeId;

/// Identity of one buffered insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub insertion: FrameInsertion,
}

/// Insertions keyed by parent node, in arrival order
///
/// Duplicates are kept; each entry is removed individually by its [`EntryId`],
/// or all at once with [`PendingFrameLedger::discard_node`] when the inserted
/// node itself becomes current or is removed.
#[derive(Debug, Default)]
pub struct PendingFrameLedger {
    by_parent: HashMap<NodeId, Vec<LedgerEntry>>,
    next_id: u64,
}

impl PendingFrameLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, insertion: FrameInsertion) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.by_parent
            .entry(insertion.parent)
            .or_default()
            .push(LedgerEntry { id, insertion });
        id
    }

    /// Buffered insertions under `parent`, oldest first
    pub fn by_parent(&self, parent: NodeId) -> &[LedgerEntry] {
        self.by_parent.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn remove(&mut self, id: EntryId) -> Option<FrameInsertion> {
        let (parent, position) = self.by_parent.iter().find_map(|(parent, entries)| {
            entries
                .iter()
                .position(|e| e.id == id)
                .map(|position| (*parent, position))
        })?;

        let entries = self.by_parent.get_mut(&parent)?;
        let removed = entries.remove(position);
        if entries.is_empty() {
            self.by_parent.remove(&parent);
        }
        Some(removed.insertion)
    }

    /// Drop every entry that inserted `node`, returning how many were dropped
    pub fn discard_node(&mut self, node: NodeId) -> usize {
        let before = self.len();
        self.by_parent.retain(|_, entries| {
            entries.retain(|e| e.insertion.node != node);
            !entries.is_empty()
        });
        before - self.len()
    }

    pub fn len(&self) -> usize {
        self.by_parent.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_parent.is_empty()
    }
}
