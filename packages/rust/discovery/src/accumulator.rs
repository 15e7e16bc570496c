//! Run-scoped, append-only store of discovered attachments.

use std::collections::HashSet;

use classfetch_shared::Attachment;

/// Attachments found so far in one discovery run, keyed by canonical URL.
///
/// Insertion order is discovery order. Inserting a URL that is already
/// present is a no-op: the first occurrence wins and is never updated.
#[derive(Debug, Default)]
pub struct Accumulator {
    seen: HashSet<String>,
    attachments: Vec<Attachment>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an attachment with this canonical URL was already recorded.
    pub fn contains(&self, canonical_url: &str) -> bool {
        self.seen.contains(canonical_url)
    }

    /// Record an attachment. Returns `false` (and drops it) on a duplicate URL.
    pub fn insert(&mut self, attachment: Attachment) -> bool {
        if !self.seen.insert(attachment.url.clone()) {
            return false;
        }
        self.attachments.push(attachment);
        true
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// Attachments in discovery order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Freeze the run's results.
    pub fn into_attachments(self) -> Vec<Attachment> {
        self.attachments
    }
}
