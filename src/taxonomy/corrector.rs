//! Deterministic remapping of duplicated reference ids.
//!
//! Self ids and parent references are corrected in separate namespaces. The
//! first owner to declare a raw id keeps it; every later owner receives
//! `<raw>#dup<n>`, with `n` counting up until the value is unused. Only
//! collisions are renamed, so a parent reference always resolves to the first
//! holder of the raw id, wherever the referencing node was loaded from.
//! Every decision is memoized per owner, so repeated lookups are stable.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{DocumentId, NodeId};

/// Identity of the node asking for a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Owner {
    pub node: NodeId,
    pub document: DocumentId,
}

#[derive(Debug, Default)]
pub struct DuplicateIdCorrector {
    seen_ids: HashSet<String>,
    id_corrections: HashMap<(NodeId, String), String>,
    parent_corrections: HashMap<(NodeId, String), String>,
    renamed: HashMap<String, usize>,
}

impl DuplicateIdCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id `owner` must use for its own raw id.
    pub fn correct_id(&mut self, owner: Owner, raw: &str) -> String {
        let key = (owner.node, raw.to_string());
        if let Some(corrected) = self.id_corrections.get(&key) {
            return corrected.clone();
        }

        let corrected = if self.seen_ids.insert(raw.to_string()) {
            raw.to_string()
        } else {
            let renamed = self.next_free_id(raw);
            debug!(
                raw = %raw,
                corrected = %renamed,
                node = owner.node.0,
                "renamed duplicate reference id"
            );
            *self.renamed.entry(raw.to_string()).or_default() += 1;
            renamed
        };

        self.id_corrections.insert(key, corrected.clone());
        corrected
    }

    /// Returns the id `owner`'s parent reference must resolve through: the
    /// raw value, which names the first holder.
    pub fn correct_parent(&mut self, owner: Owner, raw: &str) -> String {
        self.parent_corrections
            .entry((owner.node, raw.to_string()))
            .or_insert_with(|| raw.to_string())
            .clone()
    }

    /// Raw ids that needed at least one rename.
    pub fn collision_count(&self) -> usize {
        self.renamed.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn next_free_id(&mut self, raw: &str) -> String {
        let mut suffix = self.renamed.get(raw).copied().unwrap_or(0) + 1;
        loop {
            let candidate = format!("{raw}#dup{suffix}");
            if self.seen_ids.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(node: usize, document: usize) -> Owner {
        Owner {
            node: NodeId(node),
            document: DocumentId(document),
        }
    }

    #[test]
    fn first_occurrence_keeps_its_raw_id() {
        let mut corrector = DuplicateIdCorrector::new();
        assert_eq!(corrector.correct_id(owner(0, 0), "A"), "A");
        assert_eq!(corrector.correct_id(owner(1, 0), "B"), "B");
        assert_eq!(corrector.collision_count(), 0);
    }

    #[test]
    fn collisions_get_distinct_stable_ids() {
        let mut corrector = DuplicateIdCorrector::new();
        let first = corrector.correct_id(owner(0, 0), "A");
        let second = corrector.correct_id(owner(1, 1), "A");
        let third = corrector.correct_id(owner(2, 2), "A");

        assert_eq!(first, "A");
        assert_eq!(second, "A#dup1");
        assert_eq!(third, "A#dup2");
        assert_eq!(corrector.correct_id(owner(1, 1), "A"), second);
        assert_eq!(corrector.correct_id(owner(0, 0), "A"), first);
        assert_eq!(corrector.collision_count(), 1);
    }

    #[test]
    fn renamed_id_skips_values_already_in_use() {
        let mut corrector = DuplicateIdCorrector::new();
        corrector.correct_id(owner(0, 0), "A#dup1");
        corrector.correct_id(owner(1, 0), "A");
        assert_eq!(corrector.correct_id(owner(2, 1), "A"), "A#dup2");
    }

    #[test]
    fn parent_references_are_shared_by_siblings() {
        let mut corrector = DuplicateIdCorrector::new();
        corrector.correct_id(owner(0, 0), "P");
        assert_eq!(corrector.correct_parent(owner(1, 0), "P"), "P");
        assert_eq!(corrector.correct_parent(owner(2, 1), "P"), "P");
        assert_eq!(corrector.correct_parent(owner(3, 2), "missing"), "missing");
    }

    #[test]
    fn parent_reference_ignores_duplicates_in_its_own_document() {
        let mut corrector = DuplicateIdCorrector::new();
        corrector.correct_id(owner(0, 0), "P");
        let duplicate = corrector.correct_id(owner(1, 1), "P");
        assert_ne!(duplicate, "P");

        assert_eq!(corrector.correct_parent(owner(2, 1), "P"), "P");
        assert_eq!(corrector.correct_parent(owner(3, 0), "P"), "P");
        assert_eq!(corrector.correct_parent(owner(4, 2), "P"), "P");
    }

    #[test]
    fn parent_correction_is_memoized_per_owner() {
        let mut corrector = DuplicateIdCorrector::new();
        assert_eq!(corrector.correct_parent(owner(5, 1), "P"), "P");
        corrector.correct_id(owner(0, 0), "P");
        corrector.correct_id(owner(1, 1), "P");
        assert_eq!(corrector.correct_parent(owner(5, 1), "P"), "P");
    }

    #[test]
    fn reset_forgets_every_decision() {
        let mut corrector = DuplicateIdCorrector::new();
        corrector.correct_id(owner(0, 0), "A");
        corrector.correct_id(owner(1, 0), "A");
        corrector.reset();
        assert_eq!(corrector.correct_id(owner(1, 0), "A"), "A");
        assert_eq!(corrector.collision_count(), 0);
    }
}
