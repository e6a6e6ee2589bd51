//! Relation linking with per-run deduplication.

use std::collections::HashSet;

use crate::types::{RelationKind, RelationRow};

/// Collects junction rows, dropping pairs already linked in this run.
///
/// The emitted SQL also ignores conflicts, so pairs already present in the
/// target are harmless; this only keeps the script free of repeats.
#[derive(Debug, Default)]
pub struct RelationLinker {
    seen: HashSet<(RelationKind, String, String)>,
    relations: Vec<RelationRow>,
    duplicates: usize,
}

impl RelationLinker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Links `parent_key` to `slug`. Returns `false` when the pair was
    /// already linked.
    pub fn link(&mut self, kind: RelationKind, parent_key: &str, slug: &str) -> bool {
        if !self
            .seen
            .insert((kind, parent_key.to_string(), slug.to_string()))
        {
            tracing::debug!(
                %kind,
                parent = %parent_key,
                slug = %slug,
                "duplicate relation skipped"
            );
            self.duplicates += 1;
            return false;
        }

        self.relations.push(RelationRow {
            kind,
            parent_key: parent_key.to_string(),
            slug: slug.to_string(),
        });
        true
    }

    /// Relations in link order.
    #[must_use]
    pub fn relations(&self) -> &[RelationRow] {
        &self.relations
    }

    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    #[must_use]
    pub fn into_relations(self) -> Vec<RelationRow> {
        self.relations
    }
}
