//! Case-insensitive lookup from reference keys to documents.

use std::collections::HashMap;

use crate::title::canonical_title;
use crate::tree::{Document, DocumentId};

/// A key that two documents would both claim.
///
/// The earlier document keeps the key; the later one is unreachable by it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ambiguity {
    pub key: String,
    pub kept: DocumentId,
    pub shadowed: DocumentId,
}

/// Lookup table built once from the ordered document list.
///
/// Every document registers its raw stem, its ordinal-stripped stem and its
/// title, all lowercased. Registration follows document order and never
/// overwrites an existing key.
#[derive(Clone, Debug, Default)]
pub struct LinkIndex {
    keys: HashMap<String, DocumentId>,
    ambiguities: Vec<Ambiguity>,
}

impl LinkIndex {
    #[must_use]
    pub fn build(documents: &[Document]) -> Self {
        let mut index = Self {
            keys: HashMap::with_capacity(documents.len() * 2),
            ambiguities: Vec::new(),
        };

        for doc in documents {
            let mut candidates = vec![
                doc.stem.to_lowercase(),
                canonical_title(&doc.stem).to_lowercase(),
                doc.title.to_lowercase(),
            ];
            candidates.dedup();

            for key in candidates {
                if key.is_empty() {
                    continue;
                }
                index.register(key, doc.id);
            }
        }

        for ambiguity in &index.ambiguities {
            tracing::debug!(
                key = %ambiguity.key,
                kept = ambiguity.kept.index(),
                shadowed = ambiguity.shadowed.index(),
                "Ambiguous reference key"
            );
        }
        index
    }

    fn register(&mut self, key: String, id: DocumentId) {
        match self.keys.get(&key) {
            Some(&kept) if kept != id => self.ambiguities.push(Ambiguity {
                key,
                kept,
                shadowed: id,
            }),
            Some(_) => {}
            None => {
                self.keys.insert(key, id);
            }
        }
    }

    /// Resolve a reference target such as `intro` or `01 - Intro`.
    ///
    /// Tries the trimmed, lowercased target first and then its
    /// ordinal-stripped form.
    #[must_use]
    pub fn resolve(&self, target: &str) -> Option<DocumentId> {
        let target = target.trim();
        if let Some(&id) = self.keys.get(&target.to_lowercase()) {
            return Some(id);
        }
        self.keys
            .get(&canonical_title(target).to_lowercase())
            .copied()
    }

    /// Keys claimed by more than one document, in registration order.
    #[must_use]
    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
