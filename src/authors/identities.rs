use log::{debug, info};
use std::collections::HashMap;
use std::time::Instant;

use super::{AuthorId, AuthorPosition, IdentityKey};
use crate::common::{format_elapsed, ResolveStats};
use crate::corpus::{AuthorMention, Corpus, ResolvedCorpus};

/// Frozen author identity table, ready to resolve ids paper by paper
#[derive(Debug, Clone)]
pub struct AuthorIdentities {
    synthetic: HashMap<IdentityKey, AuthorId>,
    max_author_id: AuthorId,
    stats: ResolveStats,
}

impl AuthorIdentities {
    pub(super) fn new(
        synthetic: HashMap<IdentityKey, AuthorId>,
        max_author_id: AuthorId,
        stats: ResolveStats,
    ) -> Self {
        Self {
            synthetic,
            max_author_id,
            stats,
        }
    }

    /// Resolve a single mention found at `position`
    pub fn resolve_mention(&self, mention: &AuthorMention, position: AuthorPosition) -> Option<AuthorId> {
        if let Some(id) = mention.primary_id() {
            return Some(id);
        }

        let key = IdentityKey {
            name: mention.name.clone(),
            position,
        };
        self.synthetic.get(&key).copied()
    }

    /// Resolve one paper's author list into a parallel list of ids.
    ///
    /// Unidentified mentions are matched on (name, row, slot), since the same
    /// name gets different synthetic ids in different papers. Mentions that were
    /// never scanned cannot be matched and are left out. An absent author list
    /// stays absent.
    pub fn resolve(&self, row: usize, authors: Option<&[AuthorMention]>) -> Option<Vec<AuthorId>> {
        let authors = authors?;

        let ids = authors
            .iter()
            .enumerate()
            .filter_map(|(slot, mention)| {
                let resolved = self.resolve_mention(mention, AuthorPosition::new(row, slot));
                if resolved.is_none() {
                    debug!("No identity for '{}' at row {} slot {}", mention.name, row, slot);
                }
                resolved
            })
            .collect();

        Some(ids)
    }

    /// Attach resolved ids to every row, producing the corpus the aggregator consumes
    pub fn resolve_corpus(&self, mut corpus: Corpus) -> ResolvedCorpus {
        info!("Resolving author ids for {} papers", corpus.len());
        let start = Instant::now();

        for (row, paper) in corpus.papers_mut().iter_mut().enumerate() {
            paper.author_ids = self.resolve(row, paper.authors.as_deref());
        }

        info!("Author ids resolved in {}", format_elapsed(start.elapsed()));
        ResolvedCorpus::from_resolved(corpus)
    }

    pub fn max_author_id(&self) -> AuthorId {
        self.max_author_id
    }

    pub fn synthetic_count(&self) -> usize {
        self.synthetic.len()
    }

    pub fn name_count(&self) -> usize {
        self.stats.distinct_names
    }

    pub fn stats(&self) -> &ResolveStats {
        &self.stats
    }
}
