use log::{debug, info, warn};
use std::collections::HashMap;
use std::time::Instant;

use super::{AuthorId, AuthorIdentities, AuthorPosition, IdentityKey};
use crate::common::{format_elapsed, ResolveStats};
use crate::corpus::Corpus;

const PROGRESS_EVERY: usize = 1_000_000;

/// First resolver stage: the name to (id, position) mapping gathered from one
/// sweep over the corpus, plus the worklist of mentions that arrived without an id.
///
/// Homonyms are not split: every mention of a name lands in the same list.
#[derive(Debug, Clone, Default)]
pub struct AuthorScan {
    identities: HashMap<String, Vec<(AuthorId, AuthorPosition)>>,
    without_id: Vec<(String, AuthorPosition)>,
    synthetic: HashMap<IdentityKey, AuthorId>,
    max_author_id: AuthorId,
    stats: ResolveStats,
}

impl AuthorScan {
    /// Visit every paper once, in corpus order. Rows without an author list are skipped.
    pub fn scan(corpus: &Corpus) -> Self {
        info!("Scanning author mentions in {} papers", corpus.len());
        let start = Instant::now();

        let mut scan = Self::default();

        for (row, paper) in corpus.iter().enumerate() {
            if row > 0 && row % PROGRESS_EVERY == 0 {
                info!("  Scanned {} papers, {} names so far...", row, scan.identities.len());
            }

            let authors = match &paper.authors {
                Some(authors) => authors,
                None => continue,
            };
            scan.stats.papers_with_authors += 1;

            for (slot, mention) in authors.iter().enumerate() {
                let position = AuthorPosition::new(row, slot);
                match mention.primary_id() {
                    Some(id) => {
                        scan.identities
                            .entry(mention.name.clone())
                            .or_default()
                            .push((id, position));
                        scan.max_author_id = scan.max_author_id.max(id);
                        scan.stats.mentions_with_id += 1;
                    }
                    None => {
                        scan.without_id.push((mention.name.clone(), position));
                        scan.stats.mentions_without_id += 1;
                    }
                }
            }
        }

        scan.stats.max_author_id = scan.max_author_id;

        info!(
            "Author scan complete in {}: {} mentions with id, {} without, max id {}",
            format_elapsed(start.elapsed()),
            scan.stats.mentions_with_id,
            scan.stats.mentions_without_id,
            scan.max_author_id
        );

        scan
    }

    /// Assign a fresh id above the scan maximum to every worklist entry, in
    /// worklist order, then clear the worklist. Calling it again is a no-op.
    ///
    /// Once the id space above the maximum is used up, the remaining mentions
    /// get no id and are left unresolved.
    pub fn generate_ids(&mut self) {
        if self.without_id.is_empty() {
            return;
        }

        let mut last_id = self.max_author_id.checked_add(self.synthetic.len() as AuthorId);
        let pending = std::mem::take(&mut self.without_id);
        debug!("Allocating {} synthetic author ids after {:?}", pending.len(), last_id);

        let mut exhausted = 0usize;
        for (name, position) in pending {
            let id = match last_id.and_then(|id| id.checked_add(1)) {
                Some(id) => id,
                None => {
                    exhausted += 1;
                    continue;
                }
            };
            last_id = Some(id);

            self.identities
                .entry(name.clone())
                .or_default()
                .push((id, position));
            self.synthetic.insert(IdentityKey { name, position }, id);
        }

        if exhausted > 0 {
            warn!(
                "Author id space exhausted above {}: {} mentions left without an id",
                self.max_author_id, exhausted
            );
        }
    }

    /// Largest source-supplied id seen during the scan
    pub fn max_author_id(&self) -> AuthorId {
        self.max_author_id
    }

    /// Mentions still waiting for a synthetic id
    pub fn pending(&self) -> usize {
        self.without_id.len()
    }

    /// Every (id, position) recorded for a name
    pub fn ids_for_name(&self, name: &str) -> &[(AuthorId, AuthorPosition)] {
        self.identities.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stats(&self) -> &ResolveStats {
        &self.stats
    }

    /// Generate any outstanding ids and freeze the mapping for resolution
    pub fn finish(mut self) -> AuthorIdentities {
        self.generate_ids();
        self.stats.distinct_names = self.identities.len();
        AuthorIdentities::new(self.synthetic, self.max_author_id, self.stats)
    }
}
