use log::info;
use std::collections::HashMap;
use std::time::Instant;

use super::ValidityRule;
use crate::authors::AuthorId;
use crate::common::format_elapsed;
use crate::corpus::ResolvedCorpus;

const PROGRESS_EVERY: usize = 1_000_000;

/// Counters built by one pass over the citation lists
#[derive(Debug, Clone, Default)]
pub struct CitationCounters {
    /// Valid citation-list entries per paper
    pub paper_citations: HashMap<String, u32>,
    /// Per author: for each of their papers with valid citations, how many it received
    pub author_citations: HashMap<AuthorId, HashMap<String, u32>>,
    /// Entries accepted by the validity rule
    pub accepted: u64,
    /// Entries discarded by the validity rule
    pub rejected: u64,
}

impl CitationCounters {
    pub fn paper_count(&self, paper_id: &str) -> u32 {
        self.paper_citations.get(paper_id).copied().unwrap_or(0)
    }

    /// Per-paper citation counts credited to an author (empty if none)
    pub fn author_counts(&self, author: AuthorId) -> impl Iterator<Item = u32> + '_ {
        self.author_citations
            .get(&author)
            .into_iter()
            .flat_map(|papers| papers.values().copied())
    }
}

/// Walk every paper's citation list once, filter entries with `rule` and
/// accumulate the per-paper and per-author counters.
///
/// Rejected entries touch no counter. Papers whose lists yield no valid entry
/// get no counter entries at all.
pub fn count(resolved: &ResolvedCorpus, rule: &ValidityRule) -> CitationCounters {
    let corpus = resolved.corpus();
    info!("Counting citations over {} papers", corpus.len());
    let start = Instant::now();

    let mut counters = CitationCounters::default();

    for (row, paper) in corpus.iter().enumerate() {
        if row > 0 && row % PROGRESS_EVERY == 0 {
            info!(
                "  Counted {} papers: {} accepted, {} rejected so far...",
                row, counters.accepted, counters.rejected
            );
        }

        let citations = match &paper.in_citations {
            Some(citations) => citations,
            None => continue,
        };

        let paper_year = paper.year();
        let valid = citations
            .iter()
            .filter(|linked_id| !rule.is_invalid(corpus, linked_id, paper_year))
            .count() as u32;

        counters.accepted += valid as u64;
        counters.rejected += (citations.len() as u32 - valid) as u64;

        if valid == 0 {
            continue;
        }

        *counters.paper_citations.entry(paper.id.clone()).or_insert(0) += valid;

        if let Some(author_ids) = &paper.author_ids {
            for author in author_ids {
                *counters
                    .author_citations
                    .entry(*author)
                    .or_default()
                    .entry(paper.id.clone())
                    .or_insert(0) += valid;
            }
        }
    }

    info!(
        "Citation count complete in {}: {} accepted, {} rejected, {} papers cited, {} authors credited",
        format_elapsed(start.elapsed()),
        counters.accepted,
        counters.rejected,
        counters.paper_citations.len(),
        counters.author_citations.len()
    );

    counters
}
