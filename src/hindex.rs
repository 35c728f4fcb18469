use log::info;
use std::collections::HashMap;
use std::time::Instant;

use crate::authors::AuthorId;
use crate::citations::CitationCounters;
use crate::common::format_elapsed;
use crate::corpus::ResolvedCorpus;

/// Largest `h` such that at least `h` of the values are `>= h`
pub fn h_index<I: IntoIterator<Item = u32>>(counts: I) -> u32 {
    let mut counts: Vec<u32> = counts.into_iter().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    counts
        .iter()
        .enumerate()
        .take_while(|&(i, &c)| c as usize > i)
        .count() as u32
}

/// h-index of every author with at least one credited citation
pub fn author_h_indexes(counters: &CitationCounters) -> HashMap<AuthorId, u32> {
    counters
        .author_citations
        .iter()
        .map(|(author, papers)| (*author, h_index(papers.values().copied())))
        .collect()
}

/// Per-paper "best co-author" feature: the highest h-index among a paper's authors
#[derive(Debug, Clone, Default)]
pub struct MaxHIndexFeature {
    values: HashMap<String, u32>,
}

impl MaxHIndexFeature {
    /// Feature value for a paper; 0 for papers without authors or without an entry
    pub fn get(&self, paper_id: &str) -> u32 {
        self.values.get(paper_id).copied().unwrap_or(0)
    }

    pub fn contains(&self, paper_id: &str) -> bool {
        self.values.contains_key(paper_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Compute the max co-author h-index for every paper with an author list.
///
/// Authors without credited citations count as 0, an empty author list yields 0
/// and papers with no author list get no entry. `author_h` is the per-author
/// table from [`author_h_indexes`], computed once and shared across papers.
pub fn calc(resolved: &ResolvedCorpus, author_h: &HashMap<AuthorId, u32>) -> MaxHIndexFeature {
    let corpus = resolved.corpus();
    info!("Computing max co-author h-index for {} papers", corpus.len());
    let start = Instant::now();

    let mut feature = MaxHIndexFeature {
        values: HashMap::with_capacity(corpus.len()),
    };

    for paper in corpus.iter() {
        let author_ids = match &paper.author_ids {
            Some(ids) => ids,
            None => continue,
        };

        let max_h = author_ids
            .iter()
            .map(|id| author_h.get(id).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);

        feature.values.insert(paper.id.clone(), max_h);
    }

    info!(
        "Max h-index computed for {} papers in {}",
        feature.len(),
        format_elapsed(start.elapsed())
    );

    feature
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authors::AuthorScan;
    use crate::citations::{count, ValidityRule};
    use crate::corpus::{AuthorMention, Corpus, PaperRecord};

    #[test]
    fn test_h_index_definition() {
        assert_eq!(h_index(vec![0]), 0);
        assert_eq!(h_index(vec![3, 1, 0]), 1);
        assert_eq!(h_index(vec![5, 4, 3, 2, 1]), 3);
        assert_eq!(h_index(Vec::new()), 0);
        assert_eq!(h_index(vec![10, 10, 10]), 3);
        assert_eq!(h_index(vec![1, 4, 1, 4]), 2);
    }

    #[test]
    fn test_max_over_coauthors() {
        let cites = |n: usize| -> Vec<String> { (0..n).map(|i| format!("c{}", i)).collect() };

        let mut papers = Vec::new();
        // Author 1: three papers with 3, 3, 3 citations -> h = 3
        for i in 0..3 {
            let mut p = PaperRecord::new(&format!("a{}", i))
                .with_authors(vec![AuthorMention::new("Prolific", &["1"])]);
            p.in_citations = Some(cites(3));
            papers.push(p);
        }
        // Shared paper, one citation: author 2 has h = 1, author 1 keeps h = 3
        let mut shared = PaperRecord::new("shared").with_authors(vec![
            AuthorMention::new("Newcomer", &["2"]),
            AuthorMention::new("Prolific", &["1"]),
        ]);
        shared.in_citations = Some(cites(1));
        papers.push(shared);
        papers.push(PaperRecord::new("solo").with_authors(vec![AuthorMention::new("Quiet", &["3"])]));
        papers.push(PaperRecord::new("nobody").with_authors(vec![]));
        papers.push(PaperRecord::new("unknown"));

        let corpus = Corpus::from_papers(papers);
        let resolved = AuthorScan::scan(&corpus).finish().resolve_corpus(corpus);
        let counters = count(&resolved, &ValidityRule::default());
        let author_h = author_h_indexes(&counters);

        assert_eq!(author_h[&1], 3);
        assert_eq!(author_h[&2], 1);
        assert!(!author_h.contains_key(&3));

        let feature = calc(&resolved, &author_h);
        assert_eq!(feature.get("shared"), 3);
        assert_eq!(feature.get("a0"), 3);
        assert_eq!(feature.get("solo"), 0);
        assert_eq!(feature.get("nobody"), 0);
        assert!(feature.contains("nobody"));
        assert!(!feature.contains("unknown"));
        assert_eq!(feature.get("unknown"), 0);
    }
}
