pub mod loader;
pub mod record;

pub use loader::*;
pub use record::*;

use std::collections::HashMap;

/// In-memory corpus snapshot: paper rows in load order plus an id index
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    papers: Vec<PaperRecord>,
    index: HashMap<String, usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            papers: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Build a corpus from records, keeping the first row for each id
    pub fn from_papers<I: IntoIterator<Item = PaperRecord>>(papers: I) -> Self {
        let mut corpus = Self::new();
        for paper in papers {
            corpus.insert(paper);
        }
        corpus
    }

    /// Append a paper. Returns false (and drops the record) if the id is already present.
    pub fn insert(&mut self, paper: PaperRecord) -> bool {
        if self.index.contains_key(&paper.id) {
            return false;
        }
        self.index.insert(paper.id.clone(), self.papers.len());
        self.papers.push(paper);
        true
    }

    pub fn get(&self, id: &str) -> Option<&PaperRecord> {
        self.index.get(id).map(|&row| &self.papers[row])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Row position of a paper id in load order
    pub fn row_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn papers(&self) -> &[PaperRecord] {
        &self.papers
    }

    pub(crate) fn papers_mut(&mut self) -> &mut [PaperRecord] {
        &mut self.papers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaperRecord> {
        self.papers.iter()
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// A corpus whose rows carry resolved author ids.
///
/// Only `AuthorIdentities::resolve_corpus` produces one, so citation counting
/// cannot run before resolution has filled in every row.
#[derive(Debug, Clone)]
pub struct ResolvedCorpus {
    corpus: Corpus,
}

impl ResolvedCorpus {
    pub(crate) fn from_resolved(corpus: Corpus) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn into_inner(self) -> Corpus {
        self.corpus
    }
}
