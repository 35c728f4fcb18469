use crate::corpus::Corpus;

/// Year gap at which a citation-list entry is treated as a data error
pub const DEFAULT_MIN_GAP_YEARS: i32 = 5;

/// Temporal validity filter for citation-list entries.
///
/// An entry dated `min_gap_years` or more after the paper it is listed on is
/// discarded. Anything that cannot be checked (entry outside the corpus, either
/// year missing or unparseable) is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityRule {
    pub min_gap_years: i32,
}

impl Default for ValidityRule {
    fn default() -> Self {
        Self {
            min_gap_years: DEFAULT_MIN_GAP_YEARS,
        }
    }
}

impl ValidityRule {
    pub fn new(min_gap_years: i32) -> Self {
        Self { min_gap_years }
    }

    pub fn is_invalid(&self, corpus: &Corpus, linked_id: &str, paper_year: Option<i32>) -> bool {
        let linked_year = match corpus.get(linked_id).and_then(|p| p.year()) {
            Some(year) => year,
            None => return false,
        };

        match paper_year {
            Some(year) => i64::from(linked_year) - i64::from(year) >= i64::from(self.min_gap_years),
            None => false,
        }
    }
}

/// Check a citation-list entry against the default five-year rule
pub fn is_invalid_paper(corpus: &Corpus, linked_id: &str, paper_year: Option<i32>) -> bool {
    ValidityRule::default().is_invalid(corpus, linked_id, paper_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{PaperRecord, PublicationYear};

    fn corpus() -> Corpus {
        let mut garbled = PaperRecord::new("garbled");
        garbled.year = Some(PublicationYear::Unparseable("n.d.".to_string()));

        Corpus::from_papers(vec![
            PaperRecord::new("gap4").with_year(2004),
            PaperRecord::new("gap5").with_year(2005),
            PaperRecord::new("earlier").with_year(1990),
            PaperRecord::new("undated"),
            garbled,
        ])
    }

    #[test]
    fn test_missing_paper_is_valid() {
        assert!(!is_invalid_paper(&corpus(), "elsewhere", Some(2000)));
    }

    #[test]
    fn test_missing_or_unparseable_year_is_valid() {
        let corpus = corpus();
        assert!(!is_invalid_paper(&corpus, "undated", Some(2000)));
        assert!(!is_invalid_paper(&corpus, "garbled", Some(2000)));
        assert!(!is_invalid_paper(&corpus, "gap5", None));
    }

    #[test]
    fn test_gap_boundaries() {
        let corpus = corpus();
        assert!(!is_invalid_paper(&corpus, "gap4", Some(2000)));
        assert!(is_invalid_paper(&corpus, "gap5", Some(2000)));
        assert!(!is_invalid_paper(&corpus, "earlier", Some(2000)));
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        let corpus = Corpus::from_papers(vec![
            PaperRecord::new("far_future").with_year(2_000_000_000),
            PaperRecord::new("far_past").with_year(-2_000_000_000),
        ]);

        assert!(is_invalid_paper(&corpus, "far_future", Some(-2_000_000_000)));
        assert!(!is_invalid_paper(&corpus, "far_past", Some(2_000_000_000)));
        assert!(is_invalid_paper(&corpus, "far_future", Some(i32::MIN)));
    }

    #[test]
    fn test_custom_gap() {
        let rule = ValidityRule::new(3);
        assert!(rule.is_invalid(&corpus(), "gap4", Some(2000)));
    }
}
