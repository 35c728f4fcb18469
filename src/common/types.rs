/// Statistics from loading corpus shards
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub shards_read: usize,
    pub lines_read: usize,
    pub lines_failed: usize,
    pub duplicate_ids: usize,
    pub papers_loaded: usize,
}

impl LoadStats {
    /// Fold another shard's counters into this one
    pub fn absorb(&mut self, other: &LoadStats) {
        self.shards_read += other.shards_read;
        self.lines_read += other.lines_read;
        self.lines_failed += other.lines_failed;
        self.duplicate_ids += other.duplicate_ids;
        self.papers_loaded += other.papers_loaded;
    }
}

/// Statistics from the author identity scan
#[derive(Debug, Clone, Default)]
pub struct ResolveStats {
    pub papers_with_authors: usize,
    pub mentions_with_id: usize,
    pub mentions_without_id: usize,
    pub distinct_names: usize,
    pub max_author_id: u64,
}

/// Statistics from the download step
#[derive(Debug, Clone, Default)]
pub struct DownloadStats {
    pub shards_listed: usize,
    pub shards_present: usize,
    pub shards_downloaded: usize,
    pub bytes_downloaded: u64,
}

/// Statistics from the features step
#[derive(Debug, Clone, Default)]
pub struct FeatureStats {
    pub load: LoadStats,
    pub resolve: ResolveStats,
    pub citations_counted: u64,
    pub citations_rejected: u64,
    pub authors_with_citations: usize,
    pub rows_written: usize,
}
