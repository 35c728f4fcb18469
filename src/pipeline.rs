use log::info;
use std::collections::HashMap;
use std::time::Instant;

use crate::authors::{AuthorId, AuthorScan};
use crate::citations::{count, CitationCounters, ValidityRule};
use crate::common::{format_elapsed, ResolveStats};
use crate::corpus::{Corpus, ResolvedCorpus};
use crate::hindex::{author_h_indexes, calc, MaxHIndexFeature};

/// Everything the feature step produces from one corpus snapshot
pub struct PipelineOutput {
    pub resolved: ResolvedCorpus,
    pub counters: CitationCounters,
    pub author_h: HashMap<AuthorId, u32>,
    pub max_hindex: MaxHIndexFeature,
    pub resolve_stats: ResolveStats,
    pub synthetic_ids: usize,
}

/// Runs scan → id generation → resolution → counting → h-index in order.
///
/// Each stage consumes the previous stage's output type, so no stage can be
/// started on partially built input.
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    rule: ValidityRule,
}

impl FeaturePipeline {
    pub fn new(rule: ValidityRule) -> Self {
        Self { rule }
    }

    pub fn run(&self, corpus: Corpus) -> PipelineOutput {
        let start = Instant::now();

        let identities = AuthorScan::scan(&corpus).finish();
        let resolve_stats = identities.stats().clone();
        let synthetic_ids = identities.synthetic_count();
        info!(
            "Identity table: {} names, {} synthetic ids above {}",
            identities.name_count(),
            synthetic_ids,
            identities.max_author_id()
        );

        let resolved = identities.resolve_corpus(corpus);
        drop(identities);

        let counters = count(&resolved, &self.rule);
        let author_h = author_h_indexes(&counters);
        let max_hindex = calc(&resolved, &author_h);

        info!("Feature pipeline finished in {}", format_elapsed(start.elapsed()));

        PipelineOutput {
            resolved,
            counters,
            author_h,
            max_hindex,
            resolve_stats,
            synthetic_ids,
        }
    }
}
