//! Author identity resolution, citation aggregation and h-index features for
//! S2ORC-style paper corpora.
//!
//! The core runs as typed stages over an in-memory [`corpus::Corpus`]:
//! [`authors::AuthorScan`] → [`authors::AuthorIdentities`] →
//! [`corpus::ResolvedCorpus`] → [`citations::CitationCounters`] →
//! [`hindex::MaxHIndexFeature`]. [`pipeline::FeaturePipeline`] chains them.

pub mod authors;
pub mod citations;
pub mod cli;
pub mod commands;
pub mod common;
pub mod corpus;
pub mod features;
pub mod hindex;
pub mod pipeline;
pub mod retrieval;
