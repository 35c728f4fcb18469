use anyhow::{bail, Context, Result};
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{create_http_client, join_url};
use crate::corpus::{AuthorMention, PaperRecord, PublicationYear};

/// Semantic Scholar v1 paper endpoint
pub const DEFAULT_PAPER_API: &str = "https://api.semanticscholar.org/v1/paper/";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPaper {
    paper_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<PublicationYear>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    fields_of_study: Option<Vec<String>>,
    #[serde(default)]
    authors: Option<Vec<ApiAuthor>>,
    #[serde(default)]
    citations: Option<Vec<ApiLink>>,
    #[serde(default)]
    references: Option<Vec<ApiLink>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAuthor {
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLink {
    #[serde(default)]
    paper_id: Option<String>,
}

fn link_ids(links: Option<Vec<ApiLink>>) -> Option<Vec<String>> {
    links.map(|links| links.into_iter().filter_map(|l| l.paper_id).collect())
}

impl From<ApiPaper> for PaperRecord {
    fn from(api: ApiPaper) -> Self {
        let authors = api.authors.map(|authors| {
            authors
                .into_iter()
                .map(|a| AuthorMention {
                    name: a.name,
                    ids: a.author_id.into_iter().collect(),
                })
                .collect()
        });

        PaperRecord {
            id: api.paper_id,
            title: api.title,
            year: api.year,
            authors,
            in_citations: link_ids(api.citations),
            out_citations: link_ids(api.references),
            venue: api.venue,
            journal_name: None,
            fields_of_study: api.fields_of_study,
            author_ids: None,
        }
    }
}

/// Parse an API response body into a corpus-shaped record
pub fn parse_paper_response(body: &str) -> Result<PaperRecord> {
    let api: ApiPaper = serde_json::from_str(body).context("Failed to parse paper response")?;
    Ok(api.into())
}

/// Client for fetching single papers that are missing from the loaded corpus
pub struct PaperClient {
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl PaperClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_http_client().context("Failed to build HTTP client")?,
            api_base: api_base.to_string(),
            timeout,
        })
    }

    pub fn paper_url(&self, paper_id: &str) -> String {
        join_url(&self.api_base, paper_id)
    }

    /// Fetch one paper. Network errors, missing papers and bad bodies are all errors.
    pub async fn get_paper(&self, paper_id: &str) -> Result<PaperRecord> {
        let url = self.paper_url(paper_id);
        debug!("Fetching paper: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to request paper: {}", url))?;

        match response.status() {
            StatusCode::NOT_FOUND => bail!("Paper not found: {}", paper_id),
            status if !status.is_success() => bail!("Paper lookup for {} failed with status {}", paper_id, status),
            _ => {}
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body for {}", paper_id))?;

        parse_paper_response(&body).with_context(|| format!("Bad response for paper {}", paper_id))
    }
}
