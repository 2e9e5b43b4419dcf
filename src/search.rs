//! Web search the model can ask for while answering.

use crate::error::WorkflowError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DDG_URL: &str = "https://api.duckduckgo.com/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchHit>, WorkflowError>;
}

/// DuckDuckGo Instant Answer API. No key required.
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, DEFAULT_DDG_URL)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DdgResult {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<DdgTopic>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DdgTopic {
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(rename = "Text")]
    text: Option<String>,
    /// Present on category groups, which nest further topics.
    #[serde(rename = "Topics")]
    topics: Vec<DdgTopic>,
}

fn flatten(topics: Vec<DdgTopic>, out: &mut Vec<SearchHit>) {
    for topic in topics {
        match (topic.first_url, topic.text) {
            (Some(url), Some(text)) if !url.is_empty() => {
                // "Rust (programming language) - A multi-paradigm ..." -> title is the part before " - "
                let title = text.split(" - ").next().unwrap_or(&text).to_string();
                out.push(SearchHit {
                    title,
                    url,
                    snippet: text,
                });
            }
            _ => flatten(topic.topics, out),
        }
    }
}

#[async_trait]
impl SearchTool for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, WorkflowError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .header("User-Agent", "media-summarizer/0.1")
            .send()
            .await
            .map_err(|e| WorkflowError::Search(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WorkflowError::Search(format!("HTTP {status}")));
        }

        // DuckDuckGo answers with content-type application/x-javascript
        let body = resp
            .text()
            .await
            .map_err(|e| WorkflowError::Search(e.to_string()))?;
        let res: DdgResult =
            serde_json::from_str(&body).map_err(|e| WorkflowError::Search(e.to_string()))?;

        let mut hits = Vec::new();
        if !res.abstract_text.is_empty() && !res.abstract_url.is_empty() {
            hits.push(SearchHit {
                title: if res.heading.is_empty() {
                    query.to_string()
                } else {
                    res.heading
                },
                url: res.abstract_url,
                snippet: res.abstract_text,
            });
        }
        flatten(res.related_topics, &mut hits);
        hits.truncate(max_results);

        tracing::debug!(query, hits = hits.len(), "web search finished");
        Ok(hits)
    }
}
