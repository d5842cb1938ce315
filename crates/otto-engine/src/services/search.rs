//! Web search via SerpAPI, with illustrative demo results when no API key
//! is configured or the upstream call fails.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SearchConfig;

pub struct SearchService {
    client: reqwest::Client,
    config: SearchConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiResult>,
}

#[derive(Deserialize)]
struct SerpApiResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    displayed_link: String,
}

impl SearchService {
    pub fn new(config: SearchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Search the web. Degrades to demo results on a missing key or any
    /// upstream failure — a search that errors would take the whole chat
    /// branch down with it.
    pub async fn search_web(&self, query: &str, limit: usize) -> Vec<WebSearchResult> {
        if self.config.serpapi_key.is_some() {
            match self.search_serpapi(query, limit).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => debug!("serpapi returned no results, serving demo results"),
                Err(e) => debug!(error = %e, "serpapi search failed, serving demo results"),
            }
        }
        self.demo_results(query, limit)
    }

    async fn search_serpapi(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<WebSearchResult>, reqwest::Error> {
        let key = self.config.serpapi_key.as_deref().unwrap_or_default();
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", key),
                ("num", &limit.to_string()),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let data: SerpApiResponse = response.json().await?;

        Ok(data
            .organic_results
            .into_iter()
            .take(limit)
            .map(|r| WebSearchResult {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
                source: r.displayed_link,
                date: None,
            })
            .collect())
    }

    pub fn demo_results(&self, query: &str, limit: usize) -> Vec<WebSearchResult> {
        let now = Utc::now();
        let mut results = vec![
            WebSearchResult {
                title: format!("Demo Result 1: {query}"),
                url: "https://example.com/result1".into(),
                snippet: format!(
                    "This is a demo search result for '{query}'. In production, this would use \
                     real search APIs like SerpAPI to provide current information from the web."
                ),
                source: "example.com".into(),
                date: Some(now),
            },
            WebSearchResult {
                title: format!("Learn more about {query}"),
                url: "https://demo.com/learn".into(),
                snippet: format!(
                    "Comprehensive information about {query} including definitions, examples, \
                     and related topics. This demo result shows what real search results would \
                     look like."
                ),
                source: "demo.com".into(),
                date: Some(now),
            },
            WebSearchResult {
                title: format!("{query} - Wikipedia"),
                url: "https://en.wikipedia.org/wiki/Demo".into(),
                snippet: format!(
                    "Wikipedia article about {query} with detailed information, history, and \
                     references. This would be a real Wikipedia result in production."
                ),
                source: "wikipedia.org".into(),
                date: Some(now),
            },
        ];
        results.truncate(limit);
        results
    }

    /// Autocomplete-style query suggestions.
    pub fn suggestions(&self, partial: &str) -> Vec<String> {
        vec![
            format!("{partial} definition"),
            format!("{partial} examples"),
            format!("{partial} tutorial"),
            format!("how to {partial}"),
            format!("what is {partial}"),
            format!("{partial} benefits"),
            format!("{partial} vs alternatives"),
            format!("best {partial}"),
            format!("{partial} guide"),
            format!("{partial} tips"),
        ]
    }
}
