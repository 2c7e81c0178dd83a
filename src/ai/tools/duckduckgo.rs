//! DuckDuckGo web search tool.
//!
//! Queries the DuckDuckGo Instant Answer API and flattens the abstract plus
//! related topics (including nested topic groups) into a result list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use super::Tool;
use crate::config::SearchConfig;
use crate::constants::search::TOOL_NAME;
use crate::types::{InnovateError, Result};

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

pub struct DuckDuckGoSearch {
    endpoint: url::Url,
    max_results: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for DuckDuckGoSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDuckGoSearch")
            .field("endpoint", &self.endpoint.as_str())
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let endpoint = url::Url::parse(&config.endpoint).map_err(|e| {
            InnovateError::Config(format!(
                "Invalid search endpoint '{}': {}",
                config.endpoint, e
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("innovateeasy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InnovateError::Tool(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            max_results: config.max_results,
            client,
        })
    }

    /// Run a query and return at most `max_results` hits
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("no_html", "1")
            .append_pair("skip_disambig", "1");

        debug!(query, "Querying DuckDuckGo");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InnovateError::Tool(format!("DuckDuckGo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(InnovateError::Tool(format!(
                "DuckDuckGo returned {}",
                response.status()
            )));
        }

        // The API answers with `application/x-javascript`, so decode by hand.
        let body = response.text().await?;
        let answer: InstantAnswer = serde_json::from_str(&body)?;
        Ok(collect_results(answer, max_results))
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Returns titles, URLs and snippets for the query."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            query: String,
            #[serde(default)]
            max_results: Option<usize>,
        }

        let args: Args = serde_json::from_value(args)
            .map_err(|e| InnovateError::Tool(format!("Invalid arguments: {}", e)))?;
        let max_results = args.max_results.unwrap_or(self.max_results).max(1);

        info!(query = %args.query, max_results, "Web search requested");

        let results = self.search(&args.query, max_results).await?;
        Ok(json!({
            "query": args.query,
            "results": results,
        }))
    }
}

// Instant Answer payload (only the fields we read)

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InstantAnswer {
    heading: String,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    related_topics: Vec<RelatedTopic>,
    results: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<Topic>,
    },
    Entry(Topic),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Topic {
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "FirstURL")]
    first_url: String,
}

impl Topic {
    fn into_result(self) -> Option<SearchResult> {
        if self.first_url.is_empty() || self.text.is_empty() {
            return None;
        }
        // Text reads "Title - longer description"
        let title = self
            .text
            .split(" - ")
            .next()
            .unwrap_or(&self.text)
            .to_string();
        Some(SearchResult {
            title,
            url: self.first_url,
            snippet: self.text,
        })
    }
}

fn collect_results(answer: InstantAnswer, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if !answer.abstract_text.is_empty() && !answer.abstract_url.is_empty() {
        results.push(SearchResult {
            title: answer.heading,
            url: answer.abstract_url,
            snippet: answer.abstract_text,
        });
    }

    let topics = answer
        .results
        .into_iter()
        .chain(answer.related_topics.into_iter().flat_map(|t| match t {
            RelatedTopic::Group { topics } => topics,
            RelatedTopic::Entry(topic) => vec![topic],
        }));

    results.extend(topics.filter_map(Topic::into_result));
    results.truncate(max_results);
    results
}
