//! Festival catalog feed client.
//!
//! Fetches per-category product JSON from a festival's static data
//! endpoint and flattens it into `Drink` records for the browse engine.

pub mod feed;
pub mod registry;

use std::error::Error as StdError;
use std::time::Duration;

use common::{Drink, Error, Festival};
use futures_util::future::join_all;
use tracing::{debug, warn};

pub use feed::parse_catalog;

/// Catalog HTTP client with connection pooling and a hard timeout.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
}

fn format_reqwest_error(err: &reqwest::Error) -> String {
    // Keep chained causes so network failures (DNS/TLS/socket) are visible.
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

fn classify_request_error(err: &reqwest::Error) -> Error {
    let message = format_reqwest_error(err);
    if err.is_timeout() {
        Error::Timeout(message)
    } else if err.is_connect() {
        Error::Connection(message)
    } else {
        Error::Http(message)
    }
}

fn summarize_response_body(raw: &str) -> String {
    const MAX_CHARS: usize = 500;
    let compact = raw.replace('\n', " ").replace('\r', " ");
    if compact.chars().count() > MAX_CHARS {
        let truncated: String = compact.chars().take(MAX_CHARS).collect();
        format!("{truncated}…")
    } else {
        compact
    }
}

/// Build the per-category feed URL: `{base}/{category}.json`.
fn category_url(base_url: &str, category: &str) -> String {
    format!("{}/{}.json", base_url.trim_end_matches('/'), category)
}

impl CatalogClient {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("taplist/0.1")
            .pool_max_idle_per_host(4)
            .timeout(timeout)
            .build()
            .expect("failed to build catalog HTTP client");

        Self { client }
    }

    /// Fetch one category feed for a festival.
    ///
    /// A 404 means the festival simply does not offer the category and
    /// yields an empty list; any other non-2xx status is an error
    /// carrying the status code.
    pub async fn fetch_category(
        &self,
        festival: &Festival,
        category: &str,
    ) -> Result<Vec<Drink>, Error> {
        let url = category_url(&festival.data_base_url, category);
        debug!("Fetching catalog feed: {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_request_error(&e))?;

        let status = resp.status().as_u16();
        if status == 404 {
            debug!("No {} feed for {} (404)", category, festival.id);
            return Ok(Vec::new());
        }
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: summarize_response_body(&body),
            });
        }

        // Decode the body from raw bytes; see `feed::parse_catalog` for
        // why the charset header is ignored.
        let bytes = resp.bytes().await.map_err(|e| classify_request_error(&e))?;
        let drinks = parse_catalog(&bytes, &festival.id)?;

        debug!(
            "Parsed {} drinks from {} feed for {}",
            drinks.len(),
            category,
            festival.id
        );
        Ok(drinks)
    }

    /// Fetch every configured category for a festival concurrently and
    /// merge the results.
    ///
    /// Completion order is not defined. Categories that fail are dropped
    /// with a warning unless every category fails, in which case the
    /// last error is returned.
    pub async fn fetch_all(
        &self,
        festival: &Festival,
        categories: &[String],
    ) -> Result<Vec<Drink>, Error> {
        let fetches = categories
            .iter()
            .map(|category| self.fetch_category(festival, category));
        let results = join_all(fetches).await;

        let mut drinks = Vec::new();
        let mut failures = 0usize;
        let mut last_error = None;

        for (category, result) in categories.iter().zip(results) {
            match result {
                Ok(batch) => drinks.extend(batch),
                Err(e) => {
                    warn!("Dropping {} feed for {}: {}", category, festival.id, e);
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if failures == categories.len() => Err(e),
            _ => Ok(drinks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_url_joins_cleanly() {
        assert_eq!(
            category_url("https://x.org/data/fest", "beer"),
            "https://x.org/data/fest/beer.json"
        );
        assert_eq!(
            category_url("https://x.org/data/fest/", "cider"),
            "https://x.org/data/fest/cider.json"
        );
    }

    #[test]
    fn summarize_truncates_long_bodies() {
        let long = "x".repeat(2000);
        let summary = summarize_response_body(&long);
        assert!(summary.chars().count() <= 501);
        assert!(summary.ends_with('…'));
        assert_eq!(summarize_response_body("short"), "short");
    }
}
