//! Festival registry feed.
//!
//! A small JSON document listing the festivals the app can browse and
//! which one is the current default.

use common::{Error, FestivalRegistry};
use tracing::debug;

use crate::CatalogClient;

/// Parse a registry document from raw bytes.
pub fn parse_registry(bytes: &[u8]) -> Result<FestivalRegistry, Error> {
    let registry: FestivalRegistry = serde_json::from_slice(bytes)?;
    Ok(registry)
}

impl CatalogClient {
    /// Fetch the festival registry feed.
    pub async fn fetch_registry(&self, url: &str) -> Result<FestivalRegistry, Error> {
        debug!("Fetching festival registry: {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| crate::classify_request_error(&e))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: crate::summarize_response_body(&body),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| crate::classify_request_error(&e))?;
        let registry = parse_registry(&bytes)?;

        debug!(
            "Registry lists {} festivals (default: {:?})",
            registry.festivals.len(),
            registry.default_festival_id
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_registry() {
        let body = br#"{
            "festivals": [
                {
                    "id": "gbf-2026",
                    "name": "Great Beer Festival 2026",
                    "data_base_url": "https://static.festivaltaplist.org/data/gbf-2026",
                    "is_active": true,
                    "start_date": "2026-08-04",
                    "end_date": "2026-08-08",
                    "location": "London"
                },
                {
                    "id": "winter-2026",
                    "name": "Winter Ales 2026",
                    "data_base_url": "https://static.festivaltaplist.org/data/winter-2026",
                    "is_active": false
                }
            ],
            "default_festival_id": "gbf-2026",
            "version": "12",
            "last_updated": "2026-08-01T09:00:00Z"
        }"#;

        let registry = parse_registry(body).unwrap();
        assert_eq!(registry.festivals.len(), 2);
        assert_eq!(registry.default_festival().unwrap().name, "Great Beer Festival 2026");
        assert!(!registry.festivals[1].is_active);
        assert_eq!(
            registry.festivals[0].start_date.unwrap().to_string(),
            "2026-08-04"
        );
    }

    #[test]
    fn parse_minimal_registry() {
        let registry = parse_registry(br#"{"festivals": []}"#).unwrap();
        assert!(registry.festivals.is_empty());
        assert!(registry.default_festival().is_none());
    }
}
