//! HTTP client for the public Sleeper API.

use super::{LeagueSource, Resource};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Public Sleeper API base URL.
pub const SLEEPER_API: &str = "https://api.sleeper.app/v1";

/// Sleeper-backed [`LeagueSource`] for a single league.
pub struct SleeperClient {
    http_client: reqwest::Client,
    base_url: String,
    league_id: String,
    timeout_seconds: u64,
}

impl SleeperClient {
    pub fn new(base_url: &str, league_id: &str, timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("leaguebot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BotError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            league_id: league_id.to_string(),
            timeout_seconds,
        })
    }

    fn url(&self, resource: Resource) -> String {
        format!("{}/{}", self.base_url, resource.path(&self.league_id))
    }
}

#[async_trait]
impl LeagueSource for SleeperClient {
    async fn fetch(&self, resource: Resource) -> Result<Value> {
        let url = self.url(resource);
        debug!("GET {}", url);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("request timed out after {}s", self.timeout_seconds)
            } else if e.is_connect() {
                format!("cannot connect to {}", self.base_url)
            } else {
                format!("request failed: {}", e)
            };
            BotError::source_unavailable(resource.to_string(), reason)
        })?;

        if !response.status().is_success() {
            return Err(BotError::source_unavailable(
                resource.to_string(),
                format!("HTTP {}", response.status()),
            ));
        }

        // Sleeper answers unknown leagues with a literal `null` body
        let body: Value = response
            .json()
            .await
            .map_err(|e| BotError::source_unavailable(resource.to_string(), e))?;
        if body.is_null() {
            return Err(BotError::source_unavailable(
                resource.to_string(),
                "empty response",
            ));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let client = SleeperClient::new("https://api.sleeper.app/v1/", "42", 10).unwrap();
        assert_eq!(
            client.url(Resource::Users),
            "https://api.sleeper.app/v1/league/42/users"
        );
        assert_eq!(
            client.url(Resource::Players),
            "https://api.sleeper.app/v1/players/nfl"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_source_unavailable() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let client = SleeperClient::new("http://127.0.0.1:9", "42", 2).unwrap();
        let err = client.fetch(Resource::League).await.unwrap_err();
        assert!(matches!(err, BotError::SourceUnavailable { .. }));
    }
}
