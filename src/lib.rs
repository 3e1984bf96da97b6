pub mod config;
pub mod error;
pub mod github;
pub mod jsonp;
pub mod query;
pub mod repo;
pub mod routes;
pub mod scrape;
pub mod search;
pub mod types;

use std::sync::Arc;

use crate::config::Config;
use crate::github::GithubClient;
use crate::scrape::{AnchorSuffixExtractor, StatsExtractor};

// Re-export for easy access
pub use types::*;

#[derive(Clone, Debug)]
pub struct AppState {
    pub github: GithubClient,
    // key: normalized query + sort/order/pagination, see query::cache_key
    pub search_cache: moka::future::Cache<String, Arc<CachedSearchResponse>>,
    pub extractor: Arc<dyn StatsExtractor>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::with_client(GithubClient::new(config)?, config))
    }

    pub fn with_client(github: GithubClient, config: &Config) -> Self {
        Self {
            github,
            search_cache: moka::future::Cache::builder()
                .max_capacity(config.cache_max_capacity)
                .time_to_live(config.cache_ttl)
                .build(),
            extractor: Arc::new(AnchorSuffixExtractor::new()),
        }
    }
}
