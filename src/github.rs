use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{ProxyError, Resource};
use crate::query::SearchQuery;
use crate::types::{GithubRepo, GithubSearchResponse, RateLimit};

/// Characters left unescaped in a path segment; everything else is percent-encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const API_ACCEPT: &str = "application/vnd.github+json";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// One page of search results together with the quota snapshot it was served under.
#[derive(Debug)]
pub struct SearchPage {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<GithubRepo>,
    pub rate_limit: RateLimit,
}

/// Thin client over the GitHub REST API and github.com pages.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: Url,
    web_base: Url,
    token: Option<String>,
    outbound_limit: Arc<Semaphore>,
}

impl GithubClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self::with_http_client(http, config))
    }

    pub fn with_http_client(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            api_base: config.api_base.clone(),
            web_base: config.web_base.clone(),
            token: config.token.clone(),
            outbound_limit: Arc::new(Semaphore::new(config.outbound_concurrency)),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.as_str().trim_end_matches('/'), path)
    }

    fn web_url(&self, path: &str) -> String {
        format!("{}/{}", self.web_base.as_str().trim_end_matches('/'), path)
    }

    fn api_get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url).header(ACCEPT, API_ACCEPT);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// `GET /search/repositories`. The body is parsed regardless of status:
    /// an error document has no `items` and surfaces as `UnexpectedShape`.
    pub async fn search_repositories(&self, query: &SearchQuery) -> Result<SearchPage, ProxyError> {
        let _permit = self
            .outbound_limit
            .acquire()
            .await
            .map_err(|_| ProxyError::Unavailable)?;

        let url = self.api_url("search/repositories");
        info!("Searching GitHub: q={:?} page={} per_page={}", query.q, query.page, query.per_page);

        let page = query.page.to_string();
        let per_page = query.per_page.to_string();
        let response = self
            .api_get(&url)
            .query(&[
                ("q", query.q.as_str()),
                ("sort", query.sort.as_str()),
                ("order", query.order.as_str()),
                ("page", page.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let rate_limit = rate_limit_snapshot(response.headers());
        let text = response.text().await?;
        if !status.is_success() {
            warn!("GitHub search returned status {}", status);
        }

        let parsed: GithubSearchResponse = serde_json::from_str(&text)?;
        let items = parsed.items.ok_or(ProxyError::UnexpectedShape)?;
        debug!("GitHub search returned {} items", items.len());

        Ok(SearchPage {
            total_count: parsed.total_count,
            incomplete_results: parsed.incomplete_results,
            items,
            rate_limit,
        })
    }

    /// `GET /repos/{user}/{repo}`. Non-2xx statuses are reported as-is.
    pub async fn get_repository(&self, user: &str, repo: &str) -> Result<GithubRepo, ProxyError> {
        let _permit = self
            .outbound_limit
            .acquire()
            .await
            .map_err(|_| ProxyError::Unavailable)?;

        let url = self.api_url(&format!("repos/{}/{}", segment(user), segment(repo)));
        info!("Fetching repository metadata: {}/{}", user, repo);

        let response = self.api_get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
                resource: Resource::Repository,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Public web URL of a repository, e.g. `https://github.com/rust-lang/rust`.
    pub fn repository_page_url(&self, user: &str, repo: &str) -> String {
        self.web_url(&format!("{}/{}", segment(user), segment(repo)))
    }

    /// Fetches the repository's HTML page.
    pub async fn fetch_repository_page(&self, user: &str, repo: &str) -> Result<String, ProxyError> {
        let _permit = self
            .outbound_limit
            .acquire()
            .await
            .map_err(|_| ProxyError::Unavailable)?;

        let url = self.repository_page_url(user, repo);
        info!("Fetching repository page: {}", url);

        let response = self.http.get(&url).header(ACCEPT, HTML_ACCEPT).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
                resource: Resource::RepositoryPage,
            });
        }
        Ok(response.text().await?)
    }
}

fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

fn rate_limit_snapshot(headers: &HeaderMap) -> RateLimit {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    RateLimit {
        limit: header("x-ratelimit-limit"),
        remaining: header("x-ratelimit-remaining"),
        reset: header("x-ratelimit-reset"),
    }
}
