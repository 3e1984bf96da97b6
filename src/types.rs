use serde::{Deserialize, Serialize};

// Inbound query strings. Everything is optional text so that validation and
// defaulting stay in the handlers instead of becoming extractor rejections.

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub topic: Option<String>,
    pub callback: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RepoParams {
    pub user: Option<String>,
    pub repo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Search result item as returned by `GET /api/search`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RepoSummary {
    pub name: String,
    pub full_name: String,
    pub owner: String,
    pub avatar: String,
    pub url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Search result item of the cached search, which also carries license and topics.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RepoRecord {
    pub name: String,
    pub full_name: String,
    pub owner: String,
    pub avatar: String,
    pub url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub topics: Vec<String>,
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RateLimit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CachedSearchResponse {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub page: u32,
    pub per_page: u32,
    pub items: Vec<RepoRecord>,
    pub rate_limit: RateLimit,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RepoMetadata {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub url: String,
}

/// Counters scraped from a repository page. Values are the raw text shown on
/// the page with thousands separators removed, e.g. `"1234"` or `"1.2k"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RepoStats {
    pub user: String,
    pub repo: String,
    pub url: String,
    pub stars: Option<String>,
    pub forks: Option<String>,
    pub watchers: Option<String>,
    pub issues: Option<String>,
    /// Counters whose anchor could not be located in the markup.
    pub missing: Vec<String>,
}

// GitHub API types

#[derive(Debug, Deserialize)]
pub struct GithubSearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Option<Vec<GithubRepo>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubRepo {
    pub name: String,
    pub full_name: String,
    pub owner: GithubOwner,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub license: Option<GithubLicense>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    // Only present on the single-repository endpoint.
    #[serde(default)]
    pub subscribers_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubLicense {
    #[serde(default)]
    pub spdx_id: Option<String>,
}

impl From<GithubRepo> for RepoSummary {
    fn from(repo: GithubRepo) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            owner: repo.owner.login,
            avatar: repo.owner.avatar_url,
            url: repo.html_url,
            description: repo.description,
            language: repo.language,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            issues: repo.open_issues_count,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
        }
    }
}

impl From<GithubRepo> for RepoRecord {
    fn from(repo: GithubRepo) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            owner: repo.owner.login,
            avatar: repo.owner.avatar_url,
            url: repo.html_url,
            description: repo.description,
            language: repo.language,
            license: repo.license.and_then(|l| l.spdx_id),
            topics: repo.topics,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            issues: repo.open_issues_count,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
        }
    }
}

impl From<GithubRepo> for RepoMetadata {
    fn from(repo: GithubRepo) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            watchers: repo.subscribers_count,
            open_issues: repo.open_issues_count,
            url: repo.html_url,
        }
    }
}
