use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::ProxyError;
use crate::repo::RepoRef;
use crate::types::RepoStats;
use crate::AppState;

/// Counters read from a repository page. `None` means the counter could not be located.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CounterSet {
    pub stars: Option<String>,
    pub forks: Option<String>,
    pub watchers: Option<String>,
    pub issues: Option<String>,
}

impl CounterSet {
    pub fn is_empty(&self) -> bool {
        self.stars.is_none() && self.forks.is_none() && self.watchers.is_none() && self.issues.is_none()
    }

    pub fn missing(&self) -> Vec<String> {
        [
            ("stars", &self.stars),
            ("forks", &self.forks),
            ("watchers", &self.watchers),
            ("issues", &self.issues),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

/// Reads repository counters out of page markup. Markup changes on the
/// provider side only ever touch implementations of this trait.
pub trait StatsExtractor: Send + Sync + std::fmt::Debug {
    fn extract(&self, html: &str) -> CounterSet;
}

/// Extractor for github.com repository pages: each counter is the text of the
/// first anchor whose `href` ends in the counter's path.
#[derive(Debug, Default, Clone)]
pub struct AnchorSuffixExtractor;

impl AnchorSuffixExtractor {
    pub fn new() -> Self {
        Self
    }

    fn first_anchor_text(&self, document: &Html, suffix: &str) -> Option<String> {
        let selector = Selector::parse(&format!("a[href$=\"{}\"]", suffix)).ok()?;
        let element = document.select(&selector).next()?;
        let text = element.text().collect::<String>();
        Some(clean_counter(&text))
    }
}

impl StatsExtractor for AnchorSuffixExtractor {
    fn extract(&self, html: &str) -> CounterSet {
        let document = Html::parse_document(html);
        CounterSet {
            stars: self.first_anchor_text(&document, "/stargazers"),
            forks: self.first_anchor_text(&document, "/network/members"),
            watchers: self.first_anchor_text(&document, "/watchers"),
            issues: self.first_anchor_text(&document, "/issues"),
        }
    }
}

/// Drops thousands separators and collapses whitespace: `" 1,234\n stars "` becomes `"1234 stars"`.
fn clean_counter(text: &str) -> String {
    text.replace(',', "").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fetches the repository page and scrapes its counters.
pub async fn repository_stats(state: &AppState, target: &RepoRef) -> Result<RepoStats, ProxyError> {
    let html = state
        .github
        .fetch_repository_page(&target.user, &target.repo)
        .await?;

    let counters = state.extractor.extract(&html);
    if counters.is_empty() {
        return Err(ProxyError::UnrecognizedMarkup);
    }

    let missing = counters.missing();
    if missing.is_empty() {
        info!("Scraped counters for {}/{}", target.user, target.repo);
    } else {
        warn!(
            "Counters {:?} not found on page for {}/{}",
            missing, target.user, target.repo
        );
    }

    Ok(RepoStats {
        user: target.user.clone(),
        repo: target.repo.clone(),
        url: state.github.repository_page_url(&target.user, &target.repo),
        stars: counters.stars,
        forks: counters.forks,
        watchers: counters.watchers,
        issues: counters.issues,
        missing,
    })
}
