use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ProxyError;
use crate::query::{cache_key, SearchFilters, SearchQuery};
use crate::types::*;
use crate::AppState;

pub const MISSING_QUERY: &str = "Missing query parameter q";

/// Returns the trimmed `q` parameter, or a client error when it is absent or blank.
pub fn required_query(params: &SearchParams) -> Result<String, ProxyError> {
    params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .ok_or(ProxyError::MissingParam(MISSING_QUERY))
}

/// Plain search: `q` is forwarded as typed and each item is reshaped.
pub async fn search_repositories(
    state: &AppState,
    params: &SearchParams,
) -> Result<Vec<RepoSummary>, ProxyError> {
    let q = required_query(params)?;
    let query = SearchQuery::new(
        q,
        params.sort.as_deref(),
        params.order.as_deref(),
        params.page.as_deref(),
        params.per_page.as_deref(),
    );

    let page = state.github.search_repositories(&query).await?;
    info!("Search for {:?} returned {} items", query.q, page.items.len());
    Ok(page.items.into_iter().map(RepoSummary::from).collect())
}

/// Builds the normalized filters and resolved upstream query for the cached search.
/// Returns the cache key alongside.
pub fn cached_search_query(params: &SearchParams) -> Result<(String, SearchQuery), ProxyError> {
    let q = required_query(params)?;
    let filters = SearchFilters::new(
        &q,
        params.language.as_deref(),
        params.license.as_deref(),
        params.topic.as_deref(),
    );
    let query = SearchQuery::new(
        filters.upstream_query(),
        params.sort.as_deref(),
        params.order.as_deref(),
        params.page.as_deref(),
        params.per_page.as_deref(),
    );
    let key = cache_key(&filters.normalized_query(), &query);
    Ok((key, query))
}

/// Cached search. A live entry for `key` is returned unchanged; otherwise one
/// upstream fetch fills it. Concurrent misses on the same key share that fetch.
/// Failures are not cached.
pub async fn cached_search(
    state: &AppState,
    key: String,
    query: SearchQuery,
) -> Result<Arc<CachedSearchResponse>, Arc<ProxyError>> {
    if let Some(hit) = state.search_cache.get(&key).await {
        debug!("search cache hit for {}", key);
        return Ok(hit);
    }

    state
        .search_cache
        .try_get_with(key, async {
            let page = state.github.search_repositories(&query).await?;
            Ok::<_, ProxyError>(Arc::new(CachedSearchResponse {
                total_count: page.total_count,
                incomplete_results: page.incomplete_results,
                page: query.page,
                per_page: query.per_page,
                items: page.items.into_iter().map(RepoRecord::from).collect(),
                rate_limit: page.rate_limit,
            }))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(q: Option<&str>) -> SearchParams {
        SearchParams {
            q: q.map(str::to_string),
            ..SearchParams::default()
        }
    }

    #[test]
    fn test_required_query() {
        assert!(matches!(
            required_query(&params(None)),
            Err(ProxyError::MissingParam(MISSING_QUERY))
        ));
        assert!(required_query(&params(Some(""))).is_err());
        assert!(required_query(&params(Some("   "))).is_err());
        assert_eq!(required_query(&params(Some(" serde "))).unwrap(), "serde");
    }

    #[test]
    fn test_cached_search_query_normalizes_and_clamps() {
        let p = SearchParams {
            q: Some("alpha beta".into()),
            language: Some("rust".into()),
            per_page: Some("500".into()),
            page: Some("abc".into()),
            ..SearchParams::default()
        };
        let (key, query) = cached_search_query(&p).unwrap();
        assert_eq!(
            key,
            "alpha in:name,description+beta in:name,description+language:rust_stars_desc_1_100"
        );
        assert_eq!(
            query.q,
            "alpha in:name,description beta in:name,description language:rust"
        );
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 100);
    }
}
