//! Pure helpers that turn loosely typed query parameters into the values sent
//! to the GitHub search API.

pub const DEFAULT_SORT: &str = "stars";
pub const DEFAULT_ORDER: &str = "desc";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PAGE_VALUE: u32 = 100;

const KEYWORD_SCOPE: &str = "in:name,description";

/// Structured search filters for the cached search endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    pub keywords: Vec<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub topic: Option<String>,
}

impl SearchFilters {
    /// Splits `q` on whitespace and keeps non-empty filter values.
    pub fn new(q: &str, language: Option<&str>, license: Option<&str>, topic: Option<&str>) -> Self {
        let keep = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        Self {
            keywords: q.split_whitespace().map(str::to_string).collect(),
            language: keep(language),
            license: keep(license),
            topic: keep(topic),
        }
    }

    fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = self
            .keywords
            .iter()
            .map(|kw| format!("{} {}", kw, KEYWORD_SCOPE))
            .collect();
        if let Some(v) = &self.language {
            terms.push(format!("language:{}", v));
        }
        if let Some(v) = &self.license {
            terms.push(format!("license:{}", v));
        }
        if let Some(v) = &self.topic {
            terms.push(format!("topic:{}", v));
        }
        terms
    }

    /// The normalized query in its URL form, e.g.
    /// `alpha in:name,description+beta in:name,description+language:rust`.
    /// Used as the cache key prefix.
    pub fn normalized_query(&self) -> String {
        self.terms().join("+")
    }

    /// The same query as GitHub decodes it: `+` in a URL query is a space.
    pub fn upstream_query(&self) -> String {
        self.terms().join(" ")
    }
}

/// Parses the leading integer of `raw` the way lenient web clients do:
/// optional whitespace and sign, then digits. `"3abc"` is 3, `"abc"` is `None`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    Some(if negative { -value } else { value })
}

/// Clamps a `page`/`per_page` value to `[1, 100]`. Absent, non-numeric and
/// zero values fall back to `default`.
pub fn clamp_page_value(raw: Option<&str>, default: u32) -> u32 {
    match raw.and_then(parse_leading_int) {
        None | Some(0) => default,
        Some(n) => n.clamp(1, i64::from(MAX_PAGE_VALUE)) as u32,
    }
}

/// Fully resolved parameters of one upstream search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub sort: String,
    pub order: String,
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery {
    pub fn new(q: String, sort: Option<&str>, order: Option<&str>, page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            q,
            sort: or_default(sort, DEFAULT_SORT),
            order: or_default(order, DEFAULT_ORDER),
            page: clamp_page_value(page, DEFAULT_PAGE),
            per_page: clamp_page_value(per_page, DEFAULT_PER_PAGE),
        }
    }
}

fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Cache key for the cached search: `{normalized}_{sort}_{order}_{page}_{per_page}`.
pub fn cache_key(normalized_query: &str, query: &SearchQuery) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        normalized_query, query.sort, query.order, query.page, query.per_page
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_scoped_and_joined() {
        let filters = SearchFilters::new("alpha beta", None, None, None);
        assert_eq!(
            filters.normalized_query(),
            "alpha in:name,description+beta in:name,description"
        );
        assert_eq!(
            filters.upstream_query(),
            "alpha in:name,description beta in:name,description"
        );
    }

    #[test]
    fn test_filters_appended_in_order() {
        let filters = SearchFilters::new("  web   server ", Some("rust"), Some("mit"), Some("http"));
        assert_eq!(
            filters.normalized_query(),
            "web in:name,description+server in:name,description+language:rust+license:mit+topic:http"
        );
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let filters = SearchFilters::new("cli", Some(""), Some("  "), None);
        assert_eq!(filters.normalized_query(), "cli in:name,description");
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int(" 7"), Some(7));
        assert_eq!(parse_leading_int("3abc"), Some(3));
        assert_eq!(parse_leading_int("2.9"), Some(2));
        assert_eq!(parse_leading_int("-5"), Some(-5));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn test_clamp_page_value() {
        assert_eq!(clamp_page_value(Some("500"), DEFAULT_PER_PAGE), 100);
        assert_eq!(clamp_page_value(Some("abc"), DEFAULT_PER_PAGE), 10);
        assert_eq!(clamp_page_value(None, DEFAULT_PER_PAGE), 10);
        assert_eq!(clamp_page_value(Some("0"), DEFAULT_PAGE), 1);
        assert_eq!(clamp_page_value(Some("-3"), DEFAULT_PAGE), 1);
        assert_eq!(clamp_page_value(Some("25"), DEFAULT_PER_PAGE), 25);
        assert_eq!(clamp_page_value(Some("99999999999999999999"), DEFAULT_PAGE), 100);
    }

    #[test]
    fn test_search_query_defaults() {
        let query = SearchQuery::new("x".into(), None, Some(""), None, Some("abc"));
        assert_eq!(query.sort, "stars");
        assert_eq!(query.order, "desc");
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 10);
    }

    #[test]
    fn test_cache_key_covers_sort_and_pagination() {
        let a = SearchQuery::new("x".into(), Some("forks"), Some("asc"), Some("2"), Some("30"));
        assert_eq!(cache_key("x in:name,description", &a), "x in:name,description_forks_asc_2_30");
        let b = SearchQuery { page: 3, ..a.clone() };
        assert_ne!(cache_key("q", &a), cache_key("q", &b));
    }
}
