use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WEB_URL: &str = "https://github.com";
pub const DEFAULT_USER_AGENT: &str = "GitHub-Repo-Search";

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub api_base: Url,
    pub web_base: Url,
    pub token: Option<String>,
    pub user_agent: String,
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
    pub upstream_timeout: Duration,
    pub outbound_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            api_base: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            web_base: Url::parse(DEFAULT_WEB_URL).expect("default web url is valid"),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl: Duration::from_millis(10_000),
            cache_max_capacity: 10_000,
            upstream_timeout: Duration::from_secs(30),
            outbound_concurrency: 32,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(v) = get("BIND_ADDR") {
            config.bind_addr = v
                .parse()
                .with_context(|| format!("BIND_ADDR is not a socket address: {}", v))?;
        }
        if let Some(v) = get("GITHUB_API_URL") {
            config.api_base = parse_base_url("GITHUB_API_URL", &v)?;
        }
        if let Some(v) = get("GITHUB_WEB_URL") {
            config.web_base = parse_base_url("GITHUB_WEB_URL", &v)?;
        }
        config.token = get("GITHUB_TOKEN");
        if let Some(v) = get("GITHUB_USER_AGENT") {
            config.user_agent = v;
        }
        if let Some(v) = get("CACHE_TTL_MS") {
            config.cache_ttl = Duration::from_millis(parse_positive("CACHE_TTL_MS", &v)?);
        }
        if let Some(v) = get("CACHE_MAX_CAPACITY") {
            config.cache_max_capacity = parse_positive("CACHE_MAX_CAPACITY", &v)?;
        }
        if let Some(v) = get("UPSTREAM_TIMEOUT_SECS") {
            config.upstream_timeout = Duration::from_secs(parse_positive("UPSTREAM_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("OUTBOUND_CONCURRENCY") {
            config.outbound_concurrency = parse_positive("OUTBOUND_CONCURRENCY", &v)? as usize;
        }

        Ok(config)
    }
}

fn parse_base_url(key: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", key, value))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("{} must use http or https: {}", key, value));
    }
    Ok(url)
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, value))
}

// Zero would silently disable the cache or fail every upstream call.
fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match parse_number(key, value)? {
        0 => Err(anyhow!("{} must be at least 1", key)),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.api_base.as_str(), "https://api.github.com/");
        assert_eq!(config.cache_ttl, Duration::from_millis(10_000));
        assert_eq!(config.user_agent, "GitHub-Repo-Search");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("GITHUB_API_URL", "http://localhost:9000"),
            ("GITHUB_TOKEN", "secret"),
            ("CACHE_TTL_MS", "250"),
            ("OUTBOUND_CONCURRENCY", "4"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.api_base.as_str(), "http://localhost:9000/");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.cache_ttl, Duration::from_millis(250));
        assert_eq!(config.outbound_concurrency, 4);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = Config::from_lookup(lookup(&[("GITHUB_TOKEN", "  "), ("CACHE_TTL_MS", "")])).unwrap();
        assert!(config.token.is_none());
        assert_eq!(config.cache_ttl, Duration::from_millis(10_000));
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(Config::from_lookup(lookup(&[("CACHE_TTL_MS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[("GITHUB_WEB_URL", "ftp://github.com")])).is_err());
        assert!(Config::from_lookup(lookup(&[("OUTBOUND_CONCURRENCY", "0")])).is_err());
    }

    #[test]
    fn test_zero_durations_and_capacity_fail() {
        for key in ["CACHE_TTL_MS", "CACHE_MAX_CAPACITY", "UPSTREAM_TIMEOUT_SECS"] {
            let err = Config::from_lookup(lookup(&[(key, "0")])).unwrap_err();
            assert!(err.to_string().contains(key), "{key}: {err}");
        }
    }
}
