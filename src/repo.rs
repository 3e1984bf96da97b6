use tracing::info;

use crate::error::ProxyError;
use crate::types::{RepoMetadata, RepoParams};
use crate::AppState;

pub const MISSING_REPO: &str = "Missing user or repo parameter";

/// Owner and name of a repository, validated from the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub user: String,
    pub repo: String,
}

impl RepoRef {
    /// Both values must be present and non-blank. Dot segments are rejected
    /// so they cannot rewrite the upstream path.
    pub fn from_params(params: &RepoParams) -> Result<Self, ProxyError> {
        let valid = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty() && *v != "." && *v != "..")
                .map(str::to_string)
        };
        match (valid(&params.user), valid(&params.repo)) {
            (Some(user), Some(repo)) => Ok(Self { user, repo }),
            _ => Err(ProxyError::MissingParam(MISSING_REPO)),
        }
    }
}

/// Looks the repository up through the API and projects the scalar fields.
pub async fn repository_metadata(state: &AppState, target: &RepoRef) -> Result<RepoMetadata, ProxyError> {
    let repo = state.github.get_repository(&target.user, &target.repo).await?;
    info!("Fetched metadata for {}", repo.full_name);
    Ok(RepoMetadata::from(repo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(user: Option<&str>, repo: Option<&str>) -> RepoParams {
        RepoParams {
            user: user.map(str::to_string),
            repo: repo.map(str::to_string),
        }
    }

    #[test]
    fn test_repo_ref_requires_both() {
        assert!(RepoRef::from_params(&params(None, Some("r"))).is_err());
        assert!(RepoRef::from_params(&params(Some("u"), None)).is_err());
        assert!(RepoRef::from_params(&params(Some(""), Some("r"))).is_err());
        assert!(RepoRef::from_params(&params(Some("u"), Some(".."))).is_err());

        let target = RepoRef::from_params(&params(Some(" rust-lang "), Some("rust"))).unwrap();
        assert_eq!(target.user, "rust-lang");
        assert_eq!(target.repo, "rust");
    }
}
