//! Remote source configuration.
//!
//! Values come from an optional TOML file, then environment variables, which
//! win over the file.
//!
//! ```toml
//! token = "ghp_..."
//! repo = "gohugoio/hugoDocs"
//! branch = "master"
//! timeout_secs = 10
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};
use crate::github::{DEFAULT_API_URL, RepoDescriptor};

/// Environment variable holding the API token.
pub const ENV_TOKEN: &str = "SITEFS_GITHUB_TOKEN";
/// Environment variable holding `owner/repo`.
pub const ENV_REPO: &str = "SITEFS_GITHUB_REPO";
/// Environment variable holding the ref to read.
pub const ENV_BRANCH: &str = "SITEFS_GITHUB_BRANCH";
/// Environment variable overriding the API root.
pub const ENV_API_URL: &str = "SITEFS_GITHUB_API";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "SITEFS_HTTP_TIMEOUT";

/// Where the remote backend reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// API token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Repository in `owner/repo` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Branch, tag or commit. Absent reads the default branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// API root.
    pub api_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            token: None,
            repo: None,
            branch: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    /// Load from an optional file, then apply the process environment.
    pub fn load(path: Option<&Path>) -> FsResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> FsResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FsError::invalid_config(format!("read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> FsResult<Self> {
        toml::from_str(text).map_err(|e| FsError::invalid_config(e.to_string()))
    }

    /// Override fields with whatever `lookup` finds. Empty values are ignored.
    pub fn apply_env<F>(mut self, lookup: F) -> FsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = get(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(repo) = get(ENV_REPO) {
            self.repo = Some(repo);
        }
        if let Some(branch) = get(ENV_BRANCH) {
            self.branch = Some(branch);
        }
        if let Some(api_url) = get(ENV_API_URL) {
            self.api_url = api_url;
        }
        if let Some(timeout) = get(ENV_TIMEOUT) {
            self.timeout_secs = timeout.parse().map_err(|_| {
                FsError::invalid_config(format!(
                    "{ENV_TIMEOUT} must be whole seconds, got {timeout:?}"
                ))
            })?;
        }
        Ok(self)
    }

    /// Set the repository.
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Set the ref.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Set the token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the API root.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Validate and build the repository descriptor.
    pub fn repo_descriptor(&self) -> FsResult<RepoDescriptor> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FsError::invalid_config(format!("missing token (set {ENV_TOKEN})")))?;
        let repo = self
            .repo
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| FsError::invalid_config(format!("missing repo (set {ENV_REPO})")))?;
        if self.timeout_secs == 0 {
            return Err(FsError::invalid_config("timeout_secs must be positive"));
        }
        RepoDescriptor::parse(token, repo, self.branch.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.repo_descriptor().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = SourceConfig::from_toml_str(
            r#"
            token = "t0k"
            repo = "gohugoio/hugoDocs"
            branch = "master"
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        let desc = config.repo_descriptor().unwrap();
        assert_eq!(desc.owner, "gohugoio");
        assert_eq!(desc.reference.as_deref(), Some("master"));
    }

    #[test]
    fn test_bad_toml_is_invalid_config() {
        assert!(matches!(
            SourceConfig::from_toml_str("timeout_secs = \"soon\""),
            Err(FsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_env_wins_over_file() {
        let config = SourceConfig::from_toml_str("repo = \"a/b\"\nbranch = \"main\"")
            .unwrap()
            .apply_env(env(&[
                (ENV_TOKEN, "from-env"),
                (ENV_REPO, "c/d"),
                (ENV_BRANCH, ""),
                (ENV_TIMEOUT, "5"),
            ]))
            .unwrap();
        assert_eq!(config.token.as_deref(), Some("from-env"));
        assert_eq!(config.repo.as_deref(), Some("c/d"));
        // empty env values do not clear file values
        assert_eq!(config.branch.as_deref(), Some("main"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_bad_timeout() {
        let err = SourceConfig::default()
            .apply_env(env(&[(ENV_TIMEOUT, "soon")]))
            .unwrap_err();
        assert!(matches!(err, FsError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_fields() {
        let err = SourceConfig::default().with_repo("a/b").repo_descriptor().unwrap_err();
        assert!(err.to_string().contains(ENV_TOKEN));

        let err = SourceConfig::default().with_token("t").repo_descriptor().unwrap_err();
        assert!(err.to_string().contains(ENV_REPO));

        let err = SourceConfig::default()
            .with_token("t")
            .with_repo("nope")
            .repo_descriptor()
            .unwrap_err();
        assert!(err.to_string().contains("owner/repo"));
    }
}
