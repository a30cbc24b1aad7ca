//! Repository descriptor.

use crate::error::{FsError, FsResult};

/// Which repository and ref to read, and the credential to read it with.
///
/// Built once and shared read-only. `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct RepoDescriptor {
    /// User or organization.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch, tag or commit. `None` reads the default branch.
    pub reference: Option<String>,
    /// Bearer token; empty sends no `Authorization` header.
    pub token: String,
}

impl RepoDescriptor {
    /// Parse an `owner/repo` string.
    ///
    /// An empty `branch` is treated as no ref at all.
    pub fn parse(token: impl Into<String>, repo: &str, branch: Option<&str>) -> FsResult<Self> {
        let (owner, name) = match repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                (owner, name)
            }
            _ => {
                return Err(FsError::invalid_config(format!(
                    "invalid repo path {repo:?}, expected owner/repo style"
                )));
            }
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: name.to_string(),
            reference: branch.filter(|b| !b.is_empty()).map(str::to_string),
            token: token.into(),
        })
    }

    /// `owner/repo`, for logs and messages.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Debug for RepoDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoDescriptor")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("reference", &self.reference)
            .field("token", &"<redacted>")
            .finish()
    }
}
