//! Remote-API backend.

use std::time::Duration;

use super::api::{Contents, ContentsApi, DEFAULT_API_URL, GithubApi};
use super::repo::RepoDescriptor;
use crate::config::SourceConfig;
use crate::error::FsResult;
use crate::node::Node;
use crate::ops::Backend;
use crate::types::{DirEntry, FileType};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only view of one repository at one ref.
///
/// Holds nothing but the immutable client, so it is `Send + Sync` and opens
/// can run from any number of threads at once.
pub struct GithubBackend {
    api: Box<dyn ContentsApi>,
}

impl std::fmt::Debug for GithubBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubBackend").finish_non_exhaustive()
    }
}

impl GithubBackend {
    /// Connect to `owner/repo` on the public API, optionally at `branch`.
    pub fn new(token: impl Into<String>, repo: &str, branch: Option<&str>) -> FsResult<Self> {
        let descriptor = RepoDescriptor::parse(token, repo, branch)?;
        Ok(Self::with_api(GithubApi::new(
            descriptor,
            DEFAULT_API_URL,
            DEFAULT_TIMEOUT,
        )))
    }

    /// Build from validated configuration.
    pub fn from_config(config: &SourceConfig) -> FsResult<Self> {
        let descriptor = config.repo_descriptor()?;
        tracing::info!(
            repo = %descriptor.full_name(),
            reference = ?descriptor.reference,
            api = %config.api_url,
            "github backend"
        );
        Ok(Self::with_api(GithubApi::new(
            descriptor,
            &config.api_url,
            Duration::from_secs(config.timeout_secs),
        )))
    }

    /// Use any contents source, e.g. an in-memory fake.
    pub fn with_api(api: impl ContentsApi + 'static) -> Self {
        Self { api: Box::new(api) }
    }
}

impl Backend for GithubBackend {
    fn name(&self) -> &str {
        "github"
    }

    fn open(&self, path: &str) -> FsResult<Node> {
        match self.api.get_contents(path)? {
            Contents::File(file) => {
                let content = file.decode()?;
                if content.len() as u64 != file.size {
                    tracing::warn!(
                        %path,
                        declared = file.size,
                        actual = content.len(),
                        "declared size differs from decoded content"
                    );
                }
                Ok(Node::file(path, content))
            }
            Contents::Dir(entries) => {
                let children = entries
                    .into_iter()
                    .map(|entry| {
                        let kind = if entry.is_dir() {
                            FileType::Directory
                        } else {
                            FileType::File
                        };
                        DirEntry::new(entry.name, entry.size, kind)
                    })
                    .collect();
                Ok(Node::directory(path, children))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Read;

    use super::*;
    use crate::error::FsError;
    use crate::fs::SiteFs;
    use crate::github::api::{ContentEntry, FileContent};
    use crate::types::OpenFlags;

    /// Contents keyed by path; anything else is not found.
    struct FakeApi {
        contents: HashMap<String, Contents>,
    }

    impl ContentsApi for FakeApi {
        fn get_contents(&self, path: &str) -> FsResult<Contents> {
            if path == "boom" {
                return Err(FsError::transport("HTTP 500 Internal Server Error"));
            }
            self.contents
                .get(path)
                .cloned()
                .ok_or_else(|| FsError::not_found(path))
        }
    }

    fn entry(name: &str, size: u64, kind: &str) -> ContentEntry {
        ContentEntry {
            name: name.into(),
            path: format!("content/{name}"),
            size,
            kind: kind.into(),
        }
    }

    fn site() -> SiteFs {
        let mut contents = HashMap::new();
        contents.insert(
            "content/a.md".to_string(),
            Contents::File(FileContent {
                name: "a.md".into(),
                path: "content/a.md".into(),
                size: 11,
                content: Some("aGVsbG8g\nd29ybGQ=\n".into()),
                encoding: Some("base64".into()),
            }),
        );
        contents.insert(
            "content".to_string(),
            Contents::Dir(vec![
                entry("posts", 0, "dir"),
                entry("a.md", 11, "file"),
                entry("theme", 0, "submodule"),
            ]),
        );
        SiteFs::new(GithubBackend::with_api(FakeApi { contents }))
    }

    #[test]
    fn test_open_file_decodes_content() {
        let fs = site();
        let mut file = fs.open("/content/a.md").unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello world");
        assert_eq!(file.stat().unwrap().size, 11);
        assert_eq!(fs.name(), "github");
    }

    #[test]
    fn test_open_dir_lists_entries_in_order() {
        let fs = site();
        let dir = fs.open("content").unwrap();
        assert_eq!(dir.readdirnames(None).unwrap(), vec!["posts", "a.md", "theme"]);

        let entries = dir.readdir(None).unwrap();
        assert!(entries[0].kind.is_dir());
        assert!(entries[2].kind.is_file());
        assert!(dir.stat().unwrap().is_dir());
    }

    #[test]
    fn test_errors() {
        let fs = site();
        assert!(fs.open("content/missing.md").unwrap_err().is_not_found());
        assert!(matches!(fs.open("boom"), Err(FsError::Transport(_))));
        assert!(matches!(
            fs.open_file("content/a.md", OpenFlags::write()),
            Err(FsError::ReadOnly)
        ));
    }

    #[test]
    fn test_new_rejects_bad_repo() {
        assert!(matches!(
            GithubBackend::new("t", "not-a-repo", None),
            Err(FsError::InvalidConfig(_))
        ));
    }
}
