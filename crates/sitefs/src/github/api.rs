//! Contents API client.
//!
//! One synchronous `GET /repos/{owner}/{repo}/contents/{path}` per lookup.
//! The JSON body is either an object (a file) or an array (a directory).

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use url::Url;

use super::repo::RepoDescriptor;
use crate::error::{FsError, FsResult};

/// Default API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Fetches contents of one path at the configured ref.
///
/// The seam between the backend and HTTP. Implementations return
/// `FsError::NotFound` for missing paths and `FsError::Transport` for every
/// other failure.
pub trait ContentsApi: Send + Sync {
    /// Fetch the file or directory listing at `path`.
    fn get_contents(&self, path: &str) -> FsResult<Contents>;
}

/// Response body of a contents lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    /// JSON array: the path is a directory.
    Dir(Vec<ContentEntry>),
    /// JSON object: the path is a file.
    File(FileContent),
}

/// A file as returned by the contents API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileContent {
    /// Base name.
    #[serde(default)]
    pub name: String,
    /// Path from the repository root.
    #[serde(default)]
    pub path: String,
    /// Declared size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Encoded body.
    #[serde(default)]
    pub content: Option<String>,
    /// `base64`, or empty for raw content.
    #[serde(default)]
    pub encoding: Option<String>,
}

impl FileContent {
    /// Decode the transport encoding.
    ///
    /// `base64` bodies may carry line breaks. An empty or absent encoding
    /// means the content is raw.
    pub fn decode(&self) -> FsResult<Vec<u8>> {
        let content = self.content.as_deref().unwrap_or_default();
        match self.encoding.as_deref() {
            Some("base64") => {
                let compact: String = content.split_ascii_whitespace().collect();
                STANDARD
                    .decode(compact)
                    .map_err(|e| FsError::transport(format!("decode {}: {e}", self.path)))
            }
            None | Some("") => Ok(content.as_bytes().to_vec()),
            Some(other) => Err(FsError::transport(format!(
                "unsupported content encoding {other:?} for {}",
                self.path
            ))),
        }
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentEntry {
    /// Base name.
    pub name: String,
    /// Path from the repository root.
    #[serde(default)]
    pub path: String,
    /// Size in bytes, 0 for directories.
    #[serde(default)]
    pub size: u64,
    /// `file`, `dir`, `symlink` or `submodule`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentEntry {
    /// True for `dir` entries; everything else lists as a file.
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }
}

/// HTTP client for the contents API.
///
/// The agent pools connections and is safe to share between threads.
pub struct GithubApi {
    agent: ureq::Agent,
    api_url: String,
    repo: RepoDescriptor,
}

impl std::fmt::Debug for GithubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubApi")
            .field("api_url", &self.api_url)
            .field("repo", &self.repo)
            .finish()
    }
}

impl GithubApi {
    /// Build a client for `repo` rooted at `api_url`.
    pub fn new(repo: RepoDescriptor, api_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("sitefs/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_string(),
            repo,
        }
    }

    /// Get the repository descriptor.
    pub fn repo(&self) -> &RepoDescriptor {
        &self.repo
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}` with every path segment
    /// percent-encoded, so `#`, `?` and `%` stay part of the name.
    fn contents_url(&self, path: &str) -> FsResult<Url> {
        let mut url = Url::parse(&self.api_url).map_err(|e| {
            FsError::invalid_config(format!("invalid api url {:?}: {e}", self.api_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                FsError::invalid_config(format!("api url {:?} cannot be a base", self.api_url))
            })?
            .pop_if_empty()
            .extend(["repos", self.repo.owner.as_str(), self.repo.repo.as_str(), "contents"])
            .extend(path.split('/'));
        Ok(url)
    }
}

impl ContentsApi for GithubApi {
    fn get_contents(&self, path: &str) -> FsResult<Contents> {
        let url = self.contents_url(path)?;
        let mut request = self
            .agent
            .request_url("GET", &url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28");
        if !self.repo.token.is_empty() {
            request = request.set("Authorization", &format!("Bearer {}", self.repo.token));
        }
        if let Some(reference) = &self.repo.reference {
            request = request.query("ref", reference);
        }

        tracing::debug!(%path, reference = ?self.repo.reference, "GET contents");
        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Err(FsError::not_found(path)),
            Err(ureq::Error::Status(code, response)) => {
                return Err(FsError::transport(format!(
                    "GET {url}: HTTP {code} {}",
                    response.status_text()
                )));
            }
            Err(e) => return Err(FsError::transport(format!("GET {url}: {e}"))),
        };

        serde_json::from_reader(response.into_reader())
            .map_err(|e| FsError::transport(format!("decode contents of {path:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content: &str, encoding: Option<&str>) -> FileContent {
        FileContent {
            name: "a.md".into(),
            path: "content/a.md".into(),
            size: 5,
            content: Some(content.into()),
            encoding: encoding.map(str::to_string),
        }
    }

    #[test]
    fn test_decode_base64_with_line_breaks() {
        assert_eq!(file("aGVs\nbG8=\n", Some("base64")).decode().unwrap(), b"hello");
    }

    #[test]
    fn test_decode_raw() {
        assert_eq!(file("hello", None).decode().unwrap(), b"hello");
        assert_eq!(file("hello", Some("")).decode().unwrap(), b"hello");
    }

    #[test]
    fn test_decode_failures_are_transport() {
        assert!(matches!(
            file("", Some("none")).decode(),
            Err(FsError::Transport(_))
        ));
        assert!(matches!(
            file("!!not base64!!", Some("base64")).decode(),
            Err(FsError::Transport(_))
        ));
    }

    #[test]
    fn test_parse_object_and_array() {
        let body = r#"{"type":"file","name":"a.md","path":"content/a.md","size":5,
            "content":"aGVsbG8=\n","encoding":"base64","sha":"abc"}"#;
        match serde_json::from_str::<Contents>(body).unwrap() {
            Contents::File(f) => assert_eq!(f.decode().unwrap(), b"hello"),
            other => panic!("expected file, got {other:?}"),
        }

        let body = r#"[{"type":"dir","name":"posts","path":"content/posts","size":0},
            {"type":"file","name":"a.md","path":"content/a.md","size":5},
            {"type":"symlink","name":"l","path":"content/l","size":4}]"#;
        match serde_json::from_str::<Contents>(body).unwrap() {
            Contents::Dir(entries) => {
                let dirs: Vec<_> = entries.iter().map(ContentEntry::is_dir).collect();
                assert_eq!(dirs, vec![true, false, false]);
            }
            other => panic!("expected dir, got {other:?}"),
        }
    }

    #[test]
    fn test_contents_url() {
        let repo = RepoDescriptor::parse("t", "o/r", None).unwrap();
        let api = GithubApi::new(repo, "http://localhost:1/", Duration::from_secs(1));
        let url = |path| api.contents_url(path).unwrap().to_string();
        assert_eq!(url("a/b.md"), "http://localhost:1/repos/o/r/contents/a/b.md");
        assert_eq!(url(""), "http://localhost:1/repos/o/r/contents/");
        assert_eq!(url("content/c#1.md"), "http://localhost:1/repos/o/r/contents/content/c%231.md");
        assert_eq!(url("what?.md"), "http://localhost:1/repos/o/r/contents/what%3F.md");
        assert_eq!(url("100%25.md"), "http://localhost:1/repos/o/r/contents/100%2525.md");
        assert_eq!(url("my post.md"), "http://localhost:1/repos/o/r/contents/my%20post.md");
    }

    #[test]
    fn test_contents_url_keeps_api_prefix() {
        let repo = RepoDescriptor::parse("t", "o/r", None).unwrap();
        let api = GithubApi::new(repo, "https://ghe.example.com/api/v3", Duration::from_secs(1));
        assert_eq!(
            api.contents_url("a.md").unwrap().as_str(),
            "https://ghe.example.com/api/v3/repos/o/r/contents/a.md"
        );

        let repo = RepoDescriptor::parse("t", "o/r", None).unwrap();
        let api = GithubApi::new(repo, "not a url", Duration::from_secs(1));
        assert!(matches!(api.contents_url("a.md"), Err(FsError::InvalidConfig(_))));
    }
}
