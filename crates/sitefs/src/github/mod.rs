//! Remote-API backend: a repository read through the GitHub contents API.
//!
//! Every open is one HTTP request. File bodies arrive base64-encoded and are
//! decoded before a handle is returned; directories arrive as listings.

mod api;
mod backend;
mod repo;

pub use api::{ContentEntry, Contents, ContentsApi, DEFAULT_API_URL, FileContent, GithubApi};
pub use backend::GithubBackend;
pub use repo::RepoDescriptor;
