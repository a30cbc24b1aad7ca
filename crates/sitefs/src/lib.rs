//! # sitefs
//!
//! Read-only virtual filesystems for site content.
//!
//! Two backends sit behind one [`Backend`] trait and one [`SiteFs`] facade:
//! - [`github`]: a repository at a ref, read through the contents API
//! - [`host`]: a host object answering `stat`/`readFile`/`listDir` through
//!   callbacks on its own cooperative loop
//!
//! Every open fetches the entry in full and hands back an immutable
//! [`File`] snapshot. Every write-side call fails with [`FsError::ReadOnly`].

pub mod config;
pub mod error;
pub mod fs;
pub mod github;
pub mod host;
pub mod node;
pub mod ops;
pub mod path;
pub mod types;

pub use config::SourceConfig;
pub use error::{BridgeError, FsError, FsResult};
pub use fs::SiteFs;
pub use github::{ContentsApi, GithubApi, GithubBackend, RepoDescriptor};
pub use host::{
    Callback, HostBackend, HostBridge, HostMethod, HostObject, HostThread, HostValue,
    LocalDirHost, PendingRequest, ValueKind,
};
pub use node::{File, Node};
pub use ops::Backend;
pub use types::{DirEntry, FileType, Metadata, OpenFlags};
