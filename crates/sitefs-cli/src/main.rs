//! sitefs command-line browser.
//!
//! Reads site content through either backend.
//!
//! Usage:
//!   # Repository via the contents API (token from SITEFS_GITHUB_TOKEN)
//!   sitefs --repo gohugoio/hugoDocs --branch master ls content
//!
//!   # Local directory through the host bridge
//!   sitefs --local ./site cat config.toml

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use sitefs::{GithubBackend, HostBackend, HostThread, LocalDirHost, SiteFs, SourceConfig};

/// Browse a read-only site filesystem.
#[derive(Parser, Debug)]
#[command(name = "sitefs")]
#[command(about = "Browse site content from a repository or a local host bridge")]
struct Args {
    /// TOML config file for the repository source
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repository in owner/repo form (overrides config and environment)
    #[arg(long)]
    repo: Option<String>,

    /// Branch, tag or commit to read
    #[arg(long)]
    branch: Option<String>,

    /// Serve this local directory through the host bridge instead
    #[arg(long, conflicts_with_all = ["config", "repo", "branch"])]
    local: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a file's bytes to stdout
    Cat { path: String },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Show metadata for a path
    Stat { path: String },
}

fn main() -> Result<()> {
    // stdout carries file content; logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    // Keep the host thread alive for as long as the filesystem is used.
    let (fs, host) = match &args.local {
        Some(root) => {
            let root = root.clone();
            tracing::info!(root = %root.display(), "serving local directory");
            let host = HostThread::spawn(move || LocalDirHost::new(root))
                .context("failed to start host bridge")?;
            (SiteFs::new(HostBackend::new(host.bridge())), Some(host))
        }
        None => {
            let mut config = SourceConfig::load(args.config.as_deref())?;
            if let Some(repo) = &args.repo {
                config = config.with_repo(repo.clone());
            }
            if let Some(branch) = &args.branch {
                config = config.with_branch(branch.clone());
            }
            (SiteFs::new(GithubBackend::from_config(&config)?), None)
        }
    };

    let result = run(&fs, &args.command);
    if let Some(host) = host {
        host.shutdown();
    }
    result
}

fn run(fs: &SiteFs, command: &Command) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Cat { path } => {
            let bytes = fs.read_to_end(path).with_context(|| format!("cat {path}"))?;
            out.write_all(&bytes)?;
        }
        Command::Ls { path } => {
            let entries = fs.read_dir(path).with_context(|| format!("ls {path}"))?;
            for entry in entries {
                let marker = if entry.kind.is_dir() { "d" } else { "-" };
                writeln!(out, "{marker} {:>10} {}", entry.size, entry.name)?;
            }
        }
        Command::Stat { path } => {
            let meta = fs.stat(path).with_context(|| format!("stat {path}"))?;
            writeln!(out, "name: {}", meta.name)?;
            writeln!(out, "kind: {}", if meta.is_dir() { "directory" } else { "file" })?;
            writeln!(out, "size: {}", meta.size)?;
            writeln!(out, "mode: {:o}", meta.perm())?;
        }
    }
    out.flush()?;
    Ok(())
}
