//! Static file serving and SPA fallback.
//!
//! A static mount is registered as an ordinary middleware entry: a hit ends
//! the response, a miss lets the pipeline continue to later middleware and
//! route dispatch. After a full route-table miss the mount's index document
//! doubles as the SPA fallback.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::http::mime;
use crate::http::response::Response;

const DEFAULT_INDEX: &str = "index.html";

/// Options accepted at static-mount registration (and by `send_file`).
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    /// Index document served for the root path and as SPA fallback.
    /// Defaults to `index.html`.
    pub index: Option<String>,
    /// Emits `Cache-Control: max-age=<seconds>` on served files.
    pub max_age: Option<u64>,
    /// Content-Type override; otherwise inferred from the file extension.
    pub mime_type: Option<String>,
}

/// Outcome of a static service attempt.
///
/// `Missing` is a pass-through signal, never an error: the pipeline
/// continues matching. I/O failures other than not-found are real errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    Served,
    Missing,
}

/// A configured static directory.
#[derive(Debug)]
pub struct StaticMount {
    pub mount: String,
    pub root: PathBuf,
    pub options: StaticOptions,
}

impl StaticMount {
    pub fn new(mount: impl Into<String>, root: impl Into<PathBuf>, options: StaticOptions) -> Self {
        Self {
            mount: mount.into(),
            root: root.into(),
            options,
        }
    }

    fn index_document(&self) -> &str {
        self.options.index.as_deref().unwrap_or(DEFAULT_INDEX)
    }

    /// Resolves a request pathname to a candidate file.
    ///
    /// The empty or root path maps to the index document; everything else is
    /// the root joined with the request path. Paths carrying a `..` segment
    /// never resolve — traversal out of the root is treated as a miss.
    pub fn resolve(&self, pathname: &str) -> Option<PathBuf> {
        let rel = pathname.trim_start_matches('/');

        if rel.is_empty() {
            return Some(self.root.join(self.index_document()));
        }

        if rel.split('/').any(|seg| seg == "..") {
            return None;
        }

        Some(self.root.join(rel))
    }

    /// Attempts to serve the file for `pathname` into `res`.
    ///
    /// A missing file (or directory hit) reports [`ServeOutcome::Missing`]
    /// and leaves the response untouched. Any other I/O failure is an error
    /// for the error pipeline to handle.
    pub async fn serve(&self, pathname: &str, res: &mut Response) -> anyhow::Result<ServeOutcome> {
        let Some(path) = self.resolve(pathname) else {
            return Ok(ServeOutcome::Missing);
        };
        self.serve_path(&path, res).await
    }

    /// Serves the mount's index document, the SPA fallback for unmatched
    /// routes.
    pub async fn serve_index(&self, res: &mut Response) -> anyhow::Result<ServeOutcome> {
        let path = self.root.join(self.index_document());
        self.serve_path(&path, res).await
    }

    async fn serve_path(&self, path: &Path, res: &mut Response) -> anyhow::Result<ServeOutcome> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            // Not-found (and dir hits, which read as a directory error kind
            // on some platforms) fall through to the next pipeline stage.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ServeOutcome::Missing),
            Err(e) if e.kind() == ErrorKind::IsADirectory => return Ok(ServeOutcome::Missing),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Static file read failed");
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to read static file {}", path.display())));
            }
        };

        let content_type = self
            .options
            .mime_type
            .clone()
            .unwrap_or_else(|| mime::content_type_for(path).to_string());
        res.set("Content-Type", content_type);
        if let Some(max_age) = self.options.max_age {
            res.set("Cache-Control", format!("max-age={max_age}"));
        }
        res.send_bytes(bytes);

        Ok(ServeOutcome::Served)
    }
}
