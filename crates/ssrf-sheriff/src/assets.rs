//! Read-only store of response templates and media placeholders.
//!
//! Assets live in a single flat directory. Lookups never fail: a missing,
//! unreadable, or rejected name yields an empty body so the canary still
//! answers with its token header.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Flat directory of named template and media files.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Create a store rooted at `root`. The directory is not touched until
    /// the first [`load`](Self::load).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory assets are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the asset called `name`.
    ///
    /// Returns an empty vector when the name is not a plain file name or
    /// the file cannot be read.
    pub async fn load(&self, name: &str) -> Vec<u8> {
        let Some(path) = self.resolve(name) else {
            warn!(asset = name, "rejected asset name outside the template directory");
            return Vec::new();
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(asset = name, path = %path.display(), error = %e, "asset unavailable");
                Vec::new()
            }
        }
    }

    /// Join `name` onto the root if it addresses a file directly inside it.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        is_flat_name(name).then(|| self.root.join(name))
    }
}

/// A name is addressable only if it is a single, ordinary path component.
fn is_flat_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
