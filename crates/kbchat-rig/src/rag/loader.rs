//! Loads text documents from a folder.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::TRACING_TARGET;
use crate::{Error, Result};

/// File extensions treated as text documents.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "csv", "json", "html", "htm", "xml", "yaml", "yml", "toml",
    "log",
];

/// A document read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Stable identifier derived from the relative path.
    pub id: String,
    /// File name.
    pub name: String,
    /// Path relative to the document folder.
    pub path: PathBuf,
    /// Document text.
    pub text: String,
}

impl SourceDocument {
    /// Creates a document with an id derived from `path`.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = hex::encode(Sha256::digest(path.to_string_lossy().as_bytes()));

        Self {
            id,
            name,
            path,
            text: text.into(),
        }
    }
}

/// Reads supported text files from a folder.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    root: PathBuf,
    recursive: bool,
}

impl DocumentLoader {
    /// Creates a loader for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: false,
        }
    }

    /// Sets whether subdirectories are read.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Returns the folder being loaded.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads every supported, non-hidden file.
    ///
    /// A missing or unreadable root folder is an error. Unreadable files and
    /// subfolders are skipped with a warning. Documents are ordered by path.
    /// Each folder is read at most once, so symlinked folders never loop.
    pub async fn load(&self) -> Result<Vec<SourceDocument>> {
        let metadata = tokio::fs::metadata(&self.root)
            .await
            .map_err(|e| Error::loader(self.root.display(), e))?;

        if !metadata.is_dir() {
            return Err(Error::loader(self.root.display(), "not a directory"));
        }

        let mut documents = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let canonical = tokio::fs::canonicalize(&dir)
                .await
                .unwrap_or_else(|_| dir.clone());
            if !visited.insert(canonical) {
                tracing::debug!(
                    target: TRACING_TARGET,
                    path = %dir.display(),
                    "skipping already visited folder"
                );
                continue;
            }

            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if dir == self.root => return Err(Error::loader(dir.display(), e)),
                Err(e) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        path = %dir.display(),
                        error = %e,
                        "skipping unreadable folder"
                    );
                    continue;
                }
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| Error::loader(dir.display(), e))?
            {
                let path = entry.path();
                if is_hidden(&path) {
                    continue;
                }

                let Ok(metadata) = tokio::fs::metadata(&path).await else {
                    continue;
                };

                if metadata.is_dir() {
                    if self.recursive {
                        pending.push(path);
                    }
                    continue;
                }

                if !metadata.is_file() || !is_supported(&path) {
                    continue;
                }

                if let Some(document) = self.read_document(&path).await {
                    documents.push(document);
                }
            }
        }

        documents.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::info!(
            target: TRACING_TARGET,
            root = %self.root.display(),
            documents = documents.len(),
            "loaded documents"
        );

        Ok(documents)
    }

    async fn read_document(&self, path: &Path) -> Option<SourceDocument> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable file"
                );
                return None;
            }
        };

        let text = String::from_utf8_lossy(&bytes).into_owned();
        if text.trim().is_empty() {
            return None;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        Some(SourceDocument::new(relative, text))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write file");
    }

    #[tokio::test]
    async fn loads_supported_files_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "b.md", "# Beta");
        write(dir.path(), "a.txt", "Alpha");
        write(dir.path(), "image.png", "not text");
        write(dir.path(), ".hidden.txt", "secret");
        write(dir.path(), "empty.txt", "   ");

        let documents = DocumentLoader::new(dir.path()).load().await.expect("load");
        let names: Vec<_> = documents.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(names, vec!["a.txt", "b.md"]);
        assert_eq!(documents[0].text, "Alpha");
    }

    #[tokio::test]
    async fn recursion_is_opt_in() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "top.txt", "top");
        write(dir.path(), "nested/inner.txt", "inner");

        let flat = DocumentLoader::new(dir.path()).load().await.expect("load");
        assert_eq!(flat.len(), 1);

        let deep = DocumentLoader::new(dir.path())
            .with_recursive(true)
            .load()
            .await
            .expect("load");
        assert_eq!(deep.len(), 2);
        assert!(deep.iter().any(|d| d.path == Path::new("nested/inner.txt")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_folder_cycles_are_read_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "a.txt", "Alpha");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).expect("symlink");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("again")).expect("symlink");

        let documents = DocumentLoader::new(dir.path())
            .with_recursive(true)
            .load()
            .await
            .expect("load");

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].path, Path::new("a.txt"));
    }

    #[tokio::test]
    async fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = DocumentLoader::new(dir.path().join("missing")).load().await;
        assert!(matches!(result, Err(Error::Loader { .. })));
    }

    #[test]
    fn ids_are_stable() {
        let first = SourceDocument::new("docs/a.txt", "one");
        let second = SourceDocument::new("docs/a.txt", "two");
        assert_eq!(first.id, second.id);
        assert_eq!(first.id.len(), 64);
    }
}
