//! Filesystem storage for uploaded documents
//!
//! Files land in `<root>/packages/<package_id>/<millis>-<nonce>-<sanitized name>`
//! and are served back under [`PUBLIC_PREFIX`] by the HTTP layer. Existing
//! files are never overwritten.

use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// URL prefix the upload root is mounted at
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Longest stored file name, before the timestamp prefix
const MAX_FILE_NAME_LEN: usize = 128;

/// Attempts at finding a free name before giving up
const MAX_NAME_ATTEMPTS: usize = 4;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("invalid file name regex"));

/// Errors from storing or removing uploads
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file '{name}' is {size} bytes, over the {max} byte limit")]
    TooLarge { name: String, size: usize, max: usize },

    #[error("file '{name}' is empty")]
    Empty { name: String },

    #[error("url '{0}' is outside the upload directory")]
    OutsideRoot(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A file written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub url: String,
}

/// Upload directory plus per-file size limit
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Write one uploaded file under the package's directory.
    pub async fn save(
        &self,
        package_id: Uuid,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty {
                name: original_name.to_owned(),
            });
        }
        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                name: original_name.to_owned(),
                size: bytes.len(),
                max: self.max_bytes,
            });
        }

        let dir = self.root.join("packages").join(package_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let safe_name = sanitize_file_name(original_name);
        let (stored_name, path, mut file) = self.create_unique(&dir, &safe_name).await?;
        if let Err(e) = write_all(&mut file, bytes).await {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), size = bytes.len(), "stored upload");
        Ok(StoredFile {
            url: format!("{}/packages/{}/{}", PUBLIC_PREFIX, package_id, stored_name),
            path,
        })
    }

    async fn create_unique(
        &self,
        dir: &Path,
        safe_name: &str,
    ) -> Result<(String, PathBuf, tokio::fs::File), StorageError> {
        let mut last_err = None;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let nonce = Uuid::new_v4().simple().to_string();
            let stored_name = format!(
                "{}-{}-{}",
                Utc::now().timestamp_millis(),
                &nonce[..12],
                safe_name
            );
            let path = dir.join(&stored_name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((stored_name, path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => last_err = Some(e),
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_err
            .unwrap_or_else(|| io::Error::from(io::ErrorKind::AlreadyExists))
            .into())
    }

    /// Map a public URL back to its path under the root.
    pub fn path_for_url(&self, url: &str) -> Result<PathBuf, StorageError> {
        let relative = url
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::OutsideRoot(url.to_owned()))?;

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::OutsideRoot(url.to_owned()));
        }

        Ok(self.root.join(relative))
    }

    /// Remove a stored file by URL. A file that is already gone is not an error.
    pub async fn remove(&self, url: &str) -> Result<(), StorageError> {
        let path = self.path_for_url(url)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_all(file: &mut tokio::fs::File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

/// Reduce a client-supplied file name to a safe single path segment.
pub fn sanitize_file_name(name: &str) -> String {
    // Browsers on Windows may send the full path
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    let truncated: String = cleaned.chars().take(MAX_FILE_NAME_LEN).collect();
    if truncated.is_empty() || truncated.chars().all(|c| c == '_') {
        "file".to_owned()
    } else {
        truncated
    }
}

/// Guess a MIME type from the file extension when the client sent none.
pub fn guess_mime_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("invoice 2024.pdf"), "invoice_2024.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\ana\\scan.png"), "scan.png");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(sanitize_file_name("???"), "file");
        assert_eq!(sanitize_file_name(&"a".repeat(300)).len(), MAX_FILE_NAME_LEN);
    }

    #[test]
    fn guesses_mime_types() {
        assert_eq!(guess_mime_type("scan.PDF"), "application/pdf");
        assert_eq!(guess_mime_type("photo.jpeg"), "image/jpeg");
        assert_eq!(guess_mime_type("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path(), 1024);
        let package_id = Uuid::new_v4();

        let stored = store.save(package_id, "receipt.pdf", b"%PDF-1.4").await.unwrap();

        assert!(stored.url.starts_with(&format!("/uploads/packages/{}/", package_id)));
        assert!(stored.url.ends_with("-receipt.pdf"));
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"%PDF-1.4");
        assert_eq!(store.path_for_url(&stored.url).unwrap(), stored.path);

        store.remove(&stored.url).await.unwrap();
        assert!(!stored.path.exists());
        // second remove is a no-op
        store.remove(&stored.url).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_oversized_and_empty_files() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path(), 4);

        let err = store.save(Uuid::new_v4(), "big.bin", b"12345").await.unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { size: 5, max: 4, .. }));

        let err = store.save(Uuid::new_v4(), "empty.bin", b"").await.unwrap_err();
        assert!(matches!(err, StorageError::Empty { .. }));
    }

    #[tokio::test]
    async fn same_name_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path(), 1024);
        let package_id = Uuid::new_v4();

        let first = store.save(package_id, "scan.pdf", b"first").await.unwrap();
        let second = store.save(package_id, "scan.pdf", b"second").await.unwrap();

        assert_ne!(first.url, second.url);
        assert_eq!(tokio::fs::read(&first.path).await.unwrap(), b"first");
        assert_eq!(tokio::fs::read(&second.path).await.unwrap(), b"second");

        store.remove(&first.url).await.unwrap();
        assert!(second.path.exists());
    }

    #[tokio::test]
    async fn concurrent_saves_get_distinct_files() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path(), 1024);
        let package_id = Uuid::new_v4();

        for _ in 0..20 {
            let (a, b) = tokio::join!(
                store.save(package_id, "scan.pdf", b"a"),
                store.save(package_id, "scan.pdf", b"b"),
            );
            let (a, b) = (a.unwrap(), b.unwrap());
            assert_ne!(a.path, b.path);
            assert_eq!(tokio::fs::read(&a.path).await.unwrap(), b"a");
            assert_eq!(tokio::fs::read(&b.path).await.unwrap(), b"b");
        }
    }

    #[test]
    fn url_traversal_is_rejected() {
        let store = UploadStore::new("/srv/uploads", 1024);
        assert!(matches!(
            store.path_for_url("/uploads/../secrets"),
            Err(StorageError::OutsideRoot(_))
        ));
        assert!(matches!(
            store.path_for_url("/elsewhere/file.pdf"),
            Err(StorageError::OutsideRoot(_))
        ));
    }
}
