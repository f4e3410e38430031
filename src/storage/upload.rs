use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_MIME: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// A decoded multipart file part. `ok` mirrors the transport status of the
/// part: a file that arrived truncated or unreadable is kept in the map (so
/// callers can tell "supplied but broken" from "omitted") but is never
/// persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime: String,
    pub data: Vec<u8>,
    pub size: usize,
    pub ok: bool,
}

#[derive(Debug)]
pub enum UploadError {
    Transport,
    UnsupportedType(String),
    TooLarge(usize),
    Io(std::io::Error),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Transport => write!(f, "file did not arrive intact"),
            UploadError::UnsupportedType(mime) => write!(f, "unsupported file type: {}", mime),
            UploadError::TooLarge(size) => {
                write!(f, "file of {} bytes exceeds the {} byte limit", size, MAX_UPLOAD_BYTES)
            }
            UploadError::Io(e) => write!(f, "write error: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

/// Filesystem-backed image store. Files land under `<root>/uploads/` and the
/// returned paths are always storage-relative (`uploads/...`), never
/// host-qualified.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        let root = env::var("UPLOAD_DIR").unwrap_or_else(|_| "data".to_string());
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates and persists an uploaded file, returning its
    /// storage-relative path. Nothing is written when validation fails.
    pub fn save(&self, file: &UploadedFile, subfolder: Option<&str>) -> Result<String, UploadError> {
        if !file.ok {
            return Err(UploadError::Transport);
        }
        if !ALLOWED_MIME.contains(&file.mime.as_str()) {
            return Err(UploadError::UnsupportedType(file.mime.clone()));
        }
        if file.size > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge(file.size));
        }

        let mut dir = self.root.join("uploads");
        if let Some(sub) = subfolder {
            dir.push(sub);
        }
        std::fs::create_dir_all(&dir).map_err(UploadError::Io)?;

        let ext = Path::new(&file.name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin");
        // uuid + timestamp keeps concurrent uploads from colliding
        let filename = format!("{}_{}.{}", Uuid::new_v4().simple(), Utc::now().timestamp(), ext);
        std::fs::write(dir.join(&filename), &file.data).map_err(UploadError::Io)?;

        let rel = match subfolder {
            Some(sub) => format!("uploads/{}/{}", sub, filename),
            None => format!("uploads/{}", filename),
        };
        Ok(rel)
    }

    /// Best-effort removal of a stored file, used when the owning record is
    /// deleted. Failures are logged and never propagated.
    pub fn remove(&self, rel_path: &str) {
        let rel = rel_path.trim_start_matches('/');
        if !rel.starts_with("uploads/") {
            return;
        }
        let full = self.root.join(rel);
        if full.exists() {
            if let Err(e) = std::fs::remove_file(&full) {
                tracing::warn!("failed to remove {}: {}", full.display(), e);
            }
        }
    }

    /// Absolute filesystem path for a stored relative path.
    pub fn resolve(&self, rel_path: &str) -> PathBuf {
        self.root.join(rel_path.trim_start_matches('/'))
    }
}
