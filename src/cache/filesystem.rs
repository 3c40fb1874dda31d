use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::CacheDriver;
use crate::error::CacheError;

/// Default file extension of cache entries
pub const DEFAULT_EXTENSION: &str = ".cache";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache driver storing one file per key in a directory.
///
/// File names are the percent-encoded key followed by the extension, so any
/// key maps to a single flat file. Writes go to a temporary file in the same
/// directory which is then renamed over the target: a reader sees either the
/// old entry or the new one, never a partial write.
#[derive(Debug, Clone)]
pub struct FilesystemCache {
    dir: PathBuf,
    extension: String,
}

impl FilesystemCache {
    /// Create a driver rooted at `dir`. The directory is created on first write.
    ///
    /// `extension` may be given with or without the leading dot.
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        let extension = match extension {
            "" => String::new(),
            ext if ext.starts_with('.') => ext.to_string(),
            ext => format!(".{ext}"),
        };
        Self {
            dir: dir.into(),
            extension,
        }
    }

    /// Directory holding the entries
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", urlencoding::encode(key), self.extension))
    }

    fn key_of(&self, file_name: &str) -> Option<String> {
        if file_name.starts_with('.') || file_name.ends_with(".tmp") {
            return None;
        }
        let encoded = file_name.strip_suffix(self.extension.as_str())?;
        urlencoding::decode(encoded).ok().map(|k| k.into_owned())
    }
}

impl CacheDriver for FilesystemCache {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(key, e)),
        }
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::io(key, e))?;

        let target = self.path_for(key);
        let temp = self.dir.join(format!(
            ".{}.{}.{}.tmp",
            urlencoding::encode(key),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(value)?;
            file.sync_all()?;
            fs::rename(&temp, &target)
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&temp);
            return Err(CacheError::io(key, e));
        }

        debug!(key = %key, path = %target.display(), bytes = value.len(), "Cache entry written");
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, CacheError> {
        match fs::metadata(self.path_for(key)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(key, e)),
        }
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(key, e)),
        }
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for key in self.keys()? {
            if self.delete(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let dir_label = self.dir.display().to_string();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(dir_label, e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(dir_label.clone(), e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if let Some(key) = entry.file_name().to_str().and_then(|n| self.key_of(n)) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
