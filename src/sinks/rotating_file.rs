//! Rotating file sink
//!
//! Writes to a single log file and rotates it by size. A rotated file is
//! renamed to `<stem>-<timestamp>.<ext>` next to the original, e.g.
//! `app-2025-01-08T10-30-45.123.log`, and a fresh file takes its place.
//! After each rotation old backups are pruned by count and by age, and
//! optionally gzip-compressed.

use crate::core::error::{LoggerError, Result};
use chrono::{Local, NaiveDateTime, SubsecRound, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MEGABYTE: u64 = 1024 * 1024;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";
/// Ages beyond this are treated as "keep forever" in practice
const MAX_AGE_DAYS_CAP: u64 = 365_000;

/// Size, age and retention limits for a [`RotatingFile`].
///
/// # Examples
///
/// ```
/// use rust_buffered_logger::sinks::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size_mb(50)
///     .with_max_backups(7)
///     .with_compression(true);
/// assert_eq!(policy.max_bytes(), 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate before the file would grow past this many megabytes (0 = default 10)
    pub max_size_mb: u64,
    /// Delete backups older than this many days (0 = keep regardless of age)
    pub max_age_days: u64,
    /// Keep at most this many backups (0 = keep all)
    pub max_backups: usize,
    /// Use local time instead of UTC in backup names
    pub local_time: bool,
    /// Gzip backups after rotation
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: 10,
            max_age_days: 30,
            max_backups: 20,
            local_time: true,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_size_mb = megabytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Size limit in bytes
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        let megabytes = if self.max_size_mb == 0 {
            Self::default().max_size_mb
        } else {
            self.max_size_mb
        };
        megabytes.saturating_mul(MEGABYTE)
    }
}

/// Size-rotated log file implementing `io::Write`.
///
/// # Examples
///
/// ```no_run
/// use rust_buffered_logger::sinks::{RotatingFile, RotationPolicy};
/// use std::io::Write;
///
/// let mut file = RotatingFile::with_policy("/var/log/app.log", RotationPolicy::new()).unwrap();
/// file.write_all(b"[ Info] main.rs:1: started\n").unwrap();
/// ```
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    /// Size limit in bytes, overridable for tests
    max_bytes: u64,
    file: Option<File>,
    size: u64,
}

impl RotatingFile {
    /// Open `path` with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Open `path`, appending to an existing file
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let max_bytes = policy.max_bytes();
        Self::open(path.as_ref().to_path_buf(), policy, max_bytes)
    }

    fn open(path: PathBuf, policy: RotationPolicy, max_bytes: u64) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok(Self {
            path,
            policy,
            max_bytes,
            file: Some(file),
            size,
        })
    }

    #[cfg(test)]
    fn with_max_bytes<P: AsRef<Path>>(
        path: P,
        policy: RotationPolicy,
        max_bytes: u64,
    ) -> Result<Self> {
        Self::open(path.as_ref().to_path_buf(), policy, max_bytes)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes in the current file
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.size
    }

    /// Close the current file, move it to a backup name and start a new one.
    ///
    /// # Errors
    ///
    /// Returns error if the rename or the new file fails
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.path.exists() {
            let backup = self.free_backup_path();
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to create new log file: {}", e),
                )
            })?;
        self.file = Some(file);
        self.size = 0;

        self.prune_backups();
        Ok(())
    }

    /// Existing backups, newest first
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be read
    pub fn backups(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .backup_entries()?
            .into_iter()
            .map(|(_, path)| path)
            .collect())
    }

    fn now(&self) -> NaiveDateTime {
        if self.policy.local_time {
            Local::now().naive_local()
        } else {
            Utc::now().naive_utc()
        }
    }

    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("log")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        (stem, ext)
    }

    fn backup_path(&self, at: NaiveDateTime) -> PathBuf {
        let (stem, ext) = self.name_parts();
        self.path
            .with_file_name(format!("{}-{}{}", stem, at.format(BACKUP_TIME_FORMAT), ext))
    }

    /// Backup name for now, kept strictly newer than any existing backup
    /// so that rotations within one millisecond still sort correctly
    fn free_backup_path(&self) -> PathBuf {
        let mut at = self.now().trunc_subsecs(3);
        let newest = self
            .backup_entries()
            .ok()
            .and_then(|backups| backups.into_iter().next());
        if let Some((newest, _)) = newest {
            if at <= newest {
                at = newest + chrono::Duration::milliseconds(1);
            }
        }
        self.backup_path(at)
    }

    fn backup_entries(&self) -> Result<Vec<(NaiveDateTime, PathBuf)>> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (stem, ext) = self.name_parts();
        let prefix = format!("{}-", stem);

        let entries = fs::read_dir(&dir).map_err(|e| {
            LoggerError::io_operation(
                "list log backups",
                format!("Failed to read directory '{}'", dir.display()),
                e,
            )
        })?;

        let mut backups: Vec<(NaiveDateTime, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let rest = name.strip_prefix(&prefix)?;
                let rest = rest.strip_suffix(COMPRESS_SUFFIX).unwrap_or(rest);
                let stamp = rest.strip_suffix(ext.as_str())?;
                let at = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
                Some((at, entry.path()))
            })
            .collect();

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups)
    }

    /// Remove backups beyond the count and age limits, compress the rest.
    ///
    /// Failures here never fail the write that triggered the rotation.
    fn prune_backups(&self) {
        let backups = match self.backup_entries() {
            Ok(backups) => backups,
            Err(e) => {
                eprintln!("[WARN] Skipping backup cleanup: {}", e);
                return;
            }
        };

        let cutoff = (self.policy.max_age_days > 0).then(|| {
            let days = self.policy.max_age_days.min(MAX_AGE_DAYS_CAP) as i64;
            self.now() - chrono::Duration::days(days)
        });

        for (index, (at, path)) in backups.iter().enumerate() {
            let over_count = self.policy.max_backups > 0 && index >= self.policy.max_backups;
            let too_old = cutoff.is_some_and(|cutoff| *at < cutoff);

            if over_count || too_old {
                if let Err(e) = fs::remove_file(path) {
                    eprintln!("[WARN] Failed to remove old backup {}: {}", path.display(), e);
                }
            } else if self.policy.compress && !is_compressed(path) {
                if let Err(e) = compress_file(path) {
                    eprintln!("[WARN] Failed to compress backup {}: {}", path.display(), e);
                }
            }
        }
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn is_compressed(path: &Path) -> bool {
    path.to_str().is_some_and(|p| p.ends_with(COMPRESS_SUFFIX))
}

/// Gzip `path` to `path.gz` through a temporary file.
///
/// The original is only removed once the compressed copy is complete.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let gz_path = append_suffix(path, COMPRESS_SUFFIX);
    let temp_gz_path = append_suffix(&gz_path, ".tmp");

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut inner| inner.flush());
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if len > self.max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("write length {} exceeds maximum file size {}", len, self.max_bytes),
            ));
        }

        if self.file.is_none() || self.size.saturating_add(len) > self.max_bytes {
            self.rotate().map_err(LoggerError::into_io)?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Log file not open").into_io())?;
        let written = file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
    }
}
