//! Size-bounded rolling log file.
//!
//! The file is opened lazily on the first write. When a write would push it
//! past the size limit, the current file is renamed to
//! `<stem>-<UTC timestamp><ext>` and a fresh one is started. After every
//! rotation old backups are pruned by count and age and, if enabled,
//! compressed with zstd.
//!
//! ```text
//! logs/
//! ├── app.log                              # active file
//! ├── app-2026-01-21T14-13-48.120.log      # newest backup
//! └── app-2026-01-20T09-02-11.007.log.zst  # compressed backup
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::RotationPolicy;

const MEGABYTE: u64 = 1024 * 1024;
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const BACKUP_TIME_LAYOUT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".zst";
const ZSTD_LEVEL: i32 = 3;

/// A rotated copy of the log file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
    pub time: DateTime<Utc>,
    pub compressed: bool,
}

/// Buffered file writer that rotates on size.
#[derive(Debug)]
pub struct RollingFile {
    path: PathBuf,
    max_bytes: u64,
    max_age_days: u32,
    max_backups: usize,
    compress: bool,
    file: Option<BufWriter<File>>,
    size: u64,
}

impl RollingFile {
    /// A writer for `path` bounded by `policy` (sizes in megabytes).
    pub fn new(path: impl Into<PathBuf>, policy: &RotationPolicy) -> Self {
        let max_size_mb = if policy.max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            policy.max_size_mb
        };
        Self::with_max_bytes(path, max_size_mb.saturating_mul(MEGABYTE), policy)
    }

    /// Like [`RollingFile::new`] but with the size limit given in bytes.
    pub fn with_max_bytes(path: impl Into<PathBuf>, max_bytes: u64, policy: &RotationPolicy) -> Self {
        Self {
            path: path.into(),
            max_bytes: max_bytes.max(1),
            max_age_days: policy.max_age_days,
            max_backups: policy.max_backups,
            compress: policy.compress,
            file: None,
            size: 0,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Append `buf`, rotating first if it would not fit.
    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let len = buf.len() as u64;
        if len > self.max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write length {} exceeds maximum file size {}",
                    len, self.max_bytes
                ),
            ));
        }

        if self.file.is_none() {
            self.open_existing_or_new(len)?;
        }
        if self.size + len > self.max_bytes {
            self.rotate()?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file is not open"))?;
        file.write_all(buf)?;
        self.size += len;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Close the current file, move it aside and start a new one.
    pub fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        self.open_new()?;
        self.mill();
        Ok(())
    }

    /// Rotated backups on disk, newest first.
    pub fn backups(&self) -> io::Result<Vec<Backup>> {
        let (stem, ext) = self.stem_and_ext();
        let prefix = format!("{}-", stem);
        let compressed_ext = format!("{}{}", ext, COMPRESS_SUFFIX);

        let mut backups = Vec::new();
        for dir_entry in fs::read_dir(self.dir())? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let name = dir_entry.file_name().to_string_lossy().into_owned();
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            let (stamp, compressed) = if let Some(stamp) = rest.strip_suffix(&compressed_ext) {
                (stamp, true)
            } else if let Some(stamp) = rest.strip_suffix(&ext) {
                (stamp, false)
            } else {
                continue;
            };

            if let Ok(time) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_LAYOUT) {
                backups.push(Backup {
                    path: dir_entry.path(),
                    time: time.and_utc(),
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(backups)
    }

    fn open_existing_or_new(&mut self, write_len: u64) -> io::Result<()> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() + write_len <= self.max_bytes => {
                let file = OpenOptions::new().append(true).open(&self.path)?;
                self.file = Some(BufWriter::new(file));
                self.size = meta.len();
                Ok(())
            }
            Ok(_) => self.rotate(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.open_new(),
            Err(e) => Err(e),
        }
    }

    fn open_new(&mut self) -> io::Result<()> {
        create_log_dir(&self.dir())?;

        if self.path.exists() {
            let backup = self.next_backup_name();
            fs::rename(&self.path, &backup)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.file = Some(BufWriter::new(file));
        self.size = 0;
        Ok(())
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn stem_and_ext(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (stem, ext)
    }

    // Backup names only carry milliseconds, so two rotations within one
    // millisecond must not reuse a name or sort before an existing backup.
    fn next_backup_name(&self) -> PathBuf {
        let mut millis = Utc::now().timestamp_millis();
        if let Ok(backups) = self.backups() {
            if let Some(newest) = backups.first() {
                millis = millis.max(newest.time.timestamp_millis() + 1);
            }
        }
        let time = DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now);

        let (stem, ext) = self.stem_and_ext();
        self.dir()
            .join(format!("{}-{}{}", stem, time.format(BACKUP_TIME_LAYOUT), ext))
    }

    fn mill(&self) {
        // Cleanup failures must not fail the write that triggered rotation.
        if let Err(e) = self.mill_backups() {
            let _ = writeln!(
                io::stderr().lock(),
                "teelog: failed to clean up backups of {}: {}",
                self.path.display(),
                e
            );
        }
    }

    fn mill_backups(&self) -> io::Result<()> {
        if self.max_backups == 0 && self.max_age_days == 0 && !self.compress {
            return Ok(());
        }

        let mut backups = self.backups()?;
        let mut expired = Vec::new();

        if self.max_backups > 0 && backups.len() > self.max_backups {
            expired.extend(backups.split_off(self.max_backups));
        }
        if self.max_age_days > 0 {
            let cutoff = Utc::now() - chrono::Duration::days(i64::from(self.max_age_days));
            let (keep, old): (Vec<Backup>, Vec<Backup>) =
                backups.into_iter().partition(|b| b.time >= cutoff);
            backups = keep;
            expired.extend(old);
        }

        let mut first_err = None;
        for backup in &expired {
            if let Err(e) = fs::remove_file(&backup.path) {
                first_err.get_or_insert(e);
            }
        }
        if self.compress {
            for backup in backups.iter().filter(|b| !b.compressed) {
                if let Err(e) = compress_file(&backup.path) {
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn create_log_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}

fn compress_file(src: &Path) -> io::Result<()> {
    let mut dst = src.as_os_str().to_owned();
    dst.push(COMPRESS_SUFFIX);
    let dst = PathBuf::from(dst);

    let input = File::open(src)?;
    let output = File::create(&dst)?;
    if let Err(e) = zstd::stream::copy_encode(input, output, ZSTD_LEVEL) {
        let _ = fs::remove_file(&dst);
        return Err(e);
    }
    fs::remove_file(src)
}
