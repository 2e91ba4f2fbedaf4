use crate::dialog::DialogKind;
use crate::forms::InputState;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

/// Interval between draft flushes.
pub const DRAFT_INTERVAL: Duration = Duration::from_secs(30);

/// Environment variable overriding the draft directory.
pub const DRAFT_DIR_ENV: &str = "CD_DRAFT_DIR";

/// Default location of draft blobs: `$CD_DRAFT_DIR`, else the user data
/// directory, else `./drafts`.
pub fn default_draft_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DRAFT_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs_next::data_dir()
        .map(|d| d.join("chart_desk").join("drafts"))
        .unwrap_or_else(|| PathBuf::from("drafts"))
}

fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Named text blobs kept as one file per name.
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn write(&self, name: &str, text: &str) -> Result<()> {
        let path = self.path(name);
        atomic_write(&path, text.as_bytes())
            .with_context(|| format!("write draft {}", path.display()))
    }

    /// Read a blob. Unreadable files are moved aside as `*.corrupt`.
    pub fn read(&self, name: &str) -> Option<String> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!("unreadable draft {}: {err}", path.display());
                let _ = fs::rename(&path, path.with_extension("corrupt"));
                None
            }
        }
    }

    pub fn clear(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Persist every non-empty input mapping under its stable name.
    /// Returns how many blobs were written.
    pub fn flush(&self, inputs: &InputState) -> Result<usize> {
        let mut written = 0;
        for kind in DialogKind::ALL {
            if let Some(json) = inputs.mapping_json(kind)? {
                self.write(kind.draft_name(), &json)?;
                written += 1;
            }
        }
        tracing::debug!(written, "flushed drafts");
        Ok(written)
    }

    /// Bring the blob of `kind` in line with its mapping: rewritten while
    /// it has slots, removed once it is empty. Returns whether a blob
    /// remains.
    pub fn sync(&self, inputs: &InputState, kind: DialogKind) -> Result<bool> {
        match inputs.mapping_json(kind)? {
            Some(json) => {
                self.write(kind.draft_name(), &json)?;
                Ok(true)
            }
            None => {
                self.clear(kind.draft_name())?;
                Ok(false)
            }
        }
    }

    /// Replace each input mapping that has a stored blob. Blobs that do not
    /// parse are skipped so the rest still restore.
    pub fn restore(&self, inputs: &mut InputState) -> usize {
        let mut restored = 0;
        for kind in DialogKind::ALL {
            let Some(text) = self.read(kind.draft_name()) else {
                continue;
            };
            match inputs.replace_mapping(kind, &text) {
                Ok(count) => {
                    tracing::debug!(?kind, count, "restored draft");
                    restored += 1;
                }
                Err(err) => tracing::warn!(?kind, "ignoring draft: {err}"),
            }
        }
        restored
    }
}

/// Fixed-interval flush timer driven by the UI loop.
#[derive(Debug, Clone)]
pub struct DraftSchedule {
    interval: Duration,
    next: Instant,
}

impl DraftSchedule {
    /// The first tick is one full interval after `start`.
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next: start + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a flush is due at `now`; arms the following tick when it is.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }

    /// Time left until the next tick.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}
