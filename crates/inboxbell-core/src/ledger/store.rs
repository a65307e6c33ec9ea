//! Durable storage for the seen-item ledger.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::model::ItemKind;
use crate::{Error, Result};

/// On-disk shape: `{"message": {id: 1}, "comment": {id: 1}}`.
///
/// Values are sentinels; any JSON value is accepted when reading so files
/// written by earlier tools keep loading.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    message: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    comment: BTreeMap<String, serde_json::Value>,
}

/// Set of item IDs that have already been notified, per item kind.
///
/// An ID present under a kind has triggered exactly one delivered
/// notification. Every mutation is followed by [`SeenLedger::persist`] in
/// the poll loop, which replaces the file atomically.
#[derive(Debug, Clone)]
pub struct SeenLedger {
    path: PathBuf,
    comment: BTreeSet<String>,
    message: BTreeSet<String>,
}

impl SeenLedger {
    /// Creates an empty ledger that will persist to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            comment: BTreeSet::new(),
            message: BTreeSet::new(),
        }
    }

    /// Loads the ledger from `path`.
    ///
    /// A missing file is a fresh start: the ledger is empty and the parent
    /// directory is created so the first persist succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptLedger`] if the file exists but is not a valid
    /// ledger, and [`Error::LedgerIo`] if it cannot be read or the parent
    /// directory cannot be created.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No seen data found at {}, starting fresh", path.display());
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| Error::LedgerIo {
                            path: path.clone(),
                            source,
                        })?;
                }
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(Error::LedgerIo { path, source }),
        };

        let file: LedgerFile =
            serde_json::from_slice(&bytes).map_err(|source| Error::CorruptLedger {
                path: path.clone(),
                source,
            })?;

        let ledger = Self {
            comment: file.comment.into_keys().collect(),
            message: file.message.into_keys().collect(),
            path,
        };

        info!(
            comments = ledger.comment.len(),
            messages = ledger.message.len(),
            "Loaded seen data from {}",
            ledger.path.display()
        );
        Ok(ledger)
    }

    /// Returns true iff `id` was previously recorded under `kind`.
    #[must_use]
    pub fn is_seen(&self, kind: ItemKind, id: &str) -> bool {
        self.set(kind).contains(id)
    }

    /// Records `id` under `kind`. Returns false if it was already present.
    pub fn mark_seen(&mut self, kind: ItemKind, id: &str) -> bool {
        let set = match kind {
            ItemKind::Comment => &mut self.comment,
            ItemKind::Message => &mut self.message,
        };
        if set.contains(id) {
            return false;
        }
        set.insert(id.to_string())
    }

    /// Number of IDs recorded under `kind`.
    #[must_use]
    pub fn count(&self, kind: ItemKind) -> usize {
        self.set(kind).len()
    }

    /// Total number of recorded IDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.comment.len() + self.message.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path the ledger persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the full ledger to disk.
    ///
    /// The contents go to a temporary file in the same directory, which is
    /// flushed to disk and then renamed over the ledger. A failure at any
    /// point leaves the previous file untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerIo`] if any step of the write fails.
    pub async fn persist(&self) -> Result<()> {
        let sentinel = serde_json::Value::from(1);
        let file = LedgerFile {
            message: self
                .message
                .iter()
                .map(|id| (id.clone(), sentinel.clone()))
                .collect(),
            comment: self
                .comment
                .iter()
                .map(|id| (id.clone(), sentinel.clone()))
                .collect(),
        };
        let contents = serde_json::to_vec_pretty(&file)?;

        write_atomic(&self.path, &contents)
            .await
            .map_err(|source| Error::LedgerIo {
                path: self.path.clone(),
                source,
            })?;

        debug!(entries = self.len(), "Persisted seen data to {}", self.path.display());
        Ok(())
    }

    fn set(&self, kind: ItemKind) -> &BTreeSet<String> {
        match kind {
            ItemKind::Comment => &self.comment,
            ItemKind::Message => &self.message,
        }
    }
}

/// Temporary sibling used while replacing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "ledger".into(), |n| n.to_string_lossy());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Replaces `path` with `contents` via write-to-temp then rename.
async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = temp_path(path);

    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await?;
        sync_parent(path).await?;
        Ok::<_, std::io::Error>(())
    }
    .await;

    if result.is_err() {
        // Best effort; the stale temp file is overwritten on the next attempt.
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    result
}

/// Flushes the directory entry so the rename survives a power loss.
#[cfg(unix)]
async fn sync_parent(path: &Path) -> std::io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => tokio::fs::File::open(parent).await?.sync_all().await,
        None => Ok(()),
    }
}

#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn ledger_path(dir: &TempDir) -> PathBuf {
        dir.path().join("data").join("reddit_seen")
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = ledger_path(&dir);

        let ledger = SeenLedger::load(&path).await.unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.is_seen(ItemKind::Comment, "c1"));
        // Parent directory is ready for the first persist.
        assert!(path.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = ledger_path(&dir);

        let mut ledger = SeenLedger::load(&path).await.unwrap();
        ledger.mark_seen(ItemKind::Comment, "c1");
        ledger.mark_seen(ItemKind::Comment, "c2");
        ledger.mark_seen(ItemKind::Message, "m1");
        ledger.persist().await.unwrap();

        let reloaded = SeenLedger::load(&path).await.unwrap();
        assert!(reloaded.is_seen(ItemKind::Comment, "c1"));
        assert!(reloaded.is_seen(ItemKind::Comment, "c2"));
        assert!(reloaded.is_seen(ItemKind::Message, "m1"));
        assert!(!reloaded.is_seen(ItemKind::Message, "c1"));
        assert_eq!(reloaded.count(ItemKind::Comment), 2);
        assert_eq!(reloaded.count(ItemKind::Message), 1);
    }

    #[tokio::test]
    async fn test_on_disk_format() {
        let dir = TempDir::new().unwrap();
        let path = ledger_path(&dir);

        let mut ledger = SeenLedger::load(&path).await.unwrap();
        ledger.mark_seen(ItemKind::Message, "m1");
        ledger.persist().await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({ "message": { "m1": 1 }, "comment": {} })
        );
        // Pretty-printed
        assert!(std::fs::read_to_string(&path).unwrap().contains('\n'));
    }

    #[tokio::test]
    async fn test_accepts_any_sentinel_and_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reddit_seen");
        std::fs::write(&path, r#"{"comment": {"c1": true, "c2": 1}}"#).unwrap();

        let ledger = SeenLedger::load(&path).await.unwrap();
        assert!(ledger.is_seen(ItemKind::Comment, "c1"));
        assert!(ledger.is_seen(ItemKind::Comment, "c2"));
        assert_eq!(ledger.count(ItemKind::Message), 0);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reddit_seen");
        std::fs::write(&path, b"{\"comment\": {\"c1\": 1").unwrap();

        let err = SeenLedger::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::CorruptLedger { .. }));
        // The corrupt file is left for inspection.
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reddit_seen");

        let mut ledger = SeenLedger::load(&path).await.unwrap();
        ledger.mark_seen(ItemKind::Comment, "c1");
        ledger.persist().await.unwrap();
        let before = std::fs::read(&path).unwrap();

        // A directory squatting on the temp path makes the write fail
        // before anything reaches the ledger file.
        std::fs::create_dir(temp_path(&path)).unwrap();
        ledger.mark_seen(ItemKind::Comment, "c2");
        let err = ledger.persist().await.unwrap_err();
        assert!(matches!(err, Error::LedgerIo { .. }));

        assert_eq!(std::fs::read(&path).unwrap(), before);
        let reloaded = SeenLedger::load(&path).await.unwrap();
        assert!(reloaded.is_seen(ItemKind::Comment, "c1"));
        assert!(!reloaded.is_seen(ItemKind::Comment, "c2"));
    }

    #[tokio::test]
    async fn test_stale_temp_file_is_ignored_and_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reddit_seen");

        let mut ledger = SeenLedger::load(&path).await.unwrap();
        ledger.mark_seen(ItemKind::Message, "m1");
        ledger.persist().await.unwrap();

        // Half-written leftovers from a crash mid-write.
        std::fs::write(temp_path(&path), b"{\"message\": {\"m").unwrap();

        let reloaded = SeenLedger::load(&path).await.unwrap();
        assert!(reloaded.is_seen(ItemKind::Message, "m1"));

        reloaded.persist().await.unwrap();
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_mark_seen_is_idempotent() {
        let mut ledger = SeenLedger::empty("unused");
        assert!(ledger.mark_seen(ItemKind::Comment, "c1"));
        assert!(!ledger.mark_seen(ItemKind::Comment, "c1"));
        assert_eq!(ledger.len(), 1);
        // Same id under another kind is tracked separately.
        assert!(ledger.mark_seen(ItemKind::Message, "c1"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/var/lib/inboxbell/reddit_seen"));
        assert_eq!(tmp, Path::new("/var/lib/inboxbell/.reddit_seen.tmp"));
    }

    proptest! {
        #[test]
        fn prop_marking_twice_matches_marking_once(ids in proptest::collection::vec("[a-z0-9]{1,8}", 0..32)) {
            let mut once = SeenLedger::empty("unused");
            let mut twice = SeenLedger::empty("unused");
            for id in &ids {
                once.mark_seen(ItemKind::Comment, id);
                twice.mark_seen(ItemKind::Comment, id);
                twice.mark_seen(ItemKind::Comment, id);
            }
            prop_assert_eq!(once.len(), twice.len());
            for id in &ids {
                prop_assert!(twice.is_seen(ItemKind::Comment, id));
                prop_assert!(!twice.is_seen(ItemKind::Message, id));
            }
        }
    }
}
