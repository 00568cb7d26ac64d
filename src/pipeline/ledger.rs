//! Revision manifest: logical file name to fingerprinted file name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::error::AssetError;
use crate::pipeline::asset::AssetFile;
use crate::util::fs::{read_to_string, write_atomic};

/// Owner of the revision manifest file.
///
/// Every read-merge-write happens under one lock, so concurrent tasks
/// recording different asset types never lose each other's entries.
#[derive(Debug)]
pub struct RevisionLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RevisionLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RevisionLedger {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record fingerprinted outputs written under `<dist><dir>/`.
    ///
    /// Outputs without a revision are ignored. Returns the number of
    /// entries written; nothing touches the disk when that is zero.
    pub fn record(&self, dir: &str, outputs: &[AssetFile]) -> Result<usize, AssetError> {
        let entries: BTreeMap<String, String> = outputs
            .iter()
            .filter_map(|file| {
                let original = file.revision_of.as_ref()?;
                Some((
                    format!("{}/{}", dir, original),
                    format!("{}/{}", dir, file.relative_slash()),
                ))
            })
            .collect();

        self.merge(entries)
    }

    /// Insert or overwrite entries, preserving every other entry.
    pub fn merge(&self, entries: BTreeMap<String, String>) -> Result<usize, AssetError> {
        if entries.is_empty() {
            return Ok(0);
        }

        let _guard = self
            .lock
            .lock()
            .map_err(|_| AssetError::io(&self.path, "revision manifest lock poisoned"))?;

        let mut manifest = self.read_unlocked()?;
        let count = entries.len();
        manifest.extend(entries);

        let mut json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| AssetError::io(&self.path, e))?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())
            .map_err(|e| AssetError::io_chain(&self.path, e))?;

        tracing::debug!("recorded {} revision(s) in {}", count, self.path.display());
        Ok(count)
    }

    /// Current contents; empty when the file does not exist.
    pub fn entries(&self) -> Result<BTreeMap<String, String>, AssetError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AssetError::io(&self.path, "revision manifest lock poisoned"))?;
        self.read_unlocked()
    }

    fn read_unlocked(&self) -> Result<BTreeMap<String, String>, AssetError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents =
            read_to_string(&self.path).map_err(|e| AssetError::io_chain(&self.path, e))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            AssetError::config_at(&self.path, format!("malformed revision manifest: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tempfile::TempDir;

    fn revved(name: &str, original: &str) -> AssetFile {
        let mut file = AssetFile::new(format!("/ns/{}", name), "/ns", b"x".to_vec());
        file.revision_of = Some(original.to_string());
        file
    }

    #[test]
    fn test_record_writes_dist_relative_entries() {
        let tmp = TempDir::new().unwrap();
        let ledger = RevisionLedger::new(tmp.path().join("dist/assets.json"));

        let n = ledger
            .record("styles", &[revved("main-0123456789.css", "main.css")])
            .unwrap();
        assert_eq!(n, 1);

        let entries = ledger.entries().unwrap();
        assert_eq!(
            entries.get("styles/main.css").map(String::as_str),
            Some("styles/main-0123456789.css")
        );
    }

    #[test]
    fn test_merge_keeps_other_types() {
        let tmp = TempDir::new().unwrap();
        let ledger = RevisionLedger::new(tmp.path().join("assets.json"));

        ledger
            .record("styles", &[revved("main-aaaaaaaaaa.css", "main.css")])
            .unwrap();
        ledger
            .record("scripts", &[revved("main-bbbbbbbbbb.js", "main.js")])
            .unwrap();
        ledger
            .record("styles", &[revved("main-cccccccccc.css", "main.css")])
            .unwrap();

        let entries = ledger.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["styles/main.css"], "styles/main-cccccccccc.css");
        assert_eq!(entries["scripts/main.js"], "scripts/main-bbbbbbbbbb.js");
    }

    #[test]
    fn test_nothing_hashed_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("assets.json");
        let ledger = RevisionLedger::new(&path);

        let plain = AssetFile::new("/ns/main.css", "/ns", b"x".to_vec());
        assert_eq!(ledger.record("styles", &[plain]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_records() {
        let tmp = TempDir::new().unwrap();
        let ledger = Arc::new(RevisionLedger::new(tmp.path().join("assets.json")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    ledger
                        .record(
                            "scripts",
                            &[revved(&format!("b{}-0000000000.js", i), &format!("b{}.js", i))],
                        )
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.entries().unwrap().len(), 8);
    }

    #[test]
    fn test_malformed_manifest_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("assets.json");
        std::fs::write(&path, "not json").unwrap();

        let ledger = RevisionLedger::new(&path);
        let err = ledger.entries().unwrap_err();
        assert_eq!(err.kind(), crate::core::error::ErrorKind::Config);
    }
}
