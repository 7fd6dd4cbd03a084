//! Persistent `path -> (mtime, checksum)` store.
//!
//! On disk this is an append-only log: `MAGIC`, then records of
//! `uvarint(len) || CBOR(LogEntry)`. Replay is last-wins; a torn tail from an
//! interrupted run is cut off on open.

use crate::error::{CatalogError, Result};
use crate::util::varint::{get_uvarint, put_uvarint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MAGIC: &[u8; 8] = b"PKCSUM\0\x01";
/// Compact once stale entries outnumber live ones and this floor.
const COMPACT_MIN_STALE: usize = 64;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
struct LogEntry {
    path: String,
    mtime: i64,
    checksum: String,
}

#[derive(Clone, Debug)]
struct Cached {
    mtime: i64,
    checksum: String,
}

pub struct ChecksumCache {
    entries: HashMap<String, Cached>,
    log: Option<File>,
    path: Option<PathBuf>,
    /// Records in the log, live or superseded.
    logged: usize,
    pub hits: u64,
    pub misses: u64,
}

/// blake3 of the whole file, lowercase hex.
pub fn file_checksum(path: &Path) -> Result<String> {
    let f = File::open(path).map_err(|e| {
        CatalogError::header(path, format!("cannot read package for checksum: {e}"))
    })?;
    let mut hasher = blake3::Hasher::new();
    std::io::copy(&mut BufReader::new(f), &mut hasher)
        .map_err(|e| CatalogError::header(path, format!("cannot read package for checksum: {e}")))?;
    Ok(hex::encode(hasher.finalize().as_bytes()))
}

impl ChecksumCache {
    /// Nothing persisted; every lookup hashes the file.
    pub fn in_memory() -> Self {
        Self {
            entries: HashMap::new(),
            log: None,
            path: None,
            logged: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Open (or create) the store for `namespace` under `<root>/<tool>/`.
    pub fn open(root: &Path, tool: &str, namespace: &str) -> Result<Self> {
        let dir = root.join(tool);
        fs::create_dir_all(&dir)
            .map_err(|e| CatalogError::Cache(format!("{}: {e}", dir.display())))?;
        let digest = blake3::hash(namespace.as_bytes());
        let path = dir.join(format!("{}.log", &digest.to_hex()[..16]));

        let mut cache = Self::in_memory();
        let valid_len = if path.exists() {
            let buf = fs::read(&path)
                .map_err(|e| CatalogError::Cache(format!("{}: {e}", path.display())))?;
            cache.replay(&buf, &path)
        } else {
            0
        };

        let mut f = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| CatalogError::Cache(format!("{}: {e}", path.display())))?;
        let cache_err = |e: std::io::Error| CatalogError::Cache(format!("{}: {e}", path.display()));
        if valid_len == 0 {
            f.set_len(0).map_err(cache_err)?;
            f.write_all(MAGIC).map_err(cache_err)?;
        } else {
            f.set_len(valid_len as u64).map_err(cache_err)?;
        }
        drop(f);
        let f = OpenOptions::new().append(true).open(&path).map_err(cache_err)?;

        debug!(path = %path.display(), entries = cache.entries.len(), "checksum cache opened");
        cache.log = Some(f);
        cache.path = Some(path);
        Ok(cache)
    }

    /// Load records from `buf`; returns the length of the intact prefix (0 = start over).
    fn replay(&mut self, buf: &[u8], path: &Path) -> usize {
        if buf.len() < MAGIC.len() || &buf[..MAGIC.len()] != MAGIC {
            warn!(path = %path.display(), "checksum cache has unknown format; starting over");
            return 0;
        }
        let mut rest = &buf[MAGIC.len()..];
        let mut good = MAGIC.len();
        loop {
            let len = match get_uvarint(&mut rest) {
                Ok(Some(n)) => n as usize,
                Ok(None) => break,
                Err(_) => break,
            };
            if rest.len() < len {
                break;
            }
            let Ok(entry) = ciborium::from_reader::<LogEntry, _>(&rest[..len]) else {
                break;
            };
            rest = &rest[len..];
            good = buf.len() - rest.len();
            self.logged += 1;
            self.entries.insert(
                entry.path,
                Cached {
                    mtime: entry.mtime,
                    checksum: entry.checksum,
                },
            );
        }
        if good < buf.len() {
            warn!(
                path = %path.display(),
                dropped = buf.len() - good,
                "checksum cache tail is damaged; truncating"
            );
        }
        good
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached checksum when `mtime` matches, otherwise hash the file and remember it.
    pub fn checksum(&mut self, path: &Path, mtime: i64) -> Result<String> {
        let key = path.to_string_lossy().into_owned();
        if let Some(c) = self.entries.get(&key) {
            if c.mtime == mtime {
                self.hits += 1;
                return Ok(c.checksum.clone());
            }
        }
        self.misses += 1;
        let sum = file_checksum(path)?;
        let entry = LogEntry {
            path: key,
            mtime,
            checksum: sum.clone(),
        };
        self.append(&entry);
        self.entries.insert(
            entry.path,
            Cached {
                mtime,
                checksum: entry.checksum,
            },
        );
        Ok(sum)
    }

    /// A failed write only costs future hits, so the log is dropped instead of failing the run.
    fn append(&mut self, entry: &LogEntry) {
        let Some(f) = self.log.as_mut() else {
            return;
        };
        let mut payload = Vec::new();
        let res = ciborium::into_writer(entry, &mut payload)
            .map_err(|e| std::io::Error::other(e.to_string()))
            .and_then(|()| {
                let mut rec = Vec::with_capacity(payload.len() + 4);
                put_uvarint(&mut rec, payload.len() as u64);
                rec.extend_from_slice(&payload);
                f.write_all(&rec)
            });
        match res {
            Ok(()) => self.logged += 1,
            Err(e) => {
                warn!(error = %e, "checksum cache write failed; continuing without persistence");
                self.log = None;
            }
        }
    }

    /// Flush the log, rewriting it when superseded records dominate.
    pub fn finish(mut self) -> Result<()> {
        let Some(mut f) = self.log.take() else {
            return Ok(());
        };
        f.flush()?;
        drop(f);
        let stale = self.logged.saturating_sub(self.entries.len());
        if stale > self.entries.len() && stale > COMPACT_MIN_STALE {
            if let Some(path) = &self.path {
                self.compact(path)?;
            }
        }
        Ok(())
    }

    fn compact(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| CatalogError::Cache(format!("{}: no parent", path.display())))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        let mut buf = MAGIC.to_vec();
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        for k in keys {
            let c = &self.entries[k];
            let entry = LogEntry {
                path: k.clone(),
                mtime: c.mtime,
                checksum: c.checksum.clone(),
            };
            let mut payload = Vec::new();
            ciborium::into_writer(&entry, &mut payload)
                .map_err(|e| CatalogError::Cache(e.to_string()))?;
            put_uvarint(&mut buf, payload.len() as u64);
            buf.extend_from_slice(&payload);
        }
        tmp.write_all(&buf)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .map_err(|e| CatalogError::Cache(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), live = self.entries.len(), "checksum cache compacted");
        Ok(())
    }
}
