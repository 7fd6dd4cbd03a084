use crate::container::chunk::Chunk;
use crate::error::{CatalogError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sequential catalog writer. Chunks are self-contained, so the file needs no
/// header or index and can keep growing across appending runs.
pub struct CatalogWriter {
    f: File,
    path: PathBuf,
    pub chunks: u64,
    pub bytes: u64,
}

impl CatalogWriter {
    /// Truncate-or-create, or append when asked and the catalog already exists.
    pub fn open(path: &Path, append: bool) -> Result<Self> {
        let opened = if append && path.exists() {
            OpenOptions::new().append(true).open(path)
        } else {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            File::create(path)
        };
        let f = opened.map_err(|e| {
            CatalogError::Io(std::io::Error::new(
                e.kind(),
                format!("error creating file {}: {e}", path.display()),
            ))
        })?;
        debug!(path = %path.display(), append, "catalog opened");
        Ok(Self {
            f,
            path: path.to_path_buf(),
            chunks: 0,
            bytes: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        self.f.write_all(&chunk.bytes)?;
        self.chunks += 1;
        self.bytes += chunk.bytes.len() as u64;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.f.flush()?;
        self.f.sync_all()?;
        Ok(())
    }
}
