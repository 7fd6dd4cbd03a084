use crate::error::{CatalogError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A package file discovered in the input directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageEntry {
    pub path: PathBuf,
    /// File name; the record identity.
    pub identity: String,
    pub size: u64,
    pub mtime: i64,
}

fn mtime_from(md: &fs::Metadata) -> i64 {
    md.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn selected(name: &str) -> bool {
    !name.starts_with('.') && name.ends_with(".rpm")
}

pub fn stat_entry(path: &Path) -> Result<PackageEntry> {
    let md = fs::metadata(path)?;
    let identity = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CatalogError::header(path, "file name is not valid UTF-8"))?
        .to_string();
    Ok(PackageEntry {
        path: path.to_path_buf(),
        identity,
        size: md.len(),
        mtime: mtime_from(&md),
    })
}

/// Package files directly inside `dir`, sorted byte-wise by name.
pub fn scan_packages(dir: &Path) -> Result<Vec<PackageEntry>> {
    let mut entries = Vec::new();
    for e in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let e = e.map_err(std::io::Error::other)?;
        if !e.file_type().is_file() {
            continue;
        }
        let Some(name) = e.file_name().to_str() else {
            return Err(CatalogError::header(e.path(), "file name is not valid UTF-8"));
        };
        if !selected(name) {
            continue;
        }
        entries.push(stat_entry(e.path())?);
    }
    entries.sort_by(|a, b| a.identity.cmp(&b.identity));
    Ok(entries)
}
