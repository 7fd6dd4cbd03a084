use crate::error::Result;
use crate::header::{Header, Tag};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Collects absolute paths named by any record's dependency lists (pass 1).
#[derive(Debug, Default)]
pub struct UsefulFileSetBuilder {
    paths: HashSet<Vec<u8>>,
}

impl UsefulFileSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<Vec<u8>>) {
        self.paths.insert(path.into());
    }

    /// Seed from a file with one path per line.
    pub fn seed_from_file(&mut self, path: &Path) -> Result<usize> {
        let before = self.paths.len();
        let mut r = BufReader::new(File::open(path)?);
        let mut line = Vec::new();
        while r.read_until(b'\n', &mut line)? > 0 {
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            if !line.is_empty() {
                self.paths.insert(std::mem::take(&mut line));
            }
            line.clear();
        }
        Ok(self.paths.len() - before)
    }

    /// Returns how many dependency names looked like paths.
    pub fn scan(&mut self, h: &Header) -> usize {
        let mut n = 0;
        for tag in Tag::DEPENDENCY_NAMES {
            let Some(names) = h.get_strings(tag) else {
                continue;
            };
            for dep in names.iter().filter(|d| d.first() == Some(&b'/')) {
                self.paths.insert(dep.clone());
                n += 1;
            }
        }
        n
    }

    pub fn freeze(self) -> UsefulFileSet {
        UsefulFileSet { paths: self.paths }
    }
}

/// Frozen set consulted while stripping; read-only for the rest of the run.
#[derive(Debug, Default)]
pub struct UsefulFileSet {
    paths: HashSet<Vec<u8>>,
}

impl UsefulFileSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains_path(&self, path: &[u8]) -> bool {
        self.paths.contains(path)
    }

    pub fn contains(&self, dir: &[u8], base: &[u8]) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        let mut full = Vec::with_capacity(dir.len() + base.len());
        full.extend_from_slice(dir);
        full.extend_from_slice(base);
        self.paths.contains(full.as_slice())
    }
}
