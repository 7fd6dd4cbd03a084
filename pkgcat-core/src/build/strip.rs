use crate::build::useful::UsefulFileSet;
use crate::domain::FileList;
use std::collections::HashMap;

/// Whether a file stays in a stripped list.
pub fn is_useful(dir: &[u8], base: &[u8], useful: &UsefulFileSet) -> bool {
    // PATH-like directories
    if dir.ends_with(b"/bin/") || dir.ends_with(b"/sbin/") {
        return true;
    }
    if dir == b"/usr/games/" || dir == b"/usr/lib/kde4bin/" {
        return true;
    }
    if dir.starts_with(b"/usr/share/java/") && base.ends_with(b".jar") {
        return true;
    }
    if dir.starts_with(b"/usr/share/fonts/") && (base.ends_with(b".ttf") || base.ends_with(b".otf"))
    {
        return true;
    }
    // shared libraries, versioned or not
    if let Some(rest) = base.strip_prefix(b"lib") {
        if rest.windows(3).any(|w| w == b".so") {
            return true;
        }
    }
    useful.contains(dir, base)
}

/// Output directory table; a directory gets an index the first time a kept file uses it.
#[derive(Default)]
struct DirTable<'a> {
    index: HashMap<&'a [u8], u32>,
    dirs: Vec<&'a [u8]>,
}

impl<'a> DirTable<'a> {
    fn intern(&mut self, dir: &'a [u8]) -> u32 {
        *self.index.entry(dir).or_insert_with(|| {
            self.dirs.push(dir);
            (self.dirs.len() - 1) as u32
        })
    }
}

/// Reduce `list` to its useful files, re-indexing only the directories still referenced.
pub fn strip(list: &FileList, useful: &UsefulFileSet) -> FileList {
    let mut table = DirTable::default();
    let mut basenames = Vec::new();
    let mut dirindexes = Vec::new();
    for (dir, base) in list.iter() {
        if !is_useful(dir, base, useful) {
            continue;
        }
        dirindexes.push(table.intern(dir));
        basenames.push(base.to_vec());
    }
    FileList {
        dirnames: table.dirs.into_iter().map(<[u8]>::to_vec).collect(),
        basenames,
        dirindexes,
    }
}
