// pkgcat_core/src/domain.rs
use crate::error::{CatalogError, Result};
use crate::header::{Header, Tag, Value};
use std::collections::HashMap;

/// One catalog entry: identity and group key plus the attributes that get serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageRecord {
    pub identity: String,
    pub group_key: String,
    pub header: Header,
}

impl PackageRecord {
    pub fn new(identity: String, group_key: String, header: Header) -> Result<Self> {
        if identity.is_empty() {
            return Err(CatalogError::Format("record without identity".into()));
        }
        if group_key.is_empty() {
            return Err(CatalogError::Format(format!(
                "{identity}: record without group key"
            )));
        }
        Ok(Self {
            identity,
            group_key,
            header,
        })
    }

    pub fn size(&self) -> Option<u64> {
        self.header.get_u64(Tag::FILESIZE)
    }

    pub fn checksum(&self) -> Option<String> {
        self.header.get_string(Tag::CHECKSUM)
    }
}

/// File list in directory-table form: each basename points at a directory by index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileList {
    pub dirnames: Vec<Vec<u8>>,
    pub basenames: Vec<Vec<u8>>,
    pub dirindexes: Vec<u32>,
}

impl FileList {
    /// `Ok(None)` when the header carries no file list at all.
    pub fn from_header(h: &Header) -> Result<Option<Self>> {
        let Some(basenames) = h.get_strings(Tag::BASENAMES) else {
            return Ok(None);
        };
        let dirnames = h
            .get_strings(Tag::DIRNAMES)
            .ok_or_else(|| CatalogError::Format("BASENAMES without DIRNAMES".into()))?;
        let dirindexes = match h.get(Tag::DIRINDEXES) {
            Some(Value::Int32(v)) => v.clone(),
            _ => return Err(CatalogError::Format("BASENAMES without DIRINDEXES".into())),
        };
        if dirindexes.len() != basenames.len() {
            return Err(CatalogError::Format(format!(
                "{} basenames but {} dir indexes",
                basenames.len(),
                dirindexes.len()
            )));
        }
        if let Some(bad) = dirindexes.iter().find(|&&i| i as usize >= dirnames.len()) {
            return Err(CatalogError::Format(format!(
                "dir index {bad} outside table of {}",
                dirnames.len()
            )));
        }
        Ok(Some(Self {
            dirnames: dirnames.to_vec(),
            basenames: basenames.to_vec(),
            dirindexes,
        }))
    }

    /// Build from absolute paths, splitting after the last `/`.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut list = FileList::default();
        let mut seen: HashMap<Vec<u8>, u32> = HashMap::new();
        for p in paths {
            let p = p.as_ref();
            let cut = p.iter().rposition(|&b| b == b'/').map_or(0, |i| i + 1);
            let (dir, base) = p.split_at(cut);
            let idx = *seen.entry(dir.to_vec()).or_insert_with(|| {
                list.dirnames.push(dir.to_vec());
                (list.dirnames.len() - 1) as u32
            });
            list.basenames.push(base.to_vec());
            list.dirindexes.push(idx);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.basenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basenames.is_empty()
    }

    /// `(directory, basename)` pairs in list order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.basenames
            .iter()
            .zip(&self.dirindexes)
            .map(|(b, &i)| (self.dirnames[i as usize].as_slice(), b.as_slice()))
    }

    /// Store into `h`; an empty list leaves the file-list tags out entirely.
    pub fn put_into(self, h: &mut Header) {
        for tag in Tag::FILE_LIST {
            h.remove(tag);
        }
        if self.is_empty() {
            return;
        }
        h.put(Tag::BASENAMES, Value::StrArray(self.basenames));
        h.put(Tag::DIRNAMES, Value::StrArray(self.dirnames));
        h.put(Tag::DIRINDEXES, Value::Int32(self.dirindexes));
    }
}
