use crate::codec::CodecId;
use crate::container::reader::CatalogReader;
use crate::error::Result;
use crate::header::{Header, Tag};
use crate::options::PrevSource;
use std::cmp::Ordering;
use std::io::BufReader;
use tracing::warn;

/// Merge-join against the previous run's catalog.
///
/// Entries are matched on `(group key, identity)`, the order a catalog is
/// written in. The group key of a previous entry is read from `group_tag`;
/// source catalogs group by file name, so there the order is plain identity
/// order. Lookups must come in non-decreasing order. The cursor never
/// rewinds, so out-of-order lookups only miss.
pub struct PreviousOutputCache<'a> {
    reader: Option<CatalogReader<'a>>,
    group_tag: Tag,
    /// Record under the cursor with its sort key.
    current: Option<(SortKey, Header)>,
    pub hits: u64,
}

/// `(group key, identity)` as raw bytes.
type SortKey = (Vec<u8>, Vec<u8>);

impl<'a> PreviousOutputCache<'a> {
    pub fn new(reader: CatalogReader<'a>, group_tag: Tag) -> Self {
        Self {
            reader: Some(reader),
            group_tag,
            current: None,
            hits: 0,
        }
    }

    /// A cache that never hits.
    pub fn disabled() -> Self {
        Self {
            reader: None,
            group_tag: Tag::FILENAME,
            current: None,
            hits: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.reader.is_some()
    }

    /// Open the configured source. A file that cannot be opened only disables reuse.
    pub fn open(
        src: &PrevSource,
        codec: CodecId,
        group_tag: Tag,
    ) -> Result<PreviousOutputCache<'static>> {
        match src {
            PrevSource::File(path) => match CatalogReader::open(path) {
                Ok(r) => Ok(PreviousOutputCache::new(r, group_tag)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "previous catalog unavailable; rebuilding everything");
                    Ok(PreviousOutputCache::disabled())
                }
            },
            PrevSource::Stdin => {
                let stdin = BufReader::new(std::io::stdin().lock());
                Ok(PreviousOutputCache::new(
                    CatalogReader::new(stdin, codec)?,
                    group_tag,
                ))
            }
        }
    }

    /// The previous record for `identity` in `group`, if it is there and its
    /// size still matches.
    pub fn find(&mut self, group: &str, identity: &str, size: u64) -> Option<Header> {
        let want = (group.as_bytes(), identity.as_bytes());
        loop {
            if self.current.is_none() {
                self.current = Some(self.advance()?);
            }
            let ((g, id), _) = self.current.as_ref()?;
            match (g.as_slice(), id.as_slice()).cmp(&want) {
                Ordering::Less => self.current = None,
                Ordering::Greater => return None,
                Ordering::Equal => {
                    let (_, h) = self.current.take()?;
                    if h.get_u64(Tag::FILESIZE) == Some(size) {
                        self.hits += 1;
                        return Some(h);
                    }
                    return None;
                }
            }
        }
    }

    fn advance(&mut self) -> Option<(SortKey, Header)> {
        let reader = self.reader.as_mut()?;
        match reader.next_record() {
            Ok(Some(h)) => {
                let key = h
                    .get_bytes(self.group_tag)
                    .zip(h.get_bytes(Tag::FILENAME))
                    .map(|(g, id)| (g.to_vec(), id.to_vec()));
                match key {
                    Some(key) => Some((key, h)),
                    None => {
                        warn!(tag = %self.group_tag, "previous catalog entry without file name or group key; reuse disabled");
                        self.reader = None;
                        None
                    }
                }
            }
            Ok(None) => {
                self.reader = None;
                None
            }
            Err(e) => {
                warn!(error = %e, "previous catalog unreadable; reuse disabled");
                self.reader = None;
                None
            }
        }
    }
}
