use crate::codec::Compressor;
use crate::container::chunk::Chunk;
use crate::domain::PackageRecord;
use crate::error::{CatalogError, Result};
use crate::header::Header;
use crate::options::Grouping;
use std::cmp::Ordering;

/// Index into [`GroupKeys`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyId(u32);

/// Owns every group key for the run so pass-1 entries can drop their headers.
/// Consecutive equal keys share one slot.
#[derive(Debug, Default)]
pub struct GroupKeys {
    keys: Vec<String>,
}

impl GroupKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, key: &str) -> KeyId {
        if let Some(last) = self.keys.last() {
            if last == key {
                return KeyId((self.keys.len() - 1) as u32);
            }
        }
        self.keys.push(key.to_owned());
        KeyId((self.keys.len() - 1) as u32)
    }

    pub fn get(&self, id: KeyId) -> &str {
        &self.keys[id.0 as usize]
    }

    /// Slots in use; smaller than the record count when keys repeat back to back.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Emission order: group key first, identity as tie-break, both byte-wise.
    pub fn compare(&self, a: (KeyId, &str), b: (KeyId, &str)) -> Ordering {
        self.get(a.0)
            .as_bytes()
            .cmp(self.get(b.0).as_bytes())
            .then_with(|| a.1.as_bytes().cmp(b.1.as_bytes()))
    }
}

enum GroupState {
    Empty,
    Building { key: String, records: Vec<Header> },
    Sealed(Chunk),
}

/// Cuts the sorted record stream into chunks.
pub struct Grouper<'c> {
    grouping: Grouping,
    threshold: usize,
    codec: &'c dyn Compressor,
    level: i32,
    state: GroupState,
    last: Option<(String, String)>,
}

impl<'c> Grouper<'c> {
    pub fn new(grouping: Grouping, threshold: usize, codec: &'c dyn Compressor, level: i32) -> Self {
        Self {
            grouping,
            threshold: threshold.max(1),
            codec,
            level,
            state: GroupState::Empty,
            last: None,
        }
    }

    /// Add the next record; returns the previous group once it is complete.
    pub fn push(&mut self, rec: PackageRecord) -> Result<Option<Chunk>> {
        let order = (rec.group_key.clone(), rec.identity.clone());
        if let Some(prev) = &self.last {
            if order <= *prev {
                return Err(CatalogError::Format(format!(
                    "record {} out of order after {}",
                    rec.identity, prev.1
                )));
            }
        }
        self.last = Some(order);

        let boundary = matches!(
            &self.state,
            GroupState::Building { key, records } if !self.joins(key, records.len(), &rec)
        );
        let sealed = if boundary { self.seal()? } else { None };
        match &mut self.state {
            GroupState::Building { records, .. } => records.push(rec.header),
            state => {
                *state = GroupState::Building {
                    key: rec.group_key,
                    records: vec![rec.header],
                }
            }
        }
        Ok(sealed)
    }

    /// Seal whatever is still building.
    pub fn finish(mut self) -> Result<Option<Chunk>> {
        self.seal()
    }

    fn joins(&self, key: &str, len: usize, rec: &PackageRecord) -> bool {
        len < self.threshold
            && match self.grouping {
                Grouping::ByKey => key == rec.group_key,
                Grouping::Batched => true,
            }
    }

    fn seal(&mut self) -> Result<Option<Chunk>> {
        if let GroupState::Building { records, .. } = &self.state {
            self.state = GroupState::Sealed(Chunk::seal(records, self.codec, self.level)?);
        }
        match std::mem::replace(&mut self.state, GroupState::Empty) {
            GroupState::Sealed(chunk) => Ok(Some(chunk)),
            _ => Ok(None),
        }
    }
}
