//! Package headers: an ordered tag → value map with a compact binary form.
//!
//! Serialized layout (all integers big-endian):
//!
//! ```text
//! il: u32 | dl: u32 | il × (tag, type, offset, count): u32×4 | data store (dl bytes)
//! ```
//!
//! The blob length is `8 + 16*il + dl`, so a sequence of blobs needs no
//! external length field.

use crate::error::{CatalogError, Result};

pub mod tag;
pub mod value;

pub use tag::Tag;
pub use value::{TypeCode, Value};

pub const PREAMBLE_LEN: usize = 8;
pub const INDEX_ENTRY_LEN: usize = 16;
pub const MAX_TAGS: u32 = 0xffff;
pub const MAX_DATA: u32 = 256 << 20;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    entries: Vec<(Tag, Value)>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Value)> {
        self.entries.iter().map(|(t, v)| (*t, v))
    }

    pub fn get(&self, tag: Tag) -> Option<&Value> {
        self.entries.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.get(tag).is_some()
    }

    /// Set `tag`, replacing an existing value in place or appending a new entry.
    pub fn put(&mut self, tag: Tag, value: Value) {
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((tag, value)),
        }
    }

    pub fn remove(&mut self, tag: Tag) -> Option<Value> {
        let pos = self.entries.iter().position(|(t, _)| *t == tag)?;
        Some(self.entries.remove(pos).1)
    }

    /// Copy one entry from `src` verbatim. Returns false when `src` lacks it.
    pub fn copy_from(&mut self, src: &Header, tag: Tag) -> bool {
        match src.get(tag) {
            Some(v) => {
                self.put(tag, v.clone());
                true
            }
            None => false,
        }
    }

    pub fn get_bytes(&self, tag: Tag) -> Option<&[u8]> {
        self.get(tag).and_then(Value::as_bytes)
    }

    /// Lossy UTF-8 view of a string tag, for keys and display.
    pub fn get_string(&self, tag: Tag) -> Option<String> {
        self.get_bytes(tag)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn get_strings(&self, tag: Tag) -> Option<&[Vec<u8>]> {
        self.get(tag).and_then(Value::as_strings)
    }

    pub fn get_u64(&self, tag: Tag) -> Option<u64> {
        self.get(tag).and_then(Value::as_u64)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let il = self.entries.len();
        if il > MAX_TAGS as usize {
            return Err(CatalogError::Format(format!("too many tags: {il}")));
        }
        let mut index = Vec::with_capacity(il * INDEX_ENTRY_LEN);
        let mut data = Vec::new();
        for (tag, value) in &self.entries {
            let count = value.count();
            if count == 0 {
                return Err(CatalogError::Format(format!("empty value for tag {tag}")));
            }
            let align = value.type_code().alignment();
            while data.len() % align != 0 {
                data.push(0);
            }
            let offset = data.len();
            value.write_data(&mut data)?;
            for field in [
                tag.0,
                value.type_code() as u32,
                offset as u32,
                count as u32,
            ] {
                index.extend_from_slice(&field.to_be_bytes());
            }
        }
        if data.len() > MAX_DATA as usize {
            return Err(CatalogError::Format(format!(
                "header data too large: {} bytes",
                data.len()
            )));
        }
        let mut out = Vec::with_capacity(PREAMBLE_LEN + index.len() + data.len());
        out.extend_from_slice(&(il as u32).to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(&index);
        out.extend_from_slice(&data);
        Ok(out)
    }

    /// Decode one header from the front of `buf`; returns it with the bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let preamble: &[u8; PREAMBLE_LEN] = buf
            .get(..PREAMBLE_LEN)
            .and_then(|p| p.try_into().ok())
            .ok_or_else(|| CatalogError::Format("truncated header preamble".into()))?;
        let total = blob_len(preamble)?;
        if buf.len() < total {
            return Err(CatalogError::Format(format!(
                "truncated header: need {total} bytes, have {}",
                buf.len()
            )));
        }
        let il = be32(&buf[0..4]) as usize;
        let index_end = PREAMBLE_LEN + il * INDEX_ENTRY_LEN;
        let index = &buf[PREAMBLE_LEN..index_end];
        let data = &buf[index_end..total];

        let mut entries = Vec::with_capacity(il);
        for e in index.chunks_exact(INDEX_ENTRY_LEN) {
            let tag = Tag(be32(&e[0..4]));
            let ty = be32(&e[4..8]);
            let off = be32(&e[8..12]) as usize;
            let count = be32(&e[12..16]) as usize;
            let ty = TypeCode::from_u32(ty)
                .ok_or_else(|| CatalogError::Format(format!("tag {tag}: unknown type {ty}")))?;
            if off >= data.len() {
                return Err(CatalogError::Format(format!(
                    "tag {tag}: offset {off} outside data store of {} bytes",
                    data.len()
                )));
            }
            let value = Value::read_data(ty, count, &data[off..])
                .map_err(|e| CatalogError::Format(format!("tag {tag}: {e}")))?;
            entries.push((tag, value));
        }
        Ok((Self { entries }, total))
    }
}

/// Total blob length announced by an 8-byte preamble, with sanity limits.
pub fn blob_len(preamble: &[u8; PREAMBLE_LEN]) -> Result<usize> {
    let il = be32(&preamble[0..4]);
    let dl = be32(&preamble[4..8]);
    if il > MAX_TAGS || dl > MAX_DATA {
        return Err(CatalogError::Format(format!(
            "implausible header size: il={il} dl={dl}"
        )));
    }
    Ok(PREAMBLE_LEN + il as usize * INDEX_ENTRY_LEN + dl as usize)
}

#[inline]
fn be32(x: &[u8]) -> u32 {
    u32::from_be_bytes([x[0], x[1], x[2], x[3]])
}
