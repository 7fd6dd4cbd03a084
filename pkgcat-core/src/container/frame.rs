use crate::error::{CatalogError, Result};
use crate::header::{Header, PREAMBLE_LEN, blob_len};
use std::io::Read;

/// Header magic; serialized headers do not carry it themselves.
pub const FRAME_MAGIC: [u8; 8] = [0x8e, 0xad, 0xe8, 0x01, 0x00, 0x00, 0x00, 0x00];

/// Append `magic || blob` for one record.
pub fn encode_frame(out: &mut Vec<u8>, h: &Header) -> Result<()> {
    let blob = h.encode()?;
    out.reserve(FRAME_MAGIC.len() + blob.len());
    out.extend_from_slice(&FRAME_MAGIC);
    out.extend_from_slice(&blob);
    Ok(())
}

/// Split an uncompressed chunk back into records. `base` is used for error offsets.
pub fn decode_frames(buf: &[u8], base: u64) -> Result<Vec<Header>> {
    if buf.is_empty() {
        return Err(CatalogError::corrupt(base, "empty chunk"));
    }
    let mut out = Vec::new();
    let mut pos = 0usize;
    while pos < buf.len() {
        let at = base + pos as u64;
        let rest = &buf[pos..];
        if rest.len() <= FRAME_MAGIC.len() {
            return Err(CatalogError::corrupt(at, "truncated frame"));
        }
        if rest[..FRAME_MAGIC.len()] != FRAME_MAGIC {
            return Err(CatalogError::corrupt(at, "bad frame magic"));
        }
        let (h, used) = Header::decode(&rest[FRAME_MAGIC.len()..])
            .map_err(|e| CatalogError::corrupt(at, e.to_string()))?;
        out.push(h);
        pos += FRAME_MAGIC.len() + used;
    }
    Ok(out)
}

/// Fill `buf` unless EOF comes first; returns bytes read.
fn read_full<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match r.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(n)
}

/// Read one magic-prefixed header blob from a stream; `Ok(None)` on clean EOF.
pub fn read_frame<R: Read + ?Sized>(r: &mut R, offset: u64) -> Result<Option<Vec<u8>>> {
    let mut magic = [0u8; 8];
    match read_full(r, &mut magic)? {
        0 => return Ok(None),
        8 => {}
        _ => return Err(CatalogError::corrupt(offset, "truncated frame magic")),
    }
    if magic != FRAME_MAGIC {
        return Err(CatalogError::corrupt(offset, "bad frame magic"));
    }
    let mut preamble = [0u8; PREAMBLE_LEN];
    if read_full(r, &mut preamble)? != PREAMBLE_LEN {
        return Err(CatalogError::corrupt(offset, "truncated header preamble"));
    }
    let total = blob_len(&preamble).map_err(|e| CatalogError::corrupt(offset, e.to_string()))?;
    let mut blob = vec![0u8; total];
    blob[..PREAMBLE_LEN].copy_from_slice(&preamble);
    if read_full(r, &mut blob[PREAMBLE_LEN..])? != total - PREAMBLE_LEN {
        return Err(CatalogError::corrupt(offset, "truncated header"));
    }
    Ok(Some(blob))
}
