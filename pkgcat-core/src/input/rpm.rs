use crate::container::frame::read_frame;
use crate::error::{CatalogError, Result};
use crate::header::Header;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub const LEAD_LEN: usize = 96;
pub const LEAD_MAGIC: [u8; 4] = [0xed, 0xab, 0xee, 0xdb];

/// Source of package attributes for one package file.
pub trait HeaderReader {
    fn read(&self, path: &Path) -> Result<Header>;
}

/// Reads the main header of an RPM package; the payload is never touched.
#[derive(Clone, Copy, Debug, Default)]
pub struct RpmHeaderReader;

impl HeaderReader for RpmHeaderReader {
    fn read(&self, path: &Path) -> Result<Header> {
        let reason = |e: CatalogError| {
            CatalogError::header(path, format!("cannot read package header: {e}"))
        };
        let f = File::open(path).map_err(|e| reason(e.into()))?;
        read_package_header(&mut BufReader::new(f)).map_err(reason)
    }
}

/// Lead, signature header (skipped, padded to 8 bytes), then the main header.
pub fn read_package_header<R: Read>(r: &mut R) -> Result<Header> {
    let mut lead = [0u8; LEAD_LEN];
    r.read_exact(&mut lead)?;
    if lead[..4] != LEAD_MAGIC {
        return Err(CatalogError::Format("bad lead magic".into()));
    }
    let sig = read_frame(r, LEAD_LEN as u64)?
        .ok_or_else(|| CatalogError::Format("missing signature header".into()))?;
    let dl = u32::from_be_bytes([sig[4], sig[5], sig[6], sig[7]]) as usize;
    let pad = (8 - dl % 8) % 8;
    let mut skip = [0u8; 8];
    r.read_exact(&mut skip[..pad])?;

    let main = read_frame(r, (LEAD_LEN + 8 + sig.len() + pad) as u64)?
        .ok_or_else(|| CatalogError::Format("missing main header".into()))?;
    let (h, _) = Header::decode(&main)?;
    Ok(h)
}
