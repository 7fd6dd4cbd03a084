use crate::codec::Compressor;
use crate::container::frame::{FRAME_MAGIC, decode_frames, encode_frame};
use crate::error::{CatalogError, Result};
use crate::header::Header;

/// One independently decompressible unit of the catalog.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub bytes: Vec<u8>,
    pub records: usize,
    /// Uncompressed length of the frames inside.
    pub raw_len: u64,
}

impl Chunk {
    /// Frame and compress a group of records as a single unit.
    pub fn seal(records: &[Header], codec: &dyn Compressor, level: i32) -> Result<Self> {
        let raw = match records {
            [] => return Err(CatalogError::Format("cannot seal an empty group".into())),
            [one] => {
                let blob = one.encode()?;
                let mut raw = Vec::with_capacity(FRAME_MAGIC.len() + blob.len());
                raw.extend_from_slice(&FRAME_MAGIC);
                raw.extend_from_slice(&blob);
                raw
            }
            many => {
                let mut raw = Vec::new();
                for h in many {
                    encode_frame(&mut raw, h)?;
                }
                raw
            }
        };
        let mut bytes = Vec::with_capacity(raw.len() / 2);
        codec.compress(&raw, &mut bytes, level)?;
        Ok(Self {
            bytes,
            records: records.len(),
            raw_len: raw.len() as u64,
        })
    }

    /// Decompress `bytes` and split it back into records.
    pub fn open(bytes: &[u8], codec: &dyn Compressor) -> Result<Vec<Header>> {
        let raw = codec.decompress(bytes)?;
        decode_frames(&raw, 0)
    }
}
