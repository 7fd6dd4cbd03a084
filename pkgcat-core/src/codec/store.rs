use super::{CodecId, Compressor};
use crate::error::Result;
use std::io::{Read, Write};

/// Plain concatenated frames. Units have no boundaries of their own.
pub struct Store;

impl Compressor for Store {
    fn id(&self) -> CodecId {
        CodecId::Store
    }

    fn compress(&self, raw: &[u8], dst: &mut dyn Write, _level: i32) -> Result<u64> {
        dst.write_all(raw)?;
        Ok(raw.len() as u64)
    }

    fn decompress(&self, chunk: &[u8]) -> Result<Vec<u8>> {
        Ok(chunk.to_vec())
    }

    fn chunk_len(&self, buf: &[u8]) -> Result<usize> {
        Ok(buf.len())
    }

    fn reader<'a>(&self, src: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>> {
        Ok(src)
    }
}
