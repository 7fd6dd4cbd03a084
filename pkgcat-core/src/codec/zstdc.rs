use super::{CodecId, Compressor};
use crate::error::{CatalogError, Result};
use crate::util::counting::CountingWriter;
use std::io::{Read, Write};
use zstd::zstd_safe;

/// Upper bound for pre-allocating a decompressed chunk from its frame header.
const MAX_PREALLOC: u64 = 64 << 20;

pub struct ZstdCompressor;

impl Compressor for ZstdCompressor {
    fn id(&self) -> CodecId {
        CodecId::Zstd
    }

    fn compress(&self, raw: &[u8], dst: &mut dyn Write, level: i32) -> Result<u64> {
        let mut enc = zstd::stream::Encoder::new(CountingWriter::new(dst), level.max(1))?;
        // Content size goes into the frame header for pre-allocation and checking on read.
        enc.include_contentsize(true)?;
        enc.set_pledged_src_size(Some(raw.len() as u64))?;
        enc.write_all(raw)?;
        let counted = enc.finish()?;
        Ok(counted.n)
    }

    fn decompress(&self, chunk: &[u8]) -> Result<Vec<u8>> {
        let frame_len = self.chunk_len(chunk)?;
        if frame_len != chunk.len() {
            return Err(CatalogError::corrupt(
                frame_len as u64,
                format!("chunk holds {} bytes past its frame", chunk.len() - frame_len),
            ));
        }
        let expected = zstd_safe::get_frame_content_size(chunk)
            .map_err(|_| CatalogError::corrupt(0, "unreadable frame header"))?
            .ok_or_else(|| CatalogError::corrupt(0, "frame header lacks content size"))?;

        let mut out = Vec::with_capacity(expected.min(MAX_PREALLOC) as usize);
        let mut dec = zstd::stream::read::Decoder::with_buffer(chunk)?;
        dec.read_to_end(&mut out)?;
        if out.len() as u64 != expected {
            return Err(CatalogError::corrupt(
                0,
                format!("content size {} but frame header says {expected}", out.len()),
            ));
        }
        Ok(out)
    }

    fn chunk_len(&self, buf: &[u8]) -> Result<usize> {
        zstd_safe::find_frame_compressed_size(buf)
            .map_err(|code| CatalogError::corrupt(0, zstd_safe::get_error_name(code)))
    }

    fn reader<'a>(&self, src: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>> {
        Ok(Box::new(zstd::stream::read::Decoder::new(src)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_record_their_content_size() {
        let raw = b"hello hello hello hello".repeat(10);
        let mut out = Vec::new();
        let n = ZstdCompressor.compress(&raw, &mut out, 3).unwrap();
        assert_eq!(n as usize, out.len());
        assert_eq!(
            zstd_safe::get_frame_content_size(&out).unwrap(),
            Some(raw.len() as u64)
        );
        assert_eq!(ZstdCompressor.decompress(&out).unwrap(), raw);
    }

    #[test]
    fn concatenated_chunks_split_and_stream() {
        let mut out = Vec::new();
        ZstdCompressor.compress(b"first", &mut out, 1).unwrap();
        let first_len = out.len();
        ZstdCompressor.compress(b"second", &mut out, 1).unwrap();

        assert_eq!(ZstdCompressor.chunk_len(&out).unwrap(), first_len);
        assert!(ZstdCompressor.decompress(&out).is_err());

        let mut all = String::new();
        ZstdCompressor
            .reader(Box::new(&out[..]))
            .unwrap()
            .read_to_string(&mut all)
            .unwrap();
        assert_eq!(all, "firstsecond");
    }
}
