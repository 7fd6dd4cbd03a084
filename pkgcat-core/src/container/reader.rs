use crate::codec::{CodecId, Compressor};
use crate::container::frame::{decode_frames, read_frame};
use crate::error::{CatalogError, Result};
use crate::header::Header;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Sequential record iterator over a whole catalog (all chunks, in file order).
pub struct CatalogReader<'a> {
    inner: Box<dyn Read + 'a>,
    /// Offset into the uncompressed stream, for error reporting.
    offset: u64,
}

impl<'a> CatalogReader<'a> {
    pub fn new(src: impl Read + 'a, codec: CodecId) -> Result<Self> {
        let inner = codec.compressor().reader(Box::new(src))?;
        Ok(Self { inner, offset: 0 })
    }

    /// Open a catalog file, picking the codec from its suffix.
    pub fn open(path: &Path) -> Result<CatalogReader<'static>> {
        let f = File::open(path)?;
        CatalogReader::new(BufReader::new(f), CodecId::from_path(path))
    }

    pub fn next_record(&mut self) -> Result<Option<Header>> {
        let Some(blob) = read_frame(&mut self.inner, self.offset)? else {
            return Ok(None);
        };
        let (h, used) = Header::decode(&blob)?;
        self.offset += (8 + used) as u64;
        Ok(Some(h))
    }
}

impl Iterator for CatalogReader<'_> {
    type Item = Result<Header>;
    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Walk chunk boundaries of an in-memory catalog: `(file offset, chunk bytes)`.
pub fn split_chunks<'b>(
    buf: &'b [u8],
    codec: &'b dyn Compressor,
) -> impl Iterator<Item = Result<(u64, &'b [u8])>> + 'b {
    let mut pos = 0usize;
    std::iter::from_fn(move || {
        if pos >= buf.len() {
            return None;
        }
        let at = pos;
        match codec.chunk_len(&buf[pos..]) {
            Ok(n) if n > 0 => {
                pos += n;
                Some(Ok((at as u64, &buf[at..pos])))
            }
            Ok(_) => {
                pos = buf.len();
                None
            }
            Err(e) => {
                pos = buf.len();
                Some(Err(relocate(e, at as u64)))
            }
        }
    })
}

/// Shift a chunk-relative corruption offset to a file offset.
fn relocate(e: CatalogError, base: u64) -> CatalogError {
    match e {
        CatalogError::Corrupt { offset, reason } => CatalogError::Corrupt {
            offset: base + offset,
            reason,
        },
        other => other,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub chunks: u64,
    pub records: u64,
    pub compressed_bytes: u64,
    pub raw_bytes: u64,
}

/// Decompress every chunk, checking frame magic and content lengths.
pub fn verify(path: &Path) -> Result<VerifyReport> {
    let buf = std::fs::read(path)?;
    let codec = CodecId::from_path(path).compressor();
    let mut report = VerifyReport {
        compressed_bytes: buf.len() as u64,
        ..Default::default()
    };
    for item in split_chunks(&buf, codec) {
        let (at, bytes) = item?;
        let raw = codec.decompress(bytes).map_err(|e| relocate(e, at))?;
        let records = decode_frames(&raw, 0)
            .map_err(|e| CatalogError::corrupt(at, format!("inside chunk: {e}")))?;
        report.chunks += 1;
        report.records += records.len() as u64;
        report.raw_bytes += raw.len() as u64;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::chunk::Chunk;
    use crate::container::writer::CatalogWriter;
    use crate::header::{Tag, Value};

    fn rec(name: &str) -> Header {
        let mut h = Header::new();
        h.put(Tag::FILENAME, Value::str(name));
        h
    }

    fn write_catalog(p: &Path, groups: &[&[&str]]) {
        let mut w = CatalogWriter::open(p, false).unwrap();
        for g in groups {
            let hs: Vec<_> = g.iter().map(|n| rec(n)).collect();
            let chunk = Chunk::seal(&hs, CodecId::from_path(p).compressor(), 3).unwrap();
            w.write_chunk(&chunk).unwrap();
        }
        w.finish().unwrap();
    }

    #[test]
    fn reads_across_chunk_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["pkglist.t.zst", "pkglist.t"] {
            let p = dir.path().join(name);
            write_catalog(&p, &[&["a", "b"], &["c"]]);
            let names: Vec<_> = CatalogReader::open(&p)
                .unwrap()
                .map(|h| h.unwrap().get_string(Tag::FILENAME).unwrap())
                .collect();
            assert_eq!(names, ["a", "b", "c"]);
        }
    }

    #[test]
    fn verify_counts_chunks_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("pkglist.t.zst");
        write_catalog(&p, &[&["a", "b"], &["c"], &["d", "e", "f"]]);
        let report = verify(&p).unwrap();
        assert_eq!(report.chunks, 3);
        assert_eq!(report.records, 6);
    }

    #[test]
    fn interrupted_catalog_keeps_whole_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("pkglist.t.zst");
        write_catalog(&p, &[&["a"], &["b"]]);
        let mut bytes = std::fs::read(&p).unwrap();
        bytes.truncate(bytes.len() - 3);
        std::fs::write(&p, &bytes).unwrap();

        let mut r = CatalogReader::open(&p).unwrap();
        assert_eq!(r.next().unwrap().unwrap(), rec("a"));
        assert!(r.next().unwrap().is_err());

        let err = verify(&p).unwrap_err();
        assert!(matches!(err, CatalogError::Corrupt { .. }));
    }
}
