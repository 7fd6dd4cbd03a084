use crate::error::{CatalogError, Result};
use std::io::{Read, Write};
use std::path::Path;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CodecId {
    Store = 0,
    #[default]
    Zstd = 1,
}

impl CodecId {
    /// File-name suffix that tells consumers how the catalog is compressed.
    pub fn suffix(self) -> &'static str {
        match self {
            CodecId::Store => "",
            CodecId::Zstd => ".zst",
        }
    }

    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("zst") => CodecId::Zstd,
            _ => CodecId::Store,
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "store" | "none" => Ok(CodecId::Store),
            "zstd" => Ok(CodecId::Zstd),
            other => Err(CatalogError::Config(format!("unknown codec {other:?}"))),
        }
    }

    pub fn compressor(self) -> &'static dyn Compressor {
        match self {
            CodecId::Store => &store::Store,
            CodecId::Zstd => &zstdc::ZstdCompressor,
        }
    }
}

/// One independently decodable unit per call to `compress`.
pub trait Compressor: Send + Sync {
    fn id(&self) -> CodecId;

    /// Compress `raw` as a single unit into `dst`; returns compressed bytes written.
    fn compress(&self, raw: &[u8], dst: &mut dyn Write, level: i32) -> Result<u64>;

    /// Decompress exactly one unit, checking the recorded content size.
    fn decompress(&self, chunk: &[u8]) -> Result<Vec<u8>>;

    /// Length of the unit at the front of `buf`.
    fn chunk_len(&self, buf: &[u8]) -> Result<usize>;

    /// Streaming view over many concatenated units.
    fn reader<'a>(&self, src: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>>;
}

pub mod store;
pub mod zstdc;
