use serde::Serialize;

/// Counters for one catalog run.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub records: u64,
    /// Built from the package header.
    pub rebuilt: u64,
    /// Taken unchanged from the previous catalog.
    pub reused: u64,
    /// Source packages no binary refers to, left out with `mapi`.
    pub skipped: u64,
    pub chunks: u64,
    pub raw_bytes: u64,
    pub compressed_bytes: u64,
    pub checksum_hits: u64,
    pub checksum_misses: u64,
    pub useful_files: u64,
}

impl RunStats {
    /// Compressed size as a fraction of the raw frames.
    pub fn ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 / self.raw_bytes as f64
    }
}
