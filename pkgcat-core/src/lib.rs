#![forbid(unsafe_code)]

pub mod error;
pub mod options;
pub mod domain;
pub mod stats;

pub mod util {
    pub mod counting;
    pub mod progress;
    pub mod varint;
}

pub mod header;
pub mod codec;

pub mod container {
    pub mod chunk;
    pub mod frame;
    pub mod reader;
    pub mod writer;
}

pub mod input {
    pub mod info;
    pub mod rpm;
    pub mod scan;
    pub mod xref;
}

pub mod build {
    pub mod changelog;
    pub mod group;
    pub mod record;
    pub mod strip;
    pub mod useful;
}

pub mod cache {
    pub mod checksum;
    pub mod prev;
}

pub mod pipeline;
pub mod query;

// Re-exports: stable API surface
pub use container::reader::{CatalogReader, VerifyReport, verify};
pub use error::{CatalogError, Result};
pub use options::{CatalogKind, FileListMode, GenOptions, PrevSource, parse_cutoff};
pub use pipeline::generate;
pub use query::{Format, query_catalog};
pub use stats::RunStats;
