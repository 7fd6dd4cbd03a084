//! The two-pass catalog run.
//!
//! Pass 1 walks the input in identity order: it works out each package's
//! group key and, when stripping, collects the useful-file set from every
//! package's dependencies. Only the interned keys outlive a pass-1 header.
//! Pass 2 walks the entries in emission order, merge-joins them against the
//! previous catalog (written in that same order), builds or reuses each
//! record, and streams the sealed chunks to the catalog.

use crate::build::group::{GroupKeys, Grouper, KeyId};
use crate::build::record::RecordBuilder;
use crate::build::useful::UsefulFileSetBuilder;
use crate::cache::checksum::ChecksumCache;
use crate::cache::prev::PreviousOutputCache;
use crate::container::chunk::Chunk;
use crate::container::writer::CatalogWriter;
use crate::domain::PackageRecord;
use crate::error::{CatalogError, Result};
use crate::header::{Header, Tag, Value};
use crate::input::info::load_update_info;
use crate::input::rpm::{HeaderReader, RpmHeaderReader};
use crate::input::scan::{PackageEntry, scan_packages};
use crate::input::xref::{XrefWriter, read_xref};
use crate::options::{CatalogKind, GenOptions, PrevSource};
use crate::stats::RunStats;
use crate::util::progress::Progress;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of pass 1 for one package file.
struct Pending {
    entry: PackageEntry,
    key: KeyId,
}

pub fn generate(opts: &GenOptions) -> Result<RunStats> {
    generate_with(opts, &RpmHeaderReader)
}

pub fn generate_with(opts: &GenOptions, reader: &dyn HeaderReader) -> Result<RunStats> {
    opts.validate()?;

    let update_info = match (&opts.update_info, opts.kind) {
        (Some(path), CatalogKind::Binary) => Some(load_update_info(path)?),
        _ => None,
    };
    let binaries = match &opts.xref_in {
        Some(path) if opts.kind == CatalogKind::Source => read_xref(path)?,
        _ => HashMap::new(),
    };
    let mut useful = UsefulFileSetBuilder::new();
    if let Some(path) = &opts.useful_files {
        let n = useful.seed_from_file(path)?;
        debug!(n, "useful files seeded");
    }

    let entries = scan_packages(&opts.input_dir())?;
    info!(dir = %opts.input_dir().display(), packages = entries.len(), "input scanned");

    let out_path = opts.output_path();
    // Before the writer replaces the old catalog, which may be this very file.
    // The reader keeps the old inode; appending would grow it under the cursor.
    let mut prev = match &opts.prev {
        Some(_) if opts.scanning() => {
            warn!("previous catalog ignored: stripped file lists depend on the whole run");
            PreviousOutputCache::disabled()
        }
        Some(PrevSource::File(p)) if opts.append && same_file(p, &out_path) => {
            warn!(path = %p.display(), "previous catalog ignored: it is the catalog being appended to");
            PreviousOutputCache::disabled()
        }
        Some(src) => PreviousOutputCache::open(src, opts.codec, opts.group_tag())?,
        None => PreviousOutputCache::disabled(),
    };

    let mut writer = CatalogWriter::open(&out_path, opts.append)?;
    let mut xref = match &opts.xref_out {
        Some(path) if opts.kind == CatalogKind::Binary => Some(XrefWriter::create(path)?),
        _ => None,
    };
    let mut checksums = open_checksum_cache(opts);
    let mut stats = RunStats::default();

    // pass 1
    let progress = Progress::new(opts.progress, "scanning", entries.len());
    let mut keys = GroupKeys::new();
    let mut pending = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        progress.tick(i + 1);
        let key = match opts.kind {
            CatalogKind::Source => keys.intern(&entry.identity),
            CatalogKind::Binary => {
                let h = reader.read(&entry.path)?;
                if opts.scanning() {
                    useful.scan(&h);
                }
                keys.intern(group_key(&h, &entry)?)
            }
        };
        pending.push(Pending { entry, key });
    }
    pending.sort_by(|a, b| {
        keys.compare((a.key, &a.entry.identity), (b.key, &b.entry.identity))
    });
    let useful = useful.freeze();
    stats.useful_files = useful.len() as u64;
    debug!(useful = useful.len(), keys = keys.len(), "pass 1 done");

    // pass 2
    let build_opts = opts.build_options();
    let mut builder = RecordBuilder::new(&build_opts, &useful);
    if let Some(info) = &update_info {
        builder = builder.with_update_info(info);
    }
    let mut grouper = Grouper::new(
        opts.grouping(),
        opts.merge_threshold,
        opts.codec.compressor(),
        opts.level,
    );
    let progress = Progress::new(opts.progress, "writing", pending.len());
    for (i, p) in pending.into_iter().enumerate() {
        progress.tick(i + 1);
        let group = keys.get(p.key);
        let mut header = match prev.find(group, &p.entry.identity, p.entry.size) {
            Some(h) => {
                stats.reused += 1;
                h
            }
            None => {
                let src = reader.read(&p.entry.path)?;
                let sum = checksums.checksum(&p.entry.path, p.entry.mtime)?;
                stats.rebuilt += 1;
                builder.build(&src, &p.entry, &sum)?
            }
        };

        if opts.kind == CatalogKind::Source
            && !attach_binaries(&mut header, binaries.get(&p.entry.identity), opts.mapi)
        {
            debug!(package = %p.entry.identity, "no binaries refer to this source; skipped");
            stats.skipped += 1;
            continue;
        }
        if let Some(x) = xref.as_mut() {
            x.write(group, &p.entry.identity)?;
        }

        let record = PackageRecord::new(p.entry.identity, group.to_owned(), header)?;
        stats.records += 1;
        if let Some(chunk) = grouper.push(record)? {
            emit(&mut writer, &chunk, &mut stats)?;
        }
    }
    if let Some(chunk) = grouper.finish()? {
        emit(&mut writer, &chunk, &mut stats)?;
    }
    writer.finish()?;
    if let Some(x) = xref {
        x.finish()?;
    }

    stats.checksum_hits = checksums.hits;
    stats.checksum_misses = checksums.misses;
    if let Err(e) = checksums.finish() {
        warn!(error = %e, "checksum cache not saved");
    }
    info!(
        catalog = %out_path.display(),
        records = stats.records,
        reused = stats.reused,
        chunks = stats.chunks,
        ratio = stats.ratio(),
        "catalog written"
    );
    Ok(stats)
}

/// The SOURCERPM of a binary package, byte for byte.
fn group_key<'h>(h: &'h Header, entry: &PackageEntry) -> Result<&'h str> {
    match h.get_bytes(Tag::SOURCERPM) {
        Some(key) if !key.is_empty() => std::str::from_utf8(key).map_err(|_| {
            CatalogError::header(&entry.path, "source package name is not valid UTF-8")
        }),
        _ => Err(CatalogError::header(&entry.path, "invalid binary package")),
    }
}

/// Set the BINARY list of a source record. False when the record should be
/// left out because nothing refers to it and `mapi` is on.
fn attach_binaries(h: &mut Header, binaries: Option<&Vec<String>>, mapi: bool) -> bool {
    match binaries {
        Some(list) if !list.is_empty() => {
            h.put(Tag::BINARY, Value::str_array(list));
            true
        }
        _ => {
            h.remove(Tag::BINARY);
            !mapi
        }
    }
}

fn emit(writer: &mut CatalogWriter, chunk: &Chunk, stats: &mut RunStats) -> Result<()> {
    writer.write_chunk(chunk)?;
    stats.chunks += 1;
    stats.raw_bytes += chunk.raw_len;
    stats.compressed_bytes += chunk.bytes.len() as u64;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn open_checksum_cache(opts: &GenOptions) -> ChecksumCache {
    let opened = opts
        .cache_root()
        .and_then(|root| ChecksumCache::open(&root, opts.tool_name(), &opts.cache_namespace()));
    match opened {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "checksum cache unavailable; hashing every package");
            ChecksumCache::in_memory()
        }
    }
}
