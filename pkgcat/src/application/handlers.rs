use std::io::Write;
use std::path::PathBuf;

use pkgcat_core::codec::CodecId;
use pkgcat_core::error::{CatalogError, Result};
use pkgcat_core::{
    CatalogKind, FileListMode, Format, GenOptions, PrevSource, RunStats, generate, parse_cutoff,
    query_catalog, verify,
};
use tracing::error;

use crate::presentation::cli::{CommonArgs, PkgListArgs, SrcListArgs};

fn options_from(kind: CatalogKind, common: CommonArgs) -> Result<GenOptions> {
    let mut opts = GenOptions::new(kind, common.dir, common.suffix);
    opts.meta = common.meta;
    opts.append = common.append;
    opts.progress = common.progress;
    opts.cache_dir = common.cachedir;
    opts.prev = match (common.prev, common.prev_stdin) {
        (Some(path), _) => Some(PrevSource::File(path)),
        (None, true) => Some(PrevSource::Stdin),
        (None, false) => None,
    };
    opts.codec = CodecId::from_name(&common.codec)?;
    opts.level = common.level;
    opts.merge_threshold = common.merge_threshold;
    Ok(opts)
}

fn print_stats(stats: &RunStats) -> Result<()> {
    let json =
        serde_json::to_string_pretty(stats).map_err(|e| CatalogError::Format(e.to_string()))?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}")?;
    Ok(())
}

pub fn handle_genpkglist(args: PkgListArgs) -> Result<()> {
    let want_stats = args.common.stats;
    let mut opts = options_from(CatalogKind::Binary, args.common)?;
    opts.file_list = if args.bloat {
        FileListMode::Full
    } else {
        FileListMode::Stripped
    };
    opts.scan_deps = !args.no_scan;
    opts.xref_out = args.index;
    opts.update_info = args.info;
    opts.useful_files = args.useful_files;
    opts.changelog_since = args.changelog_since.as_deref().map(parse_cutoff).transpose()?;

    let stats = generate(&opts)?;
    if want_stats {
        print_stats(&stats)?;
    }
    Ok(())
}

pub fn handle_gensrclist(args: SrcListArgs) -> Result<()> {
    let want_stats = args.common.stats;
    let mut opts = options_from(CatalogKind::Source, args.common)?;
    opts.xref_in = Some(args.srpm_index);
    opts.flat = args.flat;
    opts.mapi = args.mapi;

    let stats = generate(&opts)?;
    if want_stats {
        print_stats(&stats)?;
    }
    Ok(())
}

/// Keeps going past unreadable catalogs; fails at the end if any were skipped.
pub fn handle_query(format: String, catalogs: Vec<PathBuf>) -> Result<()> {
    let format = Format::parse(&format)?;
    let mut out = std::io::stdout().lock();
    let mut failed = 0usize;
    for catalog in &catalogs {
        if let Err(e) = query_catalog(&format, catalog, &mut out) {
            error!(catalog = %catalog.display(), error = %e, "query failed");
            failed += 1;
        }
    }
    out.flush()?;
    if failed > 0 {
        return Err(CatalogError::Format(format!(
            "{failed} of {} catalogs could not be read",
            catalogs.len()
        )));
    }
    Ok(())
}

pub fn handle_verify(catalog: PathBuf) -> Result<()> {
    let report = verify(&catalog)?;
    println!(
        "{}: {} chunks, {} records, {} -> {} bytes",
        catalog.display(),
        report.chunks,
        report.records,
        report.raw_bytes,
        report.compressed_bytes
    );
    eprintln!("verify: OK");
    Ok(())
}
