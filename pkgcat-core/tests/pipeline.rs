mod common;

use common::{Pkg, Repo, file_paths};
use pkgcat_core::codec::CodecId;
use pkgcat_core::container::chunk::Chunk;
use pkgcat_core::container::reader::split_chunks;
use pkgcat_core::header::{Header, Tag};
use pkgcat_core::options::FileListMode;
use pkgcat_core::{CatalogError, CatalogKind, CatalogReader, GenOptions, PrevSource, generate, verify};
use std::fs;
use std::path::Path;

fn binary_opts(repo: &Repo) -> GenOptions {
    let mut o = GenOptions::new(CatalogKind::Binary, repo.root(), repo.suffix);
    o.cache_dir = Some(repo.cache());
    o.level = 3;
    o
}

fn chunks(path: &Path) -> Vec<Vec<Header>> {
    let buf = fs::read(path).unwrap();
    let codec = CodecId::from_path(path).compressor();
    split_chunks(&buf, codec)
        .map(|c| Chunk::open(c.unwrap().1, codec).unwrap())
        .collect()
}

fn records(path: &Path) -> Vec<Header> {
    CatalogReader::open(path).unwrap().map(Result::unwrap).collect()
}

fn name(h: &Header) -> String {
    h.get_string(Tag::FILENAME).unwrap()
}

/// a1 and a2 come from source A, b1 from B.
fn scenario(repo: &Repo) {
    repo.add_binary(&Pkg::new("a1.rpm", "a1").source_rpm("A").files(&["/usr/bin/foo"]));
    repo.add_binary(&Pkg::new("a2.rpm", "a2").source_rpm("A").files(&["/etc/foo.conf"]));
    repo.add_binary(
        &Pkg::new("b1.rpm", "b1")
            .source_rpm("B")
            .files(&["/usr/lib/libbar.so.1"]),
    );
}

#[test]
fn groups_share_a_chunk_and_files_are_stripped() {
    let repo = Repo::new();
    scenario(&repo);
    let mut opts = binary_opts(&repo);
    opts.xref_out = Some(repo.root().join("srpm-index"));

    let stats = generate(&opts).unwrap();
    assert_eq!(stats.records, 3);
    assert_eq!(stats.chunks, 2);

    let out = repo.root().join("base/pkglist.main.zst");
    let chunks = chunks(&out);
    assert_eq!(chunks.len(), 2);
    let first: Vec<_> = chunks[0].iter().map(name).collect();
    assert_eq!(first, ["a1.rpm", "a2.rpm"]);
    assert_eq!(file_paths(&chunks[0][0]), ["/usr/bin/foo"]);
    assert!(!chunks[0][1].contains(Tag::BASENAMES));
    assert!(!chunks[0][1].contains(Tag::DIRNAMES));
    assert_eq!(name(&chunks[1][0]), "b1.rpm");
    assert_eq!(file_paths(&chunks[1][0]), ["/usr/lib/libbar.so.1"]);

    let index = fs::read_to_string(repo.root().join("srpm-index")).unwrap();
    assert_eq!(index, "A a1.rpm\nA a2.rpm\nB b1.rpm\n");

    let h = &chunks[0][0];
    assert_eq!(h.get_string(Tag::DIRECTORY).as_deref(), Some("RPMS.main"));
    let size = fs::metadata(repo.rpms().join("a1.rpm")).unwrap().len();
    assert_eq!(h.get_u64(Tag::FILESIZE), Some(size));
    assert_eq!(h.get_string(Tag::CHECKSUM).map(|c| c.len()), Some(64));
}

#[test]
fn dependency_on_a_later_package_keeps_the_file() {
    let repo = Repo::new();
    scenario(&repo);
    repo.add_binary(
        &Pkg::new("z9.rpm", "z9")
            .source_rpm("Z")
            .requires(&["/etc/foo.conf", "libc.so.6"]),
    );
    let stats = generate(&binary_opts(&repo)).unwrap();
    assert_eq!(stats.useful_files, 1);

    let recs = records(&repo.root().join("base/pkglist.main.zst"));
    let a2 = recs.iter().find(|h| name(h) == "a2.rpm").unwrap();
    assert_eq!(file_paths(a2), ["/etc/foo.conf"]);

    let mut full = binary_opts(&repo);
    full.file_list = FileListMode::Full;
    generate(&full).unwrap();
    let recs = records(&repo.root().join("base/pkglist.main.zst"));
    assert_eq!(recs.len(), 4);
    assert!(recs.iter().filter(|h| name(h) != "z9.rpm").all(|h| file_paths(h).len() == 1));
}

#[test]
fn rerun_on_unchanged_input_is_identical() {
    let repo = Repo::new();
    scenario(&repo);
    let opts = binary_opts(&repo);
    let out = repo.root().join("base/pkglist.main.zst");

    let first = generate(&opts).unwrap();
    let before = records(&out);
    let second = generate(&opts).unwrap();
    assert_eq!(records(&out), before);
    assert_eq!(first.checksum_misses, 3);
    assert_eq!(second.checksum_hits, 3);
    assert_eq!(second.checksum_misses, 0);
}

#[test]
fn previous_catalog_is_reused_until_the_size_changes() {
    let repo = Repo::new();
    scenario(&repo);
    let mut opts = binary_opts(&repo);
    opts.file_list = FileListMode::Full;
    let out = repo.root().join("base/pkglist.main.zst");
    generate(&opts).unwrap();
    let prev = repo.root().join("pkglist.prev.zst");
    fs::copy(&out, &prev).unwrap();

    opts.prev = Some(PrevSource::File(prev.clone()));
    let stats = generate(&opts).unwrap();
    assert_eq!((stats.reused, stats.rebuilt), (3, 0));
    assert_eq!(records(&out), records(&prev));

    let a2 = repo.rpms().join("a2.rpm");
    let mut bytes = fs::read(&a2).unwrap();
    bytes.extend_from_slice(b"grown");
    fs::write(&a2, &bytes).unwrap();

    let stats = generate(&opts).unwrap();
    assert_eq!((stats.reused, stats.rebuilt), (2, 1));
    let recs = records(&out);
    let rebuilt = recs.iter().find(|h| name(h) == "a2.rpm").unwrap();
    assert_eq!(rebuilt.get_u64(Tag::FILESIZE), Some(bytes.len() as u64));
}

#[test]
fn previous_catalog_is_reused_when_sources_sort_against_file_names() {
    let repo = Repo::new();
    for (file, srpm) in [("a.rpm", "C"), ("b.rpm", "B"), ("c.rpm", "A")] {
        repo.add_binary(&Pkg::new(file, file).source_rpm(srpm).files(&["/usr/bin/x"]));
    }
    let mut opts = binary_opts(&repo);
    opts.file_list = FileListMode::Full;
    let out = repo.root().join("base/pkglist.main.zst");
    generate(&opts).unwrap();
    let written: Vec<_> = records(&out).iter().map(name).collect();
    assert_eq!(written, ["c.rpm", "b.rpm", "a.rpm"]);

    let prev = repo.root().join("pkglist.prev.zst");
    fs::copy(&out, &prev).unwrap();
    opts.prev = Some(PrevSource::File(prev.clone()));
    let stats = generate(&opts).unwrap();
    assert_eq!((stats.reused, stats.rebuilt), (3, 0));
    assert_eq!(records(&out), records(&prev));
}

#[test]
fn previous_source_catalog_is_reused() {
    let repo = Repo::new();
    repo.add_source(&Pkg::new("a.src.rpm", "a"));
    repo.add_source(&Pkg::new("b.src.rpm", "b"));
    let index = repo.root().join("srpm-index");
    fs::write(&index, "a.src.rpm a.rpm\n").unwrap();
    let mut opts = GenOptions::new(CatalogKind::Source, repo.root(), repo.suffix);
    opts.cache_dir = Some(repo.cache());
    opts.xref_in = Some(index);
    opts.level = 3;
    let out = repo.root().join("base/srclist.main.zst");
    generate(&opts).unwrap();

    let prev = repo.root().join("srclist.prev.zst");
    fs::copy(&out, &prev).unwrap();
    opts.prev = Some(PrevSource::File(prev.clone()));
    let stats = generate(&opts).unwrap();
    assert_eq!((stats.reused, stats.rebuilt), (2, 0));
    assert_eq!(records(&out), records(&prev));
}

#[test]
fn previous_catalog_is_not_read_while_appending_to_it() {
    let repo = Repo::new();
    scenario(&repo);
    let mut opts = binary_opts(&repo);
    opts.file_list = FileListMode::Full;
    let out = repo.root().join("base/pkglist.main.zst");
    generate(&opts).unwrap();

    opts.append = true;
    opts.prev = Some(PrevSource::File(out.clone()));
    let stats = generate(&opts).unwrap();
    assert_eq!((stats.reused, stats.rebuilt), (0, 3));
    assert_eq!(verify(&out).unwrap().records, 6);
}

#[test]
fn previous_catalog_is_ignored_while_stripping() {
    let repo = Repo::new();
    scenario(&repo);
    let mut opts = binary_opts(&repo);
    generate(&opts).unwrap();
    opts.prev = Some(PrevSource::File(repo.root().join("base/pkglist.main.zst")));
    let stats = generate(&opts).unwrap();
    assert_eq!(stats.reused, 0);
    assert_eq!(stats.rebuilt, 3);
}

#[test]
fn append_grows_the_catalog() {
    let repo = Repo::new();
    scenario(&repo);
    let mut opts = binary_opts(&repo);
    opts.append = true;
    generate(&opts).unwrap();
    generate(&opts).unwrap();

    let out = repo.root().join("base/pkglist.main.zst");
    let report = verify(&out).unwrap();
    assert_eq!(report.chunks, 4);
    assert_eq!(report.records, 6);

    opts.append = false;
    generate(&opts).unwrap();
    assert_eq!(verify(&out).unwrap().records, 3);
}

#[test]
fn source_catalog_lists_binaries() {
    let repo = Repo::new();
    for (src, bins) in [("foo-1.src.rpm", vec!["foo-1.x86_64.rpm", "foo-devel-1.x86_64.rpm"]), ("bar-1.src.rpm", vec!["bar-1.noarch.rpm"])] {
        repo.add_source(&Pkg::new(src, src));
        for b in bins {
            repo.add_binary(&Pkg::new(b, b).source_rpm(src));
        }
    }
    repo.add_source(&Pkg::new("orphan-1.src.rpm", "orphan"));

    let index = repo.root().join("srpm-index");
    let mut bin = binary_opts(&repo);
    bin.xref_out = Some(index.clone());
    generate(&bin).unwrap();

    let mut src = GenOptions::new(CatalogKind::Source, repo.root(), repo.suffix);
    src.cache_dir = Some(repo.cache());
    src.xref_in = Some(index);
    src.merge_threshold = 2;
    let stats = generate(&src).unwrap();
    assert_eq!(stats.records, 3);
    assert_eq!(stats.chunks, 2);

    let out = repo.root().join("base/srclist.main.zst");
    let recs = records(&out);
    let names: Vec<_> = recs.iter().map(name).collect();
    assert_eq!(names, ["bar-1.src.rpm", "foo-1.src.rpm", "orphan-1.src.rpm"]);
    assert_eq!(
        recs[1].get_strings(Tag::BINARY).unwrap(),
        [b"foo-1.x86_64.rpm".to_vec(), b"foo-devel-1.x86_64.rpm".to_vec()]
    );
    assert!(!recs[2].contains(Tag::BINARY));
    assert_eq!(recs[0].get_string(Tag::DIRECTORY).as_deref(), Some("../SRPMS.main"));
    assert!(!recs[0].contains(Tag::BASENAMES));

    src.mapi = true;
    src.flat = true;
    let stats = generate(&src).unwrap();
    assert_eq!((stats.records, stats.skipped), (2, 1));
    let recs = records(&out);
    assert_eq!(recs[0].get_string(Tag::DIRECTORY).as_deref(), Some("./SRPMS.main"));
}

#[test]
fn binary_without_source_package_is_fatal() {
    let repo = Repo::new();
    scenario(&repo);
    repo.add_binary(&Pkg::new("c1.rpm", "c1"));
    let err = generate(&binary_opts(&repo)).unwrap_err();
    match err {
        CatalogError::Header { path, reason } => {
            assert!(path.ends_with("c1.rpm"));
            assert_eq!(reason, "invalid binary package");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn unreadable_package_aborts_the_run() {
    let repo = Repo::new();
    scenario(&repo);
    fs::write(repo.rpms().join("broken.rpm"), b"definitely not a package").unwrap();
    let err = generate(&binary_opts(&repo)).unwrap_err();
    assert!(err.to_string().contains("cannot read package header"));
}

#[test]
fn missing_input_directory_is_a_config_error() {
    let repo = Repo::new();
    let opts = GenOptions::new(CatalogKind::Binary, repo.root(), "nosuch");
    assert!(matches!(generate(&opts), Err(CatalogError::Config(_))));
    assert!(!repo.root().join("base/pkglist.nosuch.zst").exists());
}

#[test]
fn store_codec_and_meta_suffix() {
    let repo = Repo::new();
    scenario(&repo);
    let mut opts = binary_opts(&repo);
    opts.codec = CodecId::Store;
    opts.meta = Some("extra".into());
    generate(&opts).unwrap();
    let out = repo.root().join("base/pkglist.extra");
    assert_eq!(records(&out).len(), 3);
    assert_eq!(verify(&out).unwrap().records, 3);
}
