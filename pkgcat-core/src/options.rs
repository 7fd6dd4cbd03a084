use crate::codec::CodecId;
use crate::error::{CatalogError, Result};
use crate::header::Tag;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// How much of a package's file list ends up in its catalog record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FileListMode {
    /// Keep only useful files (heuristics plus paths other packages depend on).
    #[default]
    Stripped,
    Full,
    /// No file list at all (source catalogs).
    Omit,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CatalogKind {
    #[default]
    Binary,
    Source,
}

/// How sorted records are cut into chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Grouping {
    /// One chunk per run of equal group keys, split at the merge threshold.
    ByKey,
    /// Consecutive records regardless of key, up to the merge threshold.
    Batched,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrevSource {
    File(PathBuf),
    Stdin,
}

pub const DEFAULT_MERGE_THRESHOLD: usize = 8;
pub const DEFAULT_ZSTD_LEVEL: i32 = 19;

pub fn default_binary_tags() -> Vec<Tag> {
    vec![
        Tag::NAME,
        Tag::EPOCH,
        Tag::VERSION,
        Tag::RELEASE,
        Tag::GROUP,
        Tag::ARCH,
        Tag::PACKAGER,
        Tag::SOURCERPM,
        Tag::SIZE,
        Tag::VENDOR,
        Tag::DESCRIPTION,
        Tag::SUMMARY,
        Tag::BUILDTIME,
        Tag::I18N_TABLE,
        Tag::REQUIREFLAGS,
        Tag::REQUIRENAME,
        Tag::REQUIREVERSION,
        Tag::CONFLICTFLAGS,
        Tag::CONFLICTNAME,
        Tag::CONFLICTVERSION,
        Tag::PROVIDENAME,
        Tag::PROVIDEFLAGS,
        Tag::PROVIDEVERSION,
        Tag::OBSOLETENAME,
        Tag::OBSOLETEFLAGS,
        Tag::OBSOLETEVERSION,
    ]
}

pub fn default_source_tags() -> Vec<Tag> {
    vec![
        Tag::NAME,
        Tag::EPOCH,
        Tag::VERSION,
        Tag::RELEASE,
        Tag::GROUP,
        Tag::ARCH,
        Tag::PACKAGER,
        Tag::SIZE,
        Tag::VENDOR,
        Tag::DESCRIPTION,
        Tag::SUMMARY,
        Tag::I18N_TABLE,
        Tag::REQUIREFLAGS,
        Tag::REQUIRENAME,
        Tag::REQUIREVERSION,
    ]
}

/// Per-record assembly settings handed to the record builder.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Copied verbatim, in this order.
    pub copy_tags: Vec<Tag>,
    pub file_list: FileListMode,
    pub changelog_since: Option<i64>,
    /// Originating directory recorded in every entry.
    pub dir_tag: String,
}

/// Everything one catalog run needs.
#[derive(Clone, Debug)]
pub struct GenOptions {
    pub kind: CatalogKind,
    pub root: PathBuf,
    pub suffix: String,
    /// Output name suffix when it differs from the input subset.
    pub meta: Option<String>,
    pub file_list: FileListMode,
    pub scan_deps: bool,
    pub append: bool,
    pub cache_dir: Option<PathBuf>,
    pub changelog_since: Option<i64>,
    /// Binary runs: where to write the `<group> <identity>` index.
    pub xref_out: Option<PathBuf>,
    /// Source runs: index produced by a binary run.
    pub xref_in: Option<PathBuf>,
    pub update_info: Option<PathBuf>,
    pub useful_files: Option<PathBuf>,
    pub prev: Option<PrevSource>,
    /// Source runs: SRPMS sits next to the catalog instead of one level up.
    pub flat: bool,
    /// Source runs: drop sources that no binary refers to.
    pub mapi: bool,
    pub merge_threshold: usize,
    pub codec: CodecId,
    pub level: i32,
    pub progress: bool,
    /// Replaces the kind's default copy list when set.
    pub copy_tags: Option<Vec<Tag>>,
}

impl GenOptions {
    pub fn new(kind: CatalogKind, root: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            kind,
            root: root.into(),
            suffix: suffix.into(),
            meta: None,
            file_list: match kind {
                CatalogKind::Binary => FileListMode::Stripped,
                CatalogKind::Source => FileListMode::Omit,
            },
            scan_deps: true,
            append: false,
            cache_dir: None,
            changelog_since: None,
            xref_out: None,
            xref_in: None,
            update_info: None,
            useful_files: None,
            prev: None,
            flat: false,
            mapi: false,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            codec: CodecId::Zstd,
            level: DEFAULT_ZSTD_LEVEL,
            progress: false,
            copy_tags: None,
        }
    }

    /// Checks that need no I/O beyond looking at the input directory.
    pub fn validate(&self) -> Result<()> {
        if self.suffix.is_empty() || self.suffix.contains('/') {
            return Err(CatalogError::Config(format!(
                "bad subset suffix {:?}",
                self.suffix
            )));
        }
        if let Some(meta) = &self.meta {
            if meta.is_empty() || meta.contains('/') {
                return Err(CatalogError::Config(format!("bad --meta suffix {meta:?}")));
            }
        }
        if self.merge_threshold == 0 {
            return Err(CatalogError::Config("merge threshold must be at least 1".into()));
        }
        if !(1..=22).contains(&self.level) {
            return Err(CatalogError::Config(format!(
                "compression level {} outside 1..=22",
                self.level
            )));
        }
        if self.kind == CatalogKind::Source && self.xref_in.is_none() {
            return Err(CatalogError::Config(
                "source catalogs need the binary cross-reference index".into(),
            ));
        }
        if self.kind == CatalogKind::Source && self.file_list != FileListMode::Omit {
            return Err(CatalogError::Config(
                "source catalogs carry no file lists".into(),
            ));
        }
        let input = self.input_dir();
        if !input.is_dir() {
            return Err(CatalogError::Config(format!(
                "{}: not a directory",
                input.display()
            )));
        }
        Ok(())
    }

    pub fn input_dir(&self) -> PathBuf {
        match self.kind {
            CatalogKind::Binary => self.root.join(format!("RPMS.{}", self.suffix)),
            CatalogKind::Source => self.root.join(format!("SRPMS.{}", self.suffix)),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        let name = self.meta.as_deref().unwrap_or(&self.suffix);
        let stem = match self.kind {
            CatalogKind::Binary => "pkglist",
            CatalogKind::Source => "srclist",
        };
        self.root
            .join("base")
            .join(format!("{stem}.{name}{}", self.codec.suffix()))
    }

    pub fn dir_tag(&self) -> String {
        match (self.kind, self.flat) {
            (CatalogKind::Binary, _) => format!("RPMS.{}", self.suffix),
            (CatalogKind::Source, false) => format!("../SRPMS.{}", self.suffix),
            (CatalogKind::Source, true) => format!("./SRPMS.{}", self.suffix),
        }
    }

    pub fn grouping(&self) -> Grouping {
        match self.kind {
            CatalogKind::Binary => Grouping::ByKey,
            CatalogKind::Source => Grouping::Batched,
        }
    }

    /// Where a catalog entry keeps its group key; entries are written in
    /// `(group key, file name)` order.
    pub fn group_tag(&self) -> Tag {
        match self.kind {
            CatalogKind::Binary => Tag::SOURCERPM,
            CatalogKind::Source => Tag::FILENAME,
        }
    }

    /// Pass 1 collects dependency paths only when they can change the output.
    pub fn scanning(&self) -> bool {
        self.kind == CatalogKind::Binary && self.file_list == FileListMode::Stripped && self.scan_deps
    }

    pub fn cache_root(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(d) => Ok(d.clone()),
            None => dirs_next::cache_dir()
                .map(|d| d.join("pkgcat"))
                .ok_or_else(|| {
                    CatalogError::Config("no user cache directory; pass --cachedir".into())
                }),
        }
    }

    pub fn cache_namespace(&self) -> String {
        format!("{}{}", self.root.display(), self.suffix)
    }

    pub fn tool_name(&self) -> &'static str {
        match self.kind {
            CatalogKind::Binary => "genpkglist",
            CatalogKind::Source => "gensrclist",
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            copy_tags: self.copy_tags.clone().unwrap_or_else(|| match self.kind {
                CatalogKind::Binary => default_binary_tags(),
                CatalogKind::Source => default_source_tags(),
            }),
            file_list: self.file_list,
            changelog_since: self.changelog_since,
            dir_tag: self.dir_tag(),
        }
    }
}

/// Changelog cutoff from seconds since the Epoch, a `YYYY-MM-DD` date, or RFC 3339.
pub fn parse_cutoff(s: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(ts.unix_timestamp());
    }
    let day = format_description!("[year]-[month]-[day]");
    Date::parse(s, day)
        .map(|d| d.midnight().assume_utc().unix_timestamp())
        .map_err(|e| CatalogError::Config(format!("bad changelog cutoff {s:?}: {e}")))
}
