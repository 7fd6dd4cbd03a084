use std::fmt;

/// Numeric attribute key of a package header.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    pub const I18N_TABLE: Tag = Tag(100);

    pub const NAME: Tag = Tag(1000);
    pub const VERSION: Tag = Tag(1001);
    pub const RELEASE: Tag = Tag(1002);
    pub const EPOCH: Tag = Tag(1003);
    pub const SUMMARY: Tag = Tag(1004);
    pub const DESCRIPTION: Tag = Tag(1005);
    pub const BUILDTIME: Tag = Tag(1006);
    pub const SIZE: Tag = Tag(1009);
    pub const VENDOR: Tag = Tag(1011);
    pub const PACKAGER: Tag = Tag(1015);
    pub const GROUP: Tag = Tag(1016);
    pub const ARCH: Tag = Tag(1022);
    pub const SOURCERPM: Tag = Tag(1044);
    pub const PROVIDENAME: Tag = Tag(1047);
    pub const REQUIREFLAGS: Tag = Tag(1048);
    pub const REQUIRENAME: Tag = Tag(1049);
    pub const REQUIREVERSION: Tag = Tag(1050);
    pub const CONFLICTFLAGS: Tag = Tag(1053);
    pub const CONFLICTNAME: Tag = Tag(1054);
    pub const CONFLICTVERSION: Tag = Tag(1055);
    pub const CHANGELOGTIME: Tag = Tag(1080);
    pub const CHANGELOGNAME: Tag = Tag(1081);
    pub const CHANGELOGTEXT: Tag = Tag(1082);
    pub const OBSOLETENAME: Tag = Tag(1090);
    pub const PROVIDEFLAGS: Tag = Tag(1112);
    pub const PROVIDEVERSION: Tag = Tag(1113);
    pub const OBSOLETEFLAGS: Tag = Tag(1114);
    pub const OBSOLETEVERSION: Tag = Tag(1115);
    pub const DIRINDEXES: Tag = Tag(1116);
    pub const BASENAMES: Tag = Tag(1117);
    pub const DIRNAMES: Tag = Tag(1118);

    // Catalog bookkeeping, outside the range used by package builders.
    pub const FILENAME: Tag = Tag(1_000_000);
    pub const FILESIZE: Tag = Tag(1_000_001);
    pub const CHECKSUM: Tag = Tag(1_000_005);
    pub const DIRECTORY: Tag = Tag(1_000_010);
    pub const BINARY: Tag = Tag(1_000_011);
    pub const UPDATE_SUMMARY: Tag = Tag(1_000_020);
    pub const UPDATE_IMPORTANCE: Tag = Tag(1_000_021);
    pub const UPDATE_DATE: Tag = Tag(1_000_022);
    pub const UPDATE_URL: Tag = Tag(1_000_023);

    /// Dependency-name lists whose absolute paths feed the useful-file set.
    pub const DEPENDENCY_NAMES: [Tag; 4] = [
        Tag::REQUIRENAME,
        Tag::PROVIDENAME,
        Tag::CONFLICTNAME,
        Tag::OBSOLETENAME,
    ];

    pub const FILE_LIST: [Tag; 3] = [Tag::BASENAMES, Tag::DIRNAMES, Tag::DIRINDEXES];

    pub const CHANGELOG: [Tag; 3] = [Tag::CHANGELOGTIME, Tag::CHANGELOGNAME, Tag::CHANGELOGTEXT];

    pub fn name(self) -> Option<&'static str> {
        NAMES.iter().find(|(t, _)| *t == self).map(|(_, n)| *n)
    }

    /// Case-insensitive lookup by symbolic name; numeric tags are accepted too.
    pub fn from_name(s: &str) -> Option<Tag> {
        if let Ok(n) = s.parse::<u32>() {
            return Some(Tag(n));
        }
        NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(s))
            .map(|(t, _)| *t)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(n) => f.write_str(n),
            None => write!(f, "{}", self.0),
        }
    }
}

const NAMES: &[(Tag, &str)] = &[
    (Tag::I18N_TABLE, "HEADERI18NTABLE"),
    (Tag::NAME, "NAME"),
    (Tag::VERSION, "VERSION"),
    (Tag::RELEASE, "RELEASE"),
    (Tag::EPOCH, "EPOCH"),
    (Tag::SUMMARY, "SUMMARY"),
    (Tag::DESCRIPTION, "DESCRIPTION"),
    (Tag::BUILDTIME, "BUILDTIME"),
    (Tag::SIZE, "SIZE"),
    (Tag::VENDOR, "VENDOR"),
    (Tag::PACKAGER, "PACKAGER"),
    (Tag::GROUP, "GROUP"),
    (Tag::ARCH, "ARCH"),
    (Tag::SOURCERPM, "SOURCERPM"),
    (Tag::PROVIDENAME, "PROVIDENAME"),
    (Tag::REQUIREFLAGS, "REQUIREFLAGS"),
    (Tag::REQUIRENAME, "REQUIRENAME"),
    (Tag::REQUIREVERSION, "REQUIREVERSION"),
    (Tag::CONFLICTFLAGS, "CONFLICTFLAGS"),
    (Tag::CONFLICTNAME, "CONFLICTNAME"),
    (Tag::CONFLICTVERSION, "CONFLICTVERSION"),
    (Tag::CHANGELOGTIME, "CHANGELOGTIME"),
    (Tag::CHANGELOGNAME, "CHANGELOGNAME"),
    (Tag::CHANGELOGTEXT, "CHANGELOGTEXT"),
    (Tag::OBSOLETENAME, "OBSOLETENAME"),
    (Tag::PROVIDEFLAGS, "PROVIDEFLAGS"),
    (Tag::PROVIDEVERSION, "PROVIDEVERSION"),
    (Tag::OBSOLETEFLAGS, "OBSOLETEFLAGS"),
    (Tag::OBSOLETEVERSION, "OBSOLETEVERSION"),
    (Tag::DIRINDEXES, "DIRINDEXES"),
    (Tag::BASENAMES, "BASENAMES"),
    (Tag::DIRNAMES, "DIRNAMES"),
    (Tag::FILENAME, "FILENAME"),
    (Tag::FILESIZE, "FILESIZE"),
    (Tag::CHECKSUM, "CHECKSUM"),
    (Tag::DIRECTORY, "DIRECTORY"),
    (Tag::BINARY, "BINARY"),
    (Tag::UPDATE_SUMMARY, "UPDATE_SUMMARY"),
    (Tag::UPDATE_IMPORTANCE, "UPDATE_IMPORTANCE"),
    (Tag::UPDATE_DATE, "UPDATE_DATE"),
    (Tag::UPDATE_URL, "UPDATE_URL"),
];
