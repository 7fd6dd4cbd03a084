use crate::build::changelog::copy_changelog;
use crate::build::strip::strip;
use crate::build::useful::UsefulFileSet;
use crate::domain::FileList;
use crate::error::Result;
use crate::header::{Header, Tag, Value};
use crate::input::info::UpdateInfoMap;
use crate::input::scan::PackageEntry;
use crate::options::{BuildOptions, FileListMode};

/// Assembles the catalog record for one package from its full header.
pub struct RecordBuilder<'a> {
    opts: &'a BuildOptions,
    useful: &'a UsefulFileSet,
    info: Option<&'a UpdateInfoMap>,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(opts: &'a BuildOptions, useful: &'a UsefulFileSet) -> Self {
        Self {
            opts,
            useful,
            info: None,
        }
    }

    pub fn with_update_info(mut self, info: &'a UpdateInfoMap) -> Self {
        self.info = Some(info);
        self
    }

    pub fn build(&self, src: &Header, entry: &PackageEntry, checksum: &str) -> Result<Header> {
        let mut out = Header::new();
        for &tag in &self.opts.copy_tags {
            out.copy_from(src, tag);
        }

        match self.opts.file_list {
            FileListMode::Omit => {}
            mode => {
                if let Some(list) = FileList::from_header(src)? {
                    let list = match mode {
                        FileListMode::Stripped => strip(&list, self.useful),
                        _ => list,
                    };
                    list.put_into(&mut out);
                }
            }
        }

        if let Some(cutoff) = self.opts.changelog_since {
            copy_changelog(src, &mut out, cutoff)?;
        }

        out.put(Tag::DIRECTORY, Value::str(&self.opts.dir_tag));
        out.put(Tag::FILENAME, Value::str(&entry.identity));
        out.put(Tag::FILESIZE, size_value(entry.size));

        if let Some(info) = self.info.and_then(|m| m.get(&entry.identity)) {
            out.put(Tag::UPDATE_SUMMARY, Value::str(&info.summary));
            out.put(Tag::UPDATE_URL, Value::str(&info.url));
            out.put(Tag::UPDATE_DATE, Value::str(&info.date));
            out.put(Tag::UPDATE_IMPORTANCE, Value::str(&info.importance));
        }

        out.put(Tag::CHECKSUM, Value::str(checksum));
        Ok(out)
    }
}

fn size_value(n: u64) -> Value {
    match u32::try_from(n) {
        Ok(small) => Value::Int32(vec![small]),
        Err(_) => Value::Int64(vec![n]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::useful::UsefulFileSetBuilder;
    use crate::input::info::UpdateInfo;
    use std::path::PathBuf;

    fn entry(name: &str, size: u64) -> PackageEntry {
        PackageEntry {
            path: PathBuf::from(name),
            identity: name.into(),
            size,
            mtime: 0,
        }
    }

    fn source() -> Header {
        let mut h = Header::new();
        h.put(Tag::NAME, Value::str("foo"));
        h.put(Tag::SUMMARY, Value::I18nStr(vec![b"Foo".to_vec(), b"\xc6\x92oo".to_vec()]));
        h.put(Tag::VENDOR, Value::str("nobody"));
        FileList::from_paths(["/usr/bin/foo", "/usr/share/doc/foo/README", "/etc/foo.conf"])
            .put_into(&mut h);
        h.put(Tag::CHANGELOGTIME, Value::Int32(vec![300, 200, 100]));
        h.put(Tag::CHANGELOGNAME, Value::str_array(["c", "b", "a"]));
        h.put(Tag::CHANGELOGTEXT, Value::str_array(["3", "2", "1"]));
        h
    }

    fn opts(mode: FileListMode) -> BuildOptions {
        BuildOptions {
            copy_tags: vec![Tag::SUMMARY, Tag::NAME],
            file_list: mode,
            changelog_since: None,
            dir_tag: "RPMS.main".into(),
        }
    }

    #[test]
    fn copies_selected_tags_in_configured_order() {
        let o = opts(FileListMode::Omit);
        let useful = UsefulFileSet::empty();
        let out = RecordBuilder::new(&o, &useful)
            .build(&source(), &entry("foo.rpm", 10), "abc")
            .unwrap();
        let tags: Vec<_> = out.iter().map(|(t, _)| t).collect();
        assert_eq!(
            tags,
            [
                Tag::SUMMARY,
                Tag::NAME,
                Tag::DIRECTORY,
                Tag::FILENAME,
                Tag::FILESIZE,
                Tag::CHECKSUM
            ]
        );
        assert_eq!(out.get(Tag::SUMMARY), source().get(Tag::SUMMARY));
        assert_eq!(out.get(Tag::FILESIZE), Some(&Value::Int32(vec![10])));
    }

    #[test]
    fn stripped_list_keeps_heuristic_and_useful_paths() {
        let o = opts(FileListMode::Stripped);
        let mut b = UsefulFileSetBuilder::new();
        b.insert(b"/etc/foo.conf".to_vec());
        let useful = b.freeze();
        let out = RecordBuilder::new(&o, &useful)
            .build(&source(), &entry("foo.rpm", 1), "x")
            .unwrap();
        let kept: Vec<Vec<u8>> = FileList::from_header(&out)
            .unwrap()
            .unwrap()
            .iter()
            .map(|(d, b)| [d, b].concat())
            .collect();
        assert_eq!(kept, [b"/usr/bin/foo".to_vec(), b"/etc/foo.conf".to_vec()]);

        let full = opts(FileListMode::Full);
        let out = RecordBuilder::new(&full, &useful)
            .build(&source(), &entry("foo.rpm", 1), "x")
            .unwrap();
        assert_eq!(FileList::from_header(&out).unwrap().unwrap().len(), 3);
    }

    #[test]
    fn changelog_and_update_info() {
        let mut o = opts(FileListMode::Omit);
        o.changelog_since = Some(250);
        let useful = UsefulFileSet::empty();
        let mut info = UpdateInfoMap::new();
        info.insert(
            "foo.rpm".into(),
            UpdateInfo {
                importance: "security".into(),
                ..Default::default()
            },
        );
        let out = RecordBuilder::new(&o, &useful)
            .with_update_info(&info)
            .build(&source(), &entry("foo.rpm", 5_000_000_000), "x")
            .unwrap();
        assert_eq!(out.get(Tag::CHANGELOGTIME), Some(&Value::Int32(vec![300, 200])));
        assert_eq!(out.get_string(Tag::UPDATE_IMPORTANCE).as_deref(), Some("security"));
        assert_eq!(out.get(Tag::FILESIZE), Some(&Value::Int64(vec![5_000_000_000])));
        assert_eq!(out.iter().last().map(|(t, _)| t), Some(Tag::CHECKSUM));

        let other = RecordBuilder::new(&o, &useful)
            .with_update_info(&info)
            .build(&source(), &entry("bar.rpm", 1), "x")
            .unwrap();
        assert!(!other.contains(Tag::UPDATE_IMPORTANCE));
    }
}
