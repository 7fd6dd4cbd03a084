#![allow(dead_code)]

use pkgcat_core::container::frame::FRAME_MAGIC;
use pkgcat_core::domain::FileList;
use pkgcat_core::header::{Header, Tag, Value};
use pkgcat_core::input::rpm::{LEAD_LEN, LEAD_MAGIC};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway repository: `RPMS.<suffix>`, `SRPMS.<suffix>`, `base/` and a cache dir.
pub struct Repo {
    pub dir: TempDir,
    pub suffix: &'static str,
}

impl Repo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let suffix = "main";
        for sub in ["RPMS.main", "SRPMS.main", "base"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir, suffix }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn rpms(&self) -> PathBuf {
        self.root().join(format!("RPMS.{}", self.suffix))
    }

    pub fn srpms(&self) -> PathBuf {
        self.root().join(format!("SRPMS.{}", self.suffix))
    }

    pub fn cache(&self) -> PathBuf {
        self.root().join("cache")
    }

    pub fn add_binary(&self, pkg: &Pkg) -> PathBuf {
        let p = self.rpms().join(&pkg.file);
        fs::write(&p, pkg.bytes()).unwrap();
        p
    }

    pub fn add_source(&self, pkg: &Pkg) -> PathBuf {
        let p = self.srpms().join(&pkg.file);
        fs::write(&p, pkg.bytes()).unwrap();
        p
    }
}

/// Synthetic package description.
#[derive(Clone, Debug)]
pub struct Pkg {
    pub file: String,
    pub header: Header,
}

impl Pkg {
    pub fn new(file: &str, name: &str) -> Self {
        let mut header = Header::new();
        header.put(Tag::NAME, Value::str(name));
        header.put(Tag::VERSION, Value::str("1.0"));
        header.put(Tag::RELEASE, Value::str("1"));
        header.put(Tag::SUMMARY, Value::I18nStr(vec![format!("{name} package").into_bytes()]));
        header.put(
            Tag::DESCRIPTION,
            Value::I18nStr(vec![b"A package used to exercise the catalog generator.".to_vec()]),
        );
        Self {
            file: file.to_string(),
            header,
        }
    }

    pub fn source_rpm(mut self, srpm: &str) -> Self {
        self.header.put(Tag::SOURCERPM, Value::str(srpm));
        self
    }

    pub fn files(mut self, paths: &[&str]) -> Self {
        FileList::from_paths(paths).put_into(&mut self.header);
        self
    }

    pub fn requires(mut self, deps: &[&str]) -> Self {
        self.header.put(Tag::REQUIRENAME, Value::str_array(deps));
        self.header
            .put(Tag::REQUIREFLAGS, Value::Int32(vec![0; deps.len()]));
        self.header
            .put(Tag::REQUIREVERSION, Value::str_array(vec![""; deps.len()]));
        self
    }

    /// Lead, a signature header padded to 8 bytes, the main header, and a fake payload.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; LEAD_LEN];
        out[..4].copy_from_slice(&LEAD_MAGIC);
        let mut sig = Header::new();
        sig.put(Tag(1000), Value::Bin(vec![0xaa; 21]));
        out.extend_from_slice(&FRAME_MAGIC);
        out.extend_from_slice(&sig.encode().unwrap());
        while out.len() % 8 != 0 {
            out.push(0);
        }
        out.extend_from_slice(&FRAME_MAGIC);
        out.extend_from_slice(&self.header.encode().unwrap());
        out.extend_from_slice(b"compressed payload goes here");
        out
    }
}

/// `dir + base` for every file in a record's list.
pub fn file_paths(h: &Header) -> Vec<String> {
    match FileList::from_header(h).unwrap() {
        Some(list) => list
            .iter()
            .map(|(d, b)| String::from_utf8_lossy(&[d, b].concat()).into_owned())
            .collect(),
        None => Vec::new(),
    }
}
