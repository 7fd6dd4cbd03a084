use crate::error::{CatalogError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// `<group> <identity>` lines written alongside a binary catalog.
pub struct XrefWriter {
    out: BufWriter<File>,
    pub lines: u64,
}

impl XrefWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let f = File::create(path).map_err(|e| {
            CatalogError::Io(std::io::Error::new(
                e.kind(),
                format!("error creating file {}: {e}", path.display()),
            ))
        })?;
        Ok(Self {
            out: BufWriter::new(f),
            lines: 0,
        })
    }

    pub fn write(&mut self, group: &str, identity: &str) -> Result<()> {
        writeln!(self.out, "{group} {identity}")?;
        self.lines += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Group key to identities, in file order.
pub fn read_xref(path: &Path) -> Result<HashMap<String, Vec<String>>> {
    let f = File::open(path).map_err(|e| {
        CatalogError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open index {}: {e}", path.display()),
        ))
    })?;
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (no, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (group, identity) = line
            .split_once(' ')
            .filter(|(g, i)| !g.is_empty() && !i.is_empty() && !i.contains(' '))
            .ok_or_else(|| {
                CatalogError::Format(format!(
                    "{}:{}: expected `<source> <package>`",
                    path.display(),
                    no + 1
                ))
            })?;
        map.entry(group.to_owned())
            .or_default()
            .push(identity.to_owned());
    }
    Ok(map)
}
