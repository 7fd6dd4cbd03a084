use crate::error::{CatalogError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Update annotation attached to one package file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateInfo {
    pub importance: String,
    pub date: String,
    pub summary: String,
    pub url: String,
}

/// Keyed by package file name (record identity).
pub type UpdateInfoMap = HashMap<String, UpdateInfo>;

pub fn load_update_info(path: &Path) -> Result<UpdateInfoMap> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CatalogError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open update info {}: {e}", path.display()),
        ))
    })?;
    parse_update_info(&text)
}

/// Blank-line separated stanzas of `Field: value` lines. Lines starting with
/// whitespace continue the previous field; `#` lines are comments. Field
/// names are case-insensitive and a later stanza for the same file wins.
pub fn parse_update_info(text: &str) -> Result<UpdateInfoMap> {
    let mut map = UpdateInfoMap::new();
    let mut stanza: Vec<(String, String)> = Vec::new();
    let mut first_line = 1usize;

    for (no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        if line.trim().is_empty() {
            flush(&mut stanza, &mut map, first_line);
            first_line = no + 1;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if line.starts_with([' ', '\t']) {
            let Some((_, value)) = stanza.last_mut() else {
                return Err(CatalogError::Format(format!(
                    "update info line {no}: continuation without a field"
                )));
            };
            if !value.is_empty() {
                value.push('\n');
            }
            value.push_str(line.trim());
            continue;
        }
        let Some((field, value)) = line.split_once(':') else {
            return Err(CatalogError::Format(format!(
                "update info line {no}: expected `Field: value`"
            )));
        };
        stanza.push((field.trim().to_ascii_lowercase(), value.trim().to_string()));
    }
    flush(&mut stanza, &mut map, first_line);
    Ok(map)
}

fn flush(stanza: &mut Vec<(String, String)>, map: &mut UpdateInfoMap, line: usize) {
    if stanza.is_empty() {
        return;
    }
    let mut file = None;
    let mut info = UpdateInfo::default();
    for (field, value) in stanza.drain(..) {
        match field.as_str() {
            "file" => file = Some(value),
            "importance" => info.importance = value,
            "date" => info.date = value,
            "summary" => info.summary = value,
            "url" => info.url = value,
            _ => {}
        }
    }
    match file {
        Some(f) if !f.is_empty() => {
            map.insert(f, info);
        }
        _ => warn!(line, "update info stanza without File field skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# security fixes
File: foo-1.0-1.x86_64.rpm
Importance: security
Date: 2024-05-01
Summary: Fixes a heap overflow
 in the parser.
URL: https://example.org/adv/1

file: bar-2.0-1.noarch.rpm
IMPORTANCE: bugfix

Summary: orphan

File: foo-1.0-1.x86_64.rpm
Importance: critical
";

    #[test]
    fn stanzas_and_last_wins() {
        let m = parse_update_info(SAMPLE).unwrap();
        assert_eq!(m.len(), 2);
        let foo = &m["foo-1.0-1.x86_64.rpm"];
        assert_eq!(foo.importance, "critical");
        assert!(foo.summary.is_empty());
        assert_eq!(m["bar-2.0-1.noarch.rpm"].importance, "bugfix");
    }

    #[test]
    fn continuation_lines_join() {
        let m = parse_update_info(&SAMPLE[..SAMPLE.find("\n\nfile").unwrap()]).unwrap();
        let foo = &m["foo-1.0-1.x86_64.rpm"];
        assert_eq!(foo.summary, "Fixes a heap overflow\nin the parser.");
        assert_eq!(foo.url, "https://example.org/adv/1");
    }

    #[test]
    fn garbage_lines_are_errors() {
        assert!(parse_update_info("File foo\n").is_err());
        assert!(parse_update_info(" leading continuation\n").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_update_info(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
