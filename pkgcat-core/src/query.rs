//! `%{TAG}` formatting of catalog records, one catalog after another.

use crate::container::reader::CatalogReader;
use crate::error::{CatalogError, Result};
use crate::header::{Header, Tag, Value};
use std::io::Write;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Text(String),
    Field(Tag),
}

/// A parsed query format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Format {
    pieces: Vec<Piece>,
}

impl Format {
    /// `%{NAME}` fields (case-insensitive, or numeric), `%%` for a percent sign,
    /// and `\n`, `\t`, `\\` escapes.
    pub fn parse(s: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('\\') => text.push('\\'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => text.push('\\'),
                },
                '%' if chars.peek() == Some(&'%') => {
                    chars.next();
                    text.push('%');
                }
                '%' if chars.peek() == Some(&'{') => {
                    chars.next();
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(CatalogError::Config(format!(
                            "unterminated field in format {s:?}"
                        )));
                    }
                    let tag = Tag::from_name(name.trim()).ok_or_else(|| {
                        CatalogError::Config(format!("unknown tag {name:?} in format"))
                    })?;
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Field(tag));
                }
                c => text.push(c),
            }
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }
        Ok(Self { pieces })
    }

    pub fn render(&self, h: &Header, out: &mut String) {
        for p in &self.pieces {
            match p {
                Piece::Text(t) => out.push_str(t),
                Piece::Field(tag) => match h.get(*tag) {
                    Some(v) => render_value(v, out),
                    None => out.push_str("(none)"),
                },
            }
        }
    }
}

fn render_value(v: &Value, out: &mut String) {
    let join = |items: Vec<String>, out: &mut String| out.push_str(&items.join(", "));
    match v {
        Value::Str(s) => out.push_str(&String::from_utf8_lossy(s)),
        // default locale only
        Value::I18nStr(v) => {
            if let Some(s) = v.first() {
                out.push_str(&String::from_utf8_lossy(s));
            }
        }
        Value::StrArray(v) => join(
            v.iter().map(|s| String::from_utf8_lossy(s).into_owned()).collect(),
            out,
        ),
        Value::Bin(b) => out.push_str(&hex::encode(b)),
        other => join(
            other
                .as_ints()
                .unwrap_or_default()
                .iter()
                .map(u64::to_string)
                .collect(),
            out,
        ),
    }
}

/// Print every record of the catalog at `path`; returns the record count.
pub fn query_catalog(format: &Format, path: &Path, out: &mut dyn Write) -> Result<usize> {
    let mut n = 0;
    let mut line = String::new();
    for h in CatalogReader::open(path)? {
        let h = h?;
        line.clear();
        format.render(&h, &mut line);
        out.write_all(line.as_bytes())?;
        n += 1;
    }
    Ok(n)
}
