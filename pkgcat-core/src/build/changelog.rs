use crate::error::{CatalogError, Result};
use crate::header::{Header, Tag, Value};
use std::ops::Range;

/// Entries to keep for `cutoff`: the newest run with time >= cutoff, plus the one
/// entry right before it when older history exists.
///
/// Works for either storage order; package headers usually list newest first.
pub fn retained_range(times: &[u64], cutoff: i64) -> Range<usize> {
    let n = times.len();
    let recent = |t: u64| t as i64 >= cutoff;
    let newest_first = n >= 2 && times[0] > times[n - 1];

    if newest_first {
        let run = times.iter().take_while(|&&t| recent(t)).count();
        match run {
            0 => 0..0,
            r if r == n => 0..n,
            r => 0..r + 1,
        }
    } else {
        let run = times.iter().rev().take_while(|&&t| recent(t)).count();
        match run {
            0 => n..n,
            r if r == n => 0..n,
            r => n - r - 1..n,
        }
    }
}

/// Copy the trimmed changelog triple from `src` into `dst`.
pub fn copy_changelog(src: &Header, dst: &mut Header, cutoff: i64) -> Result<()> {
    let Some(times) = src.get(Tag::CHANGELOGTIME) else {
        return Ok(());
    };
    let times = times
        .as_ints()
        .ok_or_else(|| CatalogError::Format("CHANGELOGTIME is not an integer array".into()))?;
    let n = times.len();
    for tag in [Tag::CHANGELOGNAME, Tag::CHANGELOGTEXT] {
        let len = src.get(tag).map_or(0, Value::count);
        if len != n {
            return Err(CatalogError::Format(format!(
                "{tag} has {len} entries, CHANGELOGTIME has {n}"
            )));
        }
    }

    let keep = retained_range(&times, cutoff);
    if keep.is_empty() {
        return Ok(());
    }
    for tag in Tag::CHANGELOG {
        if let Some(v) = src.get(tag).and_then(|v| slice(v, keep.clone())) {
            dst.put(tag, v);
        }
    }
    Ok(())
}

fn slice(v: &Value, r: Range<usize>) -> Option<Value> {
    Some(match v {
        Value::Int32(x) => Value::Int32(x.get(r)?.to_vec()),
        Value::Int64(x) => Value::Int64(x.get(r)?.to_vec()),
        Value::StrArray(x) => Value::StrArray(x.get(r)?.to_vec()),
        Value::I18nStr(x) => Value::I18nStr(x.get(r)?.to_vec()),
        _ => return None,
    })
}
