use crate::error::{CatalogError, Result};

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeCode {
    Char = 1,
    Int8 = 2,
    Int16 = 3,
    Int32 = 4,
    Int64 = 5,
    Str = 6,
    Bin = 7,
    StrArray = 8,
    I18nStr = 9,
}

impl TypeCode {
    pub fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            1 => Self::Char,
            2 => Self::Int8,
            3 => Self::Int16,
            4 => Self::Int32,
            5 => Self::Int64,
            6 => Self::Str,
            7 => Self::Bin,
            8 => Self::StrArray,
            9 => Self::I18nStr,
            _ => return None,
        })
    }

    /// Natural alignment of the value inside the data store.
    pub fn alignment(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Int32 => 4,
            Self::Int64 => 8,
            _ => 1,
        }
    }
}

/// A header value. Strings are kept as raw bytes so copies never re-encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Char(Vec<u8>),
    Int8(Vec<u8>),
    Int16(Vec<u16>),
    Int32(Vec<u32>),
    Int64(Vec<u64>),
    Str(Vec<u8>),
    Bin(Vec<u8>),
    StrArray(Vec<Vec<u8>>),
    /// One string per locale listed in the i18n table.
    I18nStr(Vec<Vec<u8>>),
}

impl Value {
    pub fn str(s: impl AsRef<[u8]>) -> Self {
        Self::Str(s.as_ref().to_vec())
    }

    pub fn str_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self::StrArray(items.into_iter().map(|s| s.as_ref().to_vec()).collect())
    }

    pub fn type_code(&self) -> TypeCode {
        match self {
            Self::Char(_) => TypeCode::Char,
            Self::Int8(_) => TypeCode::Int8,
            Self::Int16(_) => TypeCode::Int16,
            Self::Int32(_) => TypeCode::Int32,
            Self::Int64(_) => TypeCode::Int64,
            Self::Str(_) => TypeCode::Str,
            Self::Bin(_) => TypeCode::Bin,
            Self::StrArray(_) => TypeCode::StrArray,
            Self::I18nStr(_) => TypeCode::I18nStr,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Char(v) | Self::Int8(v) | Self::Bin(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Str(_) => 1,
            Self::StrArray(v) | Self::I18nStr(v) => v.len(),
        }
    }

    /// First string of a `Str`, `StrArray` or `I18nStr`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Str(s) => Some(s),
            Self::StrArray(v) | Self::I18nStr(v) => v.first().map(Vec::as_slice),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[Vec<u8>]> {
        match self {
            Self::StrArray(v) | Self::I18nStr(v) => Some(v),
            Self::Str(s) => Some(std::slice::from_ref(s)),
            _ => None,
        }
    }

    /// Integer elements widened to u64.
    pub fn as_ints(&self) -> Option<Vec<u64>> {
        Some(match self {
            Self::Int8(v) | Self::Char(v) => v.iter().map(|&x| x as u64).collect(),
            Self::Int16(v) => v.iter().map(|&x| x as u64).collect(),
            Self::Int32(v) => v.iter().map(|&x| x as u64).collect(),
            Self::Int64(v) => v.clone(),
            _ => return None,
        })
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int8(v) | Self::Char(v) => v.first().map(|&x| x as u64),
            Self::Int16(v) => v.first().map(|&x| x as u64),
            Self::Int32(v) => v.first().map(|&x| x as u64),
            Self::Int64(v) => v.first().copied(),
            _ => None,
        }
    }

    /// Append the data-store representation (big-endian ints, NUL-terminated strings).
    pub(crate) fn write_data(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Char(v) | Self::Int8(v) | Self::Bin(v) => out.extend_from_slice(v),
            Self::Int16(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            Self::Int32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            Self::Int64(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            Self::Str(s) => put_cstr(out, s)?,
            Self::StrArray(v) | Self::I18nStr(v) => {
                for s in v {
                    put_cstr(out, s)?;
                }
            }
        }
        Ok(())
    }

    /// Decode `count` elements of type `ty` from the start of `data`.
    pub(crate) fn read_data(ty: TypeCode, count: usize, data: &[u8]) -> Result<Self> {
        // Every element occupies at least one byte; rejects absurd counts up front.
        if count == 0 || count > data.len() {
            return Err(CatalogError::Format(format!(
                "bad element count {count} for {} data bytes",
                data.len()
            )));
        }
        Ok(match ty {
            TypeCode::Char => Self::Char(take(data, count)?.to_vec()),
            TypeCode::Int8 => Self::Int8(take(data, count)?.to_vec()),
            TypeCode::Bin => Self::Bin(take(data, count)?.to_vec()),
            TypeCode::Int16 => Self::Int16(
                take(data, count.saturating_mul(2))?
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect(),
            ),
            TypeCode::Int32 => Self::Int32(
                take(data, count.saturating_mul(4))?
                    .chunks_exact(4)
                    .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            TypeCode::Int64 => Self::Int64(
                take(data, count.saturating_mul(8))?
                    .chunks_exact(8)
                    .map(|c| {
                        let mut b = [0u8; 8];
                        b.copy_from_slice(c);
                        u64::from_be_bytes(b)
                    })
                    .collect(),
            ),
            TypeCode::Str => {
                if count != 1 {
                    return Err(CatalogError::Format(format!(
                        "string value with count {count}"
                    )));
                }
                Self::Str(get_cstr(data)?.to_vec())
            }
            TypeCode::StrArray | TypeCode::I18nStr => {
                let mut items = Vec::with_capacity(count);
                let mut rest = data;
                for _ in 0..count {
                    let s = get_cstr(rest)?;
                    items.push(s.to_vec());
                    rest = &rest[s.len() + 1..];
                }
                if ty == TypeCode::StrArray {
                    Self::StrArray(items)
                } else {
                    Self::I18nStr(items)
                }
            }
        })
    }
}

fn put_cstr(out: &mut Vec<u8>, s: &[u8]) -> Result<()> {
    if s.contains(&0) {
        return Err(CatalogError::Format("string value contains NUL".into()));
    }
    out.extend_from_slice(s);
    out.push(0);
    Ok(())
}

fn get_cstr(data: &[u8]) -> Result<&[u8]> {
    let end = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| CatalogError::Format("unterminated string".into()))?;
    Ok(&data[..end])
}

fn take(data: &[u8], n: usize) -> Result<&[u8]> {
    data.get(..n)
        .ok_or_else(|| CatalogError::Format(format!("value needs {n} bytes, {} left", data.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_array_keeps_order_and_duplicates() {
        let v = Value::str_array(["b", "a", "b"]);
        let mut data = Vec::new();
        v.write_data(&mut data).unwrap();
        assert_eq!(data, b"b\0a\0b\0");
        let back = Value::read_data(TypeCode::StrArray, 3, &data).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn nul_in_string_is_rejected() {
        let mut data = Vec::new();
        assert!(Value::str(b"a\0b").write_data(&mut data).is_err());
    }

    #[test]
    fn short_int_data_is_an_error() {
        assert!(Value::read_data(TypeCode::Int32, 2, &[0, 0, 0, 1, 0]).is_err());
        assert!(Value::read_data(TypeCode::Str, 1, b"abc").is_err());
    }
}
