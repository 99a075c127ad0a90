use compact_str::{CompactString, ToCompactString};

use crate::{
    errors::RuntimeErrorKind,
    objects::{Args, BuiltinMethods, Value, ValueType, resolve_index, slice_bounds, value_to_index},
};

/// Character index of a byte offset.
fn char_index(s: &str, byte_offset: usize) -> usize {
    s[..byte_offset].chars().count()
}

/// Byte offset of a character index, or the length when out of range.
fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices().nth(char_index).map_or(s.len(), |(i, _)| i)
}

/// Reads one character; negative indices count from the end.
pub(crate) fn char_at(s: &str, index: i64) -> Result<Value, RuntimeErrorKind> {
    let i = resolve_index(index, s.chars().count())?;
    Ok(Value::String(
        s.chars()
            .nth(i)
            .map(|c| c.to_compact_string())
            .unwrap_or_default(),
    ))
}

pub(crate) fn slice(s: &str, from: Option<i64>, to: Option<i64>) -> CompactString {
    let (start, end) = slice_bounds(from, to, s.chars().count());
    s.chars().skip(start).take(end - start).collect()
}

impl BuiltinMethods for CompactString {
    const METHODS: &'static [&'static str] = &[
        "split",
        "remove",
        "hasIndex",
        "indexOf",
        "lastIndexOf",
        "replace",
        "trim",
        "indexes",
        "code",
        "len",
        "lower",
        "upper",
        "val",
        "values",
        "to_int",
    ];

    fn call_method(&self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
        let s = self.as_str();
        match name {
            "split" => {
                let args = Args::new("split", args, 2)?;
                let delimiter = args.string_or(0, " ");
                let parts: Vec<Value> = if delimiter.is_empty() {
                    s.chars()
                        .map(|c| Value::String(c.to_compact_string()))
                        .collect()
                } else if args.is_given(1) && args.index(1)? > 0 {
                    let max = usize::try_from(args.index(1)?).unwrap_or(usize::MAX);
                    s.splitn(max, delimiter.as_str())
                        .map(|part| Value::String(part.into()))
                        .collect()
                } else {
                    s.split(delimiter.as_str())
                        .map(|part| Value::String(part.into()))
                        .collect()
                };
                Ok(parts.into())
            }
            "remove" => {
                let args = Args::new("remove", args, 1)?;
                let needle = args.string(0);
                Ok(Value::String(s.replacen(needle.as_str(), "", 1).into()))
            }
            "hasIndex" => {
                let args = Args::new("hasIndex", args, 1)?;
                let has = value_to_index(&args.get(0))
                    .is_some_and(|index| resolve_index(index, s.chars().count()).is_ok());
                Ok(Value::Boolean(has))
            }
            "indexOf" => {
                let args = Args::new("indexOf", args, 2)?;
                let needle = args.string(0);
                let from = if args.is_given(1) {
                    let after = resolve_index(args.index(1)?, s.chars().count())?;
                    byte_offset(s, after + 1)
                } else {
                    0
                };
                Ok(s[from..]
                    .find(needle.as_str())
                    .map_or(Value::Nil, |i| Value::from(char_index(s, from + i))))
            }
            "lastIndexOf" => {
                let args = Args::new("lastIndexOf", args, 1)?;
                let needle = args.string(0);
                Ok(s.rfind(needle.as_str())
                    .map_or(Value::Nil, |i| Value::from(char_index(s, i))))
            }
            "replace" => {
                let args = Args::new("replace", args, 3)?;
                let old = args.string(0);
                if old.is_empty() {
                    return Err(args.error("cannot replace an empty string"));
                }
                let new = args.string_or(1, "");
                let replaced = if args.is_given(2) {
                    let max = usize::try_from(args.index(2)?).unwrap_or_default();
                    s.replacen(old.as_str(), &new, max)
                } else {
                    s.replace(old.as_str(), &new)
                };
                Ok(Value::String(replaced.into()))
            }
            "trim" => {
                Args::new("trim", args, 0)?;
                Ok(Value::String(s.trim().into()))
            }
            "indexes" => {
                Args::new("indexes", args, 0)?;
                Ok((0..s.chars().count())
                    .map(Value::from)
                    .collect::<Vec<_>>()
                    .into())
            }
            "code" => {
                Args::new("code", args, 0)?;
                Ok(s.chars()
                    .next()
                    .map_or(Value::Nil, |c| Value::from(u32::from(c))))
            }
            "len" => {
                Args::new("len", args, 0)?;
                Ok(Value::from(s.chars().count()))
            }
            "lower" => {
                Args::new("lower", args, 0)?;
                Ok(Value::String(s.to_lowercase().into()))
            }
            "upper" => {
                Args::new("upper", args, 0)?;
                Ok(Value::String(s.to_uppercase().into()))
            }
            "val" => {
                Args::new("val", args, 0)?;
                let n = super::value::parse_number(s);
                Ok(Value::Number(if n.is_nan() { 0.0 } else { n }))
            }
            "values" => {
                Args::new("values", args, 0)?;
                Ok(s.chars()
                    .map(|c| Value::String(c.to_compact_string()))
                    .collect::<Vec<_>>()
                    .into())
            }
            "to_int" => {
                Args::new("to_int", args, 0)?;
                // Strings that are not integers come back unchanged.
                Ok(s.trim().parse::<i64>().map_or_else(
                    |_| Value::String(self.clone()),
                    Value::from,
                ))
            }
            _ => Err(RuntimeErrorKind::MethodNotFound {
                value_type: ValueType::String,
                method: name.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_helpers() {
        assert_eq!(char_index("héllo", 3), 2);
        assert_eq!(byte_offset("héllo", 2), 3);
        assert_eq!(slice("hello", Some(1), Some(-1)), "ell");
        assert_eq!(slice("hello", Some(-2), None), "lo");
        assert_eq!(slice("hello", Some(4), Some(2)), "");
        assert_eq!(char_at("abc", -1), Ok(Value::String("c".into())));
        assert!(char_at("abc", 3).is_err());
        assert_eq!(char_at("héllo", 1), Ok(Value::String("é".into())));
    }
}
