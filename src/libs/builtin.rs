use compact_str::ToCompactString;

use crate::{
    errors::{Error, Signal},
    objects::{Args, CallbackInner, MapInner, Value, parse_number, slice_str, value_to_index},
};

/// Longest list `range` may build.
const MAX_RANGE_LEN: usize = 1 << 24;

pub fn load_builtin(api: &MapInner) {
    api.insert(
        "typeof",
        CallbackInner::from_fn("typeof", |args| {
            let args = Args::new("typeof", args, 1)?;
            Ok(args.get(0).value_type().to_compact_string().into())
        }),
    );
    api.insert(
        "str",
        CallbackInner::from_fn("str", |args| {
            let args = Args::new("str", args, 1)?;
            Ok(args.get(0).to_key().into())
        }),
    );
    api.insert(
        "val",
        CallbackInner::from_fn("val", |args| {
            let args = Args::new("val", args, 1)?;
            let n = match args.get(0) {
                Value::Number(n) => n,
                Value::String(s) => parse_number(&s),
                _ => 0.0,
            };
            Ok(Value::Number(if n.is_nan() { 0.0 } else { n }))
        }),
    );
    api.insert(
        "len",
        CallbackInner::from_fn("len", |args| {
            let args = Args::new("len", args, 1)?;
            Ok(match args.get(0) {
                Value::String(s) => s.chars().count().into(),
                Value::List(list) => list.len().into(),
                Value::Map(map) => map.len().into(),
                _ => Value::Nil,
            })
        }),
    );
    api.insert(
        "char",
        CallbackInner::from_fn("char", |args| {
            let args = Args::new("char", args, 1)?;
            let code = args.index(0)?;
            let c = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| args.error(format!("{code} is not a character code")))?;
            Ok(c.to_compact_string().into())
        }),
    );
    api.insert(
        "range",
        CallbackInner::from_fn("range", |args| {
            let args = Args::new("range", args, 3)?;
            let from = args.number(0)?;
            let to = args.number_or(1, 0.0)?;
            let step = args.number_or(2, if to >= from { 1.0 } else { -1.0 })?;
            if step == 0.0 || !step.is_finite() {
                return Err(args.error("step must be a non-zero number").into());
            }
            let mut items = Vec::new();
            let mut n = from;
            while (step > 0.0 && n <= to) || (step < 0.0 && n >= to) {
                if items.len() >= MAX_RANGE_LEN {
                    return Err(args.error("range too large").into());
                }
                items.push(Value::Number(n));
                n += step;
            }
            Ok(items.into())
        }),
    );
    api.insert(
        "slice",
        CallbackInner::from_fn("slice", |args| {
            let args = Args::new("slice", args, 3)?;
            let from = value_to_index(&args.get(1));
            let to = value_to_index(&args.get(2));
            match args.get(0) {
                Value::List(list) => Ok(list.slice(from, to).into()),
                Value::String(s) => Ok(slice_str(&s, from, to).into()),
                Value::Nil => Ok(Value::Nil),
                v => Err(args
                    .error(format!("cannot slice {}", v.value_type()))
                    .into()),
            }
        }),
    );
    api.insert(
        "exit",
        CallbackInner::from_fn("exit", |args| {
            let args = Args::new("exit", args, 1)?;
            let message = args.string_or(0, "");
            Err(Signal::Exit(message.into()).into())
        }),
    );

    // Free-function spellings of builtin methods: `hasIndex(x, i)` is
    // `x.hasIndex(i)`.
    for name in ["code", "hasIndex", "indexes", "values", "join"] {
        api.insert(
            name,
            CallbackInner::from_fn(name, move |mut args: Vec<Value>| -> Result<Value, Error> {
                if args.is_empty() {
                    return Ok(Value::Nil);
                }
                let target = args.remove(0);
                Ok(target.call_method(name, args)?)
            }),
        );
    }
}
