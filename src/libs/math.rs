use std::f64::consts::PI;

use crate::objects::{Args, CallbackInner, MapInner, Value};

macro_rules! unary_math {
    ($api:expr, $($name:literal => $f:expr),* $(,)?) => {
        $(
            $api.insert(
                $name,
                CallbackInner::from_fn($name, |args| {
                    let args = Args::new($name, args, 1)?;
                    let f: fn(f64) -> f64 = $f;
                    Ok(Value::Number(f(args.number(0)?)))
                }),
            );
        )*
    };
}

pub fn load_math(api: &MapInner) {
    api.insert("pi", Value::Number(PI));
    unary_math!(api,
        "abs" => f64::abs,
        "floor" => f64::floor,
        "ceil" => f64::ceil,
        "sqrt" => f64::sqrt,
        "sign" => |n| if n > 0.0 { 1.0 } else if n < 0.0 { -1.0 } else { 0.0 },
    );
    api.insert(
        "round",
        CallbackInner::from_fn("round", |args| {
            let args = Args::new("round", args, 2)?;
            let n = args.number(0)?;
            let digits = args.number_or(1, 0.0)?;
            let scale = 10f64.powf(digits.trunc());
            Ok(Value::Number((n * scale).round() / scale))
        }),
    );
}
