use compact_str::CompactString;

use crate::{errors::RuntimeErrorKind, objects::Value};

/// Per-type dispatch table of builtin methods.
pub trait BuiltinMethods {
    /// The whitelist. Every other name is a [`RuntimeErrorKind::MethodNotFound`].
    const METHODS: &'static [&'static str];

    fn has_method(name: &str) -> bool {
        Self::METHODS.contains(&name)
    }

    fn call_method(&self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeErrorKind>;
}

/// Positional arguments of a builtin method or intrinsic.
#[derive(Debug)]
pub(crate) struct Args {
    function: &'static str,
    values: Vec<Value>,
}

impl Args {
    /// Fails when more than `max` arguments were passed.
    pub(crate) fn new(
        function: &'static str,
        values: Vec<Value>,
        max: usize,
    ) -> Result<Self, RuntimeErrorKind> {
        if values.len() > max {
            return Err(RuntimeErrorKind::CallArguments {
                expected: max,
                given: values.len(),
            });
        }
        Ok(Args { function, values })
    }

    pub(crate) fn get(&self, i: usize) -> Value {
        self.values.get(i).cloned().unwrap_or_default()
    }

    pub(crate) fn is_given(&self, i: usize) -> bool {
        self.values.get(i).is_some_and(|v| !v.is_nil())
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> RuntimeErrorKind {
        RuntimeErrorKind::InvalidArgument {
            function: CompactString::from(self.function),
            message: message.into(),
        }
    }

    pub(crate) fn number(&self, i: usize) -> Result<f64, RuntimeErrorKind> {
        self.get(i)
            .to_number()
            .ok_or_else(|| self.error(format!("argument {} must be a number", i + 1)))
    }

    pub(crate) fn number_or(&self, i: usize, default: f64) -> Result<f64, RuntimeErrorKind> {
        if self.is_given(i) {
            self.number(i)
        } else {
            Ok(default)
        }
    }

    /// An integral index argument.
    pub(crate) fn index(&self, i: usize) -> Result<i64, RuntimeErrorKind> {
        let n = self.number(i)?;
        if n.is_nan() {
            return Err(self.error(format!("argument {} must be an index", i + 1)));
        }
        // Indices truncate towards zero.
        #[allow(clippy::cast_possible_truncation)]
        let index = n as i64;
        Ok(index)
    }

    pub(crate) fn string(&self, i: usize) -> CompactString {
        self.get(i).to_key()
    }

    pub(crate) fn string_or(&self, i: usize, default: &str) -> CompactString {
        if self.is_given(i) {
            self.string(i)
        } else {
            CompactString::from(default)
        }
    }
}

/// Resolves a possibly negative index against a length.
pub(crate) fn resolve_index(index: i64, len: usize) -> Result<usize, RuntimeErrorKind> {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { index + signed_len } else { index };
    usize::try_from(resolved)
        .ok()
        .filter(|i| *i < len)
        .ok_or(RuntimeErrorKind::IndexOutOfRange { index, len })
}

/// Clamps the bounds of a `[from:to]` slice.
pub(crate) fn slice_bounds(from: Option<i64>, to: Option<i64>, len: usize) -> (usize, usize) {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let clamp = |i: i64| {
        let i = if i < 0 { i + signed_len } else { i };
        usize::try_from(i.clamp(0, signed_len)).unwrap_or_default()
    };
    let start = from.map_or(0, clamp);
    let end = to.map_or(len, clamp);
    (start, end.max(start))
}

/// The number of a value as an index, if it has one.
pub(crate) fn value_to_index(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if n.is_nan() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let index = *n as i64;
    Some(index)
}
