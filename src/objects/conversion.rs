use compact_str::CompactString;

use crate::{
    errors::{Error, RuntimeErrorKind},
    objects::{Callback, Closure, Function, Handle, List, Map, Value, ValueType},
};

/// Conversion of host data into a boxed value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion of a boxed value into host data, used for callback arguments.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, Error>;
}

impl Value {
    /// Normalizes host data into one of the value variants. `None` and `()`
    /// become `null`.
    pub fn cast<T: IntoValue>(value: T) -> Value {
        value.into_value()
    }

    /// Reads a callback argument as host data.
    pub fn to<T: FromValue>(self) -> Result<T, Error> {
        T::from_value(self)
    }
}

macro_rules! impl_number_from {
    ($($i:ty),* $(,)?) => {
        $(
            impl From<$i> for Value {
                fn from(v: $i) -> Value {
                    Value::Number(f64::from(v))
                }
            }
        )*
    };
}
impl_number_from!(i8, u8, i16, u16, i32, u32, f32, f64);

macro_rules! impl_wide_number_from {
    ($($i:ty),* $(,)?) => {
        $(
            impl From<$i> for Value {
                #[allow(clippy::cast_precision_loss)]
                fn from(v: $i) -> Value {
                    Value::Number(v as f64)
                }
            }
        )*
    };
}
impl_wide_number_from!(i64, u64, isize, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Boolean(v)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Value {
        Value::Nil
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::String(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::String(v.into())
    }
}

impl From<CompactString> for Value {
    fn from(v: CompactString) -> Value {
        Value::String(v)
    }
}

macro_rules! impl_variant_from {
    ($($variant:ident($i:ty)),* $(,)?) => {
        $(
            impl From<$i> for Value {
                fn from(v: $i) -> Value {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}
impl_variant_from!(
    List(List),
    Map(Map),
    Function(Function),
    Function(Closure),
    Function(Callback),
    Handle(Handle),
);

impl<T: Into<Value>> IntoValue for T {
    fn into_value(self) -> Value {
        self.into()
    }
}

impl<T: IntoValue> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        v.map_or(Value::Nil, IntoValue::into_value)
    }
}

impl<T: IntoValue> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .map(IntoValue::into_value)
            .collect::<Vec<_>>()
            .into()
    }
}

fn unexpected(value: &Value, expected: ValueType) -> Error {
    Error::from(RuntimeErrorKind::InvalidArgument {
        function: "host".into(),
        message: format!("expected {expected}, found {}", value.value_type()),
    })
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, Error> {
        value
            .to_number()
            .ok_or_else(|| unexpected(&value, ValueType::Number))
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, Error> {
        let n = f64::from_value(value)?;
        #[allow(clippy::cast_possible_truncation)]
        let n = n as i64;
        Ok(n)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value.is_truthy())
    }
}

impl FromValue for CompactString {
    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value.to_key())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value.to_string())
    }
}

impl FromValue for List {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::List(v) => Ok(v),
            v => Err(unexpected(&v, ValueType::List)),
        }
    }
}

impl FromValue for Map {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Map(v) => Ok(v),
            v => Err(unexpected(&v, ValueType::Map)),
        }
    }
}

impl FromValue for Function {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Function(v) => Ok(v),
            v => Err(unexpected(&v, ValueType::Function)),
        }
    }
}

impl FromValue for Handle {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Handle(v) => Ok(v),
            v => Err(unexpected(&v, ValueType::Handle)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, Error> {
        if value.is_nil() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::List(v) => v.snapshot().into_iter().map(T::from_value).collect(),
            v => Err(unexpected(&v, ValueType::List)),
        }
    }
}
