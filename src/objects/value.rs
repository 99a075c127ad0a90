use std::fmt;

use compact_str::{CompactString, ToCompactString};
use derive_more::Display;

use crate::{
    errors::RuntimeErrorKind,
    objects::{BuiltinMethods, Function, Handle, List, Map},
    utils::{format_number, quote_str},
};

/// Nesting limit for printing and comparing containers, which may be cyclic.
pub(crate) const MAX_NESTING: usize = 16;

/// Enum of all script values.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// `null`
    #[default]
    Nil,
    /// `true` / `false`
    Boolean(bool),
    /// A 64-bit floating point number.
    Number(f64),
    /// An immutable UTF-8 string.
    String(CompactString),
    /// A mutable, shared list.
    List(List),
    /// A mutable, shared, insertion-ordered map with string keys.
    Map(Map),
    /// A script closure or a host callback.
    Function(Function),
    /// An opaque host object.
    Handle(Handle),
}

/// The type of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ValueType {
    #[display("null")]
    Nil,
    #[display("boolean")]
    Boolean,
    #[display("number")]
    Number,
    #[display("string")]
    String,
    #[display("list")]
    List,
    #[display("map")]
    Map,
    #[display("function")]
    Function,
    #[display("handle")]
    Handle,
}

impl Value {
    pub const fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Map(_) => ValueType::Map,
            Value::Function(_) => ValueType::Function,
            Value::Handle(_) => ValueType::Handle,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// `null`, `false`, `0`, `""` and empty containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(v) => *v,
            Value::Number(v) => *v != 0.0 && !v.is_nan(),
            Value::String(v) => !v.is_empty(),
            Value::List(v) => !v.is_empty(),
            Value::Map(v) => !v.is_empty(),
            Value::Function(_) | Value::Handle(_) => true,
        }
    }

    /// Numeric coercion used by arithmetic. Containers, functions and handles
    /// have no numeric value.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Nil => Some(0.0),
            Value::Boolean(v) => Some(f64::from(u8::from(*v))),
            Value::Number(v) => Some(*v),
            Value::String(v) => Some(parse_number(v)),
            Value::List(_) | Value::Map(_) | Value::Function(_) | Value::Handle(_) => None,
        }
    }

    /// The text used when a value becomes a map key or is concatenated.
    pub fn to_key(&self) -> CompactString {
        match self {
            Value::String(v) => v.clone(),
            v => v.to_compact_string(),
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(v) => Some(v),
            _ => None,
        }
    }

    /// Quoted representation, as used for elements nested in containers.
    pub fn repr(&self) -> String {
        let mut s = String::new();
        let _ = self.write(&mut s, true, 0);
        s
    }

    /// Structural equality: identical references short-circuit, containers
    /// compare element-wise, functions and handles by identity.
    pub fn equals(&self, other: &Value) -> bool {
        self.equals_at(other, 0)
    }

    pub(crate) fn equals_at(&self, other: &Value, depth: usize) -> bool {
        if depth > MAX_NESTING {
            return false;
        }
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.equals(b, depth),
            (Value::Map(a), Value::Map(b)) => a.equals(b, depth),
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Handle(a), Value::Handle(b)) => a == b,
            _ => false,
        }
    }

    /// Whether `name` is a builtin method of this value's type.
    pub fn has_method(&self, name: &str) -> bool {
        match self {
            Value::String(_) => CompactString::has_method(name),
            Value::List(_) => List::has_method(name),
            Value::Map(_) => Map::has_method(name),
            _ => false,
        }
    }

    /// Calls a whitelisted builtin method. Names outside the whitelist of the
    /// value's type fail with [`RuntimeErrorKind::MethodNotFound`].
    pub fn call_method(&self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::String(v) if CompactString::has_method(name) => v.call_method(name, args),
            Value::List(v) if List::has_method(name) => v.call_method(name, args),
            Value::Map(v) if Map::has_method(name) => v.call_method(name, args),
            v => Err(RuntimeErrorKind::MethodNotFound {
                value_type: v.value_type(),
                method: name.into(),
            }),
        }
    }

    pub(crate) fn write(&self, f: &mut dyn fmt::Write, quoted: bool, depth: usize) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Number(v) => f.write_str(&format_number(*v)),
            Value::String(v) if quoted => f.write_str(&quote_str(v)),
            Value::String(v) => f.write_str(v),
            Value::List(v) => v.write(f, depth),
            Value::Map(v) => v.write(f, depth),
            Value::Function(v) => write!(f, "{v}"),
            Value::Handle(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, false, 0)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// Parses a decimal string, ignoring surrounding whitespace. Anything else is NaN.
pub(crate) fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}
