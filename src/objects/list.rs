use std::{
    cell::{Ref, RefCell},
    cmp::Ordering,
    fmt, mem,
    rc::Rc,
};

use crate::{
    errors::RuntimeErrorKind,
    objects::{
        Args, BuiltinMethods, MAX_NESTING, Value, ValueType, resolve_index, slice_bounds,
        value_to_index,
    },
};

pub type List = Rc<ListInner>;

/// The storage of a list value. Lists are shared by reference and mutated in
/// place.
#[derive(Debug, Default)]
pub struct ListInner {
    items: RefCell<Vec<Value>>,
}

impl ListInner {
    pub fn new(items: Vec<Value>) -> Self {
        ListInner {
            items: RefCell::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.items.borrow()
    }

    pub(crate) fn try_items(&self) -> Option<Ref<'_, Vec<Value>>> {
        self.items.try_borrow().ok()
    }

    pub(crate) fn take_items(&self) -> Option<Vec<Value>> {
        self.items.try_borrow_mut().ok().map(|mut items| mem::take(&mut *items))
    }

    /// A copy of the current items, safe to hold across evaluation.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    /// Reads an element; negative indices count from the end.
    pub fn get(&self, index: i64) -> Result<Value, RuntimeErrorKind> {
        let items = self.items.borrow();
        let i = resolve_index(index, items.len())?;
        Ok(items[i].clone())
    }

    /// Replaces an element; negative indices count from the end.
    pub fn set(&self, index: i64, value: Value) -> Result<(), RuntimeErrorKind> {
        let mut items = self.items.borrow_mut();
        let i = resolve_index(index, items.len())?;
        items[i] = value;
        Ok(())
    }

    pub fn slice(&self, from: Option<i64>, to: Option<i64>) -> Vec<Value> {
        let items = self.items.borrow();
        let (start, end) = slice_bounds(from, to, items.len());
        items[start..end].to_vec()
    }

    pub(crate) fn equals(&self, other: &ListInner, depth: usize) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let (a, b) = (self.snapshot(), other.snapshot());
        a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.equals_at(y, depth + 1))
    }

    pub(crate) fn write(&self, f: &mut dyn fmt::Write, depth: usize) -> fmt::Result {
        if depth >= MAX_NESTING {
            return f.write_str("[...]");
        }
        f.write_char('[')?;
        for (i, item) in self.snapshot().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            item.write(f, true, depth + 1)?;
        }
        f.write_char(']')
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(Rc::new(ListInner::new(value)))
    }
}

impl From<ListInner> for Value {
    fn from(value: ListInner) -> Self {
        Value::List(Rc::new(value))
    }
}

/// Ordering used by `sort`: numbers before strings, everything else last.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Number(_) => 0,
            Value::String(_) => 1,
            _ => 2,
        }
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

impl BuiltinMethods for List {
    const METHODS: &'static [&'static str] = &[
        "join",
        "remove",
        "hasIndex",
        "indexOf",
        "lastIndexOf",
        "len",
        "pull",
        "pop",
        "push",
        "insert",
        "indexes",
        "values",
        "sum",
        "sort",
        "reverse",
    ];

    fn call_method(&self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
        match name {
            "join" => {
                let args = Args::new("join", args, 1)?;
                let delimiter = args.string_or(0, " ");
                let parts: Vec<String> = self.snapshot().iter().map(ToString::to_string).collect();
                Ok(Value::String(parts.join(delimiter.as_str()).into()))
            }
            "remove" => {
                let args = Args::new("remove", args, 1)?;
                let index = args.index(0)?;
                let mut items = self.items.borrow_mut();
                let i = resolve_index(index, items.len())?;
                items.remove(i);
                Ok(Value::Nil)
            }
            "hasIndex" => {
                let args = Args::new("hasIndex", args, 1)?;
                let has = value_to_index(&args.get(0))
                    .is_some_and(|index| resolve_index(index, self.len()).is_ok());
                Ok(Value::Boolean(has))
            }
            "indexOf" => {
                let args = Args::new("indexOf", args, 2)?;
                let needle = args.get(0);
                let after = if args.is_given(1) {
                    Some(resolve_index(args.index(1)?, self.len())?)
                } else {
                    None
                };
                let position = self
                    .snapshot()
                    .iter()
                    .enumerate()
                    .skip(after.map_or(0, |i| i + 1))
                    .find(|(_, item)| item.equals(&needle))
                    .map(|(i, _)| i);
                Ok(position.map_or(Value::Nil, Value::from))
            }
            "lastIndexOf" => {
                let args = Args::new("lastIndexOf", args, 1)?;
                let needle = args.get(0);
                let position = self.snapshot().iter().rposition(|item| item.equals(&needle));
                Ok(position.map_or(Value::Nil, Value::from))
            }
            "len" => {
                Args::new("len", args, 0)?;
                Ok(Value::from(self.len()))
            }
            "pull" => {
                Args::new("pull", args, 0)?;
                let mut items = self.items.borrow_mut();
                if items.is_empty() {
                    Ok(Value::Nil)
                } else {
                    Ok(items.remove(0))
                }
            }
            "pop" => {
                Args::new("pop", args, 0)?;
                Ok(self.items.borrow_mut().pop().unwrap_or_default())
            }
            "push" => {
                let args = Args::new("push", args, 1)?;
                self.push(args.get(0));
                Ok(Value::List(Rc::clone(self)))
            }
            "insert" => {
                let args = Args::new("insert", args, 2)?;
                let index = args.index(0)?;
                let mut items = self.items.borrow_mut();
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                let position = if index < 0 { index + len + 1 } else { index };
                let position = usize::try_from(position)
                    .ok()
                    .filter(|p| *p <= items.len())
                    .ok_or(RuntimeErrorKind::IndexOutOfRange {
                        index,
                        len: items.len(),
                    })?;
                items.insert(position, args.get(1));
                drop(items);
                Ok(Value::List(Rc::clone(self)))
            }
            "indexes" => {
                Args::new("indexes", args, 0)?;
                Ok((0..self.len()).map(Value::from).collect::<Vec<_>>().into())
            }
            "values" => {
                Args::new("values", args, 0)?;
                Ok(self.snapshot().into())
            }
            "sum" => {
                Args::new("sum", args, 0)?;
                let mut sum = 0.0;
                for item in self.snapshot() {
                    sum += item.to_number().ok_or(RuntimeErrorKind::BinOperator {
                        operator: "+",
                        operand: [item.value_type(), item.value_type()],
                    })?;
                }
                Ok(Value::Number(sum))
            }
            "sort" => {
                let args = Args::new("sort", args, 1)?;
                let mut items = self.snapshot();
                if args.is_given(0) {
                    // Sort maps by one of their fields.
                    let key = args.string(0);
                    let field = |v: &Value| {
                        v.as_map()
                            .and_then(|m| m.get(&key))
                            .unwrap_or_default()
                    };
                    items.sort_by(|a, b| compare_values(&field(a), &field(b)));
                } else {
                    items.sort_by(compare_values);
                }
                *self.items.borrow_mut() = items;
                Ok(Value::List(Rc::clone(self)))
            }
            "reverse" => {
                Args::new("reverse", args, 0)?;
                self.items.borrow_mut().reverse();
                Ok(Value::Nil)
            }
            _ => Err(RuntimeErrorKind::MethodNotFound {
                value_type: ValueType::List,
                method: name.into(),
            }),
        }
    }
}
