use std::{
    cell::{Ref, RefCell},
    collections::HashMap,
    fmt, mem,
    rc::Rc,
};

use compact_str::CompactString;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{
    errors::RuntimeErrorKind,
    objects::{Args, BuiltinMethods, ListInner, MAX_NESTING, Value, ValueType},
    utils::quote_str,
};

pub type Map = Rc<MapInner>;

pub type MapEntries = IndexMap<CompactString, Value, FxBuildHasher>;

/// The storage of a map value.
///
/// Maps created by `new` are instances: they remember the map they were
/// forked from, which `isa` and member lookup consult.
#[derive(Debug, Default)]
pub struct MapInner {
    entries: RefCell<MapEntries>,
    is_instance: bool,
    prototype: Option<Map>,
}

impl MapInner {
    pub fn new() -> Self {
        MapInner::default()
    }

    pub fn from_entries(entries: MapEntries) -> Self {
        MapInner {
            entries: RefCell::new(entries),
            is_instance: false,
            prototype: None,
        }
    }

    pub fn is_instance(&self) -> bool {
        self.is_instance
    }

    pub fn prototype(&self) -> Option<&Map> {
        self.prototype.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn entries(&self) -> Ref<'_, MapEntries> {
        self.entries.borrow()
    }

    pub(crate) fn try_entries(&self) -> Option<Ref<'_, MapEntries>> {
        self.entries.try_borrow().ok()
    }

    pub(crate) fn take_entries(&self) -> Option<MapEntries> {
        self.entries.try_borrow_mut().ok().map(|mut entries| mem::take(&mut *entries))
    }

    /// A copy of the current entries, safe to hold across evaluation.
    pub fn snapshot(&self) -> Vec<(CompactString, Value)> {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Own entry only.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    /// Own entry, then the prototype chain.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        let mut map = Some(self);
        let mut depth = 0;
        while let Some(current) = map {
            if let Some(value) = current.get(key) {
                return Some(value);
            }
            depth += 1;
            if depth > MAX_NESTING {
                break;
            }
            map = current.prototype.as_deref();
        }
        None
    }

    pub fn insert(&self, key: impl Into<CompactString>, value: impl Into<Value>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.borrow_mut().shift_remove(key)
    }

    /// Copies every entry of `other` into this map.
    pub fn extend(&self, other: &MapInner) {
        let entries = other.snapshot();
        self.entries.borrow_mut().extend(entries);
    }

    /// Reads a dotted path such as `a.b.c`, descending into nested maps.
    /// A missing final key reads as `null`; a missing intermediate segment
    /// is a path error.
    pub fn get_path(&self, path: &str) -> Result<Value, RuntimeErrorKind> {
        let (parent, last) = self.walk_path(path)?;
        Ok(match parent {
            Some(map) => map.get(last),
            None => self.get(last),
        }
        .unwrap_or_default())
    }

    /// Assigns a dotted path such as `a.b.c`, descending into nested maps.
    pub fn set_path(&self, path: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        let (parent, last) = self.walk_path(path)?;
        match parent {
            Some(map) => map.insert(last, value),
            None => self.insert(last, value),
        }
        Ok(())
    }

    /// Resolves every segment but the last. `None` stands for `self`.
    fn walk_path<'a>(&self, path: &'a str) -> Result<(Option<Map>, &'a str), RuntimeErrorKind> {
        let mut segments: Vec<&str> = path.split('.').collect();
        let last = segments.pop().unwrap_or_default();
        let mut current: Option<Map> = None;
        for (i, segment) in segments.iter().enumerate() {
            let next = match &current {
                Some(map) => map.get(segment),
                None => self.get(segment),
            };
            let walked = || CompactString::from(segments[..=i].join("."));
            current = Some(match next {
                Some(Value::Map(map)) => map,
                Some(Value::Handle(_)) => {
                    return Err(RuntimeErrorKind::UnexpectedHandle { path: walked() });
                }
                Some(v) => {
                    return Err(RuntimeErrorKind::ImmutablePath {
                        path: path.into(),
                        value_type: v.value_type(),
                    });
                }
                None => return Err(RuntimeErrorKind::Path { path: walked() }),
            });
        }
        Ok((current, last))
    }

    /// Whether this map is `proto` or was forked from it, directly or not.
    pub fn isa(&self, proto: &MapInner) -> bool {
        let mut map = Some(self);
        let mut depth = 0;
        while let Some(current) = map {
            if std::ptr::eq(current, proto) {
                return true;
            }
            depth += 1;
            if depth > MAX_NESTING {
                break;
            }
            map = current.prototype.as_deref();
        }
        false
    }

    pub(crate) fn equals(&self, other: &MapInner, depth: usize) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let (a, b) = (self.snapshot(), other.snapshot());
        a.len() == b.len()
            && a.iter().all(|(k, v)| {
                other
                    .get(k)
                    .is_some_and(|other_value| v.equals_at(&other_value, depth + 1))
            })
    }

    pub(crate) fn write(&self, f: &mut dyn fmt::Write, depth: usize) -> fmt::Result {
        if depth >= MAX_NESTING {
            return f.write_str("{...}");
        }
        f.write_char('{')?;
        for (i, (key, value)) in self.snapshot().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: ", quote_str(key))?;
            value.write(f, true, depth + 1)?;
        }
        f.write_char('}')
    }
}

/// Creates an instance of `map` for `new`.
///
/// Nested maps and lists are forked too; a structure reachable twice is
/// forked once, so cycles survive the copy.
pub fn fork(map: &Map) -> Map {
    let mut forked = HashMap::new();
    fork_map(map, &mut forked)
}

fn fork_map(map: &Map, forked: &mut HashMap<*const (), Value>) -> Map {
    let key = Rc::as_ptr(map).cast::<()>();
    if let Some(Value::Map(done)) = forked.get(&key) {
        return Rc::clone(done);
    }
    let instance = Rc::new(MapInner {
        entries: RefCell::new(MapEntries::default()),
        is_instance: true,
        prototype: Some(Rc::clone(map)),
    });
    forked.insert(key, Value::Map(Rc::clone(&instance)));
    for (k, v) in map.snapshot() {
        let v = fork_value(v, forked);
        instance.insert(k, v);
    }
    instance
}

fn fork_value(value: Value, forked: &mut HashMap<*const (), Value>) -> Value {
    match value {
        Value::Map(map) => Value::Map(fork_map(&map, forked)),
        Value::List(list) => {
            let key = Rc::as_ptr(&list).cast::<()>();
            if let Some(done) = forked.get(&key) {
                return done.clone();
            }
            let copy = Rc::new(ListInner::default());
            forked.insert(key, Value::List(Rc::clone(&copy)));
            for item in list.snapshot() {
                let item = fork_value(item, forked);
                copy.push(item);
            }
            Value::List(copy)
        }
        other => other,
    }
}

impl From<MapInner> for Value {
    fn from(value: MapInner) -> Self {
        Value::Map(Rc::new(value))
    }
}

impl BuiltinMethods for Map {
    const METHODS: &'static [&'static str] = &[
        "remove", "hasIndex", "len", "indexes", "values", "indexOf", "push",
    ];

    fn call_method(&self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
        match name {
            "remove" => {
                let args = Args::new("remove", args, 1)?;
                Ok(Value::Boolean(self.remove(&args.string(0)).is_some()))
            }
            "hasIndex" => {
                let args = Args::new("hasIndex", args, 1)?;
                Ok(Value::Boolean(self.contains_key(&args.string(0))))
            }
            "len" => {
                Args::new("len", args, 0)?;
                Ok(Value::from(self.len()))
            }
            "indexes" => {
                Args::new("indexes", args, 0)?;
                let keys: Vec<Value> = self.entries().keys().cloned().map(Value::String).collect();
                Ok(keys.into())
            }
            "values" => {
                Args::new("values", args, 0)?;
                let values: Vec<Value> = self.entries().values().cloned().collect();
                Ok(values.into())
            }
            "indexOf" => {
                let args = Args::new("indexOf", args, 1)?;
                let needle = args.get(0);
                Ok(self
                    .snapshot()
                    .into_iter()
                    .find(|(_, v)| v.equals(&needle))
                    .map_or(Value::Nil, |(k, _)| Value::String(k)))
            }
            "push" => {
                let args = Args::new("push", args, 1)?;
                self.insert(args.string(0), Value::Number(1.0));
                Ok(Value::Map(Rc::clone(self)))
            }
            _ => Err(RuntimeErrorKind::MethodNotFound {
                value_type: ValueType::Map,
                method: name.into(),
            }),
        }
    }
}
