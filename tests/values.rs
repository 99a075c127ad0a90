use std::rc::Rc;

use compact_str::CompactString;
use greyscript_lang::{
    RuntimeErrorKind, Value, ValueType,
    objects::{ListInner, MapInner, fork},
};

fn list(items: impl IntoIterator<Item = Value>) -> Value {
    Value::from(items.into_iter().collect::<Vec<_>>())
}

fn strings(items: &[&str]) -> Value {
    list(items.iter().map(|s| Value::from(*s)))
}

#[test]
fn test_display() {
    assert_eq!(Value::Nil.to_string(), "null");
    assert_eq!(Value::from(3).to_string(), "3");
    assert_eq!(Value::from(0.5).to_string(), "0.5");
    assert_eq!(Value::from(1.0 / 3.0).to_string(), "0.333333");
    assert_eq!(Value::from("a\"b").to_string(), "a\"b");
    assert_eq!(Value::from("a\"b").repr(), "\"a\"\"b\"");
    let map = MapInner::new();
    map.insert("k", list([Value::from("v"), Value::Nil]));
    assert_eq!(Value::from(map).to_string(), "{\"k\": [\"v\", null]}");
}

#[test]
fn test_cyclic_display_terminates() {
    let inner = Rc::new(ListInner::default());
    inner.push(Value::List(Rc::clone(&inner)));
    let printed = Value::List(Rc::clone(&inner)).to_string();
    assert!(printed.contains("..."), "{printed}");
}

#[test]
fn test_truthiness() {
    for value in [
        Value::Nil,
        Value::from(false),
        Value::from(0),
        Value::from(""),
        list([]),
        Value::from(MapInner::new()),
    ] {
        assert!(!value.is_truthy(), "{value}");
    }
    assert!(Value::from(" ").is_truthy());
    assert!(list([Value::Nil]).is_truthy());
}

#[test]
fn test_equality() {
    assert_eq!(strings(&["a", "b"]), strings(&["a", "b"]));
    assert_ne!(strings(&["a"]), strings(&["a", "b"]));
    assert_ne!(Value::from(1), Value::from("1"));
    assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));

    let a = MapInner::new();
    a.insert("x", 1);
    let b = MapInner::new();
    b.insert("x", 1);
    assert_eq!(Value::from(a), Value::from(b));
}

#[test]
fn test_cast_and_to() {
    assert_eq!(Value::cast(Some(2u8)), Value::from(2));
    assert_eq!(Value::cast(None::<bool>), Value::Nil);
    assert_eq!(Value::cast(()), Value::Nil);
    assert_eq!(Value::from("7").to::<f64>().unwrap(), 7.0);
    assert_eq!(Value::from(3.9).to::<i64>().unwrap(), 3);
    assert_eq!(
        strings(&["a", "b"]).to::<Vec<CompactString>>().unwrap(),
        vec!["a", "b"]
    );
    assert_eq!(Value::Nil.to::<Option<f64>>().unwrap(), None);
    assert!(Value::from(1).to::<Vec<Value>>().is_err());
    let collected: Value = ["x", "y"].into_iter().collect();
    assert_eq!(collected, strings(&["x", "y"]));
}

#[test]
fn test_string_methods() {
    let s = Value::from("Hello World");
    assert_eq!(
        s.call_method("split", vec![Value::from(" ")]).unwrap(),
        strings(&["Hello", "World"])
    );
    assert_eq!(s.call_method("len", vec![]).unwrap(), Value::from(11));
    assert_eq!(
        s.call_method("indexOf", vec![Value::from("o")]).unwrap(),
        Value::from(4)
    );
    assert_eq!(
        s.call_method("indexOf", vec![Value::from("o"), Value::from(4)])
            .unwrap(),
        Value::from(7)
    );
    assert_eq!(
        s.call_method("indexOf", vec![Value::from("z")]).unwrap(),
        Value::Nil
    );
    assert_eq!(
        s.call_method("replace", vec![Value::from("o"), Value::from("0")])
            .unwrap(),
        Value::from("Hell0 W0rld")
    );
    assert_eq!(
        s.call_method("upper", vec![]).unwrap(),
        Value::from("HELLO WORLD")
    );
    assert_eq!(
        Value::from("42").call_method("to_int", vec![]).unwrap(),
        Value::from(42)
    );
    assert_eq!(
        Value::from("4.2").call_method("to_int", vec![]).unwrap(),
        Value::from("4.2")
    );
    assert_eq!(
        Value::from("A").call_method("code", vec![]).unwrap(),
        Value::from(65)
    );
}

#[test]
fn test_list_methods() {
    let items = list([Value::from(3), Value::from(1), Value::from(2)]);
    assert_eq!(items.call_method("sum", vec![]).unwrap(), Value::from(6));
    items.call_method("sort", vec![]).unwrap();
    assert_eq!(items.to_string(), "[1, 2, 3]");
    items.call_method("push", vec![Value::from(4)]).unwrap();
    assert_eq!(items.call_method("pull", vec![]).unwrap(), Value::from(1));
    assert_eq!(items.call_method("pop", vec![]).unwrap(), Value::from(4));
    items
        .call_method("insert", vec![Value::from(-1), Value::from(9)])
        .unwrap();
    assert_eq!(items.to_string(), "[2, 3, 9]");
    assert_eq!(
        items.call_method("join", vec![Value::from("-")]).unwrap(),
        Value::from("2-3-9")
    );
    assert_eq!(
        items.call_method("hasIndex", vec![Value::from(-3)]).unwrap(),
        Value::from(true)
    );
    assert_eq!(
        items.call_method("remove", vec![Value::from(5)]),
        Err(RuntimeErrorKind::IndexOutOfRange { index: 5, len: 3 })
    );
}

#[test]
fn test_sort_by_key() {
    let entry = |name: &str, age: i32| {
        let map = MapInner::new();
        map.insert("name", name);
        map.insert("age", age);
        Value::from(map)
    };
    let people = list([entry("b", 30), entry("a", 20), entry("c", 25)]);
    people.call_method("sort", vec![Value::from("age")]).unwrap();
    let names: Vec<String> = people
        .to::<Vec<Value>>()
        .unwrap()
        .iter()
        .map(|person| person.as_map().and_then(|m| m.get("name")).unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["a", "c", "b"]);
}

#[test]
fn test_map_methods() {
    let map = MapInner::new();
    map.insert("a", 1);
    map.insert("b", 2);
    let map = Value::from(map);
    assert_eq!(map.call_method("indexes", vec![]).unwrap(), strings(&["a", "b"]));
    assert_eq!(
        map.call_method("indexOf", vec![Value::from(2)]).unwrap(),
        Value::from("b")
    );
    assert_eq!(
        map.call_method("remove", vec![Value::from("a")]).unwrap(),
        Value::from(true)
    );
    assert_eq!(
        map.call_method("hasIndex", vec![Value::from("a")]).unwrap(),
        Value::from(false)
    );
}

#[test]
fn test_method_whitelist() {
    let cases = [
        (Value::from("abc"), "push", ValueType::String),
        (list([]), "split", ValueType::List),
        (Value::from(MapInner::new()), "sum", ValueType::Map),
        (Value::from(1), "len", ValueType::Number),
        (Value::Nil, "len", ValueType::Nil),
    ];
    for (value, method, value_type) in cases {
        assert!(!value.has_method(method));
        assert_eq!(
            value.call_method(method, vec![]),
            Err(RuntimeErrorKind::MethodNotFound {
                value_type,
                method: method.into()
            })
        );
    }
}

#[test]
fn test_method_arity() {
    assert_eq!(
        Value::from("abc").call_method("len", vec![Value::from(1)]),
        Err(RuntimeErrorKind::CallArguments {
            expected: 0,
            given: 1
        })
    );
}

#[test]
fn test_fork_and_isa() {
    let proto = Rc::new(MapInner::new());
    proto.insert("tags", list([Value::from("base")]));
    proto.insert("level", 1);
    let instance = fork(&proto);
    assert!(instance.is_instance());
    assert!(instance.isa(&proto));
    assert!(!proto.isa(&instance));

    // nested containers are copied, not shared
    instance
        .get("tags")
        .unwrap_or_default()
        .call_method("push", vec![Value::from("extra")])
        .unwrap();
    assert_eq!(proto.get("tags"), Some(strings(&["base"])));

    let grandchild = fork(&instance);
    assert!(grandchild.isa(&proto));
}

#[test]
fn test_paths() {
    let root = MapInner::new();
    let inner = Rc::new(MapInner::new());
    root.insert("a", Rc::clone(&inner));
    root.insert("n", 1);

    root.set_path("a.b", Value::from(2)).unwrap();
    assert_eq!(inner.get("b"), Some(Value::from(2)));
    assert_eq!(root.get_path("a.b").unwrap(), Value::from(2));
    assert_eq!(root.get_path("a.missing").unwrap(), Value::Nil);
    assert_eq!(
        root.get_path("x.b"),
        Err(RuntimeErrorKind::Path { path: "x".into() })
    );
    assert!(matches!(
        root.set_path("n.b", Value::Nil),
        Err(RuntimeErrorKind::ImmutablePath {
            value_type: ValueType::Number,
            ..
        })
    ));
}
