use std::{cell::RefCell, rc::Rc};

use futures::executor::block_on;
use greyscript_lang::{
    Completion, Error, HandleInner, HostObject, Interpreter, Options, RunError, RuntimeErrorKind,
    Signal, Value, objects::CallbackReturn,
};

/// An interpreter whose `print` records its first argument.
fn recording_interpreter() -> (Interpreter, Rc<RefCell<Vec<Value>>>) {
    let interpreter = Interpreter::new();
    let printed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&printed);
    interpreter.register_callback("print", move |args| {
        sink.borrow_mut()
            .push(args.into_iter().next().unwrap_or_default());
        Ok(Value::Nil)
    });
    (interpreter, printed)
}

fn run(interpreter: &Interpreter, input: &str) -> Result<Completion, RunError> {
    block_on(interpreter.run_source(input, Vec::new()))
}

fn run_value(input: &str) -> Value {
    match run(&Interpreter::new(), input) {
        Ok(Completion::Done(value)) => value,
        other => panic!("unexpected result {other:?}"),
    }
}

fn runtime_error(input: &str) -> RuntimeErrorKind {
    match run(&Interpreter::new(), input) {
        Err(RunError::Runtime(e)) => e.kind,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn test_assign_and_read() {
    assert_eq!(run_value("a = 1; b = a + 1; return b"), Value::from(2));
}

#[test]
fn test_for_prints_in_order() {
    let (interpreter, printed) = recording_interpreter();
    run(&interpreter, "for i in [1,2,3]; print(i); end for").unwrap();
    assert_eq!(
        *printed.borrow(),
        vec![Value::from(1), Value::from(2), Value::from(3)]
    );
}

#[test]
fn test_function_call_prints() {
    let (interpreter, printed) = recording_interpreter();
    run(
        &interpreter,
        "f = function(a); return a + 1; end function; print(f(41))",
    )
    .unwrap();
    assert_eq!(*printed.borrow(), vec![Value::from(42)]);
}

#[test]
fn test_parenless_call() {
    let (interpreter, printed) = recording_interpreter();
    run(&interpreter, "print \"hi\"\nprint [1, 2]\nprint (3)").unwrap();
    assert_eq!(
        printed.borrow().iter().map(Value::repr).collect::<Vec<_>>(),
        vec!["\"hi\"", "[1, 2]", "3"]
    );
}

#[test]
fn test_string_index() {
    assert_eq!(
        run_value("s = \"abc\"; return s[1] + s[-1]"),
        Value::from("bc")
    );
    assert!(matches!(
        runtime_error("return \"abc\"[3]"),
        RuntimeErrorKind::IndexOutOfRange { index: 3, len: 3 }
    ));
}

#[test]
fn test_map_constructor_scope() {
    let input = r#"
Box = {"size": 3}
Box.describe = function(label)
    return {"label": label, "size": self.size, "twice": self.size * 2}
end function
b = new Box
return b.describe("b")
"#;
    assert_eq!(
        run_value(input).to_string(),
        "{\"label\": \"b\", \"size\": 3, \"twice\": 6}"
    );
}

#[test]
fn test_loop_control() {
    let (interpreter, printed) = recording_interpreter();
    let input = r#"
acc = 0
for i in range(0, 9)
    if i % 2 == 0 then continue
    acc += i
    if acc > 8 then break
    print i
end for
return acc
"#;
    let completion = run(&interpreter, input).unwrap();
    // odd i: 1 -> 1, 3 -> 4, 5 -> 9 breaks before printing
    assert!(matches!(completion, Completion::Done(Value::Number(n)) if n == 9.0));
    assert_eq!(*printed.borrow(), vec![Value::from(1), Value::from(3)]);
}

#[test]
fn test_self_binds_to_instance() {
    let input = r#"
Counter = {"count": 0}
Counter.bump = function
    self.count += 1
    return self
end function
a = new Counter
b = new Counter
a.bump
a.bump
b.bump
return [a.count, b.count, Counter.count]
"#;
    assert_eq!(run_value(input).to_string(), "[2, 1, 0]");
}

#[test]
fn test_short_circuit() {
    let (interpreter, printed) = recording_interpreter();
    let input = r#"
effect = function
    print "evaluated"
    return true
end function
a = false and effect
b = true or effect
c = true and effect
return [a, b, c]
"#;
    match run(&interpreter, input).unwrap() {
        Completion::Done(value) => assert_eq!(value.to_string(), "[false, true, true]"),
        other => panic!("unexpected completion {other:?}"),
    }
    assert_eq!(printed.borrow().len(), 1);
}

#[test]
fn test_method_whitelist() {
    for input in [
        "x = [1, 2]; x.nope",
        "x = \"abc\"; x.push(1)",
        "x = {}; x.nope(1)",
        "x = 1; x.len",
    ] {
        assert!(
            matches!(runtime_error(input), RuntimeErrorKind::MethodNotFound { .. }),
            "{input}"
        );
    }
    // a missing key only fails when called
    assert_eq!(run_value("x = {}; return x.nope"), Value::Nil);
}

#[test]
fn test_runtime_errors() {
    assert_eq!(
        runtime_error("return missing + 1"),
        RuntimeErrorKind::Path {
            path: "missing".into()
        }
    );
    assert!(matches!(
        runtime_error("x = [1]; return x[5]"),
        RuntimeErrorKind::IndexOutOfRange { index: 5, len: 1 }
    ));
    assert!(matches!(
        runtime_error("x = \"abc\"; x[0] = \"z\""),
        RuntimeErrorKind::ImmutablePath { .. }
    ));
    assert!(matches!(
        runtime_error("f = function(a); end function; f 1, 2"),
        RuntimeErrorKind::CallArguments {
            expected: 1,
            given: 2
        }
    ));
    assert!(matches!(
        runtime_error("return [1] - 1"),
        RuntimeErrorKind::BinOperator { .. }
    ));
    assert!(matches!(
        runtime_error("for i in 3; end for"),
        RuntimeErrorKind::NotIterable(_)
    ));
    assert!(matches!(
        runtime_error("x = 1; x(2)"),
        RuntimeErrorKind::NotCallable(_)
    ));
}

#[test]
fn test_error_line() {
    match run(&Interpreter::new(), "a = 1\n\nb = a.nope\n") {
        Err(RunError::Runtime(e)) => assert_eq!(e.line, Some(3)),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_stack_overflow() {
    let interpreter = Interpreter::with_options(Options::new().max_call_depth(16));
    let result = run(
        &interpreter,
        "f = function(n); return f(n + 1); end function; f(0)",
    );
    assert!(matches!(
        result,
        Err(RunError::Runtime(e)) if e.kind == RuntimeErrorKind::StackOverflow(16)
    ));
}

#[test]
fn test_default_call_depth() {
    // a thread smaller than the default test thread
    let worker = std::thread::Builder::new()
        .stack_size(1024 * 1024)
        .spawn(|| {
            let depth = Options::default().max_call_depth;
            let deepest = run_value(&format!(
                "f = function(n)\n if n >= {depth} then return n\n return f(n + 1)\nend function\nreturn f(1)"
            ));
            assert_eq!(deepest, Value::from(depth));
            let error = runtime_error("f = function(n); return f(n + 1); end function; f(0)");
            assert_eq!(error, RuntimeErrorKind::StackOverflow(depth));
        })
        .unwrap();
    worker.join().unwrap();
}

#[test]
fn test_exit_signal() {
    let (interpreter, printed) = recording_interpreter();
    let completion = run(&interpreter, "print 1\nexit \"bye\"\nprint 2").unwrap();
    assert!(matches!(completion, Completion::Exit(message) if message == "bye"));
    assert_eq!(*printed.borrow(), vec![Value::from(1)]);
}

struct Session;

impl HostObject for Session {
    fn type_name(&self) -> &str {
        "shell"
    }

    fn call_method(&self, name: &str, _args: Vec<Value>) -> Result<CallbackReturn, Error> {
        Err(Error::host(format!("no method {name}")))
    }

    fn get(&self, name: &str) -> Option<Value> {
        (name == "name").then(|| Value::from("test"))
    }
}

#[test]
fn test_new_shell_signal() {
    let interpreter = Interpreter::new();
    interpreter.register_callback("launch", |_| {
        Err(Signal::NewShell(Rc::new(HandleInner::new(Session))).into())
    });
    let completion = run(&interpreter, "launch\nx = 1").unwrap();
    match completion {
        Completion::NewShell(handle) => {
            assert_eq!(handle.type_name(), "shell");
            assert_eq!(handle.get("name"), Some(Value::from("test")));
        }
        other => panic!("unexpected completion {other:?}"),
    }
}

#[test]
fn test_host_handle() {
    let interpreter = Interpreter::new();
    interpreter.register("session", HandleInner::new(Session));
    assert!(matches!(
        run(&interpreter, "return session.name"),
        Ok(Completion::Done(Value::String(s))) if s == "test"
    ));
    assert!(matches!(
        run(&interpreter, "session.close"),
        Err(RunError::Runtime(e)) if matches!(e.kind, RuntimeErrorKind::Host(_))
    ));
}

#[test]
fn test_async_capability() {
    let interpreter = Interpreter::new();
    interpreter.register_async("fetch", |args: Vec<Value>| async move {
        let n = args.first().and_then(Value::to_number).unwrap_or_default();
        Ok(Value::Number(n * 2.0))
    });
    assert!(matches!(
        run(&interpreter, "total = 0\nfor i in [1, 2]\n total += fetch(i)\nend for\nreturn total"),
        Ok(Completion::Done(Value::Number(n))) if n == 6.0
    ));
}

#[test]
fn test_call_function_from_host() {
    let interpreter = Interpreter::new();
    let completion = run(
        &interpreter,
        "base = 10\nreturn @(function(x); return x + base; end function)",
    );
    let Ok(Completion::Done(function)) = completion else {
        panic!("unexpected result {completion:?}");
    };
    let result = block_on(interpreter.call_function(&function, vec![Value::from(5)])).unwrap();
    assert_eq!(result, Value::from(15));
}

#[test]
fn test_params() {
    let interpreter = Interpreter::new();
    let completion = block_on(interpreter.run_source(
        "return params[0] + params.len",
        vec![Value::from("n=")],
    ));
    assert!(matches!(
        completion,
        Ok(Completion::Done(Value::String(s))) if s == "n=1"
    ));
}

#[test]
fn test_debugger_hook() {
    let interpreter = Interpreter::new();
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&lines);
    interpreter.register_callback("debugger", move |args| {
        sink.borrow_mut().push(args.first().cloned().unwrap_or_default());
        Ok(Value::Nil)
    });
    run(&interpreter, "a = 1\n// debugger\nb = 2").unwrap();
    assert_eq!(*lines.borrow(), vec![Value::from(2)]);
}

#[test]
fn test_compile_errors() {
    match run(&Interpreter::new(), "break\nx = \nif then") {
        Err(RunError::Compile(e)) => assert!(e.errors.len() >= 2, "{e}"),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_call_by_name() {
    let interpreter = Interpreter::new();
    run(&interpreter, "greet = function(name=\"you\"); return \"hi \" + name; end function").unwrap();
    assert_eq!(
        block_on(interpreter.call("greet", Vec::new())).unwrap(),
        Value::from("hi you")
    );
    let missing = block_on(interpreter.call("nope", Vec::new())).unwrap_err();
    assert!(!missing.is_signal());
    assert!(matches!(
        block_on(interpreter.call("pi", Vec::new())),
        Err(Error::Runtime(e)) if e.kind == RuntimeErrorKind::NotCallable(greyscript_lang::ValueType::Number)
    ));
}
