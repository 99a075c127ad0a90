use std::{cell::Cell, rc::Rc};

use futures::executor::block_on;
use greyscript_lang::{
    Completion, Error, HandleInner, HostObject, Interpreter, Value, objects::CallbackReturn,
};

/// A host object that counts how many of its kind were dropped.
struct Tracked(Rc<Cell<usize>>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

impl HostObject for Tracked {
    fn type_name(&self) -> &str {
        "tracked"
    }

    fn call_method(&self, name: &str, _args: Vec<Value>) -> Result<CallbackReturn, Error> {
        Err(Error::host(format!("no method {name}")))
    }
}

fn tracked(drops: &Rc<Cell<usize>>) -> Value {
    Value::from(HandleInner::new(Tracked(Rc::clone(drops))))
}

fn run_with_handle(input: &str, drops: &Rc<Cell<usize>>) {
    let interpreter = Interpreter::new();
    block_on(interpreter.run_source(input, vec![tracked(drops)])).unwrap();
}

#[test]
fn test_frames_with_local_functions_are_freed() {
    let drops = Rc::new(Cell::new(0));
    run_with_handle(
        r#"
f = function(h)
    helper = function
        return h
    end function
    return @helper
end function
f(params[0])
"#,
        &drops,
    );
    run_with_handle(
        r#"
f = function(h)
    return h
end function
f(params[0])
"#,
        &drops,
    );
    assert_eq!(drops.get(), 2);
}

#[test]
fn test_frames_are_freed_during_a_run() {
    let drops = Rc::new(Cell::new(0));
    let interpreter = Interpreter::new();
    let source = Rc::clone(&drops);
    interpreter.register_callback("track", move |_| Ok(tracked(&source)));
    let counter = Rc::clone(&drops);
    interpreter.register_callback("dropped", move |_| Ok(Value::from(counter.get())));

    let input = r#"
f = function(h)
    helper = function
        return h
    end function
    return @helper
end function
for i in range(1, 200)
    f(track)
end for
return dropped
"#;
    let completion = block_on(interpreter.run_source(input, Vec::new())).unwrap();
    let Completion::Done(Value::Number(during)) = completion else {
        panic!("unexpected completion {completion:?}");
    };
    assert!(during > 100.0, "only {during} freed while running");
    drop(interpreter);
    assert_eq!(drops.get(), 200);
}

#[test]
fn test_reachable_frames_survive() {
    let drops = Rc::new(Cell::new(0));
    let interpreter = Interpreter::new();
    let input = r#"
counter = function(h)
    state = {"n": 0, "h": h}
    bump = function
        state.n += 1
        return state.n
    end function
    return @bump
end function
bumps = []
for i in range(1, 100)
    bumps.push counter(params[0])
end for
keep = counter(params[0])
keep
bumps = null
"#;
    block_on(interpreter.run_source(input, vec![tracked(&drops)])).unwrap();
    assert_eq!(interpreter.collect(), 0);
    assert_eq!(
        block_on(interpreter.call("keep", Vec::new())).unwrap(),
        Value::from(2)
    );
    assert_eq!(drops.get(), 0);
    drop(interpreter);
    assert_eq!(drops.get(), 1);
}
