use std::{
    fs,
    io::{Write, stdout},
};

use futures::executor::block_on;
use greyscript_lang::{Completion, Error, Interpreter, Value};

/// An interpreter with an `assert(condition, message?)` capability.
fn test_interpreter() -> Interpreter {
    let interpreter = Interpreter::new();
    interpreter.register_callback("assert", |args| {
        let condition = args.first().is_some_and(Value::is_truthy);
        if condition {
            Ok(Value::Nil)
        } else {
            let message = args.get(1).map(Value::to_string).unwrap_or_default();
            Err(Error::host(format!("assertion failed: {message}")))
        }
    });
    interpreter.register_callback("print", |_| Ok(Value::Nil));
    interpreter
}

#[test]
fn test_scripts() {
    const DIR: &str = "./tests/scripts";
    let _ = writeln!(stdout(), "running all test scripts in {DIR:?}");
    for dir in fs::read_dir(DIR).expect("could not list dir") {
        let path = dir.expect("could not read dir entry").path();
        if path.extension().is_some_and(|ext| ext == "src") {
            let input = fs::read_to_string(&path).expect("could not read file contents");
            let _ = writeln!(stdout(), "running {:?}", path.file_name().unwrap());
            let interpreter = test_interpreter();
            match block_on(interpreter.run_source(&input, Vec::new())) {
                Ok(Completion::Done(_)) => {}
                Ok(other) => panic!("{path:?} did not run to completion: {other:?}"),
                Err(err) => panic!("error encountered running {path:?}: {err}"),
            }
        } else {
            let _ = writeln!(stdout(), "skipping file {path:?}");
        }
    }
}
