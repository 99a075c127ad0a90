use criterion::{Criterion, black_box, criterion_group, criterion_main};

use std::fs;

use futures::executor::block_on;
use greyscript_lang::{Interpreter, Value};

pub fn benchmark_scripts(c: &mut Criterion) {
    const DIR: &str = "./benches/scripts";
    for dir in fs::read_dir(DIR).expect("could not list dir") {
        let path = dir.expect("could not read dir entry").path();
        if path.extension().is_some_and(|ext| ext == "src") {
            let input = fs::read_to_string(&path).expect("could not read file contents");
            let interpreter = Interpreter::new();
            interpreter.register_callback("print", |_| Ok(Value::Nil));
            let program = interpreter
                .compile(&input)
                .expect("could not compile script");
            c.bench_function(
                &format!("run {}", path.file_name().unwrap().to_str().unwrap()),
                |b| {
                    b.iter(|| {
                        block_on(interpreter.run(black_box(&program), Vec::new())).unwrap()
                    });
                },
            );
        }
    }
}

criterion_group!(scripts, benchmark_scripts);
criterion_main!(scripts);
