use criterion::{Criterion, criterion_group, criterion_main};

use std::fs;

use greyscript_lang::compiler::{compile, parser::parse};

pub fn benchmark_compiler(c: &mut Criterion) {
    const DIR: &str = "./benches/scripts";
    for dir in fs::read_dir(DIR).expect("could not list dir") {
        let path = dir.expect("could not read dir entry").path();
        if path.extension().is_some_and(|ext| ext == "src") {
            let input = &fs::read_to_string(&path).expect("could not read file contents");
            let name = path.file_name().unwrap().to_str().unwrap();
            c.bench_function(&format!("parse {name}"), |b| b.iter(|| parse(input)));
            c.bench_function(&format!("compile {name}"), |b| {
                b.iter(|| compile(input).unwrap());
            });
        }
    }
}

criterion_group!(compiler, benchmark_compiler);
criterion_main!(compiler);
