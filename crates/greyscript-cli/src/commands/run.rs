use std::fs;

use anyhow::Context as _;
use greyscript_lang::{Completion, Interpreter, Value};
use log::info;

use crate::{Context, args::RunCommand, host};

impl Context {
    pub async fn execute_run(&mut self, cmd: RunCommand) -> Result<(), anyhow::Error> {
        let mut path = cmd.path;
        let mut params: Vec<Value> = cmd.args.into_iter().map(Value::from).collect();
        let stdin = host::Input::stdin();
        loop {
            let input = fs::read_to_string(&path).with_context(|| format!("cannot read {path}"))?;
            let interpreter = Interpreter::new();
            host::install(&interpreter, &stdin);
            let program = match interpreter.compile(&input) {
                Ok(program) => program,
                Err(e) => {
                    for err in e.errors {
                        eprintln!("{path}: {err}");
                    }
                    return Err(anyhow::Error::msg("compile error"));
                }
            };
            match interpreter
                .run(&program, params)
                .await
                .with_context(|| format!("runtime error in {path}"))?
            {
                Completion::Done(_) => return Ok(()),
                Completion::Exit(message) => {
                    if !message.is_empty() {
                        println!("{message}");
                    }
                    return Ok(());
                }
                Completion::NewShell(handle) => {
                    let session = host::Session::from_handle(&handle)?;
                    info!("starting nested session {}", session.path);
                    path = session.path;
                    params = session.params;
                }
            }
        }
    }
}
