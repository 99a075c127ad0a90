use std::fs;

use anyhow::Context as _;
use greyscript_lang::compiler::compile;

use crate::{Context, args::CheckCommand};

impl Context {
    pub fn execute_check(&mut self, cmd: CheckCommand) -> Result<(), anyhow::Error> {
        let input =
            fs::read_to_string(&cmd.path).with_context(|| format!("cannot read {}", cmd.path))?;
        match compile(&input) {
            Ok(_) => {
                println!("{}: ok", cmd.path);
                Ok(())
            }
            Err(e) => {
                for err in &e.errors {
                    eprintln!("{}: {err}", cmd.path);
                }
                Err(anyhow::anyhow!("{} errors", e.errors.len()))
            }
        }
    }
}
