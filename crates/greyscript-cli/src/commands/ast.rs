use std::fs;

use anyhow::Context as _;
use greyscript_lang::compiler::parser::parse;

use crate::{Context, args::AstCommand};

impl Context {
    pub fn execute_ast(&mut self, cmd: AstCommand) -> Result<(), anyhow::Error> {
        let input =
            fs::read_to_string(&cmd.path).with_context(|| format!("cannot read {}", cmd.path))?;
        let (chunk, errors) = parse(&input);
        for err in &errors {
            eprintln!("{}: {err}", cmd.path);
        }
        if cmd.debug {
            println!("{chunk:#?}");
        } else {
            print!("{chunk}");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("{} errors", errors.len()))
        }
    }
}
