use std::process::exit;

use clap::Parser;

use crate::args::GreyScriptCliArgs;

pub mod args;
pub mod commands;
pub mod host;

#[derive(Debug, Clone)]
pub struct Context;

#[tokio::main]
async fn main() {
    env_logger::init();
    let mut context = Context;
    let args = GreyScriptCliArgs::parse();
    match context.execute(args).await {
        Ok(()) => exit(0),
        Err(err) => {
            eprintln!("{err:#}");
            exit(1);
        }
    }
}
