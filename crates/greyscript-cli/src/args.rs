use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "greyscript")]
#[command(bin_name = "greyscript")]
#[command(version, about, long_about = None)]
pub struct GreyScriptCliArgs {
    #[command(subcommand)]
    pub cmd: GreyScriptCliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum GreyScriptCliCommand {
    /// Compile and run a GreyScript program.
    Run(RunCommand),
    /// Compile a GreyScript program and report every diagnostic.
    Check(CheckCommand),
    /// Print the parsed syntax tree of a GreyScript program.
    Ast(AstCommand),
}

#[derive(Debug, Clone, Args)]
pub struct RunCommand {
    /// The path of the script to run.
    pub path: String,
    /// Arguments bound to `params`.
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CheckCommand {
    /// The path of the script to check.
    pub path: String,
}

#[derive(Debug, Clone, Args)]
pub struct AstCommand {
    /// The path of the script to parse.
    pub path: String,
    /// Print the debug representation instead of source form.
    #[arg(long)]
    pub debug: bool,
}
