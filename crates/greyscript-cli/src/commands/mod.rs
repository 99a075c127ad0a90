use crate::{
    Context,
    args::{GreyScriptCliArgs, GreyScriptCliCommand},
};

mod ast;
mod check;
mod run;

impl Context {
    pub async fn execute(&mut self, args: GreyScriptCliArgs) -> Result<(), anyhow::Error> {
        match args.cmd {
            GreyScriptCliCommand::Run(cmd) => self.execute_run(cmd).await,
            GreyScriptCliCommand::Check(cmd) => self.execute_check(cmd),
            GreyScriptCliCommand::Ast(cmd) => self.execute_ast(cmd),
        }
    }
}
