//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`resolve`]. Each
//! handler lives in its own submodule.

pub mod resolve;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::PatmuxError;

pub async fn dispatch(cli: Cli) -> Result<(), PatmuxError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Resolve(ref args)) => resolve::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  patmux v{version} - HTTP request multiplexer\n\n  \
         No command provided. To get started:\n\n    \
         patmux run                       Serve ./patmux.yaml\n    \
         patmux run -c routes.yaml        Serve a specific config file\n    \
         patmux resolve /some/path        Show which route a path hits\n    \
         patmux --help                    See all commands and options\n"
    );
}
