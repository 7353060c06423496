pub mod compare;

use super::args::{Cli, Command};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Compare(args) => compare::run(args).await,
    }
}
