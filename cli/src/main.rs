mod commands;
mod shutdown;
mod terminal;

use commands::{CommandLine, Commands, once, run};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.log_format)?;

    let cfg = commands.options.to_config();

    match commands.command {
        Commands::Run { shutdown_grace } => run::run(cfg, shutdown_grace).await,
        Commands::Once => once::once(cfg).await,
    }
}
