mod commands;
mod terminal;
mod ui;

use commands::{CommandLine, Commands, info, probe, watch};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);
    let cfg = commands.config();
    print::banner(cfg.quiet);

    match commands.command {
        Commands::Info => info::info(&cfg),
        Commands::Watch { host } => watch::watch(host, &cfg).await,
        Commands::Probe { host, count } => probe::probe(host, count, &cfg).await,
    }
}
