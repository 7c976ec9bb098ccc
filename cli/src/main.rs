mod commands;
mod terminal;

use commands::{CommandLine, Commands, run, scan, services};
use lanprobe_common::config::Config;
use terminal::{logging, print};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet)?;
    print::banner(commands.quiet);

    let cfg: Config = commands.to_config();
    cfg.validate()?;

    let q_level: u8 = commands.quiet;
    match commands.command.clone().unwrap_or(Commands::Run) {
        Commands::Run => {
            print::header("discovering hosts", q_level);
            run::run(&cfg, q_level).await?;
        }
        Commands::Scan { target } => {
            print::header("starting scanner", q_level);
            scan::scan(target, &cfg, q_level).await?;
        }
        Commands::Services => {
            services::services(q_level);
            return Ok(());
        }
    }

    if !commands.no_wait {
        wait_for_exit().await?;
    }
    Ok(())
}

async fn wait_for_exit() -> anyhow::Result<()> {
    info!("Press Ctrl-C to exit");
    tokio::signal::ctrl_c().await?;
    print::print("Leaving...");
    Ok(())
}
