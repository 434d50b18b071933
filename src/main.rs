use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contagion::{Action, Config, Driver, driver};
use rand::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    config: PathBuf,

    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Run {
        #[arg(long)]
        ticks: u64,

        #[arg(long, default_value_t = 1)]
        seeds: usize,

        /// Comma separated actions applied before starting (reset, infect, cure, toggle).
        #[arg(long, value_delimiter = ',')]
        actions: Vec<Action>,
    },

    Compare {
        #[arg(long)]
        ticks: u64,

        #[arg(long, default_value_t = 1)]
        seeds: usize,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = Config::from_file(&args.config).context("failed to construct cfg")?;
    log::info!("{cfg:#?}");

    match args.command {
        Command::Run {
            ticks,
            seeds,
            actions,
        } => {
            let mut driver = Driver::new(cfg, args.seed).context("failed to construct driver")?;
            for _ in 0..seeds {
                driver.apply(Action::Infect)?;
            }
            for action in actions {
                driver.apply(action)?;
            }
            if !driver.is_running() {
                driver.apply(Action::Toggle)?;
            }
            let summary = driver.run(ticks);
            log::info!("{summary:?}");
        }
        Command::Compare { ticks, seeds } => {
            let seed = match args.seed {
                Some(seed) => seed,
                None => rand::rng().random(),
            };
            log::info!("comparing with seed {seed}");
            driver::compare(&cfg, seed, seeds, ticks).context("failed to compare")?;
        }
    }

    Ok(())
}
