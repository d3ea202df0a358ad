//! Test automation for RayOS.
//!
//! Usage:
//!   cargo xtask test [SCENARIO..]  - Build, boot and judge scenarios in QEMU
//!   cargo xtask list               - List catalog scenarios
//!   cargo xtask build              - Build the boot artifacts
//!   cargo xtask stage --out DIR    - Stage a boot volume without launching
//!   cargo xtask send-text          - Type text into a running guest
//!   cargo xtask send-key           - Press a key in a running guest

mod build;
mod cargo;
mod config;
mod control;
mod stage;
mod verbose;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayos_harness::{Arch, CancelToken};

use crate::config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Headless QEMU test automation for RayOS")]
struct Cli {
    /// Only print warnings, errors and verdicts
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Print state transitions, monitor traffic and timings
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Guest architecture (default: from workspace metadata)
    #[arg(long, global = true)]
    arch: Option<Arch>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios (all of them if none are named)
    Test {
        /// Scenario names
        scenarios: Vec<String>,

        /// Skip the cargo build of the boot artifacts
        #[arg(long)]
        no_build: bool,

        /// Per-phase marker timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Session working directory
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Print the reports as JSON instead of verdict lines
        #[arg(long)]
        json: bool,
    },

    /// List catalog scenarios and their phases
    List,

    /// Build the boot artifacts named in the catalog
    Build,

    /// Stage a boot volume into a directory
    Stage {
        /// Output directory (replaced)
        #[arg(long)]
        out: PathBuf,

        /// Scenario to stage (default: first in the catalog)
        #[arg(long)]
        scenario: Option<String>,

        /// Phase to stage (default: first of the scenario)
        #[arg(long)]
        phase: Option<String>,
    },

    /// Type text into a running guest through its monitor socket
    SendText {
        /// HMP monitor socket
        #[arg(long)]
        sock: PathBuf,

        /// Text to type
        #[arg(long)]
        text: String,

        /// Do not press Enter after the text
        #[arg(long)]
        no_enter: bool,

        /// Seconds to wait for the socket
        #[arg(long, default_value_t = 10.0)]
        wait: f64,

        /// Seconds to wait after typing
        #[arg(long, default_value_t = 1.5)]
        after: f64,

        /// Ask the emulator to exit afterwards
        #[arg(long)]
        quit: bool,
    },

    /// Press a key or combination (e.g. `ret`, `ctrl-alt-delete`)
    SendKey {
        /// HMP monitor socket
        #[arg(long)]
        sock: PathBuf,

        /// Key name
        #[arg(long)]
        key: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    verbose::init(cli.quiet, cli.verbose);

    let cancel = CancelToken::new();
    let trip = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || trip.cancel()) {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
    }

    match run(cli, &cancel) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, cancel: &CancelToken) -> Result<u8> {
    let overrides = Overrides {
        arch: cli.arch,
        ..Overrides::default()
    };

    match cli.command {
        Commands::Test {
            scenarios,
            no_build,
            timeout,
            work_dir,
            json,
        } => {
            let config = Config::load()?;
            let catalog = config.catalog()?;
            let harness = config.harness(&Overrides {
                timeout_secs: timeout,
                work_dir,
                no_build,
                ..overrides
            })?;
            test::run_tests(&config, &catalog, harness, &scenarios, json, cancel)
        }

        Commands::List => {
            let config = Config::load()?;
            let catalog = config.catalog()?;
            for def in &catalog.scenario {
                let phases: Vec<&str> = def.phase.iter().map(|p| p.name.as_str()).collect();
                if def.description.is_empty() {
                    println!("{} [{}]", def.name, phases.join(", "));
                } else {
                    println!("{} [{}] - {}", def.name, phases.join(", "), def.description);
                }
            }
            Ok(0)
        }

        Commands::Build => {
            let config = Config::load()?;
            let catalog = config.catalog()?;
            build::build(&config, &catalog)?;
            Ok(0)
        }

        Commands::Stage {
            out,
            scenario,
            phase,
        } => {
            let config = Config::load()?;
            let catalog = config.catalog()?;
            let harness = config.harness(&overrides)?;
            stage::stage(
                &config,
                &catalog,
                harness,
                scenario.as_deref(),
                phase.as_deref(),
                &out,
            )?;
            Ok(0)
        }

        Commands::SendText {
            sock,
            text,
            no_enter,
            wait,
            after,
            quit,
        } => {
            let opts = control::SendText {
                sock: &sock,
                text: &text,
                enter: !no_enter,
                wait: seconds(wait, "--wait")?,
                after: seconds(after, "--after")?,
                quit,
            };
            control::send_text(&opts, cancel)?;
            Ok(0)
        }

        Commands::SendKey { sock, key } => {
            control::send_key(&sock, &key, cancel)?;
            Ok(0)
        }
    }
}

fn seconds(value: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("{flag} must be a non-negative number of seconds"))
}
