use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;
use streamcheck_engine::{
    probe_single, CancellationToken, ProbeSettings, RunEvent, RunnerHandle,
};
use streamcheck_logging::LogDestination;

mod cli;
mod report;

use cli::{Cli, Command, ProbeArgs, RunArgs};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_path = Path::new("./streamcheck.log");
    let destination = if args.log_file {
        LogDestination::Both(log_path)
    } else {
        LogDestination::Terminal
    };
    streamcheck_logging::initialize(destination, level);

    match args.command {
        Command::Run(run_args) => run_command(&run_args),
        Command::Probe(probe_args) => probe_command(&probe_args),
    }
}

fn run_command(args: &RunArgs) -> anyhow::Result<()> {
    let config = args.to_config();
    let mut handle = RunnerHandle::new(ProbeSettings::default());
    let token = handle.start(config).context("failed to start run")?;
    spawn_ctrl_c_watcher(token);

    loop {
        let Some(event) = handle.recv_event() else {
            bail!("run controller terminated unexpectedly");
        };
        match event {
            RunEvent::Stage(stage) => log::info!("stage: {stage}"),
            RunEvent::Progress(progress) => report::print_progress(&progress),
            RunEvent::Categories(categories) => {
                if !args.json {
                    report::print_categories(&categories);
                }
            }
            RunEvent::Finished(result) => {
                let report = result.context("run failed")?;
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    report::print_summary(&report);
                }
                return Ok(());
            }
        }
    }
}

fn probe_command(args: &ProbeArgs) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(args.timeout_seconds);
    let outcome = probe_single(&args.url, timeout).context("probe setup failed")?;
    if outcome.working {
        println!("working ({} ms)", outcome.elapsed.as_millis());
        Ok(())
    } else {
        println!(
            "not working: {} ({} ms)",
            outcome.detail.as_deref().unwrap_or("unreachable"),
            outcome.elapsed.as_millis()
        );
        bail!("stream is not working");
    }
}

/// Cancel the active run on Ctrl-C. The watcher owns a tiny
/// current-thread runtime just for the signal future.
fn spawn_ctrl_c_watcher(token: CancellationToken) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                log::warn!("ctrl-c watcher unavailable: {err}");
                return;
            }
        };
        if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            log::warn!("interrupt received, cancelling run");
            token.cancel();
        }
    });
}
