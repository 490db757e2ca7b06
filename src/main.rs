//! dashforge assembles dashboard documents for the monitoring stack: it
//! builds a declarative description of panels, template variables, and grid
//! layout, validates it, and writes the platform's JSON encoding to stdout
//! or a file.

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use ringlog::*;

mod config;
mod dashboard;
mod dashboards;
mod error;

use config::Settings;
use error::Error;

#[derive(Parser)]
#[command(
    name = "dashforge",
    version,
    about = "Generates dashboard documents for the monitoring platform"
)]
struct Args {
    /// Where to write the serialized dashboard; stdout when omitted
    output: Option<PathBuf>,

    /// Which built-in dashboard to generate
    #[arg(short, long, default_value = "papermc")]
    dashboard: String,

    /// Print the built-in dashboard names and exit
    #[arg(long)]
    list: bool,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::Info,
        1 => Level::Debug,
        _ => Level::Trace,
    };
    let log = LogBuilder::new()
        .output(Box::new(Stderr::new()))
        .build()
        .expect("failed to initialize log");
    let mut log = MultiLogBuilder::new()
        .level_filter(level.to_level_filter())
        .default(log)
        .build()
        .start();

    let result = run(&args);
    let _ = log.flush();

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    if args.list {
        for name in dashboards::DASHBOARDS {
            println!("{name}");
        }
        return Ok(());
    }

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let Some(built) = dashboards::get_dashboard(&args.dashboard, &settings) else {
        bail!(
            "unknown dashboard \"{}\" (--list shows the available names)",
            args.dashboard
        );
    };
    let dashboard = built?;
    debug!(
        "assembled \"{}\": {} variables, {} panels",
        dashboard.title,
        dashboard.variables().len(),
        dashboard.panels.len()
    );

    let bytes = dashboard::serialize::to_bytes(&dashboard)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes).map_err(Error::SinkWriteFailure)?;
            info!("wrote {} bytes to {}", bytes.len(), path.display());
            println!("dashboard written to {}", path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout()
                .lock()
                .write_all(&bytes)
                .map_err(Error::SinkWriteFailure)?;
        }
    }

    Ok(())
}
