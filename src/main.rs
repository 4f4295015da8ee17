mod collectors;
mod report;
mod snapshot;
mod units;

use clap::Parser;
use sysinfo::{System, SystemExt};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hostsnap")]
#[command(version)]
#[command(about = "Point-in-time snapshot of host health")]
struct Cli {
    /// Emit the snapshot as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let mut system = System::new_all();
    let snapshot = match collectors::collect_snapshot(&mut system) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(error = %err, "cannot collect snapshot");
            std::process::exit(1);
        }
    };

    if cli.json {
        match report::render_json(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!(error = %err, "cannot encode snapshot");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", report::render_text(&snapshot));
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the report; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
