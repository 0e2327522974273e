use std::path::PathBuf;

use clap::Parser;

use crate::report::SimSettings;

mod init;
mod report;
mod scene;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// RON scene file; the built-in scene is used when missing
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Fixed steps to simulate before exiting
    #[arg(short, long, default_value_t = 640)]
    ticks: u64,

    #[arg(short, long, default_value_t = 64)]
    report_every: u64,
}

fn main() {
    let args = Args::parse();

    if args.ticks == 0 {
        eprintln!("Error: ticks must be at least 1.");
        std::process::exit(1);
    }
    if args.report_every == 0 {
        eprintln!("Error: report_every must be at least 1.");
        eprintln!("Got: {}", args.report_every);
        std::process::exit(1);
    }

    init::init(
        args.scene,
        SimSettings {
            ticks: args.ticks,
            report_every: args.report_every,
        },
    );
}
