use std::io;

use clap::Parser;
use edge_totp::{cli::Args, generate_report, SystemClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "edge_totp=warn",
        1 => "edge_totp=debug",
        _ => "edge_totp=trace",
    };

    // stdout carries the code, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.into_config(io::stdin().lock())?;

    tracing::debug!(
        algorithm = %config.algorithm(),
        digits = config.digits(),
        time_step = config.time_step(),
        threshold = config.threshold(),
        "config loaded"
    );

    let report = generate_report(&config, args.fixed_instant(), &SystemClock)?;
    println!("{}", report.render(args.quiet));

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
