mod bot;
mod cli;
mod config;
mod github;
mod model;
mod parse;
mod reconcile;
mod relation;
mod render;
mod roster;
mod scan;
mod wrike;

use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tally=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
