//! Binary entry point that glues the SQLite-backed store to the TUI form.
//! The bootstrapping pipeline: parse and validate the command line, import
//! seed data when requested, open the store, hydrate the app state, and
//! drive the Ratatui event loop until the user closes the form.
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use dbform::cli::LaunchError;
use dbform::{run_app, seed_database, App, Cli, Store};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("**Error: {err:#}");
            if err.is::<LaunchError>() {
                eprintln!();
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let launch = cli.resolve()?;

    if launch.seed {
        seed_database(&launch.data_dir, &launch.name).context("failed to import seed data")?;
    }

    let store = Store::open(&launch.data_dir, &launch.name, None)
        .context("failed to open the database")?;
    let mut app = App::new(store, launch.title)?;
    run_app(&mut app)?;
    app.close()
}
