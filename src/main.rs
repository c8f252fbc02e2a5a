use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use variants::cli::Cli;
use variants::{SettingsLoader, VariantsError, Workspace};

const LOG_ENV: &str = "VARIANTS_LOG";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), VariantsError> {
    let cwd = std::env::current_dir().map_err(|e| VariantsError::IoError {
        path: ".".into(),
        source: e,
    })?;
    let settings = SettingsLoader::new()
        .start_dir(&cwd)
        .cli_override("spec", cli.spec.map(|p| p.display().to_string()))
        .load()?;

    Workspace::new(settings, cwd).handle_and_print(&cli.command.into_action())
}

fn report(err: &VariantsError) {
    match err {
        VariantsError::UnknownKeys(keys) => {
            for key in keys {
                eprintln!("error: {key}");
            }
        }
        other => eprintln!("error: {other}"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
