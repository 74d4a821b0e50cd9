use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rlconf::cli::{self, Cli, Commands};
use rlconf::settings::Settings;
use rlconf::validate::EnvDims;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = Settings::load().unwrap_or_else(|err| {
        eprintln!("warning: failed to load settings: {err}");
        Settings::default()
    });

    init_logging(&settings.logging.level);

    let outcome = match cli.command {
        Commands::Validate {
            paths,
            strict,
            obs,
            act,
        } => {
            let paths = if paths.is_empty() {
                vec![PathBuf::from(&settings.experiments_dir)]
            } else {
                paths
            };
            let env_dims = match (obs, act) {
                (Some(observation), Some(action)) => Some(EnvDims {
                    observation,
                    action,
                }),
                _ => None,
            };
            cli::run_validate(&paths, strict || settings.strict, env_dims)
        }
        Commands::Show { file, json } => cli::run_show(&file, json).map(|_| true),
        Commands::List { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&settings.experiments_dir));
            cli::run_list(&dir).map(|_| true)
        }
        Commands::Template { name } => cli::run_template(&name).map(|_| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            warn!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
