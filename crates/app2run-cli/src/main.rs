//! app2run: check App Engine apps for Cloud Run compatibility and translate
//! their configuration into a `gcloud beta run deploy` command.

mod cli;
mod commands;
mod gcloud;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use app2run_core::Collaborators;
use app2run_features::FeatureTable;
use tracing_subscriber::EnvFilter;

use crate::cli::{Action, Invocation};
use crate::commands::Loaded;
use crate::gcloud::GcloudConfigLookup;

const DEFAULT_LOG_FILTER: &str = "warn";

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(invocation: &Invocation) -> anyhow::Result<()> {
    let owned;
    let table = match &invocation.features {
        Some(path) => {
            owned = FeatureTable::from_path(path)
                .with_context(|| format!("failed to load feature table {}", path.display()))?;
            &owned
        }
        None => FeatureTable::builtin().context("built-in feature table is invalid")?,
    };

    let input = match &invocation.action {
        Action::ListIncompatibleFeatures { input, .. } => input,
        Action::Translate(args) => &args.input,
    };
    let descriptor = match commands::load(input)? {
        Loaded::Document(descriptor) => descriptor,
        Loaded::Empty(name) => {
            println!("{name} is empty.");
            return Ok(());
        }
    };

    let mut stdout = io::stdout().lock();
    match &invocation.action {
        Action::ListIncompatibleFeatures { format, .. } => {
            commands::list_incompatible_features(table, &descriptor, *format, &mut stdout)
        }
        Action::Translate(args) => {
            let procfile = commands::working_dir_procfile();
            commands::translate(
                table,
                &descriptor,
                args,
                Collaborators {
                    procfile: &procfile,
                    projects: &GcloudConfigLookup,
                },
                &mut stdout,
                &mut io::stderr().lock(),
            )
        }
    }
}

fn main() -> ExitCode {
    let matches = cli::command().get_matches();
    let Some(invocation) = Invocation::from_matches(&matches) else {
        eprintln!("error: unknown command");
        return ExitCode::FAILURE;
    };
    init_logging(invocation.log_level.as_deref());

    match run(&invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
