//! Subcommand execution
//!
//! Output goes to the writers passed in: the report or deploy command to
//! `out`, notices for the user to `err`.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use app2run_core::{
    service_name, App2RunError, Collaborators, CompatibilityChecker, DeployCommand, FsProcfile,
    IncompatibilityReport, TranslateOptions, Translator, PARTIAL_TRANSLATION_NOTICE,
};
use app2run_descriptor::{Descriptor, InputSource};
use app2run_features::FeatureTable;

use crate::cli::{InputArgs, ReportFormat, TranslateArgs};
use crate::gcloud;

/// Input document, or the name of an empty one
#[derive(Debug)]
pub(crate) enum Loaded {
    Document(Descriptor),
    Empty(String),
}

pub(crate) fn load(input: &InputArgs) -> anyhow::Result<Loaded> {
    let result = match input {
        InputArgs::AppYaml(path) => {
            Descriptor::from_path(path, InputSource::DescriptorFile).map_err(App2RunError::from)
        }
        InputArgs::Deployed { service, version } => gcloud::describe_version(service, version),
    };

    match result {
        Ok(descriptor) => Ok(Loaded::Document(descriptor)),
        Err(e) if e.is_empty_input() => Ok(Loaded::Empty(empty_name(input, &e))),
        Err(e) => Err(e).context("failed to load the app configuration"),
    }
}

fn empty_name(input: &InputArgs, error: &App2RunError) -> String {
    match (input, error) {
        (_, App2RunError::EmptyInput { name }) => name.clone(),
        (InputArgs::AppYaml(path), _) => path.display().to_string(),
        (InputArgs::Deployed { service, version }, _) => {
            format!("version {version} of service {service}")
        }
    }
}

pub(crate) fn list_incompatible_features(
    table: &FeatureTable,
    descriptor: &Descriptor,
    format: ReportFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let findings = CompatibilityChecker::new(table).check_descriptor(descriptor);
    tracing::debug!(count = findings.len(), "compatibility check done");

    let report = IncompatibilityReport::new(findings);
    let rendered = match format {
        ReportFormat::Yaml => report.render_yaml()?,
        ReportFormat::Json => report.render_json()? + "\n",
    };
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

pub(crate) fn translate(
    table: &FeatureTable,
    descriptor: &Descriptor,
    args: &TranslateArgs,
    collaborators: Collaborators<'_>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut options = TranslateOptions::new();
    if let Some(project) = &args.project {
        options = options.with_project(project.as_str());
    }
    if let Some(command) = &args.command {
        options = options.with_command(command.as_str());
    }

    let translation = Translator::new(table).translate(descriptor, &options, collaborators);
    let command = DeployCommand::new(
        service_name(descriptor, args.service_name.as_deref()),
        translation.flags,
    );

    writeln!(err, "{PARTIAL_TRANSLATION_NOTICE}")?;
    writeln!(out, "{command}")?;
    Ok(())
}

/// Procfile in the directory the tool is run from, whatever `--appyaml` points at
pub(crate) fn working_dir_procfile() -> FsProcfile {
    FsProcfile::in_dir(Path::new("."))
}
