//! Start command translation
//!
//! Most runtimes take the start command as `--command`. Python and Ruby
//! apps deployed from source go through buildpacks, which only read the
//! `web` process of a Procfile, so for those runtimes the command is
//! declared there instead and no flag is emitted.

use app2run_descriptor::{display_value, InputSource};
use app2run_features::{flags_with_value, FeatureKind};

use super::{TranslationContext, TranslationRule};
use crate::procfile::{plan_procfile, ProcfileAction, WEB_PROCESS};

/// Runtimes whose start command must be declared in a Procfile
pub const PROCFILE_RUNTIMES: &[&str] = &[
    "python37", "python38", "python39", "python310", "python311", "python312", "ruby25", "ruby26",
    "ruby27", "ruby30", "ruby32", "ruby33",
];

const ENTRYPOINT_KEY: &str = "entrypoint";
const DEFAULT_PYTHON_ENTRYPOINT: &str = "gunicorn -b :$PORT main:app";
const DEFAULT_RUBY_ENTRYPOINT: &str = "bundle exec ruby app.rb -o 0.0.0.0";

/// Start command App Engine would use for `runtime` when none is given
#[must_use]
pub fn default_entrypoint(runtime: &str) -> Option<&'static str> {
    if runtime.starts_with("python") {
        Some(DEFAULT_PYTHON_ENTRYPOINT)
    } else if runtime.starts_with("ruby") {
        Some(DEFAULT_RUBY_ENTRYPOINT)
    } else {
        None
    }
}

/// Translates the start command into `--command` or a Procfile entry
#[derive(Debug, Clone, Copy, Default)]
pub struct EntrypointRule;

impl EntrypointRule {
    fn declared_command(ctx: &TranslationContext<'_>) -> Option<String> {
        if let Some(command) = &ctx.options().command {
            return Some(command.clone());
        }
        let rule = ctx.rule(FeatureKind::Supported, ENTRYPOINT_KEY)?;
        ctx.value_of(rule)
            .map(display_value)
            .filter(|command| !command.trim().is_empty())
    }

    fn warn_missing(ctx: &mut TranslationContext<'_>, runtime: Option<&str>) {
        ctx.warn(
            "Entrypoint for the app is not detected or provided; use --command to specify \
             the start command if one is needed.",
        );
        if let Some((runtime, entrypoint)) =
            runtime.and_then(|r| default_entrypoint(r).map(|e| (r, e)))
        {
            tracing::info!(
                "Default entrypoint for {runtime} is \"{entrypoint}\", retry with --command=\"{entrypoint}\"."
            );
        }
    }

    fn declare_in_procfile(ctx: &mut TranslationContext<'_>, runtime: &str, entrypoint: &str) {
        let existing = match ctx.procfile().read() {
            Ok(existing) => existing,
            Err(e) => {
                ctx.warn(format!("Unable to read the Procfile: {e}"));
                return;
            }
        };

        match plan_procfile(existing.as_deref(), entrypoint) {
            ProcfileAction::Create { contents } => match ctx.procfile().write(&contents) {
                Ok(()) => tracing::info!(
                    runtime,
                    "A Procfile is created with entrypoint \"{entrypoint}\", it is needed to deploy {runtime} apps from source."
                ),
                Err(e) => ctx.warn(format!("Unable to create the Procfile: {e}")),
            },
            ProcfileAction::AlreadyDeclared => {
                tracing::debug!(entrypoint, "Procfile already declares the entrypoint");
            }
            ProcfileAction::Conflict { .. } => ctx.warn(format!(
                "Entrypoint \"{entrypoint}\" is not found in the existing Procfile, \
                 add \"{WEB_PROCESS}: {entrypoint}\" to it."
            )),
        }
    }
}

impl TranslationRule for EntrypointRule {
    fn name(&self) -> &'static str {
        "entrypoint"
    }

    fn translate(&self, ctx: &mut TranslationContext<'_>) -> Vec<String> {
        let runtime = ctx.descriptor().runtime();
        let command = Self::declared_command(ctx);
        let deployed = ctx.source() == InputSource::DeployedVersion;

        if let Some(runtime) = runtime.filter(|r| PROCFILE_RUNTIMES.contains(r)) {
            let entrypoint = match command {
                Some(command) => command,
                None if deployed => {
                    Self::warn_missing(ctx, Some(runtime));
                    return Vec::new();
                }
                None => match default_entrypoint(runtime) {
                    Some(default) => default.to_string(),
                    None => return Vec::new(),
                },
            };
            Self::declare_in_procfile(ctx, runtime, &entrypoint);
            return Vec::new();
        }

        match command {
            Some(command) => {
                let flags = ctx
                    .rule(FeatureKind::Supported, ENTRYPOINT_KEY)
                    .map_or_else(|| vec!["--command".to_string()], |r| r.flags().to_vec());
                flags_with_value(&flags, &format!("\"{command}\""))
            }
            None => {
                if deployed {
                    Self::warn_missing(ctx, runtime);
                }
                Vec::new()
            }
        }
    }
}
