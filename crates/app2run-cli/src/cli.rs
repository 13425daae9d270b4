//! Command tree and typed arguments

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

pub(crate) const LIST_INCOMPATIBLE_FEATURES: &str = "list-incompatible-features";
pub(crate) const TRANSLATE: &str = "translate";

const DEFAULT_APP_YAML: &str = "app.yaml";

/// Output format of the incompatibility report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportFormat {
    Yaml,
    Json,
}

/// Where the configuration document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputArgs {
    AppYaml(PathBuf),
    Deployed { service: String, version: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TranslateArgs {
    pub(crate) input: InputArgs,
    pub(crate) project: Option<String>,
    pub(crate) service_name: Option<String>,
    pub(crate) command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    ListIncompatibleFeatures {
        input: InputArgs,
        format: ReportFormat,
    },
    Translate(TranslateArgs),
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) log_level: Option<String>,
    pub(crate) features: Option<PathBuf>,
    pub(crate) action: Action,
}

fn input_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("appyaml")
            .short('a')
            .long("appyaml")
            .default_value(DEFAULT_APP_YAML)
            .value_parser(value_parser!(PathBuf))
            .help("Path to the app.yaml of the app"),
    )
    .arg(
        Arg::new("target-service")
            .long("target-service")
            .requires("target-version")
            .help("Service of a deployed version to use instead of app.yaml"),
    )
    .arg(
        Arg::new("target-version")
            .long("target-version")
            .requires("target-service")
            .help("Deployed version to use instead of app.yaml"),
    )
}

pub(crate) fn command() -> Command {
    Command::new("app2run")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate App Engine apps to Cloud Run")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter, overrides RUST_LOG (default: warn)"),
        )
        .arg(
            Arg::new("features")
                .long("features")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Feature table to use instead of the built-in one"),
        )
        .subcommand(
            input_args(
                Command::new(LIST_INCOMPATIBLE_FEATURES)
                    .about("List incompatible App Engine features to migrate to Cloud Run"),
            )
            .arg(
                Arg::new("format")
                    .long("format")
                    .default_value("yaml")
                    .value_parser(["yaml", "json"])
                    .help("Report format"),
            ),
        )
        .subcommand(
            input_args(
                Command::new(TRANSLATE)
                    .about("Translate an app.yaml to an equivalent Cloud Run deploy command"),
            )
            .arg(
                Arg::new("project")
                    .short('p')
                    .long("project")
                    .help("The project id to deploy the Cloud Run app"),
            )
            .arg(
                Arg::new("service-name")
                    .short('s')
                    .long("service-name")
                    .help("The name of the service for the Cloud Run app"),
            )
            .arg(
                Arg::new("command")
                    .long("command")
                    .action(ArgAction::Set)
                    .help("Start command of the app, required for deployed versions"),
            ),
        )
}

fn string(args: &ArgMatches, id: &str) -> Option<String> {
    args.get_one::<String>(id).cloned()
}

fn input(args: &ArgMatches) -> InputArgs {
    match (string(args, "target-service"), string(args, "target-version")) {
        (Some(service), Some(version)) => InputArgs::Deployed { service, version },
        _ => InputArgs::AppYaml(
            args.get_one::<PathBuf>("appyaml")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_APP_YAML)),
        ),
    }
}

impl Invocation {
    /// Typed view of `matches`; `None` when no known subcommand was given
    pub(crate) fn from_matches(matches: &ArgMatches) -> Option<Self> {
        let action = match matches.subcommand()? {
            (LIST_INCOMPATIBLE_FEATURES, args) => Action::ListIncompatibleFeatures {
                input: input(args),
                format: match args.get_one::<String>("format").map(String::as_str) {
                    Some("json") => ReportFormat::Json,
                    _ => ReportFormat::Yaml,
                },
            },
            (TRANSLATE, args) => Action::Translate(TranslateArgs {
                input: input(args),
                project: string(args, "project"),
                service_name: string(args, "service-name"),
                command: string(args, "command"),
            }),
            _ => return None,
        };

        Some(Self {
            log_level: string(matches, "log-level"),
            features: matches.get_one::<PathBuf>("features").cloned(),
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Invocation {
        let matches = command().try_get_matches_from(args).unwrap();
        Invocation::from_matches(&matches).unwrap()
    }

    #[test]
    fn command_tree_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn list_defaults_to_app_yaml() {
        let invocation = parse(&["app2run", "list-incompatible-features"]);
        assert_eq!(
            invocation.action,
            Action::ListIncompatibleFeatures {
                input: InputArgs::AppYaml(PathBuf::from("app.yaml")),
                format: ReportFormat::Yaml,
            }
        );
        assert_eq!(invocation.log_level, None);
    }

    #[test]
    fn translate_with_all_options() {
        let invocation = parse(&[
            "app2run",
            "--log-level",
            "debug",
            "translate",
            "-a",
            "svc/app.yaml",
            "-p",
            "proj",
            "-s",
            "api",
            "--command",
            "./run",
        ]);
        assert_eq!(invocation.log_level.as_deref(), Some("debug"));
        assert_eq!(
            invocation.action,
            Action::Translate(TranslateArgs {
                input: InputArgs::AppYaml(PathBuf::from("svc/app.yaml")),
                project: Some("proj".to_string()),
                service_name: Some("api".to_string()),
                command: Some("./run".to_string()),
            })
        );
    }

    #[test]
    fn global_options_after_subcommand() {
        let invocation = parse(&[
            "app2run",
            "list-incompatible-features",
            "--features",
            "table.yaml",
            "--format",
            "json",
        ]);
        assert_eq!(invocation.features, Some(PathBuf::from("table.yaml")));
        assert!(matches!(
            invocation.action,
            Action::ListIncompatibleFeatures { format: ReportFormat::Json, .. }
        ));
    }

    #[test]
    fn deployed_version_input() {
        let invocation = parse(&[
            "app2run",
            "translate",
            "--target-service",
            "default",
            "--target-version",
            "v3",
        ]);
        let Action::Translate(args) = invocation.action else {
            panic!("expected translate");
        };
        assert_eq!(
            args.input,
            InputArgs::Deployed {
                service: "default".to_string(),
                version: "v3".to_string(),
            }
        );
    }

    #[test]
    fn target_options_require_each_other() {
        let result = command().try_get_matches_from([
            "app2run",
            "list-incompatible-features",
            "--target-service",
            "default",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = command().try_get_matches_from([
            "app2run",
            "list-incompatible-features",
            "--format",
            "html",
        ]);
        assert!(result.is_err());
    }
}
