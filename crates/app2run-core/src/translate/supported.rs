//! Passthrough of fully supported features

use app2run_descriptor::{display_value, Mapping, Value};
use app2run_features::{flags_with_value, FeatureKind, FeatureRule};

use super::{TranslationContext, TranslationRule};

/// Supported features translated by a dedicated rule, by `app.yaml` path
const CLAIMED: &[&str] = &["entrypoint", ENV_VARIABLES_KEY];

const ENV_VARIABLES_KEY: &str = "env_variables";
const SERVICE_ACCOUNT_KEY: &str = "service_account";

const PRIMARY_DELIMITER: char = ',';
const FALLBACK_DELIMITER: char = ';';

/// Serialize environment variables into one `--set-env-vars` value
///
/// Pairs are joined with `,`. When any pair contains a `,`, gcloud's
/// alternate delimiter syntax `^;^` is used and pairs are joined with `;`.
#[must_use]
pub fn env_vars_value(vars: &Mapping) -> String {
    let pairs: Vec<String> = vars
        .iter()
        .map(|(key, value)| format!("{}={}", display_value(key), display_value(value)))
        .collect();

    if pairs.iter().any(|pair| pair.contains(PRIMARY_DELIMITER)) {
        format!("^{FALLBACK_DELIMITER}^{}", pairs.join(&FALLBACK_DELIMITER.to_string()))
    } else {
        pairs.join(&PRIMARY_DELIMITER.to_string())
    }
}

fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

/// Emits flags for `supported` features present in the document
///
/// Also serializes environment variables and synthesizes the default App
/// Engine service account when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportedRule;

impl SupportedRule {
    fn env_vars(ctx: &mut TranslationContext<'_>, rule: &FeatureRule) -> Vec<String> {
        let Some(value) = ctx.value_of(rule) else {
            return Vec::new();
        };
        let Value::Mapping(vars) = value else {
            ctx.warn(format!(
                "{} must be a mapping of names to values, it is not translated.",
                rule.path(ctx.source())
            ));
            return Vec::new();
        };
        if vars.is_empty() {
            return Vec::new();
        }

        for (key, value) in vars {
            let pair = format!("{}={}", display_value(key), display_value(value));
            if pair.contains(PRIMARY_DELIMITER) && pair.contains(FALLBACK_DELIMITER) {
                ctx.warn(format!(
                    "Environment variable {} contains both '{PRIMARY_DELIMITER}' and \
                     '{FALLBACK_DELIMITER}', --set-env-vars will not split it correctly.",
                    display_value(key)
                ));
            }
        }

        flags_with_value(rule.flags(), &quoted(&env_vars_value(vars)))
    }

    fn default_service_account(ctx: &mut TranslationContext<'_>, rule: &FeatureRule) -> Vec<String> {
        if ctx.value_of(rule).is_some() {
            return Vec::new();
        }

        let project = ctx
            .options()
            .project
            .clone()
            .or_else(|| ctx.projects().project_id());
        match project {
            Some(project) => flags_with_value(
                rule.flags(),
                &quoted(&format!("{project}@appspot.gserviceaccount.com")),
            ),
            None => {
                ctx.warn(
                    "Unable to determine the project id, use --project to specify the project \
                     of the App Engine app so its default service account can be set.",
                );
                Vec::new()
            }
        }
    }
}

impl TranslationRule for SupportedRule {
    fn name(&self) -> &'static str {
        "supported"
    }

    fn translate(&self, ctx: &mut TranslationContext<'_>) -> Vec<String> {
        let mut flags = Vec::new();
        for (path, rule) in ctx.rules(FeatureKind::Supported).iter() {
            if CLAIMED.contains(&rule.path.app_yaml.as_str()) {
                continue;
            }
            if let Some(value) = ctx.flat().get(path) {
                flags.extend(flags_with_value(rule.flags(), &quoted(&display_value(value))));
            }
        }

        if let Some(rule) = ctx.rule(FeatureKind::Supported, ENV_VARIABLES_KEY) {
            flags.extend(Self::env_vars(ctx, rule));
        }
        if let Some(rule) = ctx.rule(FeatureKind::Supported, SERVICE_ACCOUNT_KEY) {
            flags.extend(Self::default_service_account(ctx, rule));
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procfile::MemoryProcfile;
    use crate::translate::testing::{run, run_with};
    use crate::translate::TranslateOptions;
    use app2run_descriptor::InputSource;
    use pretty_assertions::assert_eq;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn env_vars_primary_delimiter() {
        assert_eq!(env_vars_value(&mapping("A: 1\nB: two\n")), "A=1,B=two");
    }

    #[test]
    fn env_vars_fallback_delimiter() {
        assert_eq!(
            env_vars_value(&mapping("HOSTS: a,b\nMODE: x\n")),
            "^;^HOSTS=a,b;MODE=x"
        );
    }

    #[test]
    fn passthrough_in_table_order() {
        let out = run_with(
            SupportedRule,
            "service_account: sa@p.iam.gserviceaccount.com\nvpc_access_connector:\n  egress_settings: all-traffic\n  name: conn\n",
            InputSource::DescriptorFile,
            &TranslateOptions::new(),
            &MemoryProcfile::new(),
        );
        assert_eq!(
            out.flags,
            [
                "--vpc-connector=\"conn\"",
                "--vpc-egress=\"all-traffic\"",
                "--service-account=\"sa@p.iam.gserviceaccount.com\"",
            ]
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn entrypoint_is_left_to_its_rule() {
        let out = run_with(
            SupportedRule,
            "entrypoint: ./run\nservice_account: a@b\n",
            InputSource::DescriptorFile,
            &TranslateOptions::new(),
            &MemoryProcfile::new(),
        );
        assert_eq!(out.flags, ["--service-account=\"a@b\""]);
    }

    #[test]
    fn env_vars_flag() {
        let out = run_with(
            SupportedRule,
            "env_variables:\n  A: b\n  C: d\n",
            InputSource::DescriptorFile,
            &TranslateOptions::new().with_project("p"),
            &MemoryProcfile::new(),
        );
        assert_eq!(out.flags[0], "--set-env-vars=\"A=b,C=d\"");
    }

    #[test]
    fn empty_env_vars_emit_nothing() {
        let out = run_with(
            SupportedRule,
            "env_variables: {}\n",
            InputSource::DescriptorFile,
            &TranslateOptions::new().with_project("p"),
            &MemoryProcfile::new(),
        );
        assert_eq!(out.flags, ["--service-account=\"p@appspot.gserviceaccount.com\""]);
    }

    #[test]
    fn env_vars_with_both_delimiters_warn() {
        let out = run_with(
            SupportedRule,
            "env_variables:\n  X: 'a,b;c'\n",
            InputSource::DescriptorFile,
            &TranslateOptions::new().with_project("p"),
            &MemoryProcfile::new(),
        );
        assert_eq!(out.flags[0], "--set-env-vars=\"^;^X=a,b;c\"");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn default_service_account_from_option() {
        let out = run_with(
            SupportedRule,
            "runtime: go\n",
            InputSource::DescriptorFile,
            &TranslateOptions::new().with_project("my-proj"),
            &MemoryProcfile::new(),
        );
        assert_eq!(out.flags, ["--service-account=\"my-proj@appspot.gserviceaccount.com\""]);
    }

    #[test]
    fn unresolvable_project_warns() {
        let out = run(SupportedRule, "runtime: go\n");
        assert!(out.flags.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].rule, "supported");
    }

    #[test]
    fn deployed_version_paths() {
        let out = run_with(
            SupportedRule,
            "serviceAccount: sa@x\nenvVariables:\n  K: v\n",
            InputSource::DeployedVersion,
            &TranslateOptions::new(),
            &MemoryProcfile::new(),
        );
        assert_eq!(
            out.flags,
            ["--service-account=\"sa@x\"", "--set-env-vars=\"K=v\""]
        );
    }
}
