//! External `gcloud` invocations

use std::process::Command;

use app2run_core::{parse_gcloud_project, App2RunError, ProjectLookup, Result};
use app2run_descriptor::{Descriptor, DescriptorError, InputSource};

const GCLOUD: &str = "gcloud";

/// Fetch a deployed version through `gcloud app versions describe`
pub(crate) fn describe_version(service: &str, version: &str) -> Result<Descriptor> {
    tracing::debug!(service, version, "describing deployed version");
    let output = Command::new(GCLOUD)
        .args(["app", "versions", "describe", version, "--service", service])
        .args(["--format", "yaml"])
        .output()
        .map_err(|e| App2RunError::describe_failed(service, version, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(App2RunError::describe_failed(
            service,
            version,
            format!("gcloud exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    parse_describe_output(service, version, &String::from_utf8_lossy(&output.stdout))
}

/// Interpret the stdout of `gcloud app versions describe`
pub(crate) fn parse_describe_output(service: &str, version: &str, stdout: &str) -> Result<Descriptor> {
    match Descriptor::from_yaml_str(stdout, InputSource::DeployedVersion) {
        Ok(descriptor) => Ok(descriptor),
        Err(DescriptorError::Empty) => Err(App2RunError::EmptyInput {
            name: format!("version {version} of service {service}"),
        }),
        Err(e) => Err(App2RunError::describe_failed(
            service,
            version,
            format!("output is not a version description: {e}"),
        )),
    }
}

/// Active project of the local gcloud configuration
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct GcloudConfigLookup;

impl ProjectLookup for GcloudConfigLookup {
    fn project_id(&self) -> Option<String> {
        let output = match Command::new(GCLOUD).args(["config", "list"]).output() {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                tracing::debug!(status = %output.status, "gcloud config list failed");
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "gcloud is not available");
                return None;
            }
        };
        parse_gcloud_project(&String::from_utf8_lossy(&output.stdout))
    }
}
