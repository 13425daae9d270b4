//! Project id resolution

use once_cell::sync::Lazy;
use regex::Regex;

static PROJECT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*project\s*=\s*([\w.:-]+)\s*$").expect("project line pattern is valid")
});

/// Fallback source of the Google Cloud project id
///
/// Consulted only when the caller did not pass a project explicitly.
pub trait ProjectLookup {
    /// The active project, if one can be determined
    fn project_id(&self) -> Option<String>;
}

/// Lookup that never resolves a project
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProject;

impl ProjectLookup for NoProject {
    fn project_id(&self) -> Option<String> {
        None
    }
}

/// Lookup that always resolves the same project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedProject(pub String);

impl ProjectLookup for FixedProject {
    fn project_id(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Extract the project id from `gcloud config list` output
#[must_use]
pub fn parse_gcloud_project(output: &str) -> Option<String> {
    PROJECT_LINE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_LIST: &str = "\
[core]
account = dev@example.com
disable_usage_reporting = True
project = my-project-123

Your active configuration is: [default]
";

    #[test]
    fn parses_project_line() {
        assert_eq!(
            parse_gcloud_project(CONFIG_LIST),
            Some("my-project-123".to_string())
        );
    }

    #[test]
    fn domain_scoped_project() {
        assert_eq!(
            parse_gcloud_project("project = example.com:legacy-app\n"),
            Some("example.com:legacy-app".to_string())
        );
    }

    #[test]
    fn missing_project_line() {
        assert_eq!(parse_gcloud_project("[core]\naccount = a@b.c\n"), None);
        assert_eq!(parse_gcloud_project(""), None);
    }

    #[test]
    fn fixed_and_empty_lookups() {
        assert_eq!(FixedProject("p".to_string()).project_id().as_deref(), Some("p"));
        assert_eq!(NoProject.project_id(), None);
    }
}
