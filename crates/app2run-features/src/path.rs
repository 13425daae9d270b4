//! Dual-namespace feature paths

use app2run_descriptor::InputSource;
use serde::{Deserialize, Serialize};

/// Path of one feature, spelled once per input source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturePath {
    /// snake_case path in `app.yaml`
    pub app_yaml: String,
    /// camelCase path in the deployed version
    pub admin_api: String,
}

impl FeaturePath {
    /// Create from both spellings
    #[inline]
    #[must_use]
    pub fn new(app_yaml: impl Into<String>, admin_api: impl Into<String>) -> Self {
        Self {
            app_yaml: app_yaml.into(),
            admin_api: admin_api.into(),
        }
    }

    /// Path for the given input source
    #[inline]
    #[must_use]
    pub fn for_source(&self, source: InputSource) -> &str {
        match source {
            InputSource::DescriptorFile => &self.app_yaml,
            InputSource::DeployedVersion => &self.admin_api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_per_source() {
        let path = FeaturePath::new("resources.memory_gb", "resources.memoryGb");
        assert_eq!(path.for_source(InputSource::DescriptorFile), "resources.memory_gb");
        assert_eq!(path.for_source(InputSource::DeployedVersion), "resources.memoryGb");
    }
}
