//! Input source variants

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Origin of a configuration document
///
/// The two origins spell the same schema differently: the local descriptor
/// uses snake_case keys, the deployed representation uses camelCase keys.
/// Every feature rule carries one path per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSource {
    /// Local `app.yaml`
    #[serde(rename = "app_yaml")]
    DescriptorFile,
    /// Output of `gcloud app versions describe`
    #[serde(rename = "admin_api")]
    DeployedVersion,
}

impl InputSource {
    /// All variants, in table column order
    pub const ALL: [Self; 2] = [Self::DescriptorFile, Self::DeployedVersion];

    /// Field name used for this variant in the rule table
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DescriptorFile => "app_yaml",
            Self::DeployedVersion => "admin_api",
        }
    }
}

impl Display for InputSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app_yaml" => Ok(Self::DescriptorFile),
            "admin_api" => Ok(Self::DeployedVersion),
            other => Err(format!("unknown input source: {other}")),
        }
    }
}
