//! Output format selection.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rendering chosen for a single call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Token-efficient TOML rendering
    #[default]
    Compact,
    /// Pretty-printed JSON rendering
    Structured,
}

impl OutputFormat {
    /// Name accepted by the `format` tool parameter
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Structured => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "toml" => Ok(Self::Compact),
            "json" | "structured" => Ok(Self::Structured),
            other => Err(CoreError::UnknownFormat {
                name: other.to_string(),
            }),
        }
    }
}
