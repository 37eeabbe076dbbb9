//! Plugin lifecycle state enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a plugin sits in its lifecycle.
///
/// `Uninstalled` is never stored; it is the absence of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    Uninstalled,
    Inactive,
    Active,
}

impl PluginState {
    pub fn is_installed(&self) -> bool {
        !matches!(self, Self::Uninstalled)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninstalled => "uninstalled",
            Self::Inactive => "inactive",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PluginState {
    type Err = cimaise_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uninstalled" => Ok(Self::Uninstalled),
            "inactive" => Ok(Self::Inactive),
            "active" => Ok(Self::Active),
            _ => Err(cimaise_core::AppError::validation(format!(
                "Invalid plugin state: '{s}'. Expected one of: uninstalled, inactive, active"
            ))),
        }
    }
}
