//! Device settings namespaces addressed by the `settings` command.

use serde::{Deserialize, Serialize};

/// Table holding a device setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsNamespace {
    System,
    Secure,
    Global,
}

impl std::fmt::Display for SettingsNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::Secure => f.write_str("secure"),
            Self::Global => f.write_str("global"),
        }
    }
}

impl std::str::FromStr for SettingsNamespace {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "secure" => Ok(Self::Secure),
            "global" => Ok(Self::Global),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_lowercase_namespace() {
        assert_eq!(SettingsNamespace::System.to_string(), "system");
        assert_eq!(SettingsNamespace::Secure.to_string(), "secure");
        assert_eq!(SettingsNamespace::Global.to_string(), "global");
    }

    #[test]
    fn should_parse_namespace_from_display_form() {
        assert_eq!("global".parse(), Ok(SettingsNamespace::Global));
        assert!("vendor".parse::<SettingsNamespace>().is_err());
    }
}
