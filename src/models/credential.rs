//! Access credentials for the external availability API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One auth key for the availability provider.
///
/// Multiple keys are configured to mitigate per-key rate limits; probes fall
/// back through them in configuration order. The `Debug` impl redacts the
/// key so it cannot end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building the outbound request.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Credential {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for Credential {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "Credential({prefix}…)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_the_key() {
        let key = Credential::new("cd8788b75f612015c9aa389b");
        let rendered = format!("{key:?}");
        assert_eq!(rendered, "Credential(cd87…)");
        assert!(!rendered.contains("cd8788b"));
    }

    #[test]
    fn reveal_returns_the_raw_key() {
        let key = Credential::from("secret");
        assert_eq!(key.reveal(), "secret");
    }
}
