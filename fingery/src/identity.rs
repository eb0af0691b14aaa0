//! Who is typing.
//!
//! Sign-in happens elsewhere; fingery only receives the result as a display
//! name and a bearer token through the settings or the environment
//! (`FINGERY_IDENTITY__ACCESS_TOKEN`). Without a token the user is a guest:
//! analytics stay local and nothing is reported.

use std::fmt;

use serde::{Deserialize, Serialize};

const GUEST_NAME: &str = "guest";
const REDACTED: &str = "<redacted>";

#[derive(Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub display_name: Option<String>,
    pub access_token: Option<String>,
}

impl IdentityConfig {
    /// The signed-in user, if there is a token
    pub fn resolve(&self) -> Option<Identity> {
        let access_token = self
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())?
            .to_string();

        Some(Identity {
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| "anonymous".to_string()),
            access_token,
        })
    }

    /// Copy safe to print
    pub fn redacted(&self) -> Self {
        Self {
            display_name: self.display_name.clone(),
            access_token: self.access_token.as_ref().map(|_| REDACTED.to_string()),
        }
    }
}

// Tokens stay out of logs
impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("display_name", &self.display_name)
            .field("access_token", &self.access_token.as_ref().map(|_| REDACTED))
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub access_token: String,
}

impl Identity {
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("display_name", &self.display_name)
            .field("access_token", &REDACTED)
            .finish()
    }
}

/// Name to show for an optional identity
pub fn display_name(identity: Option<&Identity>) -> &str {
    identity.map_or(GUEST_NAME, |identity| identity.display_name.as_str())
}
