//! Session identifiers derived from a login email.
//!
//! The identifier is a reversible encoding of the email, not a credential.
//! It only names the submission document a user writes to.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Key of a user's submission document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Derive the identifier for an email. Surrounding whitespace is ignored.
    pub fn from_email(email: &str) -> Self {
        Self(URL_SAFE_NO_PAD.encode(email.trim().as_bytes()))
    }

    /// Wrap an identifier read back from the store.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
