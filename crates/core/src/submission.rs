//! Submission documents: one per user, holding every answer they gave.
//!
//! Answers are grouped by the step they were collected on. The login step
//! has its own key so it can never collide with a page id.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{FieldId, PageId};

/// Wire form of the login step key.
pub const LOGIN_STEP_KEY: &str = "0";

/// Field id under which the login email is kept.
pub const EMAIL_FIELD: &str = "email";

/// Field id under which the login password is kept (in memory only).
pub const PASSWORD_FIELD: &str = "password";

// ---------------------------------------------------------------------------
// Step keys
// ---------------------------------------------------------------------------

/// The step an answer group belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepKey {
    Login,
    Page(PageId),
}

impl StepKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Login => LOGIN_STEP_KEY,
            Self::Page(id) => id.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        if s == LOGIN_STEP_KEY {
            Self::Login
        } else {
            Self::Page(PageId(s.to_string()))
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StepKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StepKeyVisitor;

        impl Visitor<'_> for StepKeyVisitor {
            type Value = StepKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"0\" or a page id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StepKey, E> {
                if v.is_empty() {
                    return Err(E::invalid_value(de::Unexpected::Str(v), &self));
                }
                Ok(StepKey::parse(v))
            }
        }

        deserializer.deserialize_str(StepKeyVisitor)
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// One answered field: the prompt shown and the value entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub placeholder: String,
    pub value: String,
}

/// Answers grouped by step, then by field.
pub type Answers = BTreeMap<StepKey, BTreeMap<FieldId, Answer>>;

/// A user's stored submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub answers: Answers,
    /// Index of the last step whose data was persisted.
    #[serde(default)]
    pub last_saved: Option<u32>,
    #[serde(default)]
    pub has_submitted: bool,
}

impl Submission {
    /// Look up the answer to one field on one step.
    pub fn answer(&self, step: &StepKey, field: &FieldId) -> Option<&Answer> {
        self.answers.get(step).and_then(|fields| fields.get(field))
    }

    /// Find a field's value by scanning every step in key order.
    ///
    /// If the same field id appears under several steps the last one in key
    /// order wins.
    pub fn find_value(&self, field: &FieldId) -> Option<&str> {
        self.answers
            .values()
            .filter_map(|fields| fields.get(field))
            .next_back()
            .map(|a| a.value.as_str())
    }

    /// The email captured on the login step, if any.
    pub fn email(&self) -> Option<&str> {
        self.answer(&StepKey::Login, &FieldId::from(EMAIL_FIELD))
            .map(|a| a.value.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
