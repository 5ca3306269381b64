//! Identity references.
//!
//! Wherever configuration expects an identity name it also accepts
//! `@usergroup`, meaning every member of that usergroup. The distinction is
//! made once, when the configuration is read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix marking a usergroup reference.
pub const USERGROUP_PREFIX: char = '@';

/// A single identity or a usergroup alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Identity {
    /// A user or ssh key name
    Direct(String),
    /// `@name`: every member of the usergroup `name`
    Group(String),
}

impl Identity {
    /// Parse an identity reference.
    pub fn parse(reference: &str) -> Self {
        match reference.strip_prefix(USERGROUP_PREFIX) {
            Some(group) => Self::Group(group.to_string()),
            None => Self::Direct(reference.to_string()),
        }
    }
}

impl From<String> for Identity {
    fn from(reference: String) -> Self {
        match reference.strip_prefix(USERGROUP_PREFIX) {
            Some(group) => Self::Group(group.to_string()),
            None => Self::Direct(reference),
        }
    }
}

impl From<&str> for Identity {
    fn from(reference: &str) -> Self {
        Self::parse(reference)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_string()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(name) => f.write_str(name),
            Self::Group(name) => write!(f, "{USERGROUP_PREFIX}{name}"),
        }
    }
}
