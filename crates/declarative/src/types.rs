//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested presence of a resource
///
/// Resources carry an `Option<Ensure>`: `None` leaves the default to
/// whatever applies the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// Resource must exist
    Present,
    /// Resource must be removed
    Absent,
}

impl Ensure {
    /// Check if this is a removal
    pub fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Keyword used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a resource
///
/// Variants are declared in apply order: groups must exist before the users
/// that join them, users before the keys installed in their home.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Operating-system group
    Group,
    /// Operating-system user account
    User,
    /// Entry in a user's `authorized_keys` file
    SshAuthorizedKey,
    /// One-time placement of a private key in a user's `~/.ssh`
    PrivateKey,
}

impl ResourceKind {
    /// Every kind, in apply order
    pub const ALL: [Self; 4] = [
        Self::Group,
        Self::User,
        Self::SshAuthorizedKey,
        Self::PrivateKey,
    ];

    /// Canonical name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::User => "user",
            Self::SshAuthorizedKey => "ssh_authorized_key",
            Self::PrivateKey => "private_key",
        }
    }

    /// Heading used when listing resources of this kind
    pub fn label(self) -> &'static str {
        match self {
            Self::Group => "Groups",
            Self::User => "Users",
            Self::SshAuthorizedKey => "SSH authorized keys",
            Self::PrivateKey => "Private keys",
        }
    }

    /// Parse a kind from its canonical name or a common alias
    pub fn from_alias(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "group" | "groups" => Some(Self::Group),
            "user" | "users" => Some(Self::User),
            "ssh_authorized_key" | "ssh_authorized_keys" | "authorized_keys" | "keys" => {
                Some(Self::SshAuthorizedKey)
            }
            "private_key" | "private_keys" => Some(Self::PrivateKey),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection of resources by kind and/or name
///
/// Textual form is `kind`, `kind.name` or just `name`. Names are matched as
/// substrings of the resource id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub kind: Option<ResourceKind>,
    pub name: Option<String>,
}

impl Target {
    /// Parse a target string like "user.alice"
    pub fn parse(target: &str) -> Self {
        if let Some(kind) = ResourceKind::from_alias(target) {
            return Self {
                kind: Some(kind),
                name: None,
            };
        }

        // Titles may contain dots themselves, so only the first segment is
        // tried as a kind.
        if let Some((head, rest)) = target.split_once('.')
            && let Some(kind) = ResourceKind::from_alias(head)
        {
            return Self {
                kind: Some(kind),
                name: Some(rest.to_string()),
            };
        }

        Self {
            kind: None,
            name: Some(target.to_string()),
        }
    }

    /// Check whether a resource of the given kind and id is selected
    pub fn matches(&self, kind: ResourceKind, id: &str) -> bool {
        if let Some(k) = self.kind
            && k != kind
        {
            return false;
        }

        if let Some(n) = &self.name
            && !id.contains(n.as_str())
        {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_sort_in_apply_order() {
        let mut kinds = vec![
            ResourceKind::PrivateKey,
            ResourceKind::SshAuthorizedKey,
            ResourceKind::Group,
            ResourceKind::User,
        ];
        kinds.sort();
        assert_eq!(kinds, ResourceKind::ALL.to_vec());
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!(ResourceKind::from_alias("users"), Some(ResourceKind::User));
        assert_eq!(
            ResourceKind::from_alias("keys"),
            Some(ResourceKind::SshAuthorizedKey)
        );
        assert_eq!(ResourceKind::from_alias("Group"), Some(ResourceKind::Group));
        assert_eq!(ResourceKind::from_alias("packages"), None);
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(
            Target::parse("user"),
            Target {
                kind: Some(ResourceKind::User),
                name: None
            }
        );
        assert_eq!(
            Target::parse("user.alice"),
            Target {
                kind: Some(ResourceKind::User),
                name: Some("alice".to_string())
            }
        );
        assert_eq!(
            Target::parse("keys.Mr. Foo on foo"),
            Target {
                kind: Some(ResourceKind::SshAuthorizedKey),
                name: Some("Mr. Foo on foo".to_string())
            }
        );
        assert_eq!(
            Target::parse("a.b.c"),
            Target {
                kind: None,
                name: Some("a.b.c".to_string())
            }
        );
    }

    #[test]
    fn test_target_matches() {
        let target = Target::parse("keys.on-foo");
        assert!(target.matches(ResourceKind::SshAuthorizedKey, "bar-on-foo"));
        assert!(!target.matches(ResourceKind::SshAuthorizedKey, "bar-on-baz"));
        assert!(!target.matches(ResourceKind::User, "bar-on-foo"));
        assert!(Target::default().matches(ResourceKind::Group, "anything"));
    }

    #[test]
    fn test_ensure_serde_keywords() {
        assert_eq!(Ensure::Absent.to_string(), "absent");
        assert!(Ensure::Absent.is_absent());
        assert!(!Ensure::Present.is_absent());
    }
}
