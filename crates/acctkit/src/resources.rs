//! Resolved resources handed to the apply layer.

use crate::authorized_keys::EntrySource;
use crate::schema::Attributes;
use declarative::{Ensure, Resource, ResourceKind};
use serde::Serialize;

/// An OS group, passed through from configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupResource {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Ensure>,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Resource for GroupResource {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("group {}", self.name)
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Group
    }

    fn ensure(&self) -> Option<Ensure> {
        self.ensure
    }
}

/// An OS user with memberships and key purge policy from its accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResource {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Ensure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// `None` when no account binds the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purge_ssh_keys: Option<bool>,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Resource for UserResource {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        match &self.comment {
            Some(comment) => format!("user {} ({comment})", self.name),
            None => format!("user {}", self.name),
        }
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    fn ensure(&self) -> Option<Ensure> {
        self.ensure
    }
}

/// One SSH key authorized for one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizedKeyResource {
    /// Rendered from the title template
    pub title: String,
    pub ssh_key: String,
    /// Account identity the key is installed for
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Ensure>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    /// Public key material
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip)]
    pub source: EntrySource,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl AuthorizedKeyResource {
    /// Whether this pair is still wanted after merging.
    pub fn is_kept(&self) -> bool {
        !self.ensure.is_some_and(Ensure::is_absent)
    }
}

impl Resource for AuthorizedKeyResource {
    fn id(&self) -> String {
        self.title.clone()
    }

    fn description(&self) -> String {
        format!("ssh key {} authorized for {}", self.ssh_key, self.user)
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::SshAuthorizedKey
    }

    fn ensure(&self) -> Option<Ensure> {
        self.ensure
    }
}

/// One-time placement of a private key in a user's `~/.ssh`.
///
/// Skipped by the apply layer when `creates` already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivateKeyPlacement {
    pub title: String,
    pub ssh_key: String,
    pub user: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    /// Path of the placed key, `~user/.ssh/<file>`
    pub creates: String,
}

impl PrivateKeyPlacement {
    pub fn new(ssh_key: &str, user: &str, key_type: Option<&str>) -> Self {
        Self {
            title: format!("put ssh private key {ssh_key} for user {user}"),
            ssh_key: ssh_key.to_string(),
            user: user.to_string(),
            key_type: key_type.map(ToString::to_string),
            creates: format!("~{user}/.ssh/{}", identity_file(key_type)),
        }
    }
}

impl Resource for PrivateKeyPlacement {
    fn id(&self) -> String {
        self.title.clone()
    }

    fn description(&self) -> String {
        format!("private key {} placed at {}", self.ssh_key, self.creates)
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::PrivateKey
    }

    fn ensure(&self) -> Option<Ensure> {
        Some(Ensure::Present)
    }
}

/// Default OpenSSH identity file name for a key type.
pub fn identity_file(key_type: Option<&str>) -> &'static str {
    match key_type {
        Some("ssh-dss") => "id_dsa",
        Some("ssh-ed25519") => "id_ed25519",
        Some(t) if t.starts_with("ecdsa-") => "id_ecdsa",
        _ => "id_rsa",
    }
}
