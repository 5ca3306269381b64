//! Configuration schema.
//!
//! Mirrors the external configuration format:
//!
//! ```toml
//! ssh_authorized_key_title = "%{ssh_key}-on-%{account}"
//!
//! [groups.developers]
//!
//! [users.alice]
//! comment = "Alice"
//! uid = 1000
//!
//! [ssh_keys.alice]
//! type = "ssh-ed25519"
//! public = "AAAAC3..."
//!
//! [usergroups]
//! admins = ["alice", "bob"]
//!
//! [accounts."@admins"]
//! groups = ["developers"]
//! authorized_keys = { deploy = { options = ["no-pty"] } }
//! purge_ssh_keys = true
//! ```

use crate::identity::Identity;
use crate::ordered::Declared;
use crate::title::DEFAULT_TITLE_TEMPLATE;
use declarative::Ensure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extra attributes passed through untouched to the apply layer.
pub type Attributes = BTreeMap<String, serde_json::Value>;

// ============================================================================
// Top-level configuration
// ============================================================================

/// Everything a resolution pass consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsConfig {
    /// OS groups
    #[serde(default)]
    pub groups: Declared<GroupSpec>,

    /// OS users
    #[serde(default)]
    pub users: Declared<UserSpec>,

    /// Named SSH key material
    #[serde(default)]
    pub ssh_keys: Declared<SshKeySpec>,

    /// Aliases for lists of identities, referenced as `@name`
    #[serde(default)]
    pub usergroups: Declared<Vec<String>>,

    /// Bindings of identities to groups and authorized keys
    #[serde(default)]
    pub accounts: Declared<AccountSpec>,

    /// Template for authorized key titles
    #[serde(default = "default_title")]
    pub ssh_authorized_key_title: String,
}

fn default_title() -> String {
    DEFAULT_TITLE_TEMPLATE.to_string()
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            groups: Declared::new(),
            users: Declared::new(),
            ssh_keys: Declared::new(),
            usergroups: Declared::new(),
            accounts: Declared::new(),
            ssh_authorized_key_title: default_title(),
        }
    }
}

impl AccountsConfig {
    /// Check whether nothing is declared at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.users.is_empty()
            && self.ssh_keys.is_empty()
            && self.usergroups.is_empty()
            && self.accounts.is_empty()
    }
}

// ============================================================================
// Records
// ============================================================================

/// An OS group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Ensure>,

    #[serde(flatten)]
    pub attributes: Attributes,
}

/// An OS user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Ensure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,

    #[serde(flatten)]
    pub attributes: Attributes,
}

/// Named SSH key material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SshKeySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Ensure>,

    /// Key type, e.g. `ssh-rsa` or `ssh-ed25519`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(flatten)]
    pub attributes: Attributes,
}

impl SshKeySpec {
    /// Check whether the key is marked for removal.
    pub fn is_absent(&self) -> bool {
        self.ensure.is_some_and(Ensure::is_absent)
    }

    /// Look up an attribute by its configuration name.
    ///
    /// Known fields come first; anything else is read from the passthrough
    /// attributes. Unset fields and `null` values are `None`.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "ensure" => self.ensure.map(|e| e.to_string()),
            "type" => self.key_type.clone(),
            "public" => self.public.clone(),
            "private" => self.private.clone(),
            "comment" => self.comment.clone(),
            _ => match self.attributes.get(name)? {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            },
        }
    }
}

/// Binding of an identity (or `@usergroup`) to groups and keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Ensure>,

    /// OS groups the identity belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    #[serde(default, skip_serializing_if = "AuthorizedKeys::is_implicit")]
    pub authorized_keys: AuthorizedKeys,

    /// Remove keys from `authorized_keys` that are not managed here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purge_ssh_keys: Option<bool>,
}

// ============================================================================
// Authorized keys
// ============================================================================

/// Per-key options attached to an authorized key entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyOptions {
    /// SSH options such as `no-pty`, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    #[serde(flatten)]
    pub attributes: Attributes,
}

impl KeyOptions {
    /// Create options from a list of SSH option strings.
    pub fn with_options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            attributes: Attributes::new(),
        }
    }
}

/// The accepted shapes of an account's `authorized_keys`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAuthorizedKeys", into = "RawAuthorizedKeys")]
pub enum AuthorizedKeys {
    /// Field absent or empty: only the same-name key applies
    #[default]
    Implicit,
    /// `authorized_keys = "bar"`
    Scalar(Identity),
    /// `authorized_keys = ["bar", "@admins"]`
    List(Vec<Identity>),
    /// `authorized_keys = { bar = { options = [...] } }`
    Mapping(Vec<(Identity, KeyOptions)>),
}

impl AuthorizedKeys {
    pub fn is_implicit(&self) -> bool {
        matches!(self, Self::Implicit)
    }
}

/// Wire shape of `authorized_keys`, before tagging.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawAuthorizedKeys {
    Name(String),
    List(Vec<String>),
    Mapping(Declared<KeyOptions>),
}

impl From<RawAuthorizedKeys> for AuthorizedKeys {
    fn from(raw: RawAuthorizedKeys) -> Self {
        match raw {
            RawAuthorizedKeys::Name(name) if name.is_empty() => Self::Implicit,
            RawAuthorizedKeys::Name(name) => Self::Scalar(Identity::from(name)),
            RawAuthorizedKeys::List(names) => {
                Self::List(names.into_iter().map(Identity::from).collect())
            }
            RawAuthorizedKeys::Mapping(entries) => Self::Mapping(
                entries
                    .into_iter()
                    .map(|(name, options)| (Identity::from(name), options))
                    .collect(),
            ),
        }
    }
}

impl From<AuthorizedKeys> for RawAuthorizedKeys {
    fn from(keys: AuthorizedKeys) -> Self {
        match keys {
            AuthorizedKeys::Implicit => Self::List(Vec::new()),
            AuthorizedKeys::Scalar(identity) => Self::Name(identity.to_string()),
            AuthorizedKeys::List(identities) => {
                Self::List(identities.iter().map(ToString::to_string).collect())
            }
            AuthorizedKeys::Mapping(entries) => Self::Mapping(
                entries
                    .into_iter()
                    .map(|(identity, options)| (identity.to_string(), options))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_example_config() {
        let toml = r#"
ssh_authorized_key_title = "%{ssh_key} on %{account}"

[groups.developers]

[groups.legacy]
ensure = "absent"
gid = 2001

[users.alice]
comment = "Alice"
uid = 1000
shell = "/bin/zsh"

[ssh_keys.alice]
type = "ssh-ed25519"
public = "ALICE-PUBLIC"
comment = "alice@laptop"

[usergroups]
admins = ["alice", "bob"]

[accounts."@admins"]
groups = ["developers", "wheel"]
purge_ssh_keys = true

[accounts.deploy]
authorized_keys = { alice = { options = ["no-pty"] } }
"#;

        let config: AccountsConfig = toml::from_str(toml).expect("Failed to parse config");

        assert_eq!(config.ssh_authorized_key_title, "%{ssh_key} on %{account}");

        let groups: Vec<&str> = config.groups.names().collect();
        assert_eq!(groups, vec!["developers", "legacy"]);
        let legacy = config.groups.get("legacy").unwrap();
        assert_eq!(legacy.ensure, Some(Ensure::Absent));
        assert_eq!(legacy.attributes["gid"], serde_json::json!(2001));

        let alice = config.users.get("alice").unwrap();
        assert_eq!(alice.uid, Some(1000));
        assert_eq!(alice.attributes["shell"], serde_json::json!("/bin/zsh"));

        let key = config.ssh_keys.get("alice").unwrap();
        assert_eq!(key.key_type.as_deref(), Some("ssh-ed25519"));
        assert_eq!(key.attribute("comment").as_deref(), Some("alice@laptop"));
        assert_eq!(key.attribute("private"), None);

        assert_eq!(
            config.usergroups.get("admins").unwrap(),
            &vec!["alice".to_string(), "bob".to_string()]
        );

        let admins = config.accounts.get("@admins").unwrap();
        assert_eq!(admins.groups, vec!["developers", "wheel"]);
        assert_eq!(admins.purge_ssh_keys, Some(true));
        assert!(admins.authorized_keys.is_implicit());

        let deploy = config.accounts.get("deploy").unwrap();
        assert_eq!(
            deploy.authorized_keys,
            AuthorizedKeys::Mapping(vec![(
                Identity::parse("alice"),
                KeyOptions::with_options(["no-pty"])
            )])
        );
    }

    #[test]
    fn test_default_title() {
        let config: AccountsConfig = toml::from_str("").unwrap();
        assert_eq!(config.ssh_authorized_key_title, "%{ssh_key}-on-%{account}");
        assert!(config.is_empty());
    }

    #[test]
    fn test_authorized_keys_shapes() {
        let scalar: AccountSpec = toml::from_str(r#"authorized_keys = "bar""#).unwrap();
        assert_eq!(
            scalar.authorized_keys,
            AuthorizedKeys::Scalar(Identity::parse("bar"))
        );

        let empty: AccountSpec = toml::from_str(r#"authorized_keys = """#).unwrap();
        assert!(empty.authorized_keys.is_implicit());

        let list: AccountSpec = toml::from_str(r#"authorized_keys = ["bar", "@ops"]"#).unwrap();
        assert_eq!(
            list.authorized_keys,
            AuthorizedKeys::List(vec![Identity::parse("bar"), Identity::parse("@ops")])
        );

        let mapping: AccountSpec = serde_json::from_str(
            r#"{"authorized_keys": {"@ops": {"options": ["no-pty"], "target": "/etc/keys"}}}"#,
        )
        .unwrap();
        let AuthorizedKeys::Mapping(entries) = mapping.authorized_keys else {
            panic!("expected mapping");
        };
        assert_eq!(entries[0].0, Identity::Group("ops".to_string()));
        assert_eq!(entries[0].1.options, vec!["no-pty"]);
        assert_eq!(entries[0].1.attributes["target"], serde_json::json!("/etc/keys"));
    }

    #[test]
    fn test_account_rejects_unknown_fields() {
        let err = toml::from_str::<AccountSpec>(r#"authorised_keys = "bar""#).unwrap_err();
        assert!(err.to_string().contains("authorised_keys"));
    }

    #[test]
    fn test_extra_ssh_key_attributes() {
        let key: SshKeySpec = toml::from_str(
            r#"
type = "ssh-rsa"
bits = 4096
owner = "ops"
"#,
        )
        .unwrap();
        assert_eq!(key.attribute("bits").as_deref(), Some("4096"));
        assert_eq!(key.attribute("owner").as_deref(), Some("ops"));
        assert_eq!(key.attribute("missing"), None);
    }
}
