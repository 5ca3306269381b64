//! Normalization of `authorized_keys`.
//!
//! Every accepted shape becomes a flat list of [`KeyEntry`] values, one per
//! key name, with usergroup references expanded. The same-name key, when
//! declared, is always appended after the explicit entries.

use crate::error::Result;
use crate::ordered::Declared;
use crate::schema::{AuthorizedKeys, KeyOptions, SshKeySpec};
use crate::usergroup::UserGroups;
use serde::Serialize;

/// Why a key ended up authorized for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Listed in the account's `authorized_keys`
    Explicit,
    /// Key declared under the account's own name
    Implicit,
    /// Absent key swept from every account
    Revocation,
}

/// One key to authorize for an account.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEntry {
    pub ssh_key: String,
    pub options: KeyOptions,
    pub source: EntrySource,
}

impl KeyEntry {
    fn new(ssh_key: String, options: KeyOptions, source: EntrySource) -> Self {
        Self {
            ssh_key,
            options,
            source,
        }
    }
}

/// Normalize the authorized keys of one (already expanded) account.
///
/// Duplicates are kept; collapsing pairs is left to the caller.
pub fn normalize(
    account: &str,
    keys: &AuthorizedKeys,
    usergroups: &UserGroups<'_>,
    ssh_keys: &Declared<SshKeySpec>,
) -> Result<Vec<KeyEntry>> {
    let mut entries = Vec::new();

    match keys {
        AuthorizedKeys::Implicit => {}
        AuthorizedKeys::Scalar(identity) => {
            for name in usergroups.expand(identity)? {
                entries.push(KeyEntry::new(name, KeyOptions::default(), EntrySource::Explicit));
            }
        }
        AuthorizedKeys::List(identities) => {
            for identity in identities {
                for name in usergroups.expand(identity)? {
                    entries.push(KeyEntry::new(
                        name,
                        KeyOptions::default(),
                        EntrySource::Explicit,
                    ));
                }
            }
        }
        AuthorizedKeys::Mapping(mapping) => {
            // Options of a usergroup entry apply to every member.
            for (identity, options) in mapping {
                for name in usergroups.expand(identity)? {
                    entries.push(KeyEntry::new(name, options.clone(), EntrySource::Explicit));
                }
            }
        }
    }

    if ssh_keys.contains(account) {
        entries.push(KeyEntry::new(
            account.to_string(),
            KeyOptions::default(),
            EntrySource::Implicit,
        ));
    }

    log::debug!(
        "Account {} authorizes [{}]",
        account,
        entries
            .iter()
            .map(|e| e.ssh_key.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(entries)
}
