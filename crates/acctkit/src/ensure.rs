//! Ensure-state merging.
//!
//! Removal always wins: if any record contributing to a resource is marked
//! `absent`, so is the resource. Otherwise the state is whatever was
//! declared, and an unset state stays unset for the apply layer to default.

use crate::schema::{AccountSpec, SshKeySpec, UserSpec};
use declarative::Ensure;

/// Merge ensure states with absent-wins precedence.
///
/// Returns `Absent` if any state is absent, else the last explicitly set
/// state, else `None`.
pub fn absent_wins<I>(states: I) -> Option<Ensure>
where
    I: IntoIterator<Item = Option<Ensure>>,
{
    let mut merged = None;
    for state in states.into_iter().flatten() {
        if state.is_absent() {
            return Some(Ensure::Absent);
        }
        merged = Some(state);
    }
    merged
}

/// Ensure state of the association between a key and an account binding.
pub fn merge_key_ensure(key: &SshKeySpec, account: &AccountBinding) -> Option<Ensure> {
    if key.is_absent() || account.is_absent() {
        Some(Ensure::Absent)
    } else {
        key.ensure
    }
}

/// Ensure state of a user record given its account binding, if any.
///
/// A bound user that is not removed anywhere is `Present`; an unbound
/// user keeps its own state.
pub fn merge_user_ensure(user: &UserSpec, binding: Option<&AccountBinding>) -> Option<Ensure> {
    match binding {
        Some(binding) => match absent_wins([user.ensure, binding.ensure]) {
            Some(Ensure::Absent) => Some(Ensure::Absent),
            _ => Some(Ensure::Present),
        },
        None => user.ensure,
    }
}

/// `purge_ssh_keys` for a user: omitted when unbound, `false` by default.
pub fn purge_flag(binding: Option<&AccountBinding>) -> Option<bool> {
    binding.map(|b| b.purge_ssh_keys.unwrap_or(false))
}

/// Every account record that applies to one identity, merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBinding {
    pub ensure: Option<Ensure>,
    /// OS groups, first declaration order, without duplicates
    pub groups: Vec<String>,
    /// Last explicitly set value
    pub purge_ssh_keys: Option<bool>,
}

impl AccountBinding {
    /// Fold another account record into this binding.
    pub fn merge(&mut self, spec: &AccountSpec) {
        self.ensure = absent_wins([self.ensure, spec.ensure]);
        for group in &spec.groups {
            if !self.groups.contains(group) {
                self.groups.push(group.clone());
            }
        }
        if spec.purge_ssh_keys.is_some() {
            self.purge_ssh_keys = spec.purge_ssh_keys;
        }
    }

    pub fn is_absent(&self) -> bool {
        self.ensure.is_some_and(Ensure::is_absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ensure: Option<Ensure>) -> SshKeySpec {
        SshKeySpec {
            ensure,
            ..Default::default()
        }
    }

    fn binding_of(spec: &AccountSpec) -> AccountBinding {
        let mut binding = AccountBinding::default();
        binding.merge(spec);
        binding
    }

    fn account(ensure: Option<Ensure>, groups: &[&str], purge: Option<bool>) -> AccountSpec {
        AccountSpec {
            ensure,
            groups: groups.iter().map(ToString::to_string).collect(),
            purge_ssh_keys: purge,
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_wins() {
        assert_eq!(absent_wins(Vec::new()), None);
        assert_eq!(absent_wins([None, None]), None);
        assert_eq!(absent_wins([Some(Ensure::Present), None]), Some(Ensure::Present));
        assert_eq!(
            absent_wins([Some(Ensure::Present), Some(Ensure::Absent), Some(Ensure::Present)]),
            Some(Ensure::Absent)
        );
    }

    #[test]
    fn test_key_ensure() {
        let present = AccountBinding::default();
        let removed = binding_of(&account(Some(Ensure::Absent), &[], None));

        assert_eq!(merge_key_ensure(&key(None), &present), None);
        assert_eq!(
            merge_key_ensure(&key(Some(Ensure::Present)), &present),
            Some(Ensure::Present)
        );
        assert_eq!(
            merge_key_ensure(&key(Some(Ensure::Absent)), &present),
            Some(Ensure::Absent)
        );
        assert_eq!(
            merge_key_ensure(&key(Some(Ensure::Present)), &removed),
            Some(Ensure::Absent)
        );
    }

    #[test]
    fn test_user_ensure() {
        let user = UserSpec::default();
        let removed_user = UserSpec {
            ensure: Some(Ensure::Absent),
            ..Default::default()
        };
        let bound = AccountBinding::default();
        let removed = binding_of(&account(Some(Ensure::Absent), &[], None));

        assert_eq!(merge_user_ensure(&user, None), None);
        assert_eq!(merge_user_ensure(&removed_user, None), Some(Ensure::Absent));
        assert_eq!(merge_user_ensure(&user, Some(&bound)), Some(Ensure::Present));
        assert_eq!(merge_user_ensure(&user, Some(&removed)), Some(Ensure::Absent));
        assert_eq!(
            merge_user_ensure(&removed_user, Some(&bound)),
            Some(Ensure::Absent)
        );
    }

    #[test]
    fn test_purge_flag() {
        assert_eq!(purge_flag(None), None);
        assert_eq!(purge_flag(Some(&AccountBinding::default())), Some(false));
        let purging = binding_of(&account(None, &[], Some(true)));
        assert_eq!(purge_flag(Some(&purging)), Some(true));
    }

    #[test]
    fn test_conflicting_bindings_merge() {
        let mut binding = binding_of(&account(None, &["foo", "wheel"], Some(true)));
        binding.merge(&account(Some(Ensure::Absent), &["bar", "foo"], None));
        binding.merge(&account(Some(Ensure::Present), &[], Some(false)));

        assert_eq!(binding.groups, vec!["foo", "wheel", "bar"]);
        assert_eq!(binding.ensure, Some(Ensure::Absent));
        assert_eq!(binding.purge_ssh_keys, Some(false));
    }
}
