//! Usergroup expansion.
//!
//! `@name` stands for every member of the usergroup `name`. Members are
//! terminal identity names: a member written as `@other` is not expanded
//! again.

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::ordered::Declared;

/// Read-only view over the declared usergroups.
#[derive(Debug, Clone, Copy)]
pub struct UserGroups<'a> {
    groups: &'a Declared<Vec<String>>,
}

impl<'a> UserGroups<'a> {
    pub fn new(groups: &'a Declared<Vec<String>>) -> Self {
        Self { groups }
    }

    /// Expand an identity into the names it stands for.
    ///
    /// A direct identity expands to itself. A usergroup reference expands
    /// to the group's members in declaration order, or fails when the
    /// usergroup is not declared.
    pub fn expand(&self, identity: &Identity) -> Result<Vec<String>> {
        match identity {
            Identity::Direct(name) => Ok(vec![name.clone()]),
            Identity::Group(name) => {
                let members = self.members(name)?;
                log::debug!("Expanded @{} to [{}]", name, members.join(", "));
                Ok(members.to_vec())
            }
        }
    }

    /// Expand a textual reference such as `alice` or `@admins`.
    pub fn expand_reference(&self, reference: &str) -> Result<Vec<String>> {
        self.expand(&Identity::parse(reference))
    }

    /// Members of a usergroup, by name without the `@`.
    pub fn members(&self, name: &str) -> Result<&'a [String]> {
        self.groups
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::reference(name))
    }
}
