//! Account resolution.
//!
//! [`resolve`] turns an [`AccountsConfig`] into the desired-state resources
//! the apply layer converges:
//!
//! 1. compile the title template (fails before anything else is looked at)
//! 2. expand `@usergroup` account bindings into one binding per identity
//! 3. normalize each binding's authorized keys, then sweep absent keys
//!    from every identity
//! 4. merge ensure states and collapse repeated `(ssh_key, account)` pairs
//! 5. render titles
//! 6. emit groups, users, authorized keys and private key placements
//!
//! The pass is pure: any error aborts it and nothing is returned.

use crate::authorized_keys::{self, EntrySource, KeyEntry};
use crate::ensure::{self, AccountBinding};
use crate::error::{Error, Result};
use crate::ordered::Declared;
use crate::resources::{
    AuthorizedKeyResource, GroupResource, PrivateKeyPlacement, UserResource,
};
use crate::schema::{AccountSpec, AccountsConfig, KeyOptions};
use crate::title::{TitleContext, TitleTemplate};
use crate::usergroup::UserGroups;
use declarative::{BoxedResource, Catalog, Ensure, Resource, Target};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Output of a resolution pass, each collection in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedAccounts {
    pub groups: Vec<GroupResource>,
    pub users: Vec<UserResource>,
    pub ssh_authorized_keys: Vec<AuthorizedKeyResource>,
    pub private_keys: Vec<PrivateKeyPlacement>,
}

impl ResolvedAccounts {
    pub fn group(&self, name: &str) -> Option<&GroupResource> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn user(&self, name: &str) -> Option<&UserResource> {
        self.users.iter().find(|u| u.name == name)
    }

    /// Look up an authorized key by its rendered title.
    pub fn authorized_key(&self, title: &str) -> Option<&AuthorizedKeyResource> {
        self.ssh_authorized_keys.iter().find(|k| k.title == title)
    }

    pub fn private_key(&self, title: &str) -> Option<&PrivateKeyPlacement> {
        self.private_keys.iter().find(|p| p.title == title)
    }

    pub fn len(&self) -> usize {
        self.groups.len() + self.users.len() + self.ssh_authorized_keys.len() + self.private_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only the resources `target` selects.
    pub fn retain_target(&mut self, target: &Target) {
        self.groups.retain(|r| target.matches(r.kind(), &r.id()));
        self.users.retain(|r| target.matches(r.kind(), &r.id()));
        self.ssh_authorized_keys
            .retain(|r| target.matches(r.kind(), &r.id()));
        self.private_keys
            .retain(|r| target.matches(r.kind(), &r.id()));
    }

    /// Every resource, in apply order.
    pub fn catalog(&self) -> Catalog {
        self.clone().into_catalog()
    }

    pub fn into_catalog(self) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.extend(self.groups.into_iter().map(|r| Box::new(r) as BoxedResource));
        catalog.extend(self.users.into_iter().map(|r| Box::new(r) as BoxedResource));
        catalog.extend(
            self.ssh_authorized_keys
                .into_iter()
                .map(|r| Box::new(r) as BoxedResource),
        );
        catalog.extend(
            self.private_keys
                .into_iter()
                .map(|r| Box::new(r) as BoxedResource),
        );
        catalog
    }
}

/// Resolve a configuration into desired-state resources.
pub fn resolve(config: &AccountsConfig) -> Result<ResolvedAccounts> {
    let template = TitleTemplate::compile(&config.ssh_authorized_key_title)?;
    Resolver::new(config, template).run()
}

/// One identity with every account record that applies to it.
struct Bound<'a> {
    binding: AccountBinding,
    specs: Vec<&'a AccountSpec>,
}

/// A `(ssh_key, account)` pair before rendering.
struct Association {
    ssh_key: String,
    account: String,
    options: KeyOptions,
    ensure: Option<Ensure>,
    source: EntrySource,
}

struct Resolver<'a> {
    config: &'a AccountsConfig,
    template: TitleTemplate,
    usergroups: UserGroups<'a>,
}

impl<'a> Resolver<'a> {
    fn new(config: &'a AccountsConfig, template: TitleTemplate) -> Self {
        Self {
            config,
            template,
            usergroups: UserGroups::new(&config.usergroups),
        }
    }

    fn run(&self) -> Result<ResolvedAccounts> {
        let bound = self.bind_accounts()?;
        let associations = self.associate(&bound)?;
        let ssh_authorized_keys = self.render(associations)?;
        let private_keys = self.place_private_keys(&ssh_authorized_keys);

        let resolved = ResolvedAccounts {
            groups: self.groups(),
            users: self.users(&bound),
            ssh_authorized_keys,
            private_keys,
        };

        log::info!(
            "Resolved {} groups, {} users, {} authorized keys, {} private keys",
            resolved.groups.len(),
            resolved.users.len(),
            resolved.ssh_authorized_keys.len(),
            resolved.private_keys.len()
        );

        Ok(resolved)
    }

    /// Expand account records and merge them per identity.
    fn bind_accounts(&self) -> Result<Declared<Bound<'a>>> {
        let mut bound: Declared<Bound<'a>> = Declared::new();
        for (name, spec) in self.config.accounts.iter() {
            for identity in self.usergroups.expand_reference(name)? {
                let entry = bound.get_or_insert_with(&identity, || Bound {
                    binding: AccountBinding::default(),
                    specs: Vec::new(),
                });
                if !entry.specs.is_empty() {
                    log::debug!("Merging another binding from {name} into {identity}");
                }
                entry.binding.merge(spec);
                entry.specs.push(spec);
            }
        }
        Ok(bound)
    }

    fn associate(&self, bound: &Declared<Bound<'a>>) -> Result<Vec<Association>> {
        let revoked: Vec<&str> = self
            .config
            .ssh_keys
            .iter()
            .filter(|(_, key)| key.is_absent())
            .map(|(name, _)| name)
            .collect();

        let mut associations: Vec<Association> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for (identity, entry) in bound.iter() {
            let mut entries: Vec<KeyEntry> = Vec::new();
            for spec in &entry.specs {
                entries.extend(authorized_keys::normalize(
                    identity,
                    &spec.authorized_keys,
                    &self.usergroups,
                    &self.config.ssh_keys,
                )?);
            }
            entries.extend(revoked.iter().map(|name| KeyEntry {
                ssh_key: (*name).to_string(),
                options: KeyOptions::default(),
                source: EntrySource::Revocation,
            }));

            for KeyEntry {
                ssh_key,
                options,
                source,
            } in entries
            {
                let key = self
                    .config
                    .ssh_keys
                    .get(&ssh_key)
                    .ok_or_else(|| Error::undeclared_ssh_key(&ssh_key, identity))?;
                let ensure = ensure::merge_key_ensure(key, &entry.binding);

                let pair = (ssh_key, identity.to_string());
                if let Some(&idx) = index.get(&pair) {
                    let existing = &mut associations[idx];
                    existing.ensure = ensure::absent_wins([existing.ensure, ensure]);
                    continue;
                }

                index.insert(pair.clone(), associations.len());
                associations.push(Association {
                    ssh_key: pair.0,
                    account: pair.1,
                    options,
                    ensure,
                    source,
                });
            }
        }

        Ok(associations)
    }

    fn render(&self, associations: Vec<Association>) -> Result<Vec<AuthorizedKeyResource>> {
        let mut titles: HashSet<String> = HashSet::new();
        let mut resources = Vec::with_capacity(associations.len());

        for association in associations {
            let ctx = TitleContext {
                ssh_key: &association.ssh_key,
                account: &association.account,
                ssh_keys: &self.config.ssh_keys,
            };
            let title = self.template.render(&ctx)?;
            if !titles.insert(title.clone()) {
                log::warn!(
                    "Title '{}' is rendered for more than one authorized key (template '{}')",
                    title,
                    self.template.as_str()
                );
            }

            let key = self.config.ssh_keys.get(&association.ssh_key);
            resources.push(AuthorizedKeyResource {
                title,
                key_type: key.and_then(|k| k.key_type.clone()),
                key: key.and_then(|k| k.public.clone()),
                ssh_key: association.ssh_key,
                user: association.account,
                ensure: association.ensure,
                options: association.options.options,
                source: association.source,
                attributes: association.options.attributes,
            });
        }

        Ok(resources)
    }

    fn place_private_keys(&self, keys: &[AuthorizedKeyResource]) -> Vec<PrivateKeyPlacement> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut placements = Vec::new();

        for resource in keys.iter().filter(|k| k.is_kept()) {
            let Some(key) = self.config.ssh_keys.get(&resource.ssh_key) else {
                continue;
            };
            if key.private.is_none() {
                continue;
            }
            let placement =
                PrivateKeyPlacement::new(&resource.ssh_key, &resource.user, key.key_type.as_deref());
            if seen.insert(placement.title.clone()) {
                placements.push(placement);
            }
        }

        placements
    }

    fn groups(&self) -> Vec<GroupResource> {
        self.config
            .groups
            .iter()
            .map(|(name, group)| GroupResource {
                name: name.to_string(),
                ensure: group.ensure,
                attributes: group.attributes.clone(),
            })
            .collect()
    }

    fn users(&self, bound: &Declared<Bound<'a>>) -> Vec<UserResource> {
        self.config
            .users
            .iter()
            .map(|(name, user)| {
                let binding = bound.get(name).map(|b| &b.binding);
                UserResource {
                    name: name.to_string(),
                    ensure: ensure::merge_user_ensure(user, binding),
                    comment: user.comment.clone(),
                    uid: user.uid,
                    groups: binding.map(|b| b.groups.clone()).unwrap_or_default(),
                    purge_ssh_keys: ensure::purge_flag(binding),
                    attributes: user.attributes.clone(),
                }
            })
            .collect()
    }
}
