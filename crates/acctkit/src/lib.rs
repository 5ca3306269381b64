//! # acctkit
//!
//! Pure Rust library for resolving declarative account configuration.
//!
//! A configuration names OS groups, users, SSH keys, usergroups (aliases
//! for lists of identities, referenced as `@name`) and accounts binding
//! identities to groups and authorized keys. This crate resolves it into
//! the desired-state resources an apply layer converges:
//!
//! - groups, passed through
//! - users, with group memberships and key purge policy from their accounts
//! - SSH authorized keys, one per `(ssh_key, account)` pair, titled from a
//!   configurable template
//! - private key placements for keys that carry private material
//!
//! Resolution does no I/O and holds no state between passes.
//!
//! ## Example
//!
//! ```
//! use acctkit::{AccountsConfig, resolve};
//!
//! let config: AccountsConfig = serde_json::from_str(r#"{
//!     "ssh_keys": { "alice": { "type": "ssh-ed25519", "public": "AAAA" } },
//!     "users": { "alice": { "uid": 1000 } },
//!     "accounts": { "alice": { "groups": ["wheel"] } }
//! }"#).unwrap();
//!
//! let resolved = resolve(&config).unwrap();
//! assert_eq!(resolved.user("alice").unwrap().groups, vec!["wheel"]);
//! assert!(resolved.authorized_key("alice-on-alice").is_some());
//! ```

pub mod authorized_keys;
pub mod ensure;
pub mod error;
pub mod identity;
pub mod ordered;
pub mod resolver;
pub mod resources;
pub mod schema;
pub mod title;
pub mod usergroup;

pub use authorized_keys::{EntrySource, KeyEntry};
pub use ensure::AccountBinding;
pub use error::{Error, Result, TemplateError};
pub use identity::Identity;
pub use ordered::Declared;
pub use resolver::{ResolvedAccounts, resolve};
pub use resources::{AuthorizedKeyResource, GroupResource, PrivateKeyPlacement, UserResource};
pub use schema::{
    AccountSpec, AccountsConfig, Attributes, AuthorizedKeys, GroupSpec, KeyOptions, SshKeySpec,
    UserSpec,
};
pub use title::{DEFAULT_TITLE_TEMPLATE, TitleContext, TitleTemplate};
pub use usergroup::UserGroups;

// Re-exported so callers need not depend on `declarative` directly.
pub use declarative::{Catalog, CatalogSummary, Ensure, Resource, ResourceKind, Target};
