//! Error types for account resolution.
//!
//! Every error aborts the whole resolution pass: callers never receive a
//! partially resolved catalog.

use thiserror::Error;

/// Errors that can occur while resolving account configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// An `@name` reference has no matching usergroup
    #[error("Can't find usergroup : {name}")]
    Reference {
        /// Usergroup name, without the leading `@`
        name: String,
    },

    /// `authorized_keys` names a key that has no `ssh_keys` record
    #[error("Can't find ssh key : {name} (authorized for {account})")]
    UndeclaredSshKey {
        name: String,
        /// Identity the key was to be authorized for
        account: String,
    },

    /// The authorized key title template could not be compiled or rendered
    #[error("invalid ssh_authorized_key_title: {0}")]
    Template(#[from] TemplateError),
}

impl Error {
    /// Create a reference error for a missing usergroup.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference { name: name.into() }
    }

    pub fn undeclared_ssh_key(name: impl Into<String>, account: impl Into<String>) -> Self {
        Self::UndeclaredSshKey {
            name: name.into(),
            account: account.into(),
        }
    }

    /// Whether this error comes from the title template.
    pub fn is_template(&self) -> bool {
        matches!(self, Self::Template(_))
    }
}

/// Errors raised by the title template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `%{...}` token the template language does not know
    #[error("unknown token '%{{{token}}}'")]
    UnknownToken { token: String },

    /// A `%{` without its closing brace
    #[error("unterminated token at byte {position}")]
    Unterminated { position: usize },

    /// A closed `%{...}` whose body is not a token, such as `%{a{b}`
    #[error("malformed token '%{{{token}}}' at byte {position}")]
    Malformed { token: String, position: usize },

    /// `%{ssh_keys['name'][...]}` names a key that is not declared
    #[error("ssh key '{name}' is not declared")]
    UnknownSshKey { name: String },

    /// `%{ssh_keys[...]['attribute']}` names an attribute the key does not have
    #[error("ssh key '{ssh_key}' has no attribute '{attribute}'")]
    UnknownAttribute { ssh_key: String, attribute: String },
}

/// Result type for account resolution.
pub type Result<T> = std::result::Result<T, Error>;
