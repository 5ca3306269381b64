//! Resource trait for desired-state catalogs
//!
//! A Resource is one thing an external apply layer should converge:
//! it has a stable identity, a kind, and a requested presence.

use crate::types::{Ensure, ResourceKind};
use std::fmt;

/// Core trait for declarative resources
///
/// Every resource in a catalog implements this trait, which provides:
/// - Identity (id, description, kind)
/// - Requested presence (ensure)
///
/// # Example
///
/// ```ignore
/// use declarative::{Ensure, Resource, ResourceKind};
///
/// #[derive(Debug)]
/// struct Group {
///     name: String,
/// }
///
/// impl Resource for Group {
///     fn id(&self) -> String {
///         self.name.clone()
///     }
///
///     fn description(&self) -> String {
///         format!("Group {}", self.name)
///     }
///
///     fn kind(&self) -> ResourceKind {
///         ResourceKind::Group
///     }
///
///     fn ensure(&self) -> Option<Ensure> {
///         None
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Unique identifier for this resource
    ///
    /// This is the title handed to the apply layer. It should be stable
    /// and unique within its kind. Examples:
    /// - "alice" for a user
    /// - "deploy-on-alice" for an authorized key
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource kind, used for ordering and filtering
    fn kind(&self) -> ResourceKind;

    /// Requested presence, or `None` to leave the default to the apply layer
    fn ensure(&self) -> Option<Ensure>;

    /// Whether this resource asks for removal
    fn is_removal(&self) -> bool {
        self.ensure().is_some_and(Ensure::is_absent)
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
