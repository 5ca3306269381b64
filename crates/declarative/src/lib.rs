//! # Declarative
//!
//! Vocabulary for desired-state catalogs.
//!
//! This crate describes *what* should exist, not how to make it so: a
//! catalog is handed to an apply layer that owns idempotent convergence.
//!
//! ## Core Concepts
//!
//! - **Ensure**: Requested presence of a resource (present/absent), optional
//! - **ResourceKind**: Category of resource, ordered the way it must be applied
//! - **Resource**: Anything with an id, a kind and an ensure state
//! - **Catalog**: Resources kept in apply order, filterable by [`Target`]
//! - **CatalogSummary**: Counts per kind and ensure state
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Catalog, CatalogSummary, Ensure, Resource, ResourceKind, Target};
//!
//! #[derive(Debug)]
//! struct Group { name: String }
//!
//! impl Resource for Group {
//!     fn id(&self) -> String { self.name.clone() }
//!     fn description(&self) -> String { format!("Group {}", self.name) }
//!     fn kind(&self) -> ResourceKind { ResourceKind::Group }
//!     fn ensure(&self) -> Option<Ensure> { Some(Ensure::Present) }
//! }
//!
//! let mut catalog = Catalog::new();
//! catalog.add(Box::new(Group { name: "wheel".into() }));
//!
//! let only_groups = catalog.filter_by_target(Some(&Target::parse("groups")));
//! let summary = CatalogSummary::from_catalog(&only_groups);
//! assert_eq!(summary.total(), 1);
//! ```

pub mod catalog;
pub mod resource;
pub mod summary;
pub mod types;

// Re-export main types at crate root
pub use catalog::Catalog;
pub use resource::{BoxedResource, Resource};
pub use summary::{CatalogSummary, KindSummary, group_by_kind};
pub use types::{Ensure, ResourceKind, Target};
