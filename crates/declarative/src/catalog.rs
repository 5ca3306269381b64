//! Desired-state catalog - resources kept in apply order

use crate::resource::{BoxedResource, Resource};
use crate::types::Target;

/// An ordered collection of resources
///
/// Resources are kept sorted by kind (see [`ResourceKind`](crate::ResourceKind)); within a kind
/// they keep insertion order.
#[derive(Debug, Default)]
pub struct Catalog {
    resources: Vec<BoxedResource>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Add a resource after every resource of the same or an earlier kind
    pub fn add(&mut self, resource: BoxedResource) {
        let kind = resource.kind();
        let idx = self.resources.partition_point(|r| r.kind() <= kind);
        self.resources.insert(idx, resource);
    }

    /// Iterate resources in apply order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.iter().map(|r| -> &dyn Resource { &**r })
    }

    /// Filter catalog to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
        }
    }

    /// Filter catalog to only include resources matching a target
    pub fn filter_by_target(self, target: Option<&Target>) -> Self {
        match target {
            None => self,
            Some(t) => self.filter(|r| t.matches(r.kind(), &r.id())),
        }
    }

    /// Total number of resources in the catalog
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Check if any resource asks for removal
    pub fn has_removals(&self) -> bool {
        self.iter().any(|r| r.is_removal())
    }
}

impl Extend<BoxedResource> for Catalog {
    fn extend<I: IntoIterator<Item = BoxedResource>>(&mut self, iter: I) {
        for resource in iter {
            self.add(resource);
        }
    }
}
