//! Summary statistics for catalogs

use crate::catalog::Catalog;
use crate::resource::Resource;
use crate::types::{Ensure, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts for one resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    /// Resources explicitly ensured present
    pub present: usize,
    /// Resources to remove
    pub absent: usize,
    /// Resources leaving ensure to the apply layer's default
    pub unspecified: usize,
}

impl KindSummary {
    /// Total number of resources of this kind
    pub fn total(&self) -> usize {
        self.present + self.absent + self.unspecified
    }

    fn add(&mut self, ensure: Option<Ensure>) {
        match ensure {
            Some(Ensure::Present) => self.present += 1,
            Some(Ensure::Absent) => self.absent += 1,
            None => self.unspecified += 1,
        }
    }
}

/// Catalog summary statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub by_kind: BTreeMap<ResourceKind, KindSummary>,
}

impl CatalogSummary {
    /// Create a summary from a catalog
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut summary = Self::default();
        for resource in catalog.iter() {
            summary
                .by_kind
                .entry(resource.kind())
                .or_default()
                .add(resource.ensure());
        }
        summary
    }

    /// Counts for one kind (zeroes when the kind is missing)
    pub fn kind(&self, kind: ResourceKind) -> KindSummary {
        self.by_kind.get(&kind).copied().unwrap_or_default()
    }

    /// Total number of resources
    pub fn total(&self) -> usize {
        self.by_kind.values().map(KindSummary::total).sum()
    }

    /// Total number of removals
    pub fn removals(&self) -> usize {
        self.by_kind.values().map(|k| k.absent).sum()
    }
}

/// Group resources by kind, in apply order
pub fn group_by_kind(catalog: &Catalog) -> BTreeMap<ResourceKind, Vec<&dyn Resource>> {
    let mut groups: BTreeMap<ResourceKind, Vec<&dyn Resource>> = BTreeMap::new();
    for resource in catalog.iter() {
        groups.entry(resource.kind()).or_default().push(resource);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Stub(&'static str, ResourceKind, Option<Ensure>);

    impl Resource for Stub {
        fn id(&self) -> String {
            self.0.to_string()
        }

        fn description(&self) -> String {
            self.0.to_string()
        }

        fn kind(&self) -> ResourceKind {
            self.1
        }

        fn ensure(&self) -> Option<Ensure> {
            self.2
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut catalog = Catalog::new();
        catalog.add(Box::new(Stub("wheel", ResourceKind::Group, None)));
        catalog.add(Box::new(Stub("foo", ResourceKind::User, Some(Ensure::Present))));
        catalog.add(Box::new(Stub("qux", ResourceKind::User, Some(Ensure::Absent))));
        catalog.add(Box::new(Stub(
            "bar-on-foo",
            ResourceKind::SshAuthorizedKey,
            Some(Ensure::Absent),
        )));

        let summary = CatalogSummary::from_catalog(&catalog);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.removals(), 2);
        assert_eq!(summary.kind(ResourceKind::Group).unspecified, 1);
        assert_eq!(summary.kind(ResourceKind::User).present, 1);
        assert_eq!(summary.kind(ResourceKind::PrivateKey).total(), 0);
    }

    #[test]
    fn test_group_by_kind() {
        let mut catalog = Catalog::new();
        catalog.add(Box::new(Stub("k", ResourceKind::SshAuthorizedKey, None)));
        catalog.add(Box::new(Stub("u", ResourceKind::User, None)));

        let groups = group_by_kind(&catalog);
        let kinds: Vec<_> = groups.keys().copied().collect();
        assert_eq!(kinds, vec![ResourceKind::User, ResourceKind::SshAuthorizedKey]);
    }
}
