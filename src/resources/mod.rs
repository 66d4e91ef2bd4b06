pub mod catalog;

use std::path::PathBuf;
use serde::{Serialize, Deserialize};

pub use catalog::DirCatalog;

/// A concrete asset located in one namespace of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub namespace: String,
    pub name: String,
    pub path: PathBuf,
}

/// Read-only asset catalog supplied by the host
pub trait ResourceCatalog: Send + Sync {
    /// Looks up `name` inside `namespace`. A missing asset is `None`, never an error.
    fn find(&self, namespace: &str, name: &str) -> Option<ResourceHandle>;
}

/// Resolves a resource name against an ordered list of namespace candidates.
///
/// Candidates are tried in order and the first hit wins. Duplicate
/// candidates (e.g. when the runtime and application namespaces are the
/// same) are collapsed so each namespace is queried once.
pub struct ResourceResolver {
    catalog: Box<dyn ResourceCatalog>,
    candidates: Vec<String>,
}

impl ResourceResolver {
    pub fn new<I, S>(catalog: Box<dyn ResourceCatalog>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for candidate in candidates {
            let candidate = candidate.into();
            if candidate.is_empty() || unique.contains(&candidate) {
                continue;
            }
            unique.push(candidate);
        }
        Self { catalog, candidates: unique }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn resolve(&self, name: &str) -> Option<ResourceHandle> {
        if name.is_empty() {
            return None;
        }
        let found = self
            .candidates
            .iter()
            .find_map(|namespace| self.catalog.find(namespace, name));

        match &found {
            Some(handle) => tracing::debug!("Resolved '{}' in namespace '{}'", name, handle.namespace),
            None => tracing::debug!("Resource '{}' not found in {:?}", name, self.candidates),
        }
        found
    }
}
