mod collection;
mod import;

pub use collection::{InMemoryCollection, PackageCollection};
pub use import::import_packages;

use crate::{
    error::{RepoError, Result},
    query::PackageQuery,
    snapshot::RefList,
    types::{Dependency, Package},
};

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

/// An indexed set of packages, keyed by `architecture name version`
#[derive(Clone, Debug, Default)]
pub struct PackageList {
    // Ordered so iteration (and therefore every Packages file) is stable
    packages: BTreeMap<String, Arc<Package>>,
    // Package name -> keys of all versions and architectures of it
    name_to_keys: HashMap<String, Vec<String>>,
}

impl PackageList {
    pub fn new() -> Self {
        PackageList::default()
    }

    /// Load every package a reference list names from the collection
    pub fn from_ref_list(refs: &RefList, collection: &dyn PackageCollection) -> Result<Self> {
        let mut res = PackageList::new();
        for key in refs.iter() {
            res.add(collection.by_key(key)?)?;
        }
        Ok(res)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Add a package. Adding the same package twice is a no-op,
    /// adding a different package under an existing key is a conflict.
    pub fn add(&mut self, pkg: Arc<Package>) -> Result<()> {
        let key = pkg.key();
        if let Some(existing) = self.packages.get(&key) {
            if **existing != *pkg {
                return Err(RepoError::Conflict(key));
            }
            return Ok(());
        }
        self.insert(key, pkg);
        Ok(())
    }

    // Caller guarantees `key` is not yet present
    fn insert(&mut self, key: String, pkg: Arc<Package>) {
        self.name_to_keys
            .entry(pkg.name.clone())
            .or_default()
            .push(key.clone());
        self.packages.insert(key, pkg);
    }

    /// Union with another list. Packages already present are kept as they are.
    pub fn append(&mut self, other: &PackageList) {
        for (key, pkg) in &other.packages {
            if !self.packages.contains_key(key) {
                self.insert(key.clone(), pkg.clone());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<Package>> {
        self.packages.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.packages.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.packages.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// All packages satisfying a dependency, compared with Debian version semantics.
    /// Only versions of the dependency's package name are examined.
    pub fn search(&self, dep: &Dependency) -> Result<Vec<Arc<Package>>> {
        let mut res = Vec::new();
        if let Some(keys) = self.name_to_keys.get(&dep.pkg) {
            for key in keys {
                let pkg = &self.packages[key];
                if pkg.matches_dependency(dep)? {
                    res.push(pkg.clone());
                }
            }
        }
        Ok(res)
    }

    /// Full linear scan, collecting every package the query matches into a new list
    pub fn scan<Q: PackageQuery + ?Sized>(&self, q: &Q) -> Result<PackageList> {
        let mut res = PackageList::new();
        for (key, pkg) in &self.packages {
            if q.matches(pkg)? {
                res.insert(key.clone(), pkg.clone());
            }
        }
        Ok(res)
    }

    /// Concrete architectures present in the list, sorted. "all" is not an
    /// architecture of its own: those packages are part of every other one.
    pub fn architectures(&self) -> Vec<String> {
        let archs: BTreeSet<&str> = self
            .packages
            .values()
            .map(|pkg| pkg.architecture.as_str())
            .filter(|arch| *arch != "all")
            .collect();
        archs.into_iter().map(str::to_owned).collect()
    }
}

impl FromIterator<Arc<Package>> for PackageList {
    /// Collect packages; on duplicate keys the first package wins
    fn from_iter<I: IntoIterator<Item = Arc<Package>>>(iter: I) -> Self {
        let mut res = PackageList::new();
        for pkg in iter {
            let key = pkg.key();
            if !res.contains(&key) {
                res.insert(key, pkg);
            }
        }
        res
    }
}
