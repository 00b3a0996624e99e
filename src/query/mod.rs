//! Predicates over packages.
//!
//! Every query can both test a single package ([`PackageQuery::matches`]) and
//! run against a whole [`PackageList`] ([`PackageQuery::query`]). Queries that
//! are [`fast`](PackageQuery::fast) answer through the list's indices; the rest
//! fall back to scanning every package. Whichever path is taken, the set of
//! packages returned is the set `matches` accepts.

mod field;
mod pkg;

pub use field::FieldQuery;
pub use pkg::{DependencyQuery, PkgQuery};

use crate::{error::Result, list::PackageList, types::Package};

/// Predicate on a package
pub trait PackageQuery {
    /// Whether the package satisfies the condition
    fn matches(&self, pkg: &Package) -> Result<bool>;
    /// Whether this query can be answered without a full scan.
    /// A property of the query alone, never of the list it runs against.
    fn fast(&self) -> bool;
    /// Run the query, returning a new list
    fn query(&self, list: &PackageList) -> Result<PackageList>;
}

impl<Q: PackageQuery + ?Sized> PackageQuery for Box<Q> {
    fn matches(&self, pkg: &Package) -> Result<bool> {
        (**self).matches(pkg)
    }

    fn fast(&self) -> bool {
        (**self).fast()
    }

    fn query(&self, list: &PackageList) -> Result<PackageList> {
        (**self).query(list)
    }
}

/// L | R
pub struct OrQuery {
    pub l: Box<dyn PackageQuery>,
    pub r: Box<dyn PackageQuery>,
}

/// L , R
pub struct AndQuery {
    pub l: Box<dyn PackageQuery>,
    pub r: Box<dyn PackageQuery>,
}

/// !Q
pub struct NotQuery {
    pub q: Box<dyn PackageQuery>,
}

impl OrQuery {
    pub fn new(l: impl PackageQuery + 'static, r: impl PackageQuery + 'static) -> Self {
        OrQuery {
            l: Box::new(l),
            r: Box::new(r),
        }
    }
}

impl AndQuery {
    pub fn new(l: impl PackageQuery + 'static, r: impl PackageQuery + 'static) -> Self {
        AndQuery {
            l: Box::new(l),
            r: Box::new(r),
        }
    }
}

impl NotQuery {
    pub fn new(q: impl PackageQuery + 'static) -> Self {
        NotQuery { q: Box::new(q) }
    }
}

impl PackageQuery for OrQuery {
    fn matches(&self, pkg: &Package) -> Result<bool> {
        Ok(self.l.matches(pkg)? || self.r.matches(pkg)?)
    }

    // A targeted lookup unioned with a full scan is never cheaper than one scan
    fn fast(&self) -> bool {
        self.l.fast() && self.r.fast()
    }

    fn query(&self, list: &PackageList) -> Result<PackageList> {
        if self.fast() {
            let mut res = self.l.query(list)?;
            res.append(&self.r.query(list)?);
            Ok(res)
        } else {
            list.scan(self)
        }
    }
}

impl PackageQuery for AndQuery {
    fn matches(&self, pkg: &Package) -> Result<bool> {
        Ok(self.l.matches(pkg)? && self.r.matches(pkg)?)
    }

    // One narrow side is enough
    fn fast(&self) -> bool {
        self.l.fast() || self.r.fast()
    }

    fn query(&self, list: &PackageList) -> Result<PackageList> {
        if self.l.fast() {
            self.l.query(list)?.scan(&self.r)
        } else if self.r.fast() {
            self.r.query(list)?.scan(&self.l)
        } else {
            list.scan(self)
        }
    }
}

impl PackageQuery for NotQuery {
    fn matches(&self, pkg: &Package) -> Result<bool> {
        Ok(!self.q.matches(pkg)?)
    }

    fn fast(&self) -> bool {
        false
    }

    fn query(&self, list: &PackageList) -> Result<PackageList> {
        list.scan(self)
    }
}

/// Combine queries into one that matches any of them, `None` if there are none
pub fn any_of(queries: Vec<Box<dyn PackageQuery>>) -> Option<Box<dyn PackageQuery>> {
    queries
        .into_iter()
        .reduce(|l, r| Box::new(OrQuery { l, r }) as Box<dyn PackageQuery>)
}
