use crate::list::PackageList;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Sorted list of package keys
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefList {
    refs: Vec<String>,
}

impl RefList {
    pub fn from_package_list(list: &PackageList) -> Self {
        // PackageList iterates in key order already
        RefList {
            refs: list.keys().map(str::to_owned).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.refs.iter().map(String::as_str)
    }
}

/// Immutable, named set of exact package versions
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub uuid: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub description: String,
    refs: RefList,
}

impl Snapshot {
    pub fn from_package_list(name: &str, list: &PackageList, description: &str) -> Self {
        Snapshot {
            uuid: Uuid::new_v4(),
            name: name.to_owned(),
            created_at: Utc::now(),
            description: description.to_owned(),
            refs: RefList::from_package_list(list),
        }
    }

    pub fn ref_list(&self) -> &RefList {
        &self.refs
    }
}
