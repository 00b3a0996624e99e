mod checksum;
mod dependency;
mod package;
mod stanza;
mod version;

pub use checksum::ChecksumInfo;
pub use dependency::{Dependency, Relation};
pub use package::{Package, PackageFile};
pub use stanza::Stanza;
pub use version::PkgVersion;

#[cfg(test)]
pub(crate) use package::test::pkg;
