mod ord;
mod parse;

use std::fmt;

/// dpkg style package version: `[epoch:]upstream[-revision]`
#[derive(Clone, Debug)]
pub struct PkgVersion {
    pub epoch: u64,
    pub upstream: String,
    // Empty when the version carries no Debian revision
    pub revision: String,
}

impl fmt::Display for PkgVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}:", self.epoch)?;
        }
        f.write_str(&self.upstream)?;
        if !self.revision.is_empty() {
            write!(f, "-{}", self.revision)?;
        }
        Ok(())
    }
}
