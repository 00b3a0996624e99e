mod debcontrol;

pub use debcontrol::{parse_dependency, parse_dependency_list};
