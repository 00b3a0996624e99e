//! Debian repository tooling: package lists and queries over them, snapshots,
//! and publishing snapshots as signed apt repositories.

pub mod cli;
pub mod config;
pub mod error;
pub mod list;
pub mod publish;
pub mod query;
pub mod signer;
pub mod snapshot;
pub mod types;
pub mod utils;

pub use error::{RepoError, Result};
