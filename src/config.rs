use crate::{
    query::{any_of, DependencyQuery, PackageQuery},
    utils::parse_dependency_list,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fs, path::Path, path::PathBuf};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Public directory published repositories are written to
    pub root: PathBuf,
    /// OpenPGP secret key used to sign Release files
    pub signing_key: PathBuf,
    pub source: SourceConfig,
    pub snapshot: SnapshotConfig,
    pub publish: PublishConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&data).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn check_sanity(&self) -> Result<()> {
        lazy_static! {
            static ref DIST_NAME: Regex = Regex::new("^[a-zA-Z0-9][a-zA-Z0-9._/-]*$").unwrap();
            static ref COMPONENT_NAME: Regex = Regex::new("^[a-zA-Z0-9][a-zA-Z0-9._-]*$").unwrap();
            static ref ARCH_NAME: Regex = Regex::new("^[a-z0-9][a-z0-9-]*$").unwrap();
        }

        let publish = &self.publish;
        if !DIST_NAME.is_match(&publish.distribution) {
            bail!("Invalid distribution name {}", publish.distribution);
        }
        if !COMPONENT_NAME.is_match(&publish.component) {
            bail!("Invalid component name {}", publish.component);
        }
        if Path::new(&publish.prefix).is_absolute() {
            bail!("Publishing prefix {} must be relative to the public root", publish.prefix);
        }
        if publish.prefix.split('/').any(|part| part == "..") {
            bail!("Publishing prefix {} escapes the public root", publish.prefix);
        }
        if let Some(archs) = &publish.architectures {
            let mut seen = BTreeSet::new();
            for arch in archs {
                if !seen.insert(arch) {
                    bail!("Architecture {} is listed more than once", arch);
                }
                if !ARCH_NAME.is_match(arch) {
                    bail!("Invalid architecture name {}", arch);
                }
                if arch == "all" {
                    bail!("Architecture all is published as part of every other architecture");
                }
            }
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SourceConfig {
    /// A Packages index
    pub index: PathBuf,
    /// Directory the Filename entries of the index are relative to
    pub pool: PathBuf,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SnapshotConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Dependency expressions selecting packages, e.g. `hello (>= 2.10)`.
    /// Empty means everything in the source.
    #[serde(default)]
    pub packages: Vec<String>,
}

impl SnapshotConfig {
    /// Query matching any of the configured expressions, `None` if there are none
    pub fn selection(&self) -> Result<Option<Box<dyn PackageQuery>>> {
        let mut queries: Vec<Box<dyn PackageQuery>> = Vec::new();
        for expr in &self.packages {
            let deps = parse_dependency_list(expr)
                .context(format!("Invalid package selection {}", expr))?;
            for dep in deps {
                queries.push(Box::new(DependencyQuery::new(dep)));
            }
        }
        Ok(any_of(queries))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PublishConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub distribution: String,
    #[serde(default = "default_component")]
    pub component: String,
    /// Inferred from the snapshot when absent
    pub architectures: Option<Vec<String>>,
}

#[inline]
fn default_prefix() -> String {
    ".".to_string()
}

#[inline]
fn default_component() -> String {
    "main".to_string()
}

#[derive(Parser)]
#[clap(about, version, author)]
pub struct Opts {
    #[clap(
        short,
        long,
        default_value = "aptrepo.toml",
        help = "Position of the config file"
    )]
    pub config: PathBuf,
    #[clap(short, long, help = "Print additional debug information")]
    pub verbose: bool,
    #[clap(subcommand)]
    pub subcmd: SubCmd,
}

#[derive(Parser)]
pub enum SubCmd {
    /// Take a snapshot of the selected packages and publish it
    Publish,
    /// List packages the snapshot would contain
    Show,
}
