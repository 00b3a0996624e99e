use aptrepo::{
    cli,
    config::{Config, Opts, SubCmd},
    debug, due_to, error, info,
    list::InMemoryCollection,
    publish::{PublishedRepo, PublishedStorage},
    query::PackageQuery,
    signer::PgpSigner,
    snapshot::Snapshot,
    success,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

/// Exit codes:
/// 1 => program screwed up
fn main() {
    if let Err(err) = try_main() {
        error!("{}", err.to_string());
        err.chain().skip(1).for_each(|cause| {
            due_to!("{}", cause);
        });
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let opts: Opts = Opts::parse();
    cli::set_verbose(opts.verbose);

    let config = Config::from_file(&opts.config)?;
    config.check_sanity()?;

    info!("Loading packages from {}...", config.source.index.display());
    let collection =
        InMemoryCollection::from_packages_file(&config.source.index, &config.source.pool)
            .context("Failed to load source package index")?;
    debug!("{} packages available", collection.list().len());

    let selected = match config.snapshot.selection()? {
        Some(query) => query
            .query(collection.list())
            .context("Failed to select packages")?,
        None => collection.list().clone(),
    };

    match opts.subcmd {
        SubCmd::Show => {
            for pkg in selected.iter() {
                println!("{} {} {}", pkg.name, pkg.version, pkg.architecture);
            }
        }
        SubCmd::Publish => {
            let snapshot = Arc::new(Snapshot::from_package_list(
                &config.snapshot.name,
                &selected,
                &config.snapshot.description,
            ));
            info!(
                "Created snapshot {} with {} packages",
                snapshot.name,
                snapshot.ref_list().len()
            );

            let signer = PgpSigner::from_file(&config.signing_key)?;
            let storage = PublishedStorage::new(&config.root);
            let publish = &config.publish;
            let mut repo = PublishedRepo::new(
                &publish.prefix,
                &publish.distribution,
                &publish.component,
                publish.architectures.clone(),
                snapshot,
            );
            repo.publish(&storage, &collection, &signer)
                .context(format!("Failed to publish {}", publish.distribution))?;
            success!(
                "Published {} for {}",
                publish.distribution,
                repo.architectures().join(", ")
            );
        }
    }

    Ok(())
}
