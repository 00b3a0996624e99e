use anyhow::{format_err, Context, Result};
use sequoia_openpgp::{
    armor,
    crypto::KeyPair,
    parse::Parse,
    policy::StandardPolicy,
    serialize::stream::{Armorer, Message, Signer as StreamSigner},
    Cert,
};
use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

/// Produces signatures for Release files
pub trait Signer {
    /// Write an armored detached signature of `source` to `destination`
    fn detached_sign(&self, source: &Path, destination: &Path) -> Result<()>;
    /// Write `source` wrapped in a cleartext signature to `destination`
    fn clear_sign(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// OpenPGP signer backed by an unencrypted secret key
pub struct PgpSigner {
    keypair: KeyPair,
}

impl PgpSigner {
    /// Load a transferable secret key from a (possibly armored) file
    pub fn from_file(path: &Path) -> Result<Self> {
        let cert = Cert::from_file(path)
            .context(format!("Failed to read signing key {}", path.display()))?;
        Self::from_cert(&cert)
    }

    pub fn from_cert(cert: &Cert) -> Result<Self> {
        let policy = StandardPolicy::new();
        let key = cert
            .keys()
            .unencrypted_secret()
            .with_policy(&policy, None)
            .supported()
            .alive()
            .revoked(false)
            .for_signing()
            .next()
            .ok_or_else(|| {
                format_err!(
                    "Key {} has no usable unencrypted signing key",
                    cert.fingerprint()
                )
            })?;

        Ok(PgpSigner {
            keypair: key.key().clone().into_keypair()?,
        })
    }

    fn sign_into<W: Write + Send + Sync>(
        &self,
        source: &Path,
        sink: W,
        cleartext: bool,
    ) -> Result<()> {
        let mut input =
            File::open(source).context(format!("Failed to open {}", source.display()))?;
        let mut sink = sink;
        let message = Message::new(&mut sink);
        let mut signer = if cleartext {
            StreamSigner::new(message, self.keypair.clone())
                .cleartext()
                .build()?
        } else {
            let message = Armorer::new(message)
                .kind(armor::Kind::Signature)
                .build()?;
            StreamSigner::new(message, self.keypair.clone())
                .detached()
                .build()?
        };
        io::copy(&mut input, &mut signer)?;
        signer.finalize()?;
        sink.flush()?;
        Ok(())
    }
}

impl Signer for PgpSigner {
    fn detached_sign(&self, source: &Path, destination: &Path) -> Result<()> {
        let sink = File::create(destination)
            .context(format!("Failed to create {}", destination.display()))?;
        self.sign_into(source, sink, false)
    }

    fn clear_sign(&self, source: &Path, destination: &Path) -> Result<()> {
        let sink = File::create(destination)
            .context(format!("Failed to create {}", destination.display()))?;
        self.sign_into(source, sink, true)
    }
}
