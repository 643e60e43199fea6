//! `atv keygen` and `atv certify` - Signer identities for sealing transactions.
//!
//! A signer is an Ed25519 keypair plus a certificate in the verifier's
//! encoding. `keygen` creates all three files; `certify` issues a certificate
//! for a public key that already exists.

use anyhow::{Context, Result};
use atv_container::{load_verifying_key_pem, CertificateBuilder};
use atv_core::Certificate;
use ed25519_dalek::{SigningKey, VerifyingKey};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::{CertifyArgs, KeygenArgs};
use crate::exit_codes;

pub const PRIVATE_KEY_FILE: &str = "private_key.pem";
pub const PUBLIC_KEY_FILE: &str = "public_key.pem";
pub const CERTIFICATE_FILE: &str = "certificate.json";

/// Files making up one signer identity.
struct SignerFiles {
    private_key: PathBuf,
    public_key: PathBuf,
    certificate: PathBuf,
}

impl SignerFiles {
    fn in_dir(dir: &Path) -> Self {
        Self {
            private_key: dir.join(PRIVATE_KEY_FILE),
            public_key: dir.join(PUBLIC_KEY_FILE),
            certificate: dir.join(CERTIFICATE_FILE),
        }
    }

    fn refuse_existing(&self) -> Result<()> {
        for path in [&self.private_key, &self.public_key, &self.certificate] {
            if path.exists() {
                anyhow::bail!(
                    "signer file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
        }
        Ok(())
    }
}

pub fn cmd_keygen(args: KeygenArgs) -> i32 {
    report_result(run_keygen(args))
}

pub fn cmd_certify(args: CertifyArgs) -> i32 {
    report_result(run_certify(args))
}

fn report_result(result: Result<()>) -> i32 {
    match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::CONFIG_ERROR
        }
    }
}

fn issue(subject: &str, issuer: Option<&str>, key: &VerifyingKey) -> Result<Certificate> {
    let mut builder = CertificateBuilder::new(subject);
    if let Some(issuer) = issuer {
        builder = builder.issuer(issuer);
    }
    builder.build(key).context("failed to issue certificate")
}

fn write_certificate(path: &Path, certificate: &Certificate) -> Result<()> {
    fs::write(path, certificate.encoded())
        .with_context(|| format!("failed to write certificate: {}", path.display()))
}

fn print_certificate(certificate: &Certificate) {
    println!("subject: {}", certificate.subject());
    println!("issuer: {}", certificate.issuer());
    println!("serial: {}", certificate.serial());
    println!("fingerprint: {}", certificate.fingerprint());
}

fn run_keygen(args: KeygenArgs) -> Result<()> {
    use pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create directory: {}", args.out.display()))?;
    let files = SignerFiles::in_dir(&args.out);
    if !args.force {
        files.refuse_existing()?;
    }

    let signing_key = SigningKey::generate(&mut rand::thread_rng());
    let verifying_key = signing_key.verifying_key();
    let certificate = issue(&args.subject, args.issuer.as_deref(), &verifying_key)?;

    let private_pem = signing_key
        .to_pkcs8_pem(LineEnding::LF)
        .context("failed to encode private key as PKCS#8 PEM")?;
    fs::write(&files.private_key, private_pem.as_bytes()).with_context(|| {
        format!("failed to write private key: {}", files.private_key.display())
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&files.private_key, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict {}", files.private_key.display()))?;
    }

    let public_pem = verifying_key
        .to_public_key_pem(LineEnding::LF)
        .context("failed to encode public key as SPKI PEM")?;
    fs::write(&files.public_key, public_pem)
        .with_context(|| format!("failed to write public key: {}", files.public_key.display()))?;
    write_certificate(&files.certificate, &certificate)?;

    tracing::info!(signer = %certificate.subject(), dir = %args.out.display(), "generated signer");
    println!("signer written to {}", args.out.display());
    print_certificate(&certificate);
    Ok(())
}

fn run_certify(args: CertifyArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!(
            "certificate already exists: {} (use --force to overwrite)",
            args.out.display()
        );
    }
    let key = load_verifying_key_pem(&args.public_key)?;
    let certificate = issue(&args.subject, args.issuer.as_deref(), &key)?;
    write_certificate(&args.out, &certificate)?;

    println!("certificate written to {}", args.out.display());
    print_certificate(&certificate);
    Ok(())
}
