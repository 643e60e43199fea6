//! `atv seal` - Build and sign a transaction archive.

use anyhow::{Context, Result};
use atv_container::{
    certificate_matches_key, load_certificate, load_signing_key_pem, CertificateBuilder,
    TransactionWriter,
};
use std::fs;
use std::path::PathBuf;

use crate::cli::args::SealArgs;
use crate::exit_codes;

pub fn cmd_seal(args: SealArgs) -> i32 {
    match run_seal(args) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::CONFIG_ERROR
        }
    }
}

/// Split `NAME=FILE`.
fn parse_member(arg: &str) -> Result<(String, PathBuf)> {
    match arg.split_once('=') {
        Some((name, file)) if !name.is_empty() && !file.is_empty() => {
            Ok((name.to_string(), PathBuf::from(file)))
        }
        _ => anyhow::bail!("invalid --member {:?}: expected NAME=FILE", arg),
    }
}

fn run_seal(args: SealArgs) -> Result<()> {
    let mut writer = TransactionWriter::new();
    for arg in &args.members {
        let (name, file) = parse_member(arg)?;
        let data =
            fs::read(&file).with_context(|| format!("failed to read member file: {}", file.display()))?;
        writer
            .add_member(&name, data)
            .with_context(|| format!("cannot add member {}", name))?;
    }

    if let Some(key_path) = &args.key {
        let key = load_signing_key_pem(key_path)?;
        let certificate = match &args.cert {
            Some(cert_path) => {
                let certificate = load_certificate(cert_path)?;
                if !certificate_matches_key(&certificate, &key) {
                    anyhow::bail!(
                        "certificate {} does not belong to key {}",
                        cert_path.display(),
                        key_path.display()
                    );
                }
                certificate
            }
            None => {
                let mut builder = CertificateBuilder::new(&args.subject);
                if let Some(issuer) = &args.issuer {
                    builder = builder.issuer(issuer);
                }
                builder
                    .build(&key.verifying_key())
                    .context("failed to build certificate")?
            }
        };

        if args.signed.is_empty() {
            writer.sign_all(&key, &certificate)?;
        } else {
            let names: Vec<&str> = args.signed.iter().map(String::as_str).collect();
            writer.sign(&key, &certificate, &names)?;
        }
        tracing::info!(signer = %certificate.subject(), "sealed transaction");
    } else if !args.signed.is_empty() || args.cert.is_some() {
        anyhow::bail!("--sign and --cert require --key");
    }

    writer.write_to_path(&args.out)?;
    println!(
        "sealed {} member(s) into {}",
        args.members.len(),
        args.out.display()
    );
    Ok(())
}
