use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "atv",
    version,
    about = "Automatic Trust Verifier: resolve and verify values inside signed trust transactions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the member documents of a transaction
    Members(MembersArgs),
    /// Check whether a query exists below a path (empty path: the root)
    Exists(ExistsArgs),
    /// Resolve a path to a typed value
    Resolve(PathArgs),
    /// Print the report lines for a path
    Print(PathArgs),
    /// Verify that the document at one path is signed by the certificate at another
    VerifySignature(VerifySignatureArgs),
    /// Generate a signer: ed25519 keypair and certificate
    Keygen(KeygenArgs),
    /// Issue a certificate for an existing public key
    Certify(CertifyArgs),
    /// Build and sign a transaction archive
    Seal(SealArgs),
}

/// Options shared by every command that opens a transaction.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Transaction archive (.tar.gz)
    pub container: PathBuf,

    /// Verifier config file (YAML); environment variables are used otherwise
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Root format identifier (detected when omitted)
    #[arg(long)]
    pub format: Option<String>,

    /// Fail signature checks when no signature by the certificate is found
    #[arg(long)]
    pub require_matching_signature: bool,
}

#[derive(Args, Debug, Clone)]
pub struct MembersArgs {
    /// Transaction archive (.tar.gz)
    pub container: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExistsArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Dotted path of the document to query ("" for the root)
    pub path: String,

    /// Field name to look for
    pub query: String,
}

#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Dotted path, e.g. delegation.certificate.subject
    pub path: String,
}

#[derive(Args, Debug, Clone)]
pub struct VerifySignatureArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Path of the signed document ("" for the root)
    #[arg(long, default_value = "")]
    pub subject: String,

    /// Path resolving to the signing certificate
    #[arg(long)]
    pub cert: String,
}

#[derive(Args, Debug, Clone)]
pub struct KeygenArgs {
    /// Output directory for keypair files
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Force overwrite existing files
    #[arg(long, short)]
    pub force: bool,

    /// Certificate subject
    #[arg(long, default_value = "CN=ATV Signer")]
    pub subject: String,

    /// Certificate issuer (defaults to the subject)
    #[arg(long)]
    pub issuer: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CertifyArgs {
    /// SPKI PEM public key to certify
    #[arg(long)]
    pub public_key: PathBuf,

    /// Certificate subject
    #[arg(long)]
    pub subject: String,

    /// Certificate issuer (defaults to the subject)
    #[arg(long)]
    pub issuer: Option<String>,

    /// Output certificate file
    #[arg(long)]
    pub out: PathBuf,

    /// Force overwrite an existing certificate
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SealArgs {
    /// Member to include, as NAME=FILE (repeatable)
    #[arg(long = "member", value_name = "NAME=FILE", required = true)]
    pub members: Vec<String>,

    /// PKCS#8 PEM private key to sign with
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// Certificate to embed (e.g. from `atv keygen`); issued from --subject otherwise
    #[arg(long, conflicts_with_all = ["subject", "issuer"])]
    pub cert: Option<PathBuf>,

    /// Certificate subject for the signing key
    #[arg(long, default_value = "CN=ATV Signer")]
    pub subject: String,

    /// Certificate issuer (defaults to the subject)
    #[arg(long)]
    pub issuer: Option<String>,

    /// Members to sign (defaults to all)
    #[arg(long = "sign", value_name = "NAME")]
    pub signed: Vec<String>,

    /// Output archive
    #[arg(long)]
    pub out: PathBuf,
}
