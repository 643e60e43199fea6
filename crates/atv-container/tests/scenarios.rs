//! End-to-end verification over sealed archives.

use std::sync::Arc;

use atv_container::{CertificateBuilder, TransactionContainer, TransactionWriter};
use atv_core::{
    Certificate, Container, ErrorKind, InitError, Path, Report, ReportStatus, ResolvedValue,
    UnmatchedSignaturePolicy, VerificationSession, VerifierConfig,
};
use ed25519_dalek::SigningKey;

const BID_FORM: &str =
    "<form><format>theAuctionHouse2019</format><bid>42</bid><lot_number>7</lot_number></form>";

fn signer(subject: &str) -> (SigningKey, Certificate) {
    let key = SigningKey::generate(&mut rand::thread_rng());
    let cert = CertificateBuilder::new(subject)
        .issuer("CN=Auction House CA")
        .build(&key.verifying_key())
        .unwrap();
    (key, cert)
}

fn open(writer: &TransactionWriter) -> Arc<TransactionContainer> {
    let bytes = writer.to_bytes().unwrap();
    Arc::new(TransactionContainer::open(bytes.as_slice()).unwrap())
}

fn session(container: Arc<TransactionContainer>, config: VerifierConfig) -> VerificationSession {
    VerificationSession::open(container, Report::new(), config).unwrap()
}

fn path(s: &str) -> Path {
    Path::parse(s).unwrap()
}

fn delegation_xml(proxy: &Certificate) -> String {
    format!(
        "<delegation><format>delegation</format><delegator>CN=Alice</delegator>\
         <proxy>{}</proxy><valid_until>2030-01-01</valid_until>\
         <certificate>{}</certificate></delegation>",
        proxy.subject(),
        proxy.to_base64()
    )
}

#[test]
fn simple_contract_values() {
    let (key, cert) = signer("CN=Alice");
    let mut writer = TransactionWriter::new();
    writer.add_member("contract.txt", "Hello").unwrap();
    writer.sign_all(&key, &cert).unwrap();

    let session = session(open(&writer), VerifierConfig::default());
    assert_eq!(session.format_id(), "simpleContract");
    assert_eq!(
        session.resolve(&path("contract")),
        Some(ResolvedValue::String("Hello".into()))
    );
    assert!(session.exists(&Path::empty(), "contract"));
    assert!(!session.exists(&Path::empty(), "unknown"));
    assert_eq!(
        session.resolve(&path("certificate.subject")),
        Some(ResolvedValue::String("CN=Alice".into()))
    );
}

#[test]
fn auction_bid_values_and_print() {
    let (key, cert) = signer("CN=Bidder");
    let mut writer = TransactionWriter::new();
    writer.add_member("bid.xml", BID_FORM).unwrap();
    writer.sign_all(&key, &cert).unwrap();

    let session = session(open(&writer), VerifierConfig::default());
    assert_eq!(session.resolve(&path("bid")), Some(ResolvedValue::Integer(42)));
    assert_eq!(session.resolve(&path("lot")), Some(ResolvedValue::Integer(7)));
    assert_eq!(
        session.resolve(&path("certificate")),
        Some(ResolvedValue::Certificate(cert))
    );

    assert!(session.print(&path("bid")));
    let lines = session.report().lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].status, ReportStatus::Print);
    assert_eq!(lines[0].line, "Bid: 42");
}

#[test]
fn container_signed_by_signing_certificate() {
    let (key, cert) = signer("CN=Bidder");
    let mut writer = TransactionWriter::new();
    writer.add_member("bid.xml", BID_FORM).unwrap();
    writer.sign_all(&key, &cert).unwrap();

    let session = session(open(&writer), VerifierConfig::default());
    assert!(session.verify_signature(&Path::empty(), &path("certificate")));

    let lines = session.report().lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].status, ReportStatus::Ok);
}

#[test]
fn signature_by_other_certificate_passes_vacuously() {
    let (key, cert) = signer("CN=Bidder");
    let (_, proxy) = signer("CN=Proxy");
    let mut writer = TransactionWriter::new();
    writer.add_member("bid.xml", BID_FORM).unwrap();
    writer
        .add_member("delegation.xml", delegation_xml(&proxy))
        .unwrap();
    writer.sign_all(&key, &cert).unwrap();
    let container = open(&writer);

    let lenient = session(container.clone(), VerifierConfig::default());
    let outcome = lenient
        .check_signature(&Path::empty(), &path("delegation.certificate"))
        .unwrap();
    assert_eq!(outcome.verified, 0);
    assert!(lenient.verify_signature(&Path::empty(), &path("delegation.certificate")));

    let strict = session(
        container,
        VerifierConfig::default().with_unmatched_signature(UnmatchedSignaturePolicy::Fail),
    );
    assert!(!strict.verify_signature(&Path::empty(), &path("delegation.certificate")));
    assert_eq!(strict.report().count(ReportStatus::Failed), 1);
}

#[test]
fn missing_bid_form_fails_open() {
    let (key, cert) = signer("CN=Bidder");
    let mut writer = TransactionWriter::new();
    writer.add_member("readme.txt", "no form here").unwrap();
    writer.sign_all(&key, &cert).unwrap();

    let report = Report::new();
    let err = VerificationSession::open(
        open(&writer),
        report.clone(),
        VerifierConfig::default().with_root_format("theAuctionHouse2019"),
    )
    .unwrap_err();
    assert!(matches!(err, InitError::MissingMember { .. }));

    let lines = report.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].status, ReportStatus::Failed);
    assert!(lines[0].line.contains("bid.xml"));
}

#[test]
fn tampered_member_fails_crypto_check() {
    let (key, cert) = signer("CN=Bidder");
    let mut writer = TransactionWriter::new();
    writer.add_member("bid.xml", BID_FORM).unwrap();
    writer.sign_all(&key, &cert).unwrap();
    // replace the bid after signing
    writer
        .add_member(
            "bid.xml",
            "<form><format>theAuctionHouse2019</format><bid>1</bid><lot_number>7</lot_number></form>",
        )
        .unwrap();

    let session = session(open(&writer), VerifierConfig::default());
    let err = session
        .check_signature(&Path::empty(), &path("certificate"))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CryptographicFailure);
    assert!(!session.verify_signature(&Path::empty(), &path("certificate")));
}

#[test]
fn signature_over_unrelated_member_does_not_sign_the_bid() {
    // Alice signed only a note; a bid was added next to it afterwards
    let (key, alice) = signer("CN=Alice");
    let mut writer = TransactionWriter::new();
    writer
        .add_member(
            "bid.xml",
            "<form><format>theAuctionHouse2019</format><bid>999999</bid><lot_number>7</lot_number></form>",
        )
        .unwrap();
    writer.add_member("note.txt", "see you at the auction").unwrap();
    writer.sign(&key, &alice, &["note.txt"]).unwrap();

    let strict = session(
        open(&writer),
        VerifierConfig::default().with_unmatched_signature(UnmatchedSignaturePolicy::Fail),
    );
    assert_eq!(
        strict.resolve(&path("certificate.subject")),
        Some(ResolvedValue::String("CN=Alice".into()))
    );
    assert!(!strict.verify_signature(&Path::empty(), &path("certificate")));

    let lines = strict.report().lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].status, ReportStatus::Failed);
    assert!(lines[0].line.contains("no signature by CN=Alice"));
}

#[test]
fn delegated_bid() {
    // Alice delegates bidding to Bob; Bob signs the bid, Alice signs the proof.
    let (alice_key, alice) = signer("CN=Alice");
    let (bob_key, bob) = signer("CN=Bob");

    let mut writer = TransactionWriter::new();
    writer.add_member("bid.xml", BID_FORM).unwrap();
    writer
        .add_member("auth/delegation.xml", delegation_xml(&bob))
        .unwrap();
    writer.sign(&bob_key, &bob, &["bid.xml"]).unwrap();
    writer
        .sign(&alice_key, &alice, &["auth/delegation.xml"])
        .unwrap();
    let container = open(&writer);
    assert_eq!(container.signatures().len(), 2);

    let strict = session(
        container,
        VerifierConfig::default().with_unmatched_signature(UnmatchedSignaturePolicy::Fail),
    );

    // the bid is signed by the proxy named in the delegation
    assert!(strict.verify_signature(&Path::empty(), &path("delegation.certificate")));
    // but the proxy did not sign the proof itself
    assert!(!strict.verify_signature(&path("delegation"), &path("delegation.certificate")));

    assert_eq!(
        strict.resolve(&path("delegation.proxy")),
        Some(ResolvedValue::String("CN=Bob".into()))
    );
    assert_eq!(
        strict.resolve(&path("delegation.certificate.format")),
        Some(ResolvedValue::String("certificate".into()))
    );
    let lines = strict.report().lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].status, ReportStatus::Ok);
    assert_eq!(lines[1].status, ReportStatus::Failed);
}

#[test]
fn non_certificate_path_cannot_bind() {
    let (key, cert) = signer("CN=Bidder");
    let mut writer = TransactionWriter::new();
    writer.add_member("bid.xml", BID_FORM).unwrap();
    writer.sign_all(&key, &cert).unwrap();

    let session = session(open(&writer), VerifierConfig::default());
    for cert_path in ["bid", "lot", "format", "certificate.subject", "nope"] {
        assert!(
            session
                .check_signature(&Path::empty(), &path(cert_path))
                .is_err(),
            "{cert_path}"
        );
    }
}
