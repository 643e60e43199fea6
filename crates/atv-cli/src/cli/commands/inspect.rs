//! `atv members`, `atv exists`, `atv resolve`, `atv print`.

use anyhow::Result;
use atv_container::TransactionContainer;
use atv_core::Container;

use super::session::{open_session, parse_path};
use crate::cli::args::{ExistsArgs, MembersArgs, PathArgs};
use crate::exit_codes;

pub fn cmd_members(args: MembersArgs) -> Result<i32> {
    let container = TransactionContainer::open_path(&args.container)?;
    for name in container.list_members() {
        let size = container.member(&name).map_or(0, <[u8]>::len);
        println!("{} ({} bytes)", name, size);
    }
    if !container.is_signed() {
        println!("unsigned");
    }
    for signature in container.signatures() {
        println!(
            "signature: {} [{}]",
            signature.certificate.subject(),
            signature.signed_members.join(", ")
        );
    }
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_exists(args: ExistsArgs) -> i32 {
    let path = match parse_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e:#}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    let session = match open_session(&args.session) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let found = session.exists(&path, &args.query);
    println!("{}", found);
    if found {
        exit_codes::SUCCESS
    } else {
        exit_codes::NEGATIVE
    }
}

pub fn cmd_resolve(args: PathArgs) -> i32 {
    let path = match parse_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e:#}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    let session = match open_session(&args.session) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match session.resolve(&path) {
        Some(value) => {
            println!("{} {}", value.type_tag(), value);
            exit_codes::SUCCESS
        }
        None => {
            eprintln!("not found: {}", path);
            exit_codes::NEGATIVE
        }
    }
}

pub fn cmd_print(args: PathArgs) -> i32 {
    let path = match parse_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e:#}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    let session = match open_session(&args.session) {
        Ok(s) => s,
        Err(code) => return code,
    };

    if session.print(&path) {
        exit_codes::SUCCESS
    } else {
        exit_codes::NEGATIVE
    }
}
