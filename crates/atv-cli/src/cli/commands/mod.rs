//! Command implementations.

pub mod inspect;
pub mod keygen;
pub mod seal;
pub mod session;
pub mod verify;

use super::args::{Cli, Command};

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Members(args) => inspect::cmd_members(args),
        Command::Exists(args) => Ok(inspect::cmd_exists(args)),
        Command::Resolve(args) => Ok(inspect::cmd_resolve(args)),
        Command::Print(args) => Ok(inspect::cmd_print(args)),
        Command::VerifySignature(args) => Ok(verify::cmd_verify_signature(args)),
        Command::Keygen(args) => Ok(keygen::cmd_keygen(args)),
        Command::Certify(args) => Ok(keygen::cmd_certify(args)),
        Command::Seal(args) => Ok(seal::cmd_seal(args)),
    }
}
