mod account;
mod address;
mod connection;
mod discriminator;
mod instruction;
mod seed;
mod signature;
mod transaction;

pub use {
  account::{
    AccountRecord,
    Comment,
    DecodeError,
    Donation,
    Follow,
    Like,
    Post,
    ProgramState,
    UserProfile,
  },
  address::{Address, Error as AddressError, MAX_SEEDS, MAX_SEED_LEN},
  connection::{Commitment, Connection, SignatureStatus, TransportError},
  discriminator::{account_discriminator, instruction_discriminator},
  instruction::{AccountMeta, Instruction},
  seed::{SeedLabel, SeedPart},
  signature::Signature,
  transaction::{Blockhash, Message, MessageHeader, Transaction},
};
use once_cell::sync::Lazy;

/// Address of the deployed Twitter Platform program.
///
/// Every account reference used by the client is derived under this
/// program id, so changing it silently derives addresses that do not
/// exist on chain.
pub static PROGRAM_ID: Lazy<Address> = Lazy::new(|| {
  "5KHS8ooUAF2bYEKZTmj8jKRZmea3gXed5FPyVtQKn2bu"
    .parse()
    .expect("program id is a valid base58 address")
});

/// The native system program, passed to every instruction that
/// allocates a new account.
pub const SYSTEM_PROGRAM_ID: Address = Address::new([0u8; 32]);
