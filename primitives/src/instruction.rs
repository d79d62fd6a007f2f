use {
  crate::Address,
  serde::{Deserialize, Serialize},
};

/// Describes one account referenced by an instruction and how
/// the instruction is allowed to use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
  pub address: Address,
  pub is_signer: bool,
  pub is_writable: bool,
}

impl AccountMeta {
  pub fn writable(address: Address, is_signer: bool) -> Self {
    Self {
      address,
      is_signer,
      is_writable: true,
    }
  }

  pub fn readonly(address: Address, is_signer: bool) -> Self {
    Self {
      address,
      is_signer,
      is_writable: false,
    }
  }
}

/// A single call into an on-chain program.
///
/// Accounts are positional, the program reads them in the exact order
/// they appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
  pub program_id: Address,
  pub accounts: Vec<AccountMeta>,
  pub data: Vec<u8>,
}

impl Instruction {
  pub fn signers(&self) -> impl Iterator<Item = &Address> {
    self
      .accounts
      .iter()
      .filter(|meta| meta.is_signer)
      .map(|meta| &meta.address)
  }
}
