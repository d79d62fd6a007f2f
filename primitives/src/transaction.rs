use {
  crate::{AccountMeta, Address, Instruction, Signature},
  std::fmt::{Debug, Display},
};

/// Hash of a recent block.
///
/// Every transaction references one, transactions referencing a hash
/// that is too old are rejected by the cluster.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
  pub const fn new(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }

  pub fn to_bytes(self) -> [u8; 32] {
    self.0
  }
}

impl Display for Blockhash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.0).into_string())
  }
}

impl Debug for Blockhash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "blockhash({})", bs58::encode(self.0).into_string())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
  /// Signatures required for the message to be valid. The signers
  /// are the first keys of the account keys list.
  pub num_required_signatures: u8,

  /// The last `num_readonly_signed_accounts` of the signed keys
  /// are read-only accounts.
  pub num_readonly_signed_accounts: u8,

  /// The last `num_readonly_unsigned_accounts` of the unsigned keys
  /// are read-only accounts.
  pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
  pub program_id_index: u8,
  pub accounts: Vec<u8>,
  pub data: Vec<u8>,
}

/// The part of a transaction that gets signed.
///
/// Account keys are deduplicated across all instructions and ordered
/// as: writable signers, read-only signers, writable non-signers,
/// read-only non-signers. The fee payer is always the first key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub header: MessageHeader,
  pub account_keys: Vec<Address>,
  pub recent_blockhash: Blockhash,
  pub instructions: Vec<CompiledInstruction>,
}

impl Message {
  pub fn new(
    instructions: &[Instruction],
    payer: &Address,
    recent_blockhash: Blockhash,
  ) -> Self {
    // (address, is_signer, is_writable) in order of first appearance
    let mut keys: Vec<(Address, bool, bool)> = vec![(*payer, true, true)];
    let mut upsert = |address: Address, is_signer: bool, is_writable: bool| {
      match keys.iter_mut().find(|(key, _, _)| *key == address) {
        Some(existing) => {
          existing.1 |= is_signer;
          existing.2 |= is_writable;
        }
        None => keys.push((address, is_signer, is_writable)),
      }
    };

    for instruction in instructions {
      for meta in &instruction.accounts {
        upsert(meta.address, meta.is_signer, meta.is_writable);
      }
      upsert(instruction.program_id, false, false);
    }

    // stable, so the payer stays first among writable signers
    keys.sort_by_key(|(_, is_signer, is_writable)| {
      match (is_signer, is_writable) {
        (true, true) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
      }
    });

    let count = |signer: bool, writable: bool| {
      keys
        .iter()
        .filter(|(_, s, w)| *s == signer && *w == writable)
        .count() as u8
    };

    let header = MessageHeader {
      num_required_signatures: count(true, true) + count(true, false),
      num_readonly_signed_accounts: count(true, false),
      num_readonly_unsigned_accounts: count(false, false),
    };

    let account_keys: Vec<Address> =
      keys.into_iter().map(|(key, _, _)| key).collect();

    let index_of = |address: &Address| {
      let position = account_keys
        .iter()
        .position(|key| key == address)
        .expect("every referenced key was collected above");
      u8::try_from(position).expect("legacy messages hold at most 256 keys")
    };

    let instructions = instructions
      .iter()
      .map(|instruction| CompiledInstruction {
        program_id_index: index_of(&instruction.program_id),
        accounts: instruction
          .accounts
          .iter()
          .map(|meta| index_of(&meta.address))
          .collect(),
        data: instruction.data.clone(),
      })
      .collect();

    Self {
      header,
      account_keys,
      recent_blockhash,
      instructions,
    }
  }

  pub fn fee_payer(&self) -> Option<&Address> {
    self.account_keys.first()
  }

  /// Keys whose signatures are required, in signature order.
  pub fn signer_keys(&self) -> &[Address] {
    let signers = self.header.num_required_signatures as usize;
    &self.account_keys[..signers.min(self.account_keys.len())]
  }

  pub fn is_signer(&self, index: usize) -> bool {
    index < self.header.num_required_signatures as usize
  }

  pub fn is_writable(&self, index: usize) -> bool {
    let signed = self.header.num_required_signatures as usize;
    let readonly_signed = self.header.num_readonly_signed_accounts as usize;
    let readonly_unsigned = self.header.num_readonly_unsigned_accounts as usize;
    if index >= self.account_keys.len() {
      false
    } else if index < signed {
      index < signed - readonly_signed
    } else {
      index < self.account_keys.len() - readonly_unsigned
    }
  }

  /// Reconstructs the instructions carried by this message.
  pub fn decompile(&self) -> Vec<Instruction> {
    self
      .instructions
      .iter()
      .map(|compiled| Instruction {
        program_id: self.account_keys[compiled.program_id_index as usize],
        accounts: compiled
          .accounts
          .iter()
          .map(|&index| {
            let index = index as usize;
            AccountMeta {
              address: self.account_keys[index],
              is_signer: self.is_signer(index),
              is_writable: self.is_writable(index),
            }
          })
          .collect(),
        data: compiled.data.clone(),
      })
      .collect()
  }

  /// Wire encoding of a legacy message, this is the byte string
  /// that signers sign.
  pub fn serialize(&self) -> Vec<u8> {
    let mut out = vec![
      self.header.num_required_signatures,
      self.header.num_readonly_signed_accounts,
      self.header.num_readonly_unsigned_accounts,
    ];

    write_compact_u16(&mut out, self.account_keys.len());
    for key in &self.account_keys {
      out.extend_from_slice(key.as_ref());
    }

    out.extend_from_slice(&self.recent_blockhash.0);

    write_compact_u16(&mut out, self.instructions.len());
    for instruction in &self.instructions {
      out.push(instruction.program_id_index);
      write_compact_u16(&mut out, instruction.accounts.len());
      out.extend_from_slice(&instruction.accounts);
      write_compact_u16(&mut out, instruction.data.len());
      out.extend_from_slice(&instruction.data);
    }
    out
  }
}

/// A message along with the signatures of all its required signers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
  pub signatures: Vec<Signature>,
  pub message: Message,
}

impl Transaction {
  /// Creates a transaction with empty signature slots,
  /// one for every required signer.
  pub fn new_unsigned(message: Message) -> Self {
    Self {
      signatures: vec![
        Signature::default();
        message.header.num_required_signatures as usize
      ],
      message,
    }
  }

  /// Identifier of the transaction, which is its first signature.
  pub fn id(&self) -> Option<&Signature> {
    self.signatures.first()
  }

  /// Checks that every required signer produced a valid
  /// signature over the serialized message.
  pub fn verify(&self) -> bool {
    let signers = self.message.signer_keys();
    if signers.len() != self.signatures.len() || signers.is_empty() {
      return false;
    }
    let message = self.message.serialize();
    signers
      .iter()
      .zip(self.signatures.iter())
      .all(|(signer, signature)| signature.verify(signer, &message))
  }

  pub fn serialize(&self) -> Vec<u8> {
    let mut out = Vec::new();
    write_compact_u16(&mut out, self.signatures.len());
    for signature in &self.signatures {
      out.extend_from_slice(signature.as_ref());
    }
    out.extend_from_slice(&self.message.serialize());
    out
  }
}

/// Variable length encoding of array lengths used by the wire format,
/// 7 bits per byte, high bit set when more bytes follow.
fn write_compact_u16(out: &mut Vec<u8>, len: usize) {
  let mut value = u16::try_from(len).expect("wire arrays are shorter than 64k");
  loop {
    let byte = (value & 0x7f) as u8;
    value >>= 7;
    if value == 0 {
      out.push(byte);
      break;
    }
    out.push(byte | 0x80);
  }
}
