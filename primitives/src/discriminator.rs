use multihash::{Hasher, Sha2_256};

/// The first eight bytes of `sha256("global:<name>")`.
///
/// Prefixes the data of every instruction so the program can dispatch
/// to the handler called `name` (snake case).
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
  sighash("global", name)
}

/// The first eight bytes of `sha256("account:<Name>")`.
///
/// Prefixes the data of every account owned by the program and
/// identifies the type stored in it (camel case type name).
pub fn account_discriminator(name: &str) -> [u8; 8] {
  sighash("account", name)
}

fn sighash(namespace: &str, name: &str) -> [u8; 8] {
  let mut hasher = Sha2_256::default();
  hasher.update(namespace.as_bytes());
  hasher.update(b":");
  hasher.update(name.as_bytes());
  let mut output = [0u8; 8];
  output.copy_from_slice(&hasher.finalize()[..8]);
  output
}
