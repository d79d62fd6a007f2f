use {
  borsh::{BorshDeserialize, BorshSerialize},
  curve25519_dalek::edwards::CompressedEdwardsY,
  ed25519_dalek::PublicKey,
  multihash::{Hasher, Sha2_256},
  serde::{Deserialize, Deserializer, Serialize, Serializer},
  std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
  },
  thiserror::Error,
};

/// Maximum number of seeds accepted by a single address derivation,
/// including the bump seed.
pub const MAX_SEEDS: usize = 16;

/// Maximum length in bytes of a single derivation seed.
pub const MAX_SEED_LEN: usize = 32;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("Too many seeds: {0}, at most 16 are allowed")]
  TooManySeeds(usize),

  #[error("Seed #{0} is {1} bytes long, at most 32 bytes are allowed")]
  SeedTooLong(usize, usize),

  #[error("Derived address lies on the ed25519 curve")]
  OnCurve,

  #[error("Unable to find a viable bump seed")]
  NoViableBump,

  #[error("Invalid base58 string: {0}")]
  InvalidBase58(#[from] bs58::decode::Error),

  #[error("Address must be 32 bytes long, got {0} bytes")]
  InvalidLength(usize),
}

/// Represents an address of an account.
///
/// The same address could either represent a user wallet that
/// has a corresponding private key on the ed25519 curve (externally owned)
/// or a program account that is not on the curve and is writable
/// only by the program owning it.
///
/// Program accounts of the Twitter Platform (profiles, posts, likes, etc.)
/// are never stored under an arbitrary address. Their address is derived
/// from a fixed label and the keys of the entities they relate, so for
/// example:
///
///   - Say we have a user identified by address 0xAAA
///   - The profile of this user lives at
///     derive(["user_profile", 0xAAA], program_id)
///   - If 0xAAA follows 0xBBB, then the follow relationship lives at
///     derive(["follow", 0xAAA, 0xBBB], program_id)
#[derive(
  Copy,
  Clone,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  BorshSerialize,
  BorshDeserialize,
)]
pub struct Address([u8; 32]);

impl Address {
  pub const fn new(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }

  pub fn to_bytes(self) -> [u8; 32] {
    self.0
  }

  /// Computes the address of a program account from a set of seeds
  /// without searching for a bump seed.
  ///
  /// The address is the SHA2-256 digest of all seeds, followed by the
  /// program id and the "ProgramDerivedAddress" marker. Digests that
  /// happen to be valid ed25519 public keys are rejected, because someone
  /// could hold a private key for them.
  pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
  ) -> Result<Self, Error> {
    if seeds.len() > MAX_SEEDS {
      return Err(Error::TooManySeeds(seeds.len()));
    }

    if let Some((index, seed)) = seeds
      .iter()
      .enumerate()
      .find(|(_, seed)| seed.len() > MAX_SEED_LEN)
    {
      return Err(Error::SeedTooLong(index, seed.len()));
    }

    let mut hasher = Sha2_256::default();
    for seed in seeds {
      hasher.update(seed);
    }
    hasher.update(&program_id.0);
    hasher.update(PDA_MARKER);

    let key = Address(
      hasher
        .finalize()
        .try_into()
        .expect("sha2-256 digests are 32 bytes long"),
    );

    match key.is_on_curve() {
      true => Err(Error::OnCurve),
      false => Ok(key),
    }
  }

  /// Given a list of seeds this method will generate a new
  /// derived address that is not on the Ed25519 curve
  /// (no private key exists for the resulting address).
  ///
  /// Bump seeds are tried starting at 255 and going down, the
  /// first one that yields an off-curve address wins. It is
  /// appended as the last seed.
  ///
  /// The same set of seeds will always return the same
  /// derived address and bump.
  pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
  ) -> Result<(Self, u8), Error> {
    for bump in (0..=u8::MAX).rev() {
      let bump_seed = [bump];
      let mut seeds_with_bump = seeds.to_vec();
      seeds_with_bump.push(&bump_seed);
      match Self::create_program_address(&seeds_with_bump, program_id) {
        Ok(address) => return Ok((address, bump)),
        Err(Error::OnCurve) => continue,
        Err(e) => return Err(e),
      }
    }
    Err(Error::NoViableBump)
  }

  /// Checks if the given address lies on the Ed25519 elliptic curve.
  ///
  /// When true, then it means that there exists a private key that
  /// make up together a valid Ed25519 keypair. Otherwise, when false
  /// it means that there is no corresponding valid private key.
  pub fn is_on_curve(&self) -> bool {
    CompressedEdwardsY::from_slice(&self.0)
      .decompress()
      .is_some()
  }

  /// Shortened form used when displaying addresses, for example
  /// "29d2...hfV2".
  pub fn truncated(&self) -> String {
    let full = self.to_string();
    match full.len() {
      0..=8 => full,
      len => format!("{}...{}", &full[..4], &full[len - 4..]),
    }
  }
}

impl AsRef<[u8]> for Address {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Deref for Address {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.0).into_string())
  }
}

impl Debug for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "address({})", bs58::encode(self.0).into_string())
  }
}

impl From<Address> for String {
  fn from(pk: Address) -> Self {
    bs58::encode(pk.0).into_string()
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = bs58::decode(s).into_vec()?;
    let bytes: [u8; 32] = bytes
      .try_into()
      .map_err(|b: Vec<u8>| Error::InvalidLength(b.len()))?;
    Ok(Self(bytes))
  }
}

impl TryFrom<&str> for Address {
  type Error = Error;

  fn try_from(value: &str) -> Result<Self, Self::Error> {
    FromStr::from_str(value)
  }
}

impl From<PublicKey> for Address {
  fn from(p: PublicKey) -> Self {
    Self(*p.as_bytes())
  }
}

impl From<[u8; 32]> for Address {
  fn from(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }
}

impl Serialize for Address {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Address {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let encoded = <String as Deserialize>::deserialize(deserializer)?;
    encoded.parse().map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::{Address, Error};

  fn loader() -> Address {
    "BPFLoaderUpgradeab1e11111111111111111111111".parse().unwrap()
  }

  #[test]
  fn create_program_address_known_vectors() {
    let program_id = loader();
    let public_key: Address =
      "SeedPubey1111111111111111111111111111111111".parse().unwrap();

    assert_eq!(
      Address::create_program_address(&[b"", &[1]], &program_id),
      Ok("BwqrghZA2htAcqq8dzP1WDAhTXYTYWj7CHxF5j7TDBAe".parse().unwrap())
    );
    assert_eq!(
      Address::create_program_address(&["☉".as_ref(), &[0]], &program_id),
      Ok("13yWmRpaTR4r5nAktwLqMpRNr28tnVUZw26rTvPSSB19".parse().unwrap())
    );
    assert_eq!(
      Address::create_program_address(&[b"Talking", b"Squirrels"], &program_id),
      Ok("2fnQrngrQT4SeLcdToJAD96phoEjNL2man2kfRLCASVk".parse().unwrap())
    );
    assert_eq!(
      Address::create_program_address(&[public_key.as_ref(), &[1]], &program_id),
      Ok("976ymqVnfE32QFe6NfGDctSvVa36LWnvYxhU6G2232YL".parse().unwrap())
    );
  }

  #[test]
  fn seed_limits_are_enforced() {
    let program_id = loader();
    let long = [127u8; 33];
    assert_eq!(
      Address::create_program_address(&[&long], &program_id),
      Err(Error::SeedTooLong(0, 33))
    );

    let seeds: Vec<&[u8]> = vec![&b"a"[..]; 17];
    assert_eq!(
      Address::create_program_address(&seeds, &program_id),
      Err(Error::TooManySeeds(17))
    );
  }

  #[test]
  fn find_program_address_is_off_curve_and_stable() {
    let program_id = loader();
    for i in 0..100u64 {
      let seed = i.to_le_bytes();
      let (first, bump) =
        Address::find_program_address(&[b"post", &seed], &program_id).unwrap();
      let (second, bump2) =
        Address::find_program_address(&[b"post", &seed], &program_id).unwrap();
      assert_eq!(first, second);
      assert_eq!(bump, bump2);
      assert!(!first.is_on_curve());
      assert_eq!(
        Address::create_program_address(&[b"post", &seed, &[bump]], &program_id),
        Ok(first)
      );
    }
  }

  #[test]
  fn base58_roundtrip_and_errors() {
    let address = Address::new([0x11; 32]);
    assert_eq!(
      address.to_string(),
      "29d2S7vB453rNYFdR5Ycwt7y9haRT5fwVwL9zTmBhfV2"
    );
    assert_eq!(
      "29d2S7vB453rNYFdR5Ycwt7y9haRT5fwVwL9zTmBhfV2"
        .parse::<Address>()
        .unwrap(),
      address
    );
    assert_eq!("1111".parse::<Address>(), Err(Error::InvalidLength(4)));
    assert!(matches!(
      "0OIl".parse::<Address>(),
      Err(Error::InvalidBase58(_))
    ));
  }

  #[test]
  fn truncated_display() {
    let address = Address::new([0x11; 32]);
    assert_eq!(address.truncated(), "29d2...hfV2");
  }
}
