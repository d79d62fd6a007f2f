use {
  serde::{Deserialize, Deserializer, Serialize, Serializer},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
  },
  thiserror::Error,
};

/// An ed25519 signature over a transaction message.
///
/// The first signature of a transaction is also its identifier, which is
/// what callers get back once a submission is confirmed.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("Invalid base58 string: {0}")]
  InvalidBase58(#[from] bs58::decode::Error),

  #[error("Signature must be 64 bytes long, got {0} bytes")]
  InvalidLength(usize),
}

impl Signature {
  pub const fn new(bytes: [u8; 64]) -> Self {
    Self(bytes)
  }

  pub fn to_bytes(self) -> [u8; 64] {
    self.0
  }

  /// Verifies this signature against a message and the
  /// public key of its supposed signer.
  pub fn verify(&self, signer: &crate::Address, message: &[u8]) -> bool {
    use ed25519_dalek::Verifier;
    let Ok(public) = ed25519_dalek::PublicKey::from_bytes(signer.as_ref())
    else {
      return false;
    };
    let Ok(signature) = ed25519_dalek::Signature::try_from(&self.0[..]) else {
      return false;
    };
    public.verify(message, &signature).is_ok()
  }
}

impl Default for Signature {
  fn default() -> Self {
    Self([0u8; 64])
  }
}

impl AsRef<[u8]> for Signature {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl From<ed25519_dalek::Signature> for Signature {
  fn from(signature: ed25519_dalek::Signature) -> Self {
    Self(signature.to_bytes())
  }
}

impl Display for Signature {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.0).into_string())
  }
}

impl Debug for Signature {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "signature({})", bs58::encode(self.0).into_string())
  }
}

impl FromStr for Signature {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = bs58::decode(s).into_vec()?;
    let bytes: [u8; 64] = bytes
      .try_into()
      .map_err(|b: Vec<u8>| Error::InvalidLength(b.len()))?;
    Ok(Self(bytes))
  }
}

impl Serialize for Signature {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Signature {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    encoded.parse().map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use {
    super::Signature,
    crate::Address,
    ed25519_dalek::{Keypair, PublicKey, SecretKey, Signer},
  };

  fn keypair(seed: u8) -> Keypair {
    let secret = SecretKey::from_bytes(&[seed; 32]).unwrap();
    let public = PublicKey::from(&secret);
    Keypair { secret, public }
  }

  #[test]
  fn verifies_only_matching_signer_and_message() {
    let signer = keypair(1);
    let other = keypair(2);
    let signature: Signature = signer.sign(b"hello").into();

    assert!(signature.verify(&signer.public.into(), b"hello"));
    assert!(!signature.verify(&signer.public.into(), b"hellO"));
    assert!(!signature.verify(&other.public.into(), b"hello"));
    assert!(!Signature::default().verify(&Address::new([0x11; 32]), b"hello"));
  }

  #[test]
  fn base58_roundtrip() {
    let signature: Signature = keypair(3).sign(b"message").into();
    let encoded = signature.to_string();
    assert_eq!(encoded.parse::<Signature>().unwrap(), signature);
  }
}
