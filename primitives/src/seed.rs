use {
  crate::Address,
  serde::{Deserialize, Serialize},
  std::{fmt::Display, str::FromStr},
  thiserror::Error,
};

/// Fixed labels that prefix the seeds of every program account.
///
/// They must match the program byte for byte (ASCII, case-sensitive),
/// any difference derives an address that does not exist on chain.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SeedLabel {
  ProgramState,
  UserProfile,
  Post,
  Comment,
  Like,
  Follow,
  Donation,
}

impl SeedLabel {
  pub const ALL: [SeedLabel; 7] = [
    SeedLabel::ProgramState,
    SeedLabel::UserProfile,
    SeedLabel::Post,
    SeedLabel::Comment,
    SeedLabel::Like,
    SeedLabel::Follow,
    SeedLabel::Donation,
  ];

  pub const fn as_str(&self) -> &'static str {
    match self {
      SeedLabel::ProgramState => "program_state",
      SeedLabel::UserProfile => "user_profile",
      SeedLabel::Post => "post",
      SeedLabel::Comment => "comment",
      SeedLabel::Like => "like",
      SeedLabel::Follow => "follow",
      SeedLabel::Donation => "donation",
    }
  }
}

impl Display for SeedLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown seed label '{0}'")]
pub struct UnknownLabel(String);

impl FromStr for SeedLabel {
  type Err = UnknownLabel;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    SeedLabel::ALL
      .into_iter()
      .find(|label| label.as_str() == s)
      .ok_or_else(|| UnknownLabel(s.to_owned()))
  }
}

/// A dynamic part of a derivation seed list.
///
/// Public keys contribute their 32 raw bytes, numeric ids contribute
/// their 8-byte little-endian encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPart {
  Key(Address),
  Id(u64),
}

impl SeedPart {
  pub fn to_bytes(&self) -> Vec<u8> {
    match self {
      SeedPart::Key(address) => address.to_bytes().to_vec(),
      SeedPart::Id(id) => id.to_le_bytes().to_vec(),
    }
  }
}

impl From<Address> for SeedPart {
  fn from(address: Address) -> Self {
    SeedPart::Key(address)
  }
}

impl From<u64> for SeedPart {
  fn from(id: u64) -> Self {
    SeedPart::Id(id)
  }
}

#[cfg(test)]
mod tests {
  use super::{SeedLabel, SeedPart};

  #[test]
  fn labels_roundtrip_through_their_ascii_form() {
    for label in SeedLabel::ALL {
      assert_eq!(label.as_str().parse::<SeedLabel>(), Ok(label));
    }
    assert!("Post".parse::<SeedLabel>().is_err());
    assert!("user-profile".parse::<SeedLabel>().is_err());
  }

  #[test]
  fn ids_are_little_endian_u64() {
    assert_eq!(SeedPart::Id(1).to_bytes(), vec![1, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(SeedPart::Id(0x0102).to_bytes(), vec![
      2, 1, 0, 0, 0, 0, 0, 0
    ]);
  }
}
