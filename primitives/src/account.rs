use {
  crate::{account_discriminator, Address},
  borsh::{BorshDeserialize, BorshSerialize},
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("Account data is {0} bytes long, too short for a discriminator")]
  TooShort(usize),

  #[error("Account is not a {0}, discriminator mismatch")]
  WrongType(&'static str),

  #[error("Malformed {0} account: {1}")]
  Malformed(&'static str, std::io::Error),
}

/// Typed view over the raw bytes of an account owned by the program.
///
/// Account data is an 8-byte type discriminator followed by the Borsh
/// encoding of the record fields in declaration order. Accounts are
/// allocated at their maximum size, so decoding stops after the last
/// field and ignores the zeroed tail.
pub trait AccountRecord: BorshSerialize + BorshDeserialize + Sized {
  /// Type name of the record as declared by the program.
  const NAME: &'static str;

  fn discriminator() -> [u8; 8] {
    account_discriminator(Self::NAME)
  }

  fn decode(data: &[u8]) -> Result<Self, DecodeError> {
    if data.len() < 8 {
      return Err(DecodeError::TooShort(data.len()));
    }

    let (discriminator, mut body) = data.split_at(8);
    if discriminator != Self::discriminator() {
      return Err(DecodeError::WrongType(Self::NAME));
    }

    Self::deserialize(&mut body)
      .map_err(|e| DecodeError::Malformed(Self::NAME, e))
  }

  fn encode(&self) -> Vec<u8> {
    let mut data = Self::discriminator().to_vec();
    self
      .serialize(&mut data)
      .expect("writing into a Vec never fails");
    data
  }
}

/// Global counters of the platform, a single instance lives
/// at derive(["program_state"]).
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ProgramState {
  pub initialized: bool,
  pub user_count: u64,
  pub post_count: u64,
  pub comment_count: u64,

  /// Percentage of every donation sent to `platform_address`.
  pub platform_fee: u64,
  pub platform_address: Address,
  pub total_donations: u64,
}

impl AccountRecord for ProgramState {
  const NAME: &'static str = "ProgramState";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserProfile {
  pub owner: Address,
  pub user_id: u64,
  pub username: String,
  pub display_name: String,
  pub bio: String,
  pub profile_image_url: String,
  pub followers_count: u64,
  pub following_count: u64,
  pub posts_count: u64,
  pub created_at: u64,
  pub total_donations_received: u64,
  pub is_verified: bool,
}

impl AccountRecord for UserProfile {
  const NAME: &'static str = "UserProfile";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Post {
  pub post_id: u64,
  pub author: Address,
  pub collaborator: Option<Address>,
  pub content: String,
  pub image_url: Option<String>,
  pub likes_count: u64,
  pub comments_count: u64,
  pub created_at: u64,
  pub updated_at: u64,
  pub is_deleted: bool,
  pub is_collaboration: bool,
}

impl AccountRecord for Post {
  const NAME: &'static str = "Post";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Comment {
  pub comment_id: u64,
  pub post_id: u64,
  pub author: Address,
  pub content: String,
  pub created_at: u64,
  pub is_deleted: bool,
}

impl AccountRecord for Comment {
  const NAME: &'static str = "Comment";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Like {
  pub user: Address,
  pub post_id: u64,
  pub created_at: u64,
}

impl AccountRecord for Like {
  const NAME: &'static str = "Like";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Follow {
  pub follower: Address,
  pub following: Address,
  pub created_at: u64,
}

impl AccountRecord for Follow {
  const NAME: &'static str = "Follow";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Donation {
  pub donor: Address,
  pub recipient: Address,
  pub amount: u64,
  pub timestamp: u64,
  pub transaction_id: String,
}

impl AccountRecord for Donation {
  const NAME: &'static str = "Donation";
}

#[cfg(test)]
mod tests {
  use {
    super::{AccountRecord, DecodeError, Follow, Post, ProgramState},
    crate::Address,
  };

  fn post() -> Post {
    Post {
      post_id: 3,
      author: Address::new([0x11; 32]),
      collaborator: Some(Address::new([0x22; 32])),
      content: "gm".into(),
      image_url: None,
      likes_count: 5,
      comments_count: 1,
      created_at: 1_700_000_000,
      updated_at: 1_700_000_000,
      is_deleted: false,
      is_collaboration: true,
    }
  }

  #[test]
  fn decodes_zero_padded_account_data() {
    let mut data = post().encode();
    data.resize(data.len() + 300, 0);
    assert_eq!(Post::decode(&data).unwrap(), post());
  }

  #[test]
  fn field_layout_matches_program() {
    let data = Follow {
      follower: Address::new([1; 32]),
      following: Address::new([2; 32]),
      created_at: 0x0102,
    }
    .encode();

    assert_eq!(&data[..8], &Follow::discriminator());
    assert_eq!(&data[8..40], &[1u8; 32]);
    assert_eq!(&data[40..72], &[2u8; 32]);
    assert_eq!(&data[72..], &[2, 1, 0, 0, 0, 0, 0, 0]);
  }

  #[test]
  fn rejects_foreign_or_truncated_data() {
    let data = post().encode();
    assert!(matches!(
      ProgramState::decode(&data),
      Err(DecodeError::WrongType("ProgramState"))
    ));
    assert!(matches!(Post::decode(&data[..4]), Err(DecodeError::TooShort(4))));
    assert!(matches!(
      Post::decode(&data[..20]),
      Err(DecodeError::Malformed("Post", _))
    ));
  }
}
