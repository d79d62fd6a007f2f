#![allow(dead_code)]

use {
  ed25519_dalek::{Keypair, PublicKey, SecretKey},
  std::{sync::Arc, time::Duration},
  twitter_devnode::Devnode,
  twitter_primitives::{
    AccountRecord,
    Address,
    Comment,
    Commitment,
    Follow,
    Instruction,
    Post,
    ProgramState,
    UserProfile,
    PROGRAM_ID,
  },
  twitter_sdk::{
    AddressDeriver,
    ClientContext,
    GatewayConfig,
    MediaAttachment,
    MediaError,
    MediaStore,
  },
};

pub fn keypair(seed: u8) -> Keypair {
  let secret = SecretKey::from_bytes(&[seed; 32]).unwrap();
  let public = PublicKey::from(&secret);
  Keypair { secret, public }
}

pub fn fast_config() -> GatewayConfig {
  GatewayConfig {
    commitment: Commitment::Finalized,
    confirmation_timeout: Duration::from_millis(200),
    poll_interval: Duration::from_millis(1),
  }
}

pub fn connect(
  node: &Arc<Devnode>,
  seed: u8,
) -> ClientContext<Devnode, Keypair> {
  ClientContext::connect(
    Arc::clone(node),
    Some(keypair(seed)),
    *PROGRAM_ID,
    fast_config(),
  )
  .unwrap()
}

/// File storage that answers every upload the same way.
pub struct FixedStore(pub Result<String, MediaError>);

impl MediaStore for FixedStore {
  async fn upload(&self, _: &MediaAttachment) -> Result<String, MediaError> {
    self.0.clone()
  }
}

pub fn png() -> MediaAttachment {
  MediaAttachment {
    name: "avatar.png".into(),
    mime_type: "image/png".into(),
    bytes: vec![0x89, b'P', b'N', b'G'],
  }
}

pub const UPLOADED: &str = "https://gateway.pinata.cloud/ipfs/QmUploaded";

pub fn uploading() -> FixedStore {
  FixedStore(Ok(UPLOADED.into()))
}

pub fn broken_store() -> FixedStore {
  FixedStore(Err(MediaError::Upload("pinata returned 503".into())))
}

pub fn store<T: AccountRecord>(node: &Devnode, address: Address, record: &T) {
  node.set_account(address, *PROGRAM_ID, record.encode());
}

pub fn seed_state(node: &Devnode, post_count: u64, comment_count: u64) {
  store(
    node,
    AddressDeriver::default().program_state(),
    &ProgramState {
      initialized: true,
      user_count: 2,
      post_count,
      comment_count,
      platform_fee: 5,
      platform_address: Address::new([0xfe; 32]),
      total_donations: 0,
    },
  );
}

pub fn profile(owner: Address, username: &str) -> UserProfile {
  UserProfile {
    owner,
    user_id: 1,
    username: username.into(),
    display_name: username.to_uppercase(),
    bio: "gm".into(),
    profile_image_url: String::new(),
    followers_count: 0,
    following_count: 0,
    posts_count: 0,
    created_at: 1_736_078_400,
    total_donations_received: 0,
    is_verified: false,
  }
}

pub fn post(id: u64, author: Address, created_at: u64) -> Post {
  Post {
    post_id: id,
    author,
    collaborator: None,
    content: format!("post #{id}"),
    image_url: None,
    likes_count: 0,
    comments_count: 0,
    created_at,
    updated_at: created_at,
    is_deleted: false,
    is_collaboration: false,
  }
}

pub fn comment(id: u64, post_id: u64, author: Address) -> Comment {
  Comment {
    comment_id: id,
    post_id,
    author,
    content: format!("comment #{id}"),
    created_at: 1_736_078_400 + id,
    is_deleted: false,
  }
}

pub fn follow(follower: Address, following: Address) -> Follow {
  Follow {
    follower,
    following,
    created_at: 1_736_078_400,
  }
}

/// Instructions of the last transaction the node received.
pub fn last_instruction(node: &Devnode) -> Instruction {
  let submissions = node.submissions();
  let transaction = submissions.last().expect("nothing was submitted");
  assert!(transaction.verify());
  transaction
    .message
    .decompile()
    .pop()
    .expect("transaction without instructions")
}
