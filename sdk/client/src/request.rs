use {
  borsh::BorshSerialize,
  serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer},
  std::fmt::Display,
  twitter_primitives::{
    instruction_discriminator,
    AccountMeta,
    Address,
    Instruction,
  },
};

/// User actions the program understands, one instruction each.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
  Initialize,
  CreateProfile,
  UpdateProfile,
  CreatePost,
  CreateCollaborationPost,
  DeletePost,
  LikePost,
  UnlikePost,
  CreateComment,
  DeleteComment,
  FollowUser,
  UnfollowUser,
  DonateToCreator,
}

impl ActionKind {
  pub const ALL: [ActionKind; 13] = [
    ActionKind::Initialize,
    ActionKind::CreateProfile,
    ActionKind::UpdateProfile,
    ActionKind::CreatePost,
    ActionKind::CreateCollaborationPost,
    ActionKind::DeletePost,
    ActionKind::LikePost,
    ActionKind::UnlikePost,
    ActionKind::CreateComment,
    ActionKind::DeleteComment,
    ActionKind::FollowUser,
    ActionKind::UnfollowUser,
    ActionKind::DonateToCreator,
  ];

  /// Name of the program instruction, used for its discriminator.
  pub const fn instruction_name(&self) -> &'static str {
    match self {
      ActionKind::Initialize => "initialize",
      ActionKind::CreateProfile => "create_profile",
      ActionKind::UpdateProfile => "update_profile",
      ActionKind::CreatePost => "create_post",
      ActionKind::CreateCollaborationPost => "create_collaboration_post",
      ActionKind::DeletePost => "delete_post",
      ActionKind::LikePost => "like_post",
      ActionKind::UnlikePost => "unlike_post",
      ActionKind::CreateComment => "create_comment",
      ActionKind::DeleteComment => "delete_comment",
      ActionKind::FollowUser => "follow_user",
      ActionKind::UnfollowUser => "unfollow_user",
      ActionKind::DonateToCreator => "donate_to_creator",
    }
  }
}

impl Display for ActionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.instruction_name())
  }
}

/// Arguments of an instruction, in the order the program declares them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Args {
  Initialize,
  CreateProfile {
    username: String,
    display_name: String,
    bio: String,
    profile_image_url: String,
  },
  UpdateProfile {
    display_name: Option<String>,
    bio: Option<String>,
    profile_image_url: Option<String>,
  },
  CreatePost {
    content: String,
    image_url: Option<String>,
  },
  CreateCollaborationPost {
    collaborator: Address,
    content: String,
    image_url: Option<String>,
  },
  DeletePost {
    post_id: u64,
  },
  LikePost {
    post_id: u64,
  },
  UnlikePost {
    post_id: u64,
  },
  CreateComment {
    post_id: u64,
    content: String,
  },
  DeleteComment {
    comment_id: u64,
  },
  FollowUser {
    target: Address,
  },
  UnfollowUser {
    target: Address,
  },
  DonateToCreator {
    creator: Address,
    amount: u64,
  },
}

macro_rules! borsh_fields {
  ($out:expr, $($field:expr),+) => {{
    $(
      BorshSerialize::serialize($field, $out)
        .expect("writing into a Vec never fails");
    )+
  }};
}

impl Args {
  pub fn kind(&self) -> ActionKind {
    match self {
      Args::Initialize => ActionKind::Initialize,
      Args::CreateProfile { .. } => ActionKind::CreateProfile,
      Args::UpdateProfile { .. } => ActionKind::UpdateProfile,
      Args::CreatePost { .. } => ActionKind::CreatePost,
      Args::CreateCollaborationPost { .. } => {
        ActionKind::CreateCollaborationPost
      }
      Args::DeletePost { .. } => ActionKind::DeletePost,
      Args::LikePost { .. } => ActionKind::LikePost,
      Args::UnlikePost { .. } => ActionKind::UnlikePost,
      Args::CreateComment { .. } => ActionKind::CreateComment,
      Args::DeleteComment { .. } => ActionKind::DeleteComment,
      Args::FollowUser { .. } => ActionKind::FollowUser,
      Args::UnfollowUser { .. } => ActionKind::UnfollowUser,
      Args::DonateToCreator { .. } => ActionKind::DonateToCreator,
    }
  }

  /// Instruction data: the 8-byte discriminator of the instruction
  /// followed by the Borsh encoding of every argument.
  pub fn encode(&self) -> Vec<u8> {
    let mut data =
      instruction_discriminator(self.kind().instruction_name()).to_vec();
    let out = &mut data;
    match self {
      Args::Initialize => {}
      Args::CreateProfile {
        username,
        display_name,
        bio,
        profile_image_url,
      } => borsh_fields!(out, username, display_name, bio, profile_image_url),
      Args::UpdateProfile {
        display_name,
        bio,
        profile_image_url,
      } => borsh_fields!(out, display_name, bio, profile_image_url),
      Args::CreatePost { content, image_url } => {
        borsh_fields!(out, content, image_url)
      }
      Args::CreateCollaborationPost {
        collaborator,
        content,
        image_url,
      } => borsh_fields!(out, collaborator, content, image_url),
      Args::DeletePost { post_id }
      | Args::LikePost { post_id }
      | Args::UnlikePost { post_id } => borsh_fields!(out, post_id),
      Args::CreateComment { post_id, content } => {
        borsh_fields!(out, post_id, content)
      }
      Args::DeleteComment { comment_id } => borsh_fields!(out, comment_id),
      Args::FollowUser { target } | Args::UnfollowUser { target } => {
        borsh_fields!(out, target)
      }
      Args::DonateToCreator { creator, amount } => {
        borsh_fields!(out, creator, amount)
      }
    }
    data
  }
}

/// An account reference together with the role it plays in
/// the instruction, for example "post" or "user_profile".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NamedAccount {
  pub name: &'static str,

  #[serde(flatten)]
  pub meta: AccountMeta,
}

/// A fully addressed instruction ready to be compiled into
/// a transaction and signed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRequest {
  pub program_id: Address,
  pub caller: Address,
  pub accounts: Vec<NamedAccount>,
  pub args: Args,
}

impl InstructionRequest {
  pub fn kind(&self) -> ActionKind {
    self.args.kind()
  }

  /// Looks up an account reference by its role.
  pub fn account(&self, name: &str) -> Option<&Address> {
    self
      .accounts
      .iter()
      .find(|account| account.name == name)
      .map(|account| &account.meta.address)
  }

  pub fn data(&self) -> Vec<u8> {
    self.args.encode()
  }

  pub fn to_instruction(&self) -> Instruction {
    Instruction {
      program_id: self.program_id,
      accounts: self.accounts.iter().map(|account| account.meta).collect(),
      data: self.data(),
    }
  }
}

impl Serialize for InstructionRequest {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut request = serializer.serialize_struct("InstructionRequest", 6)?;
    request.serialize_field("action", &self.kind())?;
    request.serialize_field("program_id", &self.program_id)?;
    request.serialize_field("caller", &self.caller)?;
    request.serialize_field("accounts", &self.accounts)?;
    request.serialize_field("args", &self.args)?;
    request.serialize_field("data", &hex::encode(self.data()))?;
    request.end()
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{ActionKind, Args},
    twitter_primitives::Address,
  };

  #[test]
  fn instruction_data_layout() {
    let data = Args::CreatePost {
      content: "hello".into(),
      image_url: None,
    }
    .encode();
    assert_eq!(&data[..8], &[123, 92, 184, 29, 231, 24, 15, 202]);
    assert_eq!(&data[8..12], &[5, 0, 0, 0]);
    assert_eq!(&data[12..17], b"hello");
    assert_eq!(&data[17..], &[0]);

    let data = Args::UpdateProfile {
      display_name: None,
      bio: Some(String::new()),
      profile_image_url: None,
    }
    .encode();
    assert_eq!(&data[8..], &[0, 1, 0, 0, 0, 0, 0]);

    let data = Args::DonateToCreator {
      creator: Address::new([7; 32]),
      amount: 20_000_000,
    }
    .encode();
    assert_eq!(&data[8..40], &[7; 32]);
    assert_eq!(&data[40..], &20_000_000u64.to_le_bytes());

    assert_eq!(Args::Initialize.encode(), vec![
      175, 175, 109, 31, 13, 152, 155, 237
    ]);
  }

  #[test]
  fn kinds_map_to_snake_case_instruction_names() {
    assert_eq!(ActionKind::ALL.len(), 13);
    assert_eq!(
      ActionKind::CreateCollaborationPost.instruction_name(),
      "create_collaboration_post"
    );
    assert_eq!(
      Args::FollowUser {
        target: Address::default()
      }
      .kind(),
      ActionKind::FollowUser
    );
  }
}
