use {
  crate::{
    derive::AddressDeriver,
    request::{Args, InstructionRequest, NamedAccount},
    validate::{self, ValidationError},
  },
  twitter_primitives::{AccountMeta, Address, SYSTEM_PROGRAM_ID},
};

/// Optional fields of a profile update.
///
/// `None` leaves the stored value unchanged, `Some` replaces it with the
/// given value as-is, including an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
  pub display_name: Option<String>,
  pub bio: Option<String>,
  pub profile_image_url: Option<String>,
}

/// Turns user actions into fully addressed instruction requests.
///
/// Every account reference is derived, the caller never supplies raw
/// addresses of program accounts. Arguments are checked against the
/// program limits before anything is built, so a request that comes out
/// of the builder is never rejected for malformed input.
///
/// Post and comment accounts are derived from the platform counters,
/// the caller passes the counter value it read right before building.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBuilder {
  deriver: AddressDeriver,
}

fn writable(name: &'static str, address: Address) -> NamedAccount {
  NamedAccount {
    name,
    meta: AccountMeta::writable(address, false),
  }
}

fn readonly(name: &'static str, address: Address) -> NamedAccount {
  NamedAccount {
    name,
    meta: AccountMeta::readonly(address, false),
  }
}

fn signer(name: &'static str, address: Address) -> NamedAccount {
  NamedAccount {
    name,
    meta: AccountMeta::writable(address, true),
  }
}

fn system_program() -> NamedAccount {
  readonly("system_program", SYSTEM_PROGRAM_ID)
}

/// Empty image URLs mean no image.
fn optional_image(
  image_url: Option<&str>,
) -> Result<Option<String>, ValidationError> {
  match image_url {
    Some(url) => {
      let url = validate::image_url(url)?;
      Ok((!url.is_empty()).then_some(url))
    }
    None => Ok(None),
  }
}

impl RequestBuilder {
  pub fn new(deriver: AddressDeriver) -> Self {
    Self { deriver }
  }

  pub fn deriver(&self) -> &AddressDeriver {
    &self.deriver
  }

  fn request(
    &self,
    caller: &Address,
    accounts: Vec<NamedAccount>,
    args: Args,
  ) -> InstructionRequest {
    InstructionRequest {
      program_id: *self.deriver.program_id(),
      caller: *caller,
      accounts,
      args,
    }
  }

  /// One-time setup of the platform counters.
  pub fn initialize(&self, deployer: &Address) -> InstructionRequest {
    self.request(
      deployer,
      vec![
        writable("program_state", self.deriver.program_state()),
        signer("deployer", *deployer),
        system_program(),
      ],
      Args::Initialize,
    )
  }

  pub fn create_profile(
    &self,
    user: &Address,
    username: &str,
    display_name: &str,
    bio: &str,
    profile_image_url: &str,
  ) -> Result<InstructionRequest, ValidationError> {
    let args = Args::CreateProfile {
      username: validate::username(username)?,
      display_name: validate::display_name(display_name)?,
      bio: validate::bio(bio)?,
      profile_image_url: validate::image_url(profile_image_url)?,
    };

    Ok(self.request(
      user,
      vec![
        writable("program_state", self.deriver.program_state()),
        writable("user_profile", self.deriver.user_profile(user)),
        signer("user", *user),
        system_program(),
      ],
      args,
    ))
  }

  pub fn update_profile(
    &self,
    user: &Address,
    update: &ProfileUpdate,
  ) -> Result<InstructionRequest, ValidationError> {
    let args = Args::UpdateProfile {
      display_name: validate::update_field(
        "Display name",
        update.display_name.as_deref(),
        validate::MAX_DISPLAY_NAME_LENGTH,
      )?,
      bio: validate::update_field(
        "Bio",
        update.bio.as_deref(),
        validate::MAX_BIO_LENGTH,
      )?,
      profile_image_url: validate::update_field(
        "Image URL",
        update.profile_image_url.as_deref(),
        validate::MAX_IMAGE_URL_LENGTH,
      )?,
    };

    Ok(self.request(
      user,
      vec![
        writable("user_profile", self.deriver.user_profile(user)),
        signer("user", *user),
      ],
      args,
    ))
  }

  /// The new post gets id `post_count + 1`.
  pub fn create_post(
    &self,
    user: &Address,
    post_count: u64,
    content: &str,
    image_url: Option<&str>,
  ) -> Result<InstructionRequest, ValidationError> {
    let args = Args::CreatePost {
      content: validate::post_content(content)?,
      image_url: optional_image(image_url)?,
    };
    let post_id = validate::next_id("post", post_count)?;

    Ok(self.request(
      user,
      vec![
        writable("program_state", self.deriver.program_state()),
        writable("user_profile", self.deriver.user_profile(user)),
        writable("post", self.deriver.post(post_id)),
        signer("user", *user),
        system_program(),
      ],
      args,
    ))
  }

  /// A post co-authored with another user, who does not sign.
  pub fn create_collaboration_post(
    &self,
    author: &Address,
    collaborator: &Address,
    post_count: u64,
    content: &str,
    image_url: Option<&str>,
  ) -> Result<InstructionRequest, ValidationError> {
    validate::distinct("collaborate with", author, collaborator)?;
    let args = Args::CreateCollaborationPost {
      collaborator: *collaborator,
      content: validate::post_content(content)?,
      image_url: optional_image(image_url)?,
    };
    let post_id = validate::next_id("post", post_count)?;

    Ok(self.request(
      author,
      vec![
        writable("program_state", self.deriver.program_state()),
        writable("author_profile", self.deriver.user_profile(author)),
        readonly(
          "collaborator_profile",
          self.deriver.user_profile(collaborator),
        ),
        writable("post", self.deriver.post(post_id)),
        signer("author", *author),
        system_program(),
      ],
      args,
    ))
  }

  pub fn delete_post(&self, user: &Address, post_id: u64) -> InstructionRequest {
    self.request(
      user,
      vec![
        writable("post", self.deriver.post(post_id)),
        writable("user_profile", self.deriver.user_profile(user)),
        signer("user", *user),
      ],
      Args::DeletePost { post_id },
    )
  }

  pub fn like_post(&self, user: &Address, post_id: u64) -> InstructionRequest {
    self.request(
      user,
      vec![
        writable("like", self.deriver.like(user, post_id)),
        writable("post", self.deriver.post(post_id)),
        signer("user", *user),
        system_program(),
      ],
      Args::LikePost { post_id },
    )
  }

  pub fn unlike_post(&self, user: &Address, post_id: u64) -> InstructionRequest {
    self.request(
      user,
      vec![
        writable("like", self.deriver.like(user, post_id)),
        writable("post", self.deriver.post(post_id)),
        signer("user", *user),
      ],
      Args::UnlikePost { post_id },
    )
  }

  /// The new comment gets id `comment_count + 1`.
  pub fn create_comment(
    &self,
    user: &Address,
    comment_count: u64,
    post_id: u64,
    content: &str,
  ) -> Result<InstructionRequest, ValidationError> {
    let args = Args::CreateComment {
      post_id,
      content: validate::comment_content(content)?,
    };
    let comment_id = validate::next_id("comment", comment_count)?;

    Ok(self.request(
      user,
      vec![
        writable("program_state", self.deriver.program_state()),
        writable("comment", self.deriver.comment(comment_id)),
        writable("post", self.deriver.post(post_id)),
        signer("user", *user),
        system_program(),
      ],
      args,
    ))
  }

  /// `post_id` is the post the comment belongs to, as stored
  /// in the comment account.
  pub fn delete_comment(
    &self,
    user: &Address,
    comment_id: u64,
    post_id: u64,
  ) -> InstructionRequest {
    self.request(
      user,
      vec![
        writable("comment", self.deriver.comment(comment_id)),
        writable("post", self.deriver.post(post_id)),
        signer("user", *user),
      ],
      Args::DeleteComment { comment_id },
    )
  }

  pub fn follow_user(
    &self,
    follower: &Address,
    target: &Address,
  ) -> Result<InstructionRequest, ValidationError> {
    validate::distinct("follow", follower, target)?;
    Ok(self.request(
      follower,
      vec![
        writable("follow", self.deriver.follow(follower, target)),
        writable("follower_profile", self.deriver.user_profile(follower)),
        writable("following_profile", self.deriver.user_profile(target)),
        signer("follower", *follower),
        system_program(),
      ],
      Args::FollowUser { target: *target },
    ))
  }

  pub fn unfollow_user(
    &self,
    follower: &Address,
    target: &Address,
  ) -> Result<InstructionRequest, ValidationError> {
    validate::distinct("unfollow", follower, target)?;
    Ok(self.request(
      follower,
      vec![
        writable("follow", self.deriver.follow(follower, target)),
        writable("follower_profile", self.deriver.user_profile(follower)),
        writable("following_profile", self.deriver.user_profile(target)),
        signer("follower", *follower),
      ],
      Args::UnfollowUser { target: *target },
    ))
  }

  pub fn donate_to_creator(
    &self,
    donor: &Address,
    creator: &Address,
    amount: u64,
  ) -> Result<InstructionRequest, ValidationError> {
    validate::distinct("donate to", donor, creator)?;
    let amount = validate::donation_amount(amount)?;
    Ok(self.request(
      donor,
      vec![
        writable("program_state", self.deriver.program_state()),
        writable("donation", self.deriver.donation(donor, creator)),
        writable("creator_profile", self.deriver.user_profile(creator)),
        signer("donor", *donor),
        system_program(),
      ],
      Args::DonateToCreator {
        creator: *creator,
        amount,
      },
    ))
  }
}
