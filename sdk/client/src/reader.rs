use {
  crate::{
    derive::AddressDeriver,
    view::{CommentView, PostView, ViewModelMapper},
  },
  std::sync::Arc,
  thiserror::Error,
  tracing::warn,
  twitter_primitives::{
    AccountRecord,
    Address,
    Comment,
    Commitment,
    Connection,
    DecodeError,
    Follow,
    Post,
    ProgramState,
    TransportError,
    UserProfile,
  },
};

#[derive(Debug, Error)]
pub enum FetchError {
  #[error(transparent)]
  Transport(#[from] TransportError),

  #[error("Account {0}: {1}")]
  Decode(Address, DecodeError),
}

/// Read access to platform accounts, no wallet needed.
///
/// Reads use `processed` commitment so that the effects of a
/// transaction that was just confirmed are visible right away.
pub struct Reader<C> {
  connection: Arc<C>,
  deriver: AddressDeriver,
  commitment: Commitment,
}

impl<C> Clone for Reader<C> {
  fn clone(&self) -> Self {
    Self {
      connection: Arc::clone(&self.connection),
      deriver: self.deriver,
      commitment: self.commitment,
    }
  }
}

impl<C: Connection> Reader<C> {
  pub fn new(connection: Arc<C>, deriver: AddressDeriver) -> Self {
    Self {
      connection,
      deriver,
      commitment: Commitment::Processed,
    }
  }

  pub fn deriver(&self) -> &AddressDeriver {
    &self.deriver
  }

  pub async fn exists(&self, address: &Address) -> Result<bool, FetchError> {
    Ok(
      self
        .connection
        .get_account(address, self.commitment)
        .await?
        .is_some(),
    )
  }

  /// Fetches and decodes a single account, `None` when it does not exist.
  pub async fn fetch<T: AccountRecord>(
    &self,
    address: &Address,
  ) -> Result<Option<T>, FetchError> {
    match self.connection.get_account(address, self.commitment).await? {
      Some(data) => T::decode(&data)
        .map(Some)
        .map_err(|e| FetchError::Decode(*address, e)),
      None => Ok(None),
    }
  }

  /// All accounts of one record type owned by the program.
  ///
  /// Accounts that fail to decode are skipped, one malformed record
  /// does not hide all the others.
  pub async fn fetch_all<T: AccountRecord>(
    &self,
  ) -> Result<Vec<(Address, T)>, FetchError> {
    let accounts = self
      .connection
      .get_program_accounts(
        self.deriver.program_id(),
        &T::discriminator(),
        self.commitment,
      )
      .await?;

    Ok(
      accounts
        .into_iter()
        .filter_map(|(address, data)| match T::decode(&data) {
          Ok(record) => Some((address, record)),
          Err(e) => {
            warn!("skipping account {address}: {e}");
            None
          }
        })
        .collect(),
    )
  }

  pub async fn program_state(&self) -> Result<Option<ProgramState>, FetchError> {
    self.fetch(&self.deriver.program_state()).await
  }

  pub async fn profile(
    &self,
    owner: &Address,
  ) -> Result<Option<UserProfile>, FetchError> {
    self.fetch(&self.deriver.user_profile(owner)).await
  }

  pub async fn post(&self, post_id: u64) -> Result<Option<Post>, FetchError> {
    self.fetch(&self.deriver.post(post_id)).await
  }

  pub async fn comment(
    &self,
    comment_id: u64,
  ) -> Result<Option<Comment>, FetchError> {
    self.fetch(&self.deriver.comment(comment_id)).await
  }

  pub async fn all_profiles(&self) -> Result<Vec<UserProfile>, FetchError> {
    Ok(strip(self.fetch_all().await?))
  }

  pub async fn all_posts(&self) -> Result<Vec<Post>, FetchError> {
    Ok(strip(self.fetch_all().await?))
  }

  pub async fn posts_by(&self, author: &Address) -> Result<Vec<Post>, FetchError> {
    let mut posts = self.all_posts().await?;
    posts.retain(|post| post.author == *author);
    Ok(posts)
  }

  pub async fn comments_for(
    &self,
    post_id: u64,
  ) -> Result<Vec<Comment>, FetchError> {
    let mut comments: Vec<Comment> = strip(self.fetch_all().await?);
    comments.retain(|comment| comment.post_id == post_id);
    Ok(comments)
  }

  /// Users followed by `user`.
  pub async fn follows_of(&self, user: &Address) -> Result<Vec<Follow>, FetchError> {
    let mut follows: Vec<Follow> = strip(self.fetch_all().await?);
    follows.retain(|follow| follow.follower == *user);
    Ok(follows)
  }

  /// Users following `user`.
  pub async fn followers_of(
    &self,
    user: &Address,
  ) -> Result<Vec<Follow>, FetchError> {
    let mut follows: Vec<Follow> = strip(self.fetch_all().await?);
    follows.retain(|follow| follow.following == *user);
    Ok(follows)
  }

  pub async fn is_liked(
    &self,
    user: &Address,
    post_id: u64,
  ) -> Result<bool, FetchError> {
    self.exists(&self.deriver.like(user, post_id)).await
  }

  pub async fn is_following(
    &self,
    follower: &Address,
    target: &Address,
  ) -> Result<bool, FetchError> {
    self.exists(&self.deriver.follow(follower, target)).await
  }

  /// Live posts of everyone, newest first. Empty when the
  /// posts could not be fetched.
  pub async fn feed(&self, mapper: &ViewModelMapper) -> Vec<PostView> {
    mapper.feed(&self.all_posts().await.or_degraded("posts"))
  }

  /// Live comments of a post, newest first. Empty when the
  /// comments could not be fetched.
  pub async fn thread(
    &self,
    post_id: u64,
    mapper: &ViewModelMapper,
  ) -> Vec<CommentView> {
    let comments = self.comments_for(post_id).await.or_degraded("comments");
    mapper.thread(&comments)
  }
}

fn strip<T>(records: Vec<(Address, T)>) -> Vec<T> {
  records.into_iter().map(|(_, record)| record).collect()
}

/// Turns failed reads into empty results for display purposes.
pub trait Degrade<T> {
  fn or_degraded(self, what: &str) -> T;
}

impl<T: Default> Degrade<T> for Result<T, FetchError> {
  fn or_degraded(self, what: &str) -> T {
    self.unwrap_or_else(|e| {
      warn!("failed to fetch {what}: {e}");
      T::default()
    })
  }
}
