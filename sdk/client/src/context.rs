use {
  crate::{
    builder::{ProfileUpdate, RequestBuilder},
    derive::AddressDeriver,
    gateway::{ChainGateway, GatewayConfig, SubmissionFailure},
    media::{self, MediaAttachment, MediaStore},
    optimistic::LikeState,
    reader::{FetchError, Reader},
    request::{ActionKind, InstructionRequest},
    validate::{self, ValidationError},
    wallet::Wallet,
  },
  std::sync::Arc,
  thiserror::Error,
  tracing::{info, warn},
  twitter_primitives::{Address, Connection, ProgramState, Signature},
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("No wallet connected")]
pub struct WalletUnavailable;

#[derive(Debug, Error)]
pub enum ActionError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Submission(#[from] SubmissionFailure),

  /// Another transaction took the counter value this one was built
  /// for. Reading the counter again and retrying resolves it.
  #[error("Account {0} is already claimed, retry with a fresh counter")]
  AlreadyClaimed(Address),

  #[error("The platform is not initialized")]
  NotInitialized,

  #[error("Comment {0} does not exist")]
  CommentNotFound(u64),

  #[error(transparent)]
  Fetch(#[from] FetchError),
}

/// A new post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Created {
  pub id: u64,
  pub address: Address,
  pub signature: Signature,
}

/// Everything needed to act on behalf of a connected user.
///
/// Created when a wallet connects and dropped when it disconnects, there
/// is no ambient connection or wallet anywhere else in the crate. Reads
/// that do not need a wallet go through [`Reader`].
pub struct ClientContext<C, W> {
  wallet: W,
  builder: RequestBuilder,
  gateway: ChainGateway<C>,
  reader: Reader<C>,
}

impl<C: Connection, W: Wallet> ClientContext<C, W> {
  pub fn connect(
    connection: Arc<C>,
    wallet: Option<W>,
    program_id: Address,
    config: GatewayConfig,
  ) -> Result<Self, WalletUnavailable> {
    let wallet = wallet.ok_or(WalletUnavailable)?;
    let deriver = AddressDeriver::new(program_id);
    info!("connected {} to program {program_id}", wallet.address());

    Ok(Self {
      wallet,
      builder: RequestBuilder::new(deriver),
      gateway: ChainGateway::new(Arc::clone(&connection), config),
      reader: Reader::new(connection, deriver),
    })
  }

  /// Drops the wallet, keeping read access.
  pub fn disconnect(self) -> Reader<C> {
    info!("disconnected {}", self.wallet.address());
    self.reader
  }

  pub fn address(&self) -> Address {
    self.wallet.address()
  }

  pub fn reader(&self) -> &Reader<C> {
    &self.reader
  }

  pub fn builder(&self) -> &RequestBuilder {
    &self.builder
  }

  pub fn gateway(&self) -> &ChainGateway<C> {
    &self.gateway
  }

  async fn submit(
    &self,
    request: &InstructionRequest,
  ) -> Result<Signature, ActionError> {
    Ok(self.gateway.submit(&self.wallet, request).await?)
  }

  /// Submits a request that creates a counter-derived account.
  ///
  /// The address is checked right before sending, and an "already in
  /// use" rejection from the program is reported the same way.
  async fn submit_claim(
    &self,
    request: &InstructionRequest,
    claimed: Address,
  ) -> Result<Signature, ActionError> {
    if self.reader.exists(&claimed).await? {
      warn!("{} target {claimed} already exists", request.kind());
      return Err(ActionError::AlreadyClaimed(claimed));
    }

    match self.gateway.submit(&self.wallet, request).await {
      Err(SubmissionFailure::RejectedByProgram(message))
        if message.contains("already in use") =>
      {
        warn!("{} lost the race for {claimed}", request.kind());
        Err(ActionError::AlreadyClaimed(claimed))
      }
      outcome => Ok(outcome?),
    }
  }

  async fn program_state(&self) -> Result<ProgramState, ActionError> {
    self
      .reader
      .program_state()
      .await?
      .ok_or(ActionError::NotInitialized)
  }

  pub async fn initialize(&self) -> Result<Signature, ActionError> {
    self.submit(&self.builder.initialize(&self.address())).await
  }

  pub async fn create_profile(
    &self,
    username: &str,
    display_name: &str,
    bio: &str,
    profile_image_url: &str,
  ) -> Result<Signature, ActionError> {
    let request = self.builder.create_profile(
      &self.address(),
      username,
      display_name,
      bio,
      profile_image_url,
    )?;
    self.submit(&request).await
  }

  /// Creates the profile with an avatar that is uploaded first.
  /// A failed upload creates the profile without an image.
  pub async fn create_profile_with_media(
    &self,
    store: &impl MediaStore,
    username: &str,
    display_name: &str,
    bio: &str,
    avatar: Option<&MediaAttachment>,
  ) -> Result<Signature, ActionError> {
    validate::username(username)?;
    validate::display_name(display_name)?;
    validate::bio(bio)?;

    let image_url = media::attach(store, avatar).await.unwrap_or_default();
    self
      .create_profile(username, display_name, bio, &image_url)
      .await
  }

  pub async fn update_profile(
    &self,
    update: &ProfileUpdate,
  ) -> Result<Signature, ActionError> {
    let request = self.builder.update_profile(&self.address(), update)?;
    self.submit(&request).await
  }

  /// Applies the update with a new avatar uploaded first. An uploaded
  /// avatar replaces `update.profile_image_url`, a failed upload leaves
  /// the update as given.
  pub async fn update_profile_with_media(
    &self,
    store: &impl MediaStore,
    update: &ProfileUpdate,
    avatar: Option<&MediaAttachment>,
  ) -> Result<Signature, ActionError> {
    self.builder.update_profile(&self.address(), update)?;

    let mut update = update.clone();
    if let Some(reference) = media::attach(store, avatar).await {
      update.profile_image_url = Some(reference);
    }
    self.update_profile(&update).await
  }

  /// Publishes a post under the next free post id.
  ///
  /// Arguments are checked before the counter is read, invalid
  /// input never reaches the network.
  pub async fn create_post(
    &self,
    content: &str,
    image_url: Option<&str>,
  ) -> Result<Created, ActionError> {
    validate::post_content(content)?;
    image_url.map(validate::image_url).transpose()?;

    let state = self.program_state().await?;
    let id = validate::next_id("post", state.post_count)?;
    let request =
      self
        .builder
        .create_post(&self.address(), state.post_count, content, image_url)?;
    let address = self.builder.deriver().post(id);

    let signature = self.submit_claim(&request, address).await?;
    Ok(Created {
      id,
      address,
      signature,
    })
  }

  /// Same as [`ClientContext::create_post`] with an attachment that is
  /// uploaded first. A failed upload publishes the post without media.
  pub async fn create_post_with_media(
    &self,
    store: &impl MediaStore,
    content: &str,
    attachment: Option<&MediaAttachment>,
  ) -> Result<Created, ActionError> {
    validate::post_content(content)?;
    let image_url = media::attach(store, attachment).await;
    self.create_post(content, image_url.as_deref()).await
  }

  pub async fn create_collaboration_post(
    &self,
    collaborator: &Address,
    content: &str,
    image_url: Option<&str>,
  ) -> Result<Created, ActionError> {
    validate::distinct("collaborate with", &self.address(), collaborator)?;
    validate::post_content(content)?;
    image_url.map(validate::image_url).transpose()?;

    let state = self.program_state().await?;
    let id = validate::next_id("post", state.post_count)?;
    let request = self.builder.create_collaboration_post(
      &self.address(),
      collaborator,
      state.post_count,
      content,
      image_url,
    )?;
    let address = self.builder.deriver().post(id);

    let signature = self.submit_claim(&request, address).await?;
    Ok(Created {
      id,
      address,
      signature,
    })
  }

  /// Same as [`ClientContext::create_collaboration_post`] with an
  /// attachment that is uploaded first.
  pub async fn create_collaboration_post_with_media(
    &self,
    store: &impl MediaStore,
    collaborator: &Address,
    content: &str,
    attachment: Option<&MediaAttachment>,
  ) -> Result<Created, ActionError> {
    validate::distinct("collaborate with", &self.address(), collaborator)?;
    validate::post_content(content)?;

    let image_url = media::attach(store, attachment).await;
    self
      .create_collaboration_post(collaborator, content, image_url.as_deref())
      .await
  }

  pub async fn delete_post(&self, post_id: u64) -> Result<Signature, ActionError> {
    self
      .submit(&self.builder.delete_post(&self.address(), post_id))
      .await
  }

  pub async fn like_post(&self, post_id: u64) -> Result<Signature, ActionError> {
    self
      .submit(&self.builder.like_post(&self.address(), post_id))
      .await
  }

  pub async fn unlike_post(&self, post_id: u64) -> Result<Signature, ActionError> {
    self
      .submit(&self.builder.unlike_post(&self.address(), post_id))
      .await
  }

  /// Flips the like optimistically, submits it and reconciles the
  /// shown state with the outcome.
  pub async fn toggle_like(
    &self,
    state: &mut LikeState,
  ) -> Result<Signature, ActionError> {
    let request = match state.toggle() {
      ActionKind::LikePost => self.builder.like_post(&self.address(), state.post_id),
      _ => self.builder.unlike_post(&self.address(), state.post_id),
    };

    let outcome = self.gateway.submit(&self.wallet, &request).await;
    state.reconcile(&outcome);
    Ok(outcome?)
  }

  /// Comments on a post under the next free comment id.
  pub async fn create_comment(
    &self,
    post_id: u64,
    content: &str,
  ) -> Result<Created, ActionError> {
    validate::comment_content(content)?;

    let state = self.program_state().await?;
    let id = validate::next_id("comment", state.comment_count)?;
    let request = self.builder.create_comment(
      &self.address(),
      state.comment_count,
      post_id,
      content,
    )?;
    let address = self.builder.deriver().comment(id);

    let signature = self.submit_claim(&request, address).await?;
    Ok(Created {
      id,
      address,
      signature,
    })
  }

  /// Reads the comment first to find the post it belongs to.
  pub async fn delete_comment(
    &self,
    comment_id: u64,
  ) -> Result<Signature, ActionError> {
    let comment = self
      .reader
      .comment(comment_id)
      .await?
      .ok_or(ActionError::CommentNotFound(comment_id))?;

    let request =
      self
        .builder
        .delete_comment(&self.address(), comment_id, comment.post_id);
    self.submit(&request).await
  }

  pub async fn follow_user(&self, target: &Address) -> Result<Signature, ActionError> {
    let request = self.builder.follow_user(&self.address(), target)?;
    self.submit(&request).await
  }

  pub async fn unfollow_user(
    &self,
    target: &Address,
  ) -> Result<Signature, ActionError> {
    let request = self.builder.unfollow_user(&self.address(), target)?;
    self.submit(&request).await
  }

  pub async fn donate_to_creator(
    &self,
    creator: &Address,
    amount: u64,
  ) -> Result<Signature, ActionError> {
    let request =
      self
        .builder
        .donate_to_creator(&self.address(), creator, amount)?;
    self.submit(&request).await
  }
}
