use {
  crate::{request::InstructionRequest, wallet::Wallet},
  std::{sync::Arc, time::Duration},
  thiserror::Error,
  tracing::{debug, info, warn},
  twitter_primitives::{
    Commitment,
    Address,
    Connection,
    Message,
    Signature,
    Transaction,
    TransportError,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
  /// Commitment a transaction must reach before it counts as confirmed.
  pub commitment: Commitment,

  /// How long to wait for `commitment` after the transaction was sent.
  pub confirmation_timeout: Duration,

  /// Delay between two signature status queries.
  pub poll_interval: Duration,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      commitment: Commitment::Finalized,
      confirmation_timeout: Duration::from_secs(60),
      poll_interval: Duration::from_millis(500),
    }
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
  /// The program refused the transaction. The message is passed
  /// through verbatim.
  #[error("Transaction rejected: {0}")]
  RejectedByProgram(String),

  /// The cluster could not be reached, nothing was submitted.
  #[error("Connection error: {0}")]
  ConnectionError(String),

  /// The transaction was sent but did not reach the requested
  /// commitment in time. It may still land, the outcome is only
  /// known after re-reading the affected accounts.
  #[error("Transaction {0} was not confirmed in time")]
  Timeout(Signature),

  #[error("Wallet declined to sign the transaction")]
  SignatureDeclined,

  /// The request names a different signer than the wallet asked
  /// to pay for and sign it. Nothing was sent.
  #[error("Request signed by {caller} cannot be submitted by wallet {wallet}")]
  WrongSigner { caller: Address, wallet: Address },
}

impl SubmissionFailure {
  pub fn is_retryable(&self) -> bool {
    matches!(self, SubmissionFailure::ConnectionError(_))
  }
}

impl From<TransportError> for SubmissionFailure {
  fn from(error: TransportError) -> Self {
    match error {
      TransportError::Unreachable(e) => SubmissionFailure::ConnectionError(e),
      TransportError::Rejected(e) => SubmissionFailure::RejectedByProgram(e),
    }
  }
}

/// Sends instruction requests to the cluster and waits for them
/// to be confirmed.
///
/// Every call to [`ChainGateway::submit`] sends the transaction exactly
/// once. Retrying is up to the caller, because only the caller knows
/// whether repeating an action is safe.
pub struct ChainGateway<C> {
  connection: Arc<C>,
  config: GatewayConfig,
}

impl<C> Clone for ChainGateway<C> {
  fn clone(&self) -> Self {
    Self {
      connection: Arc::clone(&self.connection),
      config: self.config,
    }
  }
}

impl<C: Connection> ChainGateway<C> {
  pub fn new(connection: Arc<C>, config: GatewayConfig) -> Self {
    Self { connection, config }
  }

  pub fn connection(&self) -> &Arc<C> {
    &self.connection
  }

  pub fn config(&self) -> &GatewayConfig {
    &self.config
  }

  /// Compiles the request into a transaction paid for and signed by
  /// the wallet, sends it and waits for the configured commitment.
  ///
  /// On success returns the transaction signature, which doubles as
  /// its id.
  pub async fn submit(
    &self,
    wallet: &impl Wallet,
    request: &InstructionRequest,
  ) -> Result<Signature, SubmissionFailure> {
    let payer = wallet.address();
    if payer != request.caller {
      warn!("{} not submitted: built for {}", request.kind(), request.caller);
      return Err(SubmissionFailure::WrongSigner {
        caller: request.caller,
        wallet: payer,
      });
    }

    let blockhash = self.connection.latest_blockhash().await?;
    let message = Message::new(&[request.to_instruction()], &payer, blockhash);
    let mut transaction = Transaction::new_unsigned(message);

    let signature = wallet
      .sign(&transaction.message.serialize())
      .await
      .map_err(|e| {
        warn!("{} not submitted: {e}", request.kind());
        SubmissionFailure::SignatureDeclined
      })?;
    transaction.signatures[0] = signature;

    let signature = self
      .connection
      .send_transaction(&transaction)
      .await
      .map_err(|e| {
        warn!("{} submission failed: {e}", request.kind());
        SubmissionFailure::from(e)
      })?;
    info!("{} sent as {signature}", request.kind());

    self.await_confirmation(&signature).await?;
    Ok(signature)
  }

  /// Polls the status of a sent transaction until it reaches the
  /// configured commitment, fails or the timeout elapses.
  pub async fn await_confirmation(
    &self,
    signature: &Signature,
  ) -> Result<(), SubmissionFailure> {
    let poll = async {
      loop {
        match self.connection.signature_status(signature).await {
          Ok(Some(status)) => {
            if let Some(err) = status.err {
              return Err(SubmissionFailure::RejectedByProgram(err));
            }
            if status.commitment >= self.config.commitment {
              return Ok(());
            }
            debug!("{signature} at {}", status.commitment);
          }
          Ok(None) => debug!("{signature} not seen yet"),
          Err(e) => warn!("status query for {signature} failed: {e}"),
        }
        tokio::time::sleep(self.config.poll_interval).await;
      }
    };

    match tokio::time::timeout(self.config.confirmation_timeout, poll).await {
      Ok(result) => {
        if result.is_ok() {
          info!("{signature} reached {}", self.config.commitment);
        }
        result
      }
      Err(_) => {
        warn!(
          "{signature} not {} after {:?}",
          self.config.commitment, self.config.confirmation_timeout
        );
        Err(SubmissionFailure::Timeout(*signature))
      }
    }
  }
}
