use {
  crate::{Address, Blockhash, Signature, Transaction},
  serde::{Deserialize, Serialize},
  std::{fmt::Display, str::FromStr, sync::Arc},
  thiserror::Error,
};

/// How settled a piece of state must be before it is reported.
///
/// Levels are ordered, a transaction that reached `Finalized` also
/// satisfies `Confirmed` and `Processed`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
  /// Seen by the node, may still be rolled back.
  #[default]
  Processed,

  /// Voted on by a supermajority of the cluster.
  Confirmed,

  /// Rooted, will not be rolled back.
  Finalized,
}

impl Display for Commitment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Commitment::Processed => "processed",
      Commitment::Confirmed => "confirmed",
      Commitment::Finalized => "finalized",
    })
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown commitment level '{0}'")]
pub struct UnknownCommitment(String);

impl FromStr for Commitment {
  type Err = UnknownCommitment;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "processed" => Ok(Commitment::Processed),
      "confirmed" => Ok(Commitment::Confirmed),
      "finalized" => Ok(Commitment::Finalized),
      other => Err(UnknownCommitment(other.to_owned())),
    }
  }
}

/// Status of a transaction that was accepted by the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
  pub commitment: Commitment,

  /// Set when the transaction landed but one of its
  /// instructions failed.
  pub err: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
  /// The endpoint could not be reached or answered with a transport
  /// level failure. Nothing is known about the fate of the request.
  #[error("RPC endpoint unreachable: {0}")]
  Unreachable(String),

  /// The cluster refused the transaction, usually because simulating
  /// it made the program return an error.
  #[error("{0}")]
  Rejected(String),
}

/// Remote procedure calls against a cluster node.
///
/// This is the only way the client talks to the chain. Production code
/// plugs an RPC client in here, tests and local development use the
/// in-memory devnode.
#[allow(async_fn_in_trait)]
pub trait Connection {
  async fn latest_blockhash(&self) -> Result<Blockhash, TransportError>;

  /// Sends a signed transaction once. Returns its signature when the
  /// node accepted it for processing.
  async fn send_transaction(
    &self,
    transaction: &Transaction,
  ) -> Result<Signature, TransportError>;

  /// `None` when the node has not seen the transaction (yet).
  async fn signature_status(
    &self,
    signature: &Signature,
  ) -> Result<Option<SignatureStatus>, TransportError>;

  /// Raw data of an account, `None` when no account exists
  /// under this address.
  async fn get_account(
    &self,
    address: &Address,
    commitment: Commitment,
  ) -> Result<Option<Vec<u8>>, TransportError>;

  /// All accounts owned by a program whose data starts with
  /// the given prefix.
  async fn get_program_accounts(
    &self,
    program_id: &Address,
    prefix: &[u8],
    commitment: Commitment,
  ) -> Result<Vec<(Address, Vec<u8>)>, TransportError>;
}

impl<C: Connection> Connection for Arc<C> {
  async fn latest_blockhash(&self) -> Result<Blockhash, TransportError> {
    (**self).latest_blockhash().await
  }

  async fn send_transaction(
    &self,
    transaction: &Transaction,
  ) -> Result<Signature, TransportError> {
    (**self).send_transaction(transaction).await
  }

  async fn signature_status(
    &self,
    signature: &Signature,
  ) -> Result<Option<SignatureStatus>, TransportError> {
    (**self).signature_status(signature).await
  }

  async fn get_account(
    &self,
    address: &Address,
    commitment: Commitment,
  ) -> Result<Option<Vec<u8>>, TransportError> {
    (**self).get_account(address, commitment).await
  }

  async fn get_program_accounts(
    &self,
    program_id: &Address,
    prefix: &[u8],
    commitment: Commitment,
  ) -> Result<Vec<(Address, Vec<u8>)>, TransportError> {
    (**self)
      .get_program_accounts(program_id, prefix, commitment)
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::Commitment;

  #[test]
  fn commitment_levels_are_ordered() {
    assert!(Commitment::Processed < Commitment::Confirmed);
    assert!(Commitment::Confirmed < Commitment::Finalized);
    assert_eq!("finalized".parse(), Ok(Commitment::Finalized));
    assert!("final".parse::<Commitment>().is_err());
    assert_eq!(Commitment::Confirmed.to_string(), "confirmed");
  }
}
