use {
  ed25519_dalek::{Keypair, Signer},
  std::sync::Arc,
  thiserror::Error,
  twitter_primitives::{Address, Signature},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
  #[error("Signing request declined: {0}")]
  Declined(String),
}

/// Signing capability of the connected user.
///
/// Browser and hardware wallets may ask the user for approval, so
/// signing is asynchronous and may be declined.
#[allow(async_fn_in_trait)]
pub trait Wallet {
  fn address(&self) -> Address;

  async fn sign(&self, message: &[u8]) -> Result<Signature, SignError>;
}

impl Wallet for Keypair {
  fn address(&self) -> Address {
    self.public.into()
  }

  async fn sign(&self, message: &[u8]) -> Result<Signature, SignError> {
    Ok(Signer::sign(self, message).into())
  }
}

impl<W: Wallet> Wallet for Arc<W> {
  fn address(&self) -> Address {
    (**self).address()
  }

  async fn sign(&self, message: &[u8]) -> Result<Signature, SignError> {
    (**self).sign(message).await
  }
}
