use {
  crate::{
    block::Chain,
    processor::{NoopProcessor, Processor},
    storage::{Account, InMemoryStateStore, Overlay, State, StateDiff},
  },
  dashmap::DashMap,
  parking_lot::Mutex,
  std::collections::VecDeque,
  tracing::{debug, info, warn},
  twitter_primitives::{
    Address,
    Blockhash,
    Commitment,
    Connection,
    Signature,
    SignatureStatus,
    Transaction,
    TransportError,
  },
};

/// How fast accepted transactions move through commitment levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationMode {
  /// Finalized as soon as it is accepted.
  #[default]
  Immediate,

  /// Starts at `Processed` and moves one level up every time
  /// its status is queried.
  Stepped,

  /// Accepted and applied, but the node never reports a status
  /// for it, so waiters run into their timeout.
  Withheld,
}

#[derive(Debug, Default)]
struct Faults {
  unreachable_sends: usize,
  unreachable_reads: bool,
  rejections: VecDeque<String>,
  landed_failures: VecDeque<String>,
}

/// A single-process ledger that speaks the client connection protocol.
///
/// It keeps accounts in memory, verifies transaction signatures and
/// blockhashes, hands instructions to a pluggable [`Processor`] and
/// tracks signature statuses. Reads ignore the requested commitment,
/// every accepted transaction is visible immediately.
pub struct Devnode {
  store: InMemoryStateStore,
  chain: Mutex<Chain>,
  statuses: DashMap<Signature, SignatureStatus>,
  submissions: Mutex<Vec<Transaction>>,
  faults: Mutex<Faults>,
  mode: Mutex<ConfirmationMode>,
  processor: Box<dyn Processor>,
}

impl Default for Devnode {
  fn default() -> Self {
    Self::new(NoopProcessor)
  }
}

impl Devnode {
  pub fn new(processor: impl Processor + 'static) -> Self {
    Self {
      store: InMemoryStateStore::default(),
      chain: Mutex::new(Chain::default()),
      statuses: DashMap::new(),
      submissions: Mutex::new(Vec::new()),
      faults: Mutex::new(Faults::default()),
      mode: Mutex::new(ConfirmationMode::default()),
      processor: Box::new(processor),
    }
  }

  pub fn with_confirmation(self, mode: ConfirmationMode) -> Self {
    *self.mode.lock() = mode;
    self
  }

  pub fn set_confirmation(&self, mode: ConfirmationMode) {
    *self.mode.lock() = mode;
  }

  /// Stores raw account data owned by `owner`, replacing
  /// whatever was there before.
  pub fn set_account(&self, address: Address, owner: Address, data: Vec<u8>) {
    let mut diff = StateDiff::default();
    diff.set(address, Account { owner, data });
    self.store.apply(diff);
  }

  pub fn remove_account(&self, address: &Address) {
    let mut diff = StateDiff::default();
    diff.remove(address);
    self.store.apply(diff);
  }

  pub fn account(&self, address: &Address) -> Option<Account> {
    self.store.get(address)
  }

  /// Every transaction that reached the node through `send_transaction`,
  /// including rejected ones, in arrival order.
  pub fn submissions(&self) -> Vec<Transaction> {
    self.submissions.lock().clone()
  }

  pub fn slot(&self) -> u64 {
    self.chain.lock().slot()
  }

  /// The next `count` sends fail with a transport error before
  /// reaching the ledger.
  pub fn fail_next_sends(&self, count: usize) {
    self.faults.lock().unreachable_sends += count;
  }

  /// While set, all account reads fail with a transport error.
  pub fn fail_reads(&self, fail: bool) {
    self.faults.lock().unreachable_reads = fail;
  }

  /// The next accepted transaction is rejected with this message,
  /// as if the program had returned it.
  pub fn reject_next(&self, message: impl Into<String>) {
    self.faults.lock().rejections.push_back(message.into());
  }

  /// The next accepted transaction lands in a slot but fails with this
  /// message. Its state changes are discarded and the error is
  /// reported through its signature status only.
  pub fn fail_after_landing(&self, message: impl Into<String>) {
    self.faults.lock().landed_failures.push_back(message.into());
  }

  fn check_reads(&self) -> Result<(), TransportError> {
    match self.faults.lock().unreachable_reads {
      true => Err(TransportError::Unreachable("devnode reads disabled".into())),
      false => Ok(()),
    }
  }

  fn execute(&self, transaction: &Transaction) -> Result<StateDiff, String> {
    let mut diff = StateDiff::default();
    for instruction in transaction.message.decompile() {
      let overlay = Overlay::new(&self.store, &diff);
      let changes = self.processor.process(&overlay, &instruction)?;
      diff = diff.merge(changes);
    }
    Ok(diff)
  }
}

impl Connection for Devnode {
  async fn latest_blockhash(&self) -> Result<Blockhash, TransportError> {
    Ok(self.chain.lock().latest())
  }

  async fn send_transaction(
    &self,
    transaction: &Transaction,
  ) -> Result<Signature, TransportError> {
    {
      let mut faults = self.faults.lock();
      if faults.unreachable_sends > 0 {
        faults.unreachable_sends -= 1;
        warn!("dropping transaction, devnode is unreachable");
        return Err(TransportError::Unreachable("devnode unreachable".into()));
      }
    }

    self.submissions.lock().push(transaction.clone());

    let Some(signature) = transaction.id().copied() else {
      return Err(TransportError::Rejected("transaction has no signatures".into()));
    };

    if !transaction.verify() {
      return Err(TransportError::Rejected(
        "Transaction signature verification failure".into(),
      ));
    }

    // one transaction per slot, processed in arrival order
    let mut chain = self.chain.lock();
    if !chain.is_recent(&transaction.message.recent_blockhash) {
      return Err(TransportError::Rejected("Blockhash not found".into()));
    }

    if let Some(message) = self.faults.lock().rejections.pop_front() {
      debug!("rejecting {signature} on request: {message}");
      return Err(TransportError::Rejected(message));
    }

    let landed_error = self.faults.lock().landed_failures.pop_front();
    let mutations = match &landed_error {
      Some(message) => {
        debug!("{signature} lands as failed: {message}");
        0
      }
      None => {
        let diff = self.execute(transaction).map_err(TransportError::Rejected)?;
        let mutations = diff.iter().count();
        self.store.apply(diff);
        mutations
      }
    };
    let slot_hash = chain.advance();

    let commitment = match *self.mode.lock() {
      ConfirmationMode::Immediate => Some(Commitment::Finalized),
      ConfirmationMode::Stepped => Some(Commitment::Processed),
      ConfirmationMode::Withheld => None,
    };
    if let Some(commitment) = commitment {
      self.statuses.insert(signature, SignatureStatus {
        commitment,
        err: landed_error,
      });
    }

    info!(
      "slot {} ({slot_hash}): applied {signature} with {mutations} account \
       mutations",
      chain.slot()
    );
    Ok(signature)
  }

  async fn signature_status(
    &self,
    signature: &Signature,
  ) -> Result<Option<SignatureStatus>, TransportError> {
    let Some(mut entry) = self.statuses.get_mut(signature) else {
      return Ok(None);
    };

    let current = entry.value().clone();
    if *self.mode.lock() == ConfirmationMode::Stepped {
      entry.value_mut().commitment = match current.commitment {
        Commitment::Processed => Commitment::Confirmed,
        _ => Commitment::Finalized,
      };
    }
    Ok(Some(current))
  }

  async fn get_account(
    &self,
    address: &Address,
    _: Commitment,
  ) -> Result<Option<Vec<u8>>, TransportError> {
    self.check_reads()?;
    Ok(self.store.get(address).map(|account| account.data))
  }

  async fn get_program_accounts(
    &self,
    program_id: &Address,
    prefix: &[u8],
    _: Commitment,
  ) -> Result<Vec<(Address, Vec<u8>)>, TransportError> {
    self.check_reads()?;
    Ok(
      self
        .store
        .owned_by(program_id)
        .into_iter()
        .filter(|(_, account)| account.data.starts_with(prefix))
        .map(|(address, account)| (address, account.data))
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{ConfirmationMode, Devnode},
    crate::storage::{Account, State, StateDiff},
    ed25519_dalek::{Keypair, PublicKey, SecretKey, Signer},
    twitter_primitives::{
      AccountMeta,
      Address,
      Commitment,
      Connection,
      Instruction,
      Message,
      Signature,
      Transaction,
      TransportError,
    },
  };

  fn keypair(seed: u8) -> Keypair {
    let secret = SecretKey::from_bytes(&[seed; 32]).unwrap();
    let public = PublicKey::from(&secret);
    Keypair { secret, public }
  }

  async fn signed(node: &Devnode, keypair: &Keypair, data: u8) -> Transaction {
    let payer = Address::from(keypair.public);
    let instruction = Instruction {
      program_id: Address::new([5; 32]),
      accounts: vec![
        AccountMeta::writable(Address::new([6; 32]), false),
        AccountMeta::writable(payer, true),
      ],
      data: vec![data],
    };
    let blockhash = node.latest_blockhash().await.unwrap();
    let mut tx =
      Transaction::new_unsigned(Message::new(&[instruction], &payer, blockhash));
    tx.signatures[0] = Signature::from(keypair.sign(&tx.message.serialize()));
    tx
  }

  #[tokio::test]
  async fn accepted_transactions_advance_the_chain() {
    let node = Devnode::default();
    let before = node.latest_blockhash().await.unwrap();
    let tx = signed(&node, &keypair(1), 0).await;

    let signature = node.send_transaction(&tx).await.unwrap();
    assert_eq!(Some(&signature), tx.id());
    assert_eq!(node.slot(), 1);
    assert_ne!(node.latest_blockhash().await.unwrap(), before);

    let status = node.signature_status(&signature).await.unwrap().unwrap();
    assert_eq!(status.commitment, Commitment::Finalized);
  }

  #[tokio::test]
  async fn tampered_transactions_are_rejected() {
    let node = Devnode::default();
    let mut tx = signed(&node, &keypair(1), 0).await;
    tx.message.instructions[0].data = vec![1];

    assert!(matches!(
      node.send_transaction(&tx).await,
      Err(TransportError::Rejected(_))
    ));
    assert_eq!(node.slot(), 0);
    assert_eq!(node.submissions().len(), 1);
  }

  #[tokio::test]
  async fn processor_effects_are_visible_to_reads() {
    let target = Address::new([6; 32]);
    let node = Devnode::new(move |state: &dyn State, ix: &Instruction| {
      let mut diff = StateDiff::default();
      if state.get(&target).is_some() {
        return Err("account already in use".to_owned());
      }
      diff.set(target, Account {
        owner: ix.program_id,
        data: ix.data.clone(),
      });
      Ok(diff)
    });

    let tx = signed(&node, &keypair(1), 7).await;
    node.send_transaction(&tx).await.unwrap();
    assert_eq!(
      node.get_account(&target, Commitment::Processed).await.unwrap(),
      Some(vec![7])
    );

    let listed = node
      .get_program_accounts(&Address::new([5; 32]), &[7], Commitment::Processed)
      .await
      .unwrap();
    assert_eq!(listed, vec![(target, vec![7])]);

    let again = signed(&node, &keypair(1), 8).await;
    assert_eq!(
      node.send_transaction(&again).await,
      Err(TransportError::Rejected("account already in use".into()))
    );
  }

  #[tokio::test]
  async fn stepped_confirmation_climbs_one_level_per_query() {
    let node = Devnode::default().with_confirmation(ConfirmationMode::Stepped);
    let tx = signed(&node, &keypair(2), 0).await;
    let signature = node.send_transaction(&tx).await.unwrap();

    let mut seen = vec![];
    for _ in 0..4 {
      let status = node.signature_status(&signature).await.unwrap().unwrap();
      seen.push(status.commitment);
    }
    assert_eq!(seen, vec![
      Commitment::Processed,
      Commitment::Confirmed,
      Commitment::Finalized,
      Commitment::Finalized,
    ]);
  }

  #[tokio::test]
  async fn injected_faults() {
    let node = Devnode::default();
    node.fail_next_sends(1);
    let tx = signed(&node, &keypair(3), 0).await;
    assert!(matches!(
      node.send_transaction(&tx).await,
      Err(TransportError::Unreachable(_))
    ));
    assert!(node.submissions().is_empty());

    node.reject_next("custom program error: 0x1770");
    assert_eq!(
      node.send_transaction(&tx).await,
      Err(TransportError::Rejected("custom program error: 0x1770".into()))
    );
    assert!(node.send_transaction(&tx).await.is_ok());

    node.fail_reads(true);
    assert!(node
      .get_account(&Address::new([6; 32]), Commitment::Processed)
      .await
      .is_err());
  }

  #[tokio::test]
  async fn landed_failures_are_reported_in_the_status() {
    let target = Address::new([6; 32]);
    let node = Devnode::new(move |_: &dyn State, ix: &Instruction| {
      let mut diff = StateDiff::default();
      diff.set(target, Account {
        owner: ix.program_id,
        data: ix.data.clone(),
      });
      Ok(diff)
    });

    node.fail_after_landing("custom program error: 0x1771");
    let tx = signed(&node, &keypair(4), 9).await;
    let signature = node.send_transaction(&tx).await.unwrap();
    assert_eq!(node.slot(), 1);
    assert_eq!(node.account(&target), None);

    let status = node.signature_status(&signature).await.unwrap().unwrap();
    assert_eq!(status.err.as_deref(), Some("custom program error: 0x1771"));
    assert_eq!(status.commitment, Commitment::Finalized);
  }
}
