use {
  multihash::{Hasher, Sha2_256},
  std::collections::VecDeque,
  twitter_primitives::Blockhash,
};

/// Number of recent blockhashes a transaction may reference.
pub const MAX_RECENT_BLOCKHASHES: usize = 150;

/// Slot counter and the window of recent blockhashes.
///
/// Every accepted transaction closes the current slot, so each
/// submission observes a fresh blockhash.
#[derive(Debug)]
pub struct Chain {
  slot: u64,
  recent: VecDeque<Blockhash>,
}

impl Default for Chain {
  fn default() -> Self {
    let genesis = Blockhash::new(hash(&[0u8; 32], 0));
    Self {
      slot: 0,
      recent: VecDeque::from([genesis]),
    }
  }
}

impl Chain {
  pub fn slot(&self) -> u64 {
    self.slot
  }

  pub fn latest(&self) -> Blockhash {
    *self
      .recent
      .back()
      .expect("the window always holds the genesis hash or newer")
  }

  pub fn is_recent(&self, blockhash: &Blockhash) -> bool {
    self.recent.contains(blockhash)
  }

  /// Produces the hash of the next slot from the hash of the
  /// previous one and returns it.
  pub fn advance(&mut self) -> Blockhash {
    self.slot += 1;
    let next = Blockhash::new(hash(&self.latest().to_bytes(), self.slot));
    self.recent.push_back(next);
    while self.recent.len() > MAX_RECENT_BLOCKHASHES {
      self.recent.pop_front();
    }
    next
  }
}

fn hash(parent: &[u8; 32], slot: u64) -> [u8; 32] {
  let mut hasher = Sha2_256::default();
  hasher.update(parent);
  hasher.update(&slot.to_le_bytes());
  hasher
    .finalize()
    .try_into()
    .expect("sha2-256 digests are 32 bytes long")
}

#[cfg(test)]
mod tests {
  use super::{Chain, MAX_RECENT_BLOCKHASHES};

  #[test]
  fn old_blockhashes_expire() {
    let mut chain = Chain::default();
    let genesis = chain.latest();
    let first = chain.advance();
    assert_ne!(genesis, first);
    assert_eq!(chain.slot(), 1);
    assert!(chain.is_recent(&genesis));

    for _ in 0..MAX_RECENT_BLOCKHASHES {
      chain.advance();
    }
    assert!(!chain.is_recent(&genesis));
    assert!(!chain.is_recent(&first));
    assert!(chain.is_recent(&chain.latest()));
  }
}
