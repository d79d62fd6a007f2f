use {
  dashmap::DashMap,
  std::collections::{BTreeMap, BTreeSet},
  twitter_primitives::Address,
};

/// Contents of an account on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
  /// Program allowed to modify the account data.
  pub owner: Address,
  pub data: Vec<u8>,
}

/// Represents a change in ledger accounts.
///
/// A transaction produces one statediff per instruction, they are
/// merged in order and applied at once when every instruction succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDiff {
  upserts: BTreeMap<Address, Account>,
  deletes: BTreeSet<Address>,
}

impl StateDiff {
  /// Inserts or updates an account under a given address.
  ///
  /// Returns the value previously set in this diff under the address.
  pub fn set(&mut self, address: Address, account: Account) -> Option<Account> {
    self.deletes.remove(&address);
    self.upserts.insert(address, account)
  }

  /// Closes the account under a given address.
  pub fn remove(&mut self, address: &Address) -> Option<Account> {
    self.deletes.insert(*address);
    self.upserts.remove(address)
  }

  /// Merges a state diff with a newer diff.
  ///
  /// Applying the result is equivalent to applying the two
  /// diffs consecutively.
  pub fn merge(self, newer: StateDiff) -> StateDiff {
    let mut upserts = self.upserts;
    let mut deletes = self.deletes;
    for (addr, acc) in newer.upserts {
      deletes.remove(&addr);
      upserts.insert(addr, acc);
    }
    for addr in newer.deletes {
      upserts.remove(&addr);
      deletes.insert(addr);
    }
    StateDiff { upserts, deletes }
  }

  /// Iterates over all changes, `None` marks a closed account.
  pub fn iter(&self) -> impl Iterator<Item = (&Address, Option<&Account>)> {
    self
      .upserts
      .iter()
      .map(|(addr, acc)| (addr, Some(acc)))
      .chain(self.deletes.iter().map(|addr| (addr, None)))
  }

  pub fn is_empty(&self) -> bool {
    self.upserts.is_empty() && self.deletes.is_empty()
  }
}

/// Read access to ledger accounts.
pub trait State {
  fn get(&self, address: &Address) -> Option<Account>;
}

impl State for StateDiff {
  fn get(&self, address: &Address) -> Option<Account> {
    self.upserts.get(address).cloned()
  }
}

/// A state with a pending diff on top of it.
///
/// Later instructions of a transaction observe the effects
/// of the earlier ones before anything is committed.
pub struct Overlay<'a> {
  base: &'a dyn State,
  diff: &'a StateDiff,
}

impl<'a> Overlay<'a> {
  pub fn new(base: &'a dyn State, diff: &'a StateDiff) -> Self {
    Self { base, diff }
  }
}

impl State for Overlay<'_> {
  fn get(&self, address: &Address) -> Option<Account> {
    if self.diff.deletes.contains(address) {
      return None;
    }
    self
      .diff
      .get(address)
      .or_else(|| self.base.get(address))
  }
}

#[derive(Debug, Default)]
pub struct InMemoryStateStore {
  data: DashMap<Address, Account>,
}

impl InMemoryStateStore {
  pub fn apply(&self, diff: StateDiff) {
    for (k, v) in diff.upserts {
      self.data.insert(k, v);
    }

    for addr in diff.deletes {
      self.data.remove(&addr);
    }
  }

  /// Snapshot of all accounts owned by a program.
  pub fn owned_by(&self, owner: &Address) -> Vec<(Address, Account)> {
    let mut accounts: Vec<_> = self
      .data
      .iter()
      .filter(|entry| entry.value().owner == *owner)
      .map(|entry| (*entry.key(), entry.value().clone()))
      .collect();
    accounts.sort_by_key(|(address, _)| *address);
    accounts
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }
}

impl State for InMemoryStateStore {
  fn get(&self, address: &Address) -> Option<Account> {
    self.data.get(address).map(|entry| entry.value().clone())
  }
}
