//! Local ledger for developing and testing Twitter Platform clients
//! without a cluster.

mod block;
mod ledger;
mod processor;
mod storage;

pub use {
  block::{Chain, MAX_RECENT_BLOCKHASHES},
  ledger::{ConfirmationMode, Devnode},
  processor::{NoopProcessor, Processor},
  storage::{Account, InMemoryStateStore, Overlay, State, StateDiff},
};
