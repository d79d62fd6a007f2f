use {
  crate::storage::{State, StateDiff},
  twitter_primitives::Instruction,
};

/// Executes instructions addressed to a program on the devnode.
///
/// The devnode knows nothing about program rules. Tests that need
/// instructions to have visible effects plug their own processor in,
/// everything else runs with [`NoopProcessor`].
///
/// A processor returns the account changes of a single instruction or
/// an error message. An error fails the whole transaction and the
/// message is reported to the sender verbatim.
pub trait Processor: Send + Sync {
  fn process(
    &self,
    state: &dyn State,
    instruction: &Instruction,
  ) -> Result<StateDiff, String>;
}

impl<F> Processor for F
where
  F: Fn(&dyn State, &Instruction) -> Result<StateDiff, String> + Send + Sync,
{
  fn process(
    &self,
    state: &dyn State,
    instruction: &Instruction,
  ) -> Result<StateDiff, String> {
    self(state, instruction)
  }
}

/// Accepts every instruction without touching any account.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProcessor;

impl Processor for NoopProcessor {
  fn process(&self, _: &dyn State, _: &Instruction) -> Result<StateDiff, String> {
    Ok(StateDiff::default())
  }
}
