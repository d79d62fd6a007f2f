//! View state updated before a submission resolves.
//!
//! Optimistic changes are kept when the submission succeeds and
//! reverted when it definitely failed. A timeout says nothing about
//! the outcome, so the change stays in place and the state is marked
//! stale until it is refreshed from the chain.

use {
  crate::{gateway::SubmissionFailure, request::ActionKind, view::CommentView},
  twitter_primitives::Signature,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeState {
  pub post_id: u64,
  pub is_liked: bool,
  pub likes: u64,

  /// Set after a timeout, the shown values may not match the chain.
  pub stale: bool,
  previous: Option<(bool, u64)>,
}

impl LikeState {
  pub fn new(post_id: u64, is_liked: bool, likes: u64) -> Self {
    Self {
      post_id,
      is_liked,
      likes,
      stale: false,
      previous: None,
    }
  }

  /// Flips the like and returns the action that needs to be
  /// submitted for it.
  pub fn toggle(&mut self) -> ActionKind {
    self.previous = Some((self.is_liked, self.likes));
    self.is_liked = !self.is_liked;
    match self.is_liked {
      true => {
        self.likes += 1;
        ActionKind::LikePost
      }
      false => {
        self.likes = self.likes.saturating_sub(1);
        ActionKind::UnlikePost
      }
    }
  }

  pub fn reconcile(&mut self, outcome: &Result<Signature, SubmissionFailure>) {
    let previous = self.previous.take();
    match outcome {
      Ok(_) => {}
      Err(SubmissionFailure::Timeout(_)) => self.stale = true,
      Err(_) => {
        if let Some((is_liked, likes)) = previous {
          self.is_liked = is_liked;
          self.likes = likes;
        }
      }
    }
  }

  /// Replaces the shown values with what was read from the chain.
  pub fn refresh(&mut self, is_liked: bool, likes: u64) {
    self.is_liked = is_liked;
    self.likes = likes;
    self.stale = false;
    self.previous = None;
  }
}

/// Comments of a post with optimistic inserts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThread {
  pub comments: Vec<CommentView>,
  pub stale: bool,
  pending: Vec<u64>,
}

impl CommentThread {
  pub fn new(comments: Vec<CommentView>) -> Self {
    Self {
      comments,
      ..Default::default()
    }
  }

  /// Shows a comment that is not confirmed yet at the top.
  pub fn insert_pending(&mut self, comment: CommentView) {
    self.pending.push(comment.id);
    self.comments.insert(0, comment);
  }

  pub fn is_pending(&self, comment_id: u64) -> bool {
    self.pending.contains(&comment_id)
  }

  pub fn reconcile(
    &mut self,
    comment_id: u64,
    outcome: &Result<Signature, SubmissionFailure>,
  ) {
    self.pending.retain(|id| *id != comment_id);
    match outcome {
      Ok(_) => {}
      Err(SubmissionFailure::Timeout(_)) => self.stale = true,
      Err(_) => self.comments.retain(|c| c.id != comment_id),
    }
  }

  pub fn refresh(&mut self, comments: Vec<CommentView>) {
    *self = Self::new(comments);
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{CommentThread, LikeState},
    crate::{gateway::SubmissionFailure, request::ActionKind, view::CommentView},
    twitter_primitives::{Address, Signature},
  };

  #[test]
  fn failed_like_is_reverted() {
    let mut state = LikeState::new(1, false, 10);
    assert_eq!(state.toggle(), ActionKind::LikePost);
    assert!(state.is_liked);
    assert_eq!(state.likes, 11);

    state.reconcile(&Err(SubmissionFailure::RejectedByProgram(
      "Already liked post".into(),
    )));
    assert_eq!(state, LikeState::new(1, false, 10));
  }

  #[test]
  fn confirmed_unlike_is_kept() {
    let mut state = LikeState::new(1, true, 1);
    assert_eq!(state.toggle(), ActionKind::UnlikePost);
    state.reconcile(&Ok(Signature::default()));
    assert!(!state.is_liked);
    assert_eq!(state.likes, 0);
    assert!(!state.stale);
  }

  #[test]
  fn timeout_leaves_state_until_refresh() {
    let mut state = LikeState::new(1, false, 3);
    state.toggle();
    state.reconcile(&Err(SubmissionFailure::Timeout(Signature::default())));
    assert!(state.is_liked);
    assert_eq!(state.likes, 4);
    assert!(state.stale);

    state.refresh(false, 3);
    assert_eq!(state, LikeState::new(1, false, 3));
  }

  fn comment(id: u64) -> CommentView {
    CommentView {
      id,
      post_id: 1,
      author: Address::default(),
      author_short: String::new(),
      content: format!("comment {id}"),
      created_at: 0,
      date: String::new(),
      age: String::new(),
    }
  }

  #[test]
  fn pending_comments() {
    let mut thread = CommentThread::new(vec![comment(1)]);
    thread.insert_pending(comment(2));
    assert!(thread.is_pending(2));
    assert_eq!(thread.comments[0].id, 2);

    thread.reconcile(2, &Err(SubmissionFailure::ConnectionError("down".into())));
    assert_eq!(thread.comments, vec![comment(1)]);
    assert!(!thread.is_pending(2));

    thread.insert_pending(comment(3));
    thread.reconcile(3, &Err(SubmissionFailure::Timeout(Signature::default())));
    assert_eq!(thread.comments.len(), 2);
    assert!(thread.stale);
  }
}
