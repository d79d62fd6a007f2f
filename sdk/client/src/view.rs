use {
  serde::Serialize,
  time::OffsetDateTime,
  twitter_primitives::{Address, Comment, Post, UserProfile},
};

/// A post as shown in a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
  pub id: u64,
  pub author: Address,
  pub author_short: String,
  pub collaborator: Option<Address>,
  pub content: String,
  pub image_url: Option<String>,
  pub likes: u64,
  pub comments: u64,
  pub created_at: u64,
  pub date: String,
  pub age: String,
  pub is_collaboration: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
  pub owner: Address,
  pub owner_short: String,
  pub username: String,
  pub display_name: String,
  pub bio: String,
  pub avatar: Option<String>,
  pub followers: u64,
  pub following: u64,
  pub posts: u64,
  pub donations_received: u64,
  pub verified: bool,
  pub joined: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
  pub id: u64,
  pub post_id: u64,
  pub author: Address,
  pub author_short: String,
  pub content: String,
  pub created_at: u64,
  pub date: String,
  pub age: String,
}

/// Calendar date of a unix timestamp in UTC, for example "Jan 5, 2025".
pub fn format_date(timestamp: u64) -> String {
  let Some(datetime) = i64::try_from(timestamp)
    .ok()
    .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
  else {
    return String::new();
  };

  let month = datetime.month().to_string();
  format!("{} {}, {}", &month[..3], datetime.day(), datetime.year())
}

/// Age of a timestamp relative to `now`, for example "3h ago".
///
/// Anything older than a week is shown as a calendar date. Timestamps
/// in the future count as "just now".
pub fn relative_age(timestamp: u64, now: u64) -> String {
  const MINUTE: u64 = 60;
  const HOUR: u64 = 60 * MINUTE;
  const DAY: u64 = 24 * HOUR;

  match now.saturating_sub(timestamp) {
    age if age < MINUTE => "just now".to_owned(),
    age if age < HOUR => format!("{}m ago", age / MINUTE),
    age if age < DAY => format!("{}h ago", age / HOUR),
    age if age < 7 * DAY => format!("{}d ago", age / DAY),
    _ => format_date(timestamp),
  }
}

fn non_empty(url: &str) -> Option<String> {
  match url.trim() {
    "" => None,
    url => Some(url.to_owned()),
  }
}

/// Maps decoded account records into display shapes.
///
/// Relative ages are computed against a fixed instant so that a whole
/// feed is rendered consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewModelMapper {
  now: u64,
}

impl Default for ViewModelMapper {
  fn default() -> Self {
    Self::now()
  }
}

impl ViewModelMapper {
  pub fn at(now: u64) -> Self {
    Self { now }
  }

  pub fn now() -> Self {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    Self::at(u64::try_from(now).unwrap_or_default())
  }

  pub fn post(&self, post: &Post) -> PostView {
    PostView {
      id: post.post_id,
      author: post.author,
      author_short: post.author.truncated(),
      collaborator: post.collaborator,
      content: post.content.clone(),
      image_url: post.image_url.as_deref().and_then(non_empty),
      likes: post.likes_count,
      comments: post.comments_count,
      created_at: post.created_at,
      date: format_date(post.created_at),
      age: relative_age(post.created_at, self.now),
      is_collaboration: post.is_collaboration,
    }
  }

  pub fn profile(&self, profile: &UserProfile) -> ProfileView {
    ProfileView {
      owner: profile.owner,
      owner_short: profile.owner.truncated(),
      username: profile.username.clone(),
      display_name: profile.display_name.clone(),
      bio: profile.bio.clone(),
      avatar: non_empty(&profile.profile_image_url),
      followers: profile.followers_count,
      following: profile.following_count,
      posts: profile.posts_count,
      donations_received: profile.total_donations_received,
      verified: profile.is_verified,
      joined: format_date(profile.created_at),
    }
  }

  pub fn comment(&self, comment: &Comment) -> CommentView {
    CommentView {
      id: comment.comment_id,
      post_id: comment.post_id,
      author: comment.author,
      author_short: comment.author.truncated(),
      content: comment.content.clone(),
      created_at: comment.created_at,
      date: format_date(comment.created_at),
      age: relative_age(comment.created_at, self.now),
    }
  }

  /// Live posts, newest first.
  pub fn feed<'a>(&self, posts: impl IntoIterator<Item = &'a Post>) -> Vec<PostView> {
    let mut feed: Vec<_> = posts
      .into_iter()
      .filter(|post| !post.is_deleted)
      .map(|post| self.post(post))
      .collect();
    feed.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    feed
  }

  /// Live comments, newest first.
  pub fn thread<'a>(
    &self,
    comments: impl IntoIterator<Item = &'a Comment>,
  ) -> Vec<CommentView> {
    let mut thread: Vec<_> = comments
      .into_iter()
      .filter(|comment| !comment.is_deleted)
      .map(|comment| self.comment(comment))
      .collect();
    thread.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    thread
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{format_date, relative_age, ViewModelMapper},
    twitter_primitives::{Address, Comment, Post, UserProfile},
  };

  // 2025-01-05T12:00:00Z
  const JAN_5_2025: u64 = 1_736_078_400;

  fn post(id: u64, created_at: u64, is_deleted: bool) -> Post {
    Post {
      post_id: id,
      author: Address::new([0x11; 32]),
      collaborator: None,
      content: format!("post {id}"),
      image_url: Some(String::new()),
      likes_count: 0,
      comments_count: 0,
      created_at,
      updated_at: created_at,
      is_deleted,
      is_collaboration: false,
    }
  }

  #[test]
  fn calendar_dates() {
    assert_eq!(format_date(JAN_5_2025), "Jan 5, 2025");
    assert_eq!(format_date(0), "Jan 1, 1970");
  }

  #[test]
  fn relative_ages() {
    let now = JAN_5_2025;
    assert_eq!(relative_age(now - 5, now), "just now");
    assert_eq!(relative_age(now + 30, now), "just now");
    assert_eq!(relative_age(now - 120, now), "2m ago");
    assert_eq!(relative_age(now - 3 * 3600, now), "3h ago");
    assert_eq!(relative_age(now - 2 * 86400, now), "2d ago");
    assert_eq!(relative_age(now - 30 * 86400, now), "Dec 6, 2024");
  }

  #[test]
  fn feed_hides_deleted_posts_and_sorts_newest_first() {
    let mapper = ViewModelMapper::at(JAN_5_2025);
    let posts = vec![
      post(1, JAN_5_2025 - 300, false),
      post(2, JAN_5_2025 - 100, true),
      post(3, JAN_5_2025 - 200, false),
      post(4, JAN_5_2025 - 200, false),
    ];

    let feed = mapper.feed(&posts);
    let ids: Vec<_> = feed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![4, 3, 1]);
    assert_eq!(feed[0].image_url, None);
    assert_eq!(feed[0].author_short, "29d2...hfV2");
    assert_eq!(feed[2].age, "5m ago");
  }

  #[test]
  fn comments_and_profiles() {
    let mapper = ViewModelMapper::at(JAN_5_2025);
    let comments = vec![
      Comment {
        comment_id: 1,
        post_id: 9,
        author: Address::new([0x22; 32]),
        content: "first".into(),
        created_at: JAN_5_2025 - 60,
        is_deleted: false,
      },
      Comment {
        comment_id: 2,
        post_id: 9,
        author: Address::new([0x22; 32]),
        content: "gone".into(),
        created_at: JAN_5_2025,
        is_deleted: true,
      },
    ];
    let thread = mapper.thread(&comments);
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].age, "1m ago");

    let profile = mapper.profile(&UserProfile {
      owner: Address::new([0x11; 32]),
      user_id: 1,
      username: "alice".into(),
      display_name: "Alice".into(),
      bio: "hi".into(),
      profile_image_url: "https://ipfs.io/ipfs/Qm".into(),
      followers_count: 2,
      following_count: 3,
      posts_count: 4,
      created_at: JAN_5_2025,
      total_donations_received: 0,
      is_verified: false,
    });
    assert_eq!(profile.avatar.as_deref(), Some("https://ipfs.io/ipfs/Qm"));
    assert_eq!(profile.joined, "Jan 5, 2025");
  }
}
