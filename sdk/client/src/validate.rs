//! Local checks applied to action arguments before anything is built.
//!
//! They mirror the limits the program enforces so that invalid input is
//! reported immediately instead of costing a failed transaction. All
//! lengths are measured in UTF-8 bytes.

use {thiserror::Error, twitter_primitives::Address};

pub const MAX_USERNAME_LENGTH: usize = 20;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 50;
pub const MAX_BIO_LENGTH: usize = 160;
pub const MAX_POST_CONTENT_LENGTH: usize = 280;
pub const MAX_COMMENT_LENGTH: usize = 140;
pub const MAX_IMAGE_URL_LENGTH: usize = 256;

/// 0.02 SOL.
pub const MIN_DONATION_AMOUNT: u64 = 20_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("{0} must not be empty")]
  Empty(&'static str),

  #[error("{field} is {len} bytes long, at most {max} bytes are allowed")]
  TooLong {
    field: &'static str,
    len: usize,
    max: usize,
  },

  #[error("Username may only contain letters, digits and underscores")]
  InvalidUsername,

  #[error("Cannot {0} yourself")]
  SelfTarget(&'static str),

  #[error("Donation of {0} lamports is below the minimum of 20000000")]
  DonationTooSmall(u64),

  #[error("The {0} counter is exhausted")]
  CounterExhausted(&'static str),
}

fn bounded(
  field: &'static str,
  value: &str,
  max: usize,
) -> Result<(), ValidationError> {
  match value.len() {
    len if len > max => Err(ValidationError::TooLong { field, len, max }),
    _ => Ok(()),
  }
}

/// Trims the value and checks that something within the limit is left.
fn required(
  field: &'static str,
  value: &str,
  max: usize,
) -> Result<String, ValidationError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(ValidationError::Empty(field));
  }
  bounded(field, value, max)?;
  Ok(value.to_owned())
}

pub fn username(value: &str) -> Result<String, ValidationError> {
  let value = required("Username", value, MAX_USERNAME_LENGTH)?;
  match value
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || c == '_')
  {
    true => Ok(value),
    false => Err(ValidationError::InvalidUsername),
  }
}

pub fn display_name(value: &str) -> Result<String, ValidationError> {
  required("Display name", value, MAX_DISPLAY_NAME_LENGTH)
}

pub fn bio(value: &str) -> Result<String, ValidationError> {
  required("Bio", value, MAX_BIO_LENGTH)
}

pub fn post_content(value: &str) -> Result<String, ValidationError> {
  required("Post content", value, MAX_POST_CONTENT_LENGTH)
}

pub fn comment_content(value: &str) -> Result<String, ValidationError> {
  required("Comment", value, MAX_COMMENT_LENGTH)
}

/// Image URLs may be empty, an empty URL means no image.
pub fn image_url(value: &str) -> Result<String, ValidationError> {
  let value = value.trim();
  bounded("Image URL", value, MAX_IMAGE_URL_LENGTH)?;
  Ok(value.to_owned())
}

/// Checks a partial profile update value.
///
/// Provided values are submitted as-is, including empty strings which
/// explicitly clear the field, so only the length is checked.
pub fn update_field(
  field: &'static str,
  value: Option<&str>,
  max: usize,
) -> Result<Option<String>, ValidationError> {
  value
    .map(|value| bounded(field, value, max).map(|_| value.to_owned()))
    .transpose()
}

/// Rejects actions a user tries to direct at themselves.
pub fn distinct(
  action: &'static str,
  caller: &Address,
  target: &Address,
) -> Result<(), ValidationError> {
  match caller == target {
    true => Err(ValidationError::SelfTarget(action)),
    false => Ok(()),
  }
}

pub fn donation_amount(amount: u64) -> Result<u64, ValidationError> {
  match amount < MIN_DONATION_AMOUNT {
    true => Err(ValidationError::DonationTooSmall(amount)),
    false => Ok(amount),
  }
}

/// Id of the next post or comment given the current counter value.
pub fn next_id(counter: &'static str, count: u64) -> Result<u64, ValidationError> {
  count
    .checked_add(1)
    .ok_or(ValidationError::CounterExhausted(counter))
}
