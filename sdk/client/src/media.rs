use {thiserror::Error, tracing::warn};

/// Largest file accepted for upload, 5 MiB.
pub const MAX_MEDIA_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
  #[error("Unsupported media type '{0}', only images and videos are allowed")]
  UnsupportedType(String),

  #[error("File is {0} bytes, at most 5 MiB are allowed")]
  TooLarge(usize),

  #[error("Upload failed: {0}")]
  Upload(String),
}

/// A file the user wants to attach to a post or profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
  pub name: String,
  pub mime_type: String,
  pub bytes: Vec<u8>,
}

impl MediaAttachment {
  pub fn check(&self) -> Result<(), MediaError> {
    let mime = self.mime_type.to_ascii_lowercase();
    if !(mime.starts_with("image/") || mime.starts_with("video/")) {
      return Err(MediaError::UnsupportedType(self.mime_type.clone()));
    }
    if self.bytes.len() > MAX_MEDIA_SIZE {
      return Err(MediaError::TooLarge(self.bytes.len()));
    }
    Ok(())
  }
}

/// Content-addressed file storage.
#[allow(async_fn_in_trait)]
pub trait MediaStore {
  /// Stores the file and returns a reference to it that fits
  /// into an image URL field.
  async fn upload(&self, attachment: &MediaAttachment) -> Result<String, MediaError>;
}

/// Checks and uploads an optional attachment.
///
/// Any failure degrades to no media, a post is never lost because
/// its image could not be stored.
pub async fn attach(
  store: &impl MediaStore,
  attachment: Option<&MediaAttachment>,
) -> Option<String> {
  let attachment = attachment?;
  let uploaded = match attachment.check() {
    Ok(()) => store.upload(attachment).await,
    Err(e) => Err(e),
  };

  match uploaded {
    Ok(reference) => Some(reference),
    Err(e) => {
      warn!("continuing without {}: {e}", attachment.name);
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{attach, MediaAttachment, MediaError, MediaStore, MAX_MEDIA_SIZE};

  struct Store(Result<String, MediaError>);

  impl MediaStore for Store {
    async fn upload(&self, _: &MediaAttachment) -> Result<String, MediaError> {
      self.0.clone()
    }
  }

  fn file(mime: &str, size: usize) -> MediaAttachment {
    MediaAttachment {
      name: "cat".into(),
      mime_type: mime.into(),
      bytes: vec![0; size],
    }
  }

  #[test]
  fn type_and_size_checks() {
    assert!(file("image/png", MAX_MEDIA_SIZE).check().is_ok());
    assert!(file("video/mp4", 10).check().is_ok());
    assert_eq!(
      file("image/png", MAX_MEDIA_SIZE + 1).check(),
      Err(MediaError::TooLarge(MAX_MEDIA_SIZE + 1))
    );
    assert!(matches!(
      file("application/pdf", 10).check(),
      Err(MediaError::UnsupportedType(_))
    ));
  }

  #[tokio::test]
  async fn failed_uploads_degrade_to_no_media() {
    let ok = Store(Ok("https://gateway.pinata.cloud/ipfs/Qm".into()));
    let broken = Store(Err(MediaError::Upload("503".into())));
    let png = file("image/png", 10);

    assert_eq!(
      attach(&ok, Some(&png)).await.as_deref(),
      Some("https://gateway.pinata.cloud/ipfs/Qm")
    );
    assert_eq!(attach(&broken, Some(&png)).await, None);
    assert_eq!(attach(&ok, Some(&file("text/plain", 1))).await, None);
    assert_eq!(attach(&ok, None).await, None);
  }
}
