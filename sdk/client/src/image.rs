use tracing::{debug, warn};

/// Public IPFS gateways, tried in this order.
pub const DEFAULT_GATEWAYS: [&str; 4] = [
  "https://ipfs.io/ipfs/",
  "https://gateway.pinata.cloud/ipfs/",
  "https://cloudflare-ipfs.com/ipfs/",
  "https://dweb.link/ipfs/",
];

/// Ordered list of gateway URL prefixes, a content hash is appended
/// to each of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateways(Vec<String>);

impl Default for Gateways {
  fn default() -> Self {
    Self(DEFAULT_GATEWAYS.iter().map(|g| (*g).to_owned()).collect())
  }
}

impl Gateways {
  pub fn new(prefixes: impl IntoIterator<Item = String>) -> Self {
    Self(prefixes.into_iter().collect())
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn url(&self, index: usize, hash: &str) -> Option<String> {
    self.0.get(index).map(|prefix| format!("{prefix}{hash}"))
  }
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
  /// Content hash of an IPFS object, loadable through any gateway.
  Content(String),

  /// A plain URL without a recognizable content hash.
  Url(String),
}

impl ImageSource {
  /// Reduces a source URL to its content hash, which is the path
  /// segment right after `/ipfs/`. A bare CID is taken as is.
  pub fn parse(src: &str) -> Self {
    let src = src.trim();
    if let Some((_, rest)) = src.split_once("/ipfs/") {
      let hash = rest.split(&['/', '?', '#'][..]).next().unwrap_or_default();
      if !hash.is_empty() {
        return ImageSource::Content(hash.to_owned());
      }
    } else if is_bare_cid(src) {
      return ImageSource::Content(src.to_owned());
    }
    ImageSource::Url(src.to_owned())
  }
}

/// CIDv0 hashes start with "Qm", CIDv1 in base32 with "b".
fn is_bare_cid(src: &str) -> bool {
  let plausible = (src.starts_with("Qm") && src.len() == 46)
    || (src.starts_with("bafy") && src.len() > 50);
  plausible && src.chars().all(|c| c.is_ascii_alphanumeric())
}

/// State of a single display attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLoad {
  /// Loading from the gateway at this index.
  Pending { attempt: usize, url: String },
  Resolved { url: String },
  Unavailable,
}

/// Failover state machine for one display attempt.
///
/// Starts at the first gateway and moves to the next one on every load
/// failure, never going back. After the last gateway fails the image
/// is unavailable. A source without a content hash gets a single try
/// at its own URL.
#[derive(Debug, Clone)]
pub struct ImageResolution {
  source: ImageSource,
  gateways: Gateways,
  state: ImageLoad,
}

impl ImageResolution {
  pub fn start(source: ImageSource, gateways: Gateways) -> Self {
    let state = match &source {
      ImageSource::Content(hash) => match gateways.url(0, hash) {
        Some(url) => ImageLoad::Pending { attempt: 0, url },
        None => ImageLoad::Unavailable,
      },
      ImageSource::Url(url) if url.is_empty() => ImageLoad::Unavailable,
      ImageSource::Url(url) => ImageLoad::Pending {
        attempt: 0,
        url: url.clone(),
      },
    };

    Self {
      source,
      gateways,
      state,
    }
  }

  pub fn state(&self) -> &ImageLoad {
    &self.state
  }

  /// The current URL loaded successfully.
  pub fn loaded(&mut self) {
    if let ImageLoad::Pending { url, .. } = &self.state {
      self.state = ImageLoad::Resolved { url: url.clone() };
    }
  }

  /// The current URL failed to load, moves on to the next gateway.
  pub fn failed(&mut self) {
    let ImageLoad::Pending { attempt, .. } = self.state else {
      return;
    };

    let next = match &self.source {
      ImageSource::Content(hash) => self.gateways.url(attempt + 1, hash),
      ImageSource::Url(_) => None,
    };

    self.state = match next {
      Some(url) => ImageLoad::Pending {
        attempt: attempt + 1,
        url,
      },
      None => ImageLoad::Unavailable,
    };
  }
}

/// Fetches an image from a URL, the display layer decides what
/// counts as a successful load.
#[allow(async_fn_in_trait)]
pub trait ImageLoader {
  async fn load(&self, url: &str) -> Result<(), String>;
}

/// Resolves image references through the gateway list.
#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
  gateways: Gateways,
}

impl ImageResolver {
  pub fn new(gateways: Gateways) -> Self {
    Self { gateways }
  }

  pub fn gateways(&self) -> &Gateways {
    &self.gateways
  }

  pub fn start(&self, src: &str) -> ImageResolution {
    ImageResolution::start(ImageSource::parse(src), self.gateways.clone())
  }

  /// URLs a display attempt would try, in order.
  pub fn candidates(&self, src: &str) -> Vec<String> {
    let mut resolution = self.start(src);
    let mut urls = vec![];
    while let ImageLoad::Pending { url, .. } = resolution.state() {
      urls.push(url.clone());
      resolution.failed();
    }
    urls
  }

  /// Runs one display attempt to completion. Every call starts over
  /// from the first gateway.
  pub async fn resolve(&self, loader: &impl ImageLoader, src: &str) -> ImageLoad {
    let mut resolution = self.start(src);
    while let ImageLoad::Pending { attempt, url } = resolution.state().clone() {
      match loader.load(&url).await {
        Ok(()) => resolution.loaded(),
        Err(e) => {
          debug!("image load #{attempt} from {url} failed: {e}");
          resolution.failed();
        }
      }
    }

    if resolution.state() == &ImageLoad::Unavailable {
      warn!("image {src} unavailable on all gateways");
    }
    resolution.state().clone()
  }
}
