use {
  serde::{Deserialize, Serialize},
  std::{convert::Infallible, fmt::Display, str::FromStr},
};

/// Value of the Shyft API key in unconfigured environment files.
pub const SHYFT_KEY_PLACEHOLDER: &str = "your_shyft_api_key_here";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
  MainnetBeta,
  Testnet,
  #[default]
  Devnet,
  Localhost,
}

impl Cluster {
  pub const fn name(&self) -> &'static str {
    match self {
      Cluster::MainnetBeta => "mainnet-beta",
      Cluster::Testnet => "testnet",
      Cluster::Devnet => "devnet",
      Cluster::Localhost => "localhost",
    }
  }

  /// RPC endpoint of the cluster. Devnet goes through Shyft when
  /// a real API key is configured.
  pub fn endpoint(&self, shyft_api_key: Option<&str>) -> String {
    match self {
      Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com".into(),
      Cluster::Testnet => "https://api.testnet.solana.com".into(),
      Cluster::Devnet => match shyft_api_key.map(str::trim) {
        Some(key) if !key.is_empty() && key != SHYFT_KEY_PLACEHOLDER => {
          format!("https://devnet-rpc.shyft.to?api_key={key}")
        }
        _ => "https://api.devnet.solana.com".into(),
      },
      Cluster::Localhost => "http://127.0.0.1:8899".into(),
    }
  }
}

impl Display for Cluster {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

/// Unknown cluster names fall back to devnet.
impl FromStr for Cluster {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "mainnet-beta" => Cluster::MainnetBeta,
      "testnet" => Cluster::Testnet,
      "localhost" => Cluster::Localhost,
      _ => Cluster::Devnet,
    })
  }
}

/// Picks the RPC endpoint, an explicit URL wins over the cluster name.
pub fn resolve_endpoint(
  cluster: Cluster,
  rpc_url: Option<&str>,
  shyft_api_key: Option<&str>,
) -> String {
  match rpc_url.map(str::trim) {
    Some(url) if !url.is_empty() => url.to_owned(),
    _ => cluster.endpoint(shyft_api_key),
  }
}

#[cfg(test)]
mod tests {
  use super::{resolve_endpoint, Cluster, SHYFT_KEY_PLACEHOLDER};

  #[test]
  fn cluster_endpoints() {
    let cluster = |name: &str| name.parse::<Cluster>().unwrap();
    assert_eq!(
      cluster("mainnet-beta").endpoint(None),
      "https://api.mainnet-beta.solana.com"
    );
    assert_eq!(
      cluster("testnet").endpoint(None),
      "https://api.testnet.solana.com"
    );
    assert_eq!(cluster("localhost").endpoint(None), "http://127.0.0.1:8899");
    assert_eq!(cluster("moonnet"), Cluster::Devnet);
    assert_eq!(
      cluster("devnet").endpoint(None),
      "https://api.devnet.solana.com"
    );
  }

  #[test]
  fn shyft_key_only_applies_to_devnet() {
    assert_eq!(
      Cluster::Devnet.endpoint(Some("abc")),
      "https://devnet-rpc.shyft.to?api_key=abc"
    );
    assert_eq!(
      Cluster::Devnet.endpoint(Some(SHYFT_KEY_PLACEHOLDER)),
      "https://api.devnet.solana.com"
    );
    assert_eq!(
      Cluster::Testnet.endpoint(Some("abc")),
      "https://api.testnet.solana.com"
    );
  }

  #[test]
  fn explicit_rpc_url_wins() {
    assert_eq!(
      resolve_endpoint(Cluster::MainnetBeta, Some("http://node:8899"), None),
      "http://node:8899"
    );
    assert_eq!(
      resolve_endpoint(Cluster::Localhost, Some(""), None),
      "http://127.0.0.1:8899"
    );
  }
}
