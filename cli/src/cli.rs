use {
  clap::{Parser, Subcommand},
  humantime::Duration,
  twitter_primitives::{Address, Commitment, SeedLabel, SeedPart, PROGRAM_ID},
  twitter_sdk::{resolve_endpoint, Cluster, GatewayConfig},
};

/// Twitter Platform command line tools
///
/// Derives program account addresses, builds instruction requests
/// and resolves cluster and image gateway settings, all offline.
#[derive(Debug, Parser)]
pub struct CliOptions {
  /// Cluster name, unknown names fall back to devnet
  #[clap(
    long,
    env = "TWITTER_CLUSTER",
    default_value = "devnet",
    value_name = "NAME"
  )]
  pub cluster: String,

  /// Explicit RPC endpoint, overrides the cluster mapping
  #[clap(long, env = "TWITTER_RPC_URL", value_name = "URL")]
  pub rpc_url: Option<String>,

  /// Shyft API key used for devnet
  #[clap(long, env = "SHYFT_API_KEY", value_name = "KEY", hide_env_values = true)]
  pub shyft_api_key: Option<String>,

  /// Address of the deployed program
  #[clap(long, value_name = "ADDRESS", default_value_t = *PROGRAM_ID)]
  pub program_id: Address,

  /// Commitment a submission has to reach
  #[clap(long, default_value = "finalized", value_name = "LEVEL")]
  pub commitment: Commitment,

  /// How long to wait for a submission to be confirmed
  #[clap(long, default_value = "60s", value_name = "DURATION")]
  pub confirmation_timeout: Duration,

  /// Delay between two confirmation status queries
  #[clap(long, default_value = "500ms", value_name = "DURATION")]
  pub poll_interval: Duration,

  #[clap(subcommand)]
  pub command: Command,
}

impl CliOptions {
  pub fn cluster(&self) -> Cluster {
    self.cluster.parse().unwrap_or_default()
  }

  pub fn endpoint(&self) -> String {
    resolve_endpoint(
      self.cluster(),
      self.rpc_url.as_deref(),
      self.shyft_api_key.as_deref(),
    )
  }

  pub fn gateway_config(&self) -> GatewayConfig {
    GatewayConfig {
      commitment: self.commitment,
      confirmation_timeout: self.confirmation_timeout.into(),
      poll_interval: self.poll_interval.into(),
    }
  }
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Print the address of a program account
  Derive {
    /// Seed label, for example "post" or "user_profile"
    label: SeedLabel,

    /// Dynamic seed parts in order, numbers are ids and
    /// anything else a base58 address
    #[clap(value_parser = parse_part)]
    parts: Vec<SeedPart>,
  },

  /// Build an instruction request and print it as JSON
  Build {
    /// Address of the user performing the action
    #[clap(long, value_name = "ADDRESS")]
    caller: Address,

    #[clap(subcommand)]
    action: BuildAction,
  },

  /// Print the URLs an image is loaded from, in failover order
  Gateways {
    /// Image URL or bare content hash
    source: String,
  },

  /// Print the resolved RPC endpoint and submission settings
  Cluster,
}

#[derive(Debug, Clone, Subcommand)]
pub enum BuildAction {
  Initialize,
  CreateProfile {
    #[clap(long)]
    username: String,
    #[clap(long)]
    display_name: String,
    #[clap(long)]
    bio: String,
    #[clap(long, default_value = "")]
    image_url: String,
  },
  UpdateProfile {
    #[clap(long)]
    display_name: Option<String>,
    #[clap(long)]
    bio: Option<String>,
    #[clap(long)]
    image_url: Option<String>,
  },
  CreatePost {
    /// Current post counter of the platform
    #[clap(long)]
    post_count: u64,
    #[clap(long)]
    content: String,
    #[clap(long)]
    image_url: Option<String>,
  },
  CreateCollaborationPost {
    #[clap(long)]
    collaborator: Address,
    /// Current post counter of the platform
    #[clap(long)]
    post_count: u64,
    #[clap(long)]
    content: String,
    #[clap(long)]
    image_url: Option<String>,
  },
  DeletePost {
    #[clap(long)]
    post_id: u64,
  },
  LikePost {
    #[clap(long)]
    post_id: u64,
  },
  UnlikePost {
    #[clap(long)]
    post_id: u64,
  },
  CreateComment {
    /// Current comment counter of the platform
    #[clap(long)]
    comment_count: u64,
    #[clap(long)]
    post_id: u64,
    #[clap(long)]
    content: String,
  },
  DeleteComment {
    #[clap(long)]
    comment_id: u64,
    /// Post the comment belongs to
    #[clap(long)]
    post_id: u64,
  },
  FollowUser {
    #[clap(long)]
    target: Address,
  },
  UnfollowUser {
    #[clap(long)]
    target: Address,
  },
  DonateToCreator {
    #[clap(long)]
    creator: Address,
    /// Amount in lamports
    #[clap(long)]
    amount: u64,
  },
}

fn parse_part(value: &str) -> Result<SeedPart, String> {
  if let Ok(id) = value.parse::<u64>() {
    return Ok(SeedPart::Id(id));
  }
  value
    .parse::<Address>()
    .map(SeedPart::Key)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
  use {
    super::{BuildAction, CliOptions, Command},
    clap::Parser,
    twitter_primitives::{Address, SeedLabel, SeedPart},
  };

  #[test]
  fn derive_arguments() {
    let opts = CliOptions::parse_from([
      "twitter",
      "derive",
      "like",
      "29d2S7vB453rNYFdR5Ycwt7y9haRT5fwVwL9zTmBhfV2",
      "7",
    ]);
    match opts.command {
      Command::Derive { label, parts } => {
        assert_eq!(label, SeedLabel::Like);
        assert_eq!(parts, vec![
          SeedPart::Key(Address::new([0x11; 32])),
          SeedPart::Id(7)
        ]);
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn build_arguments_and_settings() {
    let opts = CliOptions::parse_from([
      "twitter",
      "--cluster",
      "localhost",
      "--confirmation-timeout",
      "5s",
      "build",
      "--caller",
      "29d2S7vB453rNYFdR5Ycwt7y9haRT5fwVwL9zTmBhfV2",
      "create-post",
      "--post-count",
      "41",
      "--content",
      "hello",
    ]);
    assert_eq!(opts.endpoint(), "http://127.0.0.1:8899");
    assert_eq!(
      opts.gateway_config().confirmation_timeout,
      std::time::Duration::from_secs(5)
    );
    assert!(matches!(
      opts.command,
      Command::Build {
        action: BuildAction::CreatePost { post_count: 41, .. },
        ..
      }
    ));
  }
}
