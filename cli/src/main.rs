use {
  crate::cli::{BuildAction, CliOptions, Command},
  clap::Parser,
  serde_json::json,
  tracing::{debug, subscriber::set_global_default},
  tracing_subscriber::{EnvFilter, FmtSubscriber},
  twitter_primitives::{Address, SeedLabel, SeedPart},
  twitter_sdk::{
    AddressDeriver,
    ImageResolver,
    InstructionRequest,
    ProfileUpdate,
    RequestBuilder,
  },
};

mod cli;

fn build(
  builder: &RequestBuilder,
  caller: &Address,
  action: BuildAction,
) -> anyhow::Result<InstructionRequest> {
  Ok(match action {
    BuildAction::Initialize => builder.initialize(caller),
    BuildAction::CreateProfile {
      username,
      display_name,
      bio,
      image_url,
    } => builder.create_profile(caller, &username, &display_name, &bio, &image_url)?,
    BuildAction::UpdateProfile {
      display_name,
      bio,
      image_url,
    } => builder.update_profile(caller, &ProfileUpdate {
      display_name,
      bio,
      profile_image_url: image_url,
    })?,
    BuildAction::CreatePost {
      post_count,
      content,
      image_url,
    } => builder.create_post(caller, post_count, &content, image_url.as_deref())?,
    BuildAction::CreateCollaborationPost {
      collaborator,
      post_count,
      content,
      image_url,
    } => builder.create_collaboration_post(
      caller,
      &collaborator,
      post_count,
      &content,
      image_url.as_deref(),
    )?,
    BuildAction::DeletePost { post_id } => builder.delete_post(caller, post_id),
    BuildAction::LikePost { post_id } => builder.like_post(caller, post_id),
    BuildAction::UnlikePost { post_id } => builder.unlike_post(caller, post_id),
    BuildAction::CreateComment {
      comment_count,
      post_id,
      content,
    } => builder.create_comment(caller, comment_count, post_id, &content)?,
    BuildAction::DeleteComment {
      comment_id,
      post_id,
    } => builder.delete_comment(caller, comment_id, post_id),
    BuildAction::FollowUser { target } => builder.follow_user(caller, &target)?,
    BuildAction::UnfollowUser { target } => {
      builder.unfollow_user(caller, &target)?
    }
    BuildAction::DonateToCreator { creator, amount } => {
      builder.donate_to_creator(caller, &creator, amount)?
    }
  })
}

fn derive(
  deriver: &AddressDeriver,
  label: SeedLabel,
  parts: &[SeedPart],
) -> anyhow::Result<serde_json::Value> {
  let (address, bump) = deriver.derive_with_bump(label, parts)?;
  Ok(json!({
    "label": label,
    "address": address,
    "bump": bump,
    "program_id": deriver.program_id(),
  }))
}

fn main() -> anyhow::Result<()> {
  // logs go to stderr, stdout carries the command output
  set_global_default(
    FmtSubscriber::builder()
      .with_env_filter(EnvFilter::from_default_env())
      .with_writer(std::io::stderr)
      .finish(),
  )?;

  let opts = CliOptions::parse();
  debug!("options: {opts:?}");

  let deriver = AddressDeriver::new(opts.program_id);
  let output = match &opts.command {
    Command::Derive { label, parts } => derive(&deriver, *label, parts)?,
    Command::Build { caller, action } => {
      let builder = RequestBuilder::new(deriver);
      serde_json::to_value(build(&builder, caller, action.clone())?)?
    }
    Command::Gateways { source } => {
      json!(ImageResolver::default().candidates(source))
    }
    Command::Cluster => {
      let config = opts.gateway_config();
      json!({
        "cluster": opts.cluster(),
        "endpoint": opts.endpoint(),
        "commitment": config.commitment,
        "confirmation_timeout_ms": config.confirmation_timeout.as_millis() as u64,
        "poll_interval_ms": config.poll_interval.as_millis() as u64,
      })
    }
  };

  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}
