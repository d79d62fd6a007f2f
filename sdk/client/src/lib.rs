//! Client SDK for the Twitter Platform program.
//!
//! Actions flow through [`RequestBuilder`], which derives every account
//! address with [`AddressDeriver`], into [`ChainGateway`], which signs,
//! sends and confirms them. Fetched accounts are turned into display
//! shapes by [`ViewModelMapper`]. [`ClientContext`] ties all of these to a
//! connected wallet.

mod builder;
mod cluster;
mod context;
mod derive;
mod gateway;
mod image;
mod media;
mod optimistic;
mod reader;
mod request;
mod view;
mod wallet;

pub mod validate;

pub use {
  builder::{ProfileUpdate, RequestBuilder},
  cluster::{resolve_endpoint, Cluster, SHYFT_KEY_PLACEHOLDER},
  context::{ActionError, ClientContext, Created, WalletUnavailable},
  derive::AddressDeriver,
  gateway::{ChainGateway, GatewayConfig, SubmissionFailure},
  image::{
    Gateways,
    ImageLoad,
    ImageLoader,
    ImageResolution,
    ImageResolver,
    ImageSource,
    DEFAULT_GATEWAYS,
  },
  media::{attach, MediaAttachment, MediaError, MediaStore, MAX_MEDIA_SIZE},
  optimistic::{CommentThread, LikeState},
  reader::{Degrade, FetchError, Reader},
  request::{ActionKind, Args, InstructionRequest, NamedAccount},
  validate::ValidationError,
  view::{
    format_date,
    relative_age,
    CommentView,
    PostView,
    ProfileView,
    ViewModelMapper,
  },
  wallet::{SignError, Wallet},
};
