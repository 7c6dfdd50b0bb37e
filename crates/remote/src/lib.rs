//! HTTP client for the avatar-video rendering service, plus the
//! cancellable status poll loop.
//!
//! [`api::VideoApi`] wraps the service's REST endpoints with
//! [`reqwest`]; [`watch::watch_video`] drives a job from submission to
//! a terminal status at a fixed cadence. Consumers depend on the
//! [`api::RenderService`] trait so the network edge can be faked in
//! tests.

pub mod api;
pub mod watch;

pub use api::{
    CreateVideoResponse, RenderService, VideoApi, VideoApiError, VideoStatusResponse,
    DEFAULT_BASE_URL,
};
pub use watch::{watch_video, CompletedVideo, PollConfig, WatchError};
