//! Domain types for the avatar-video generation bridge.
//!
//! This crate is transport- and host-agnostic: it defines the job
//! request/status model, the terminal [`Outcome`] of one generation
//! attempt, the [`GenerateError`] taxonomy, and small validation
//! helpers. The HTTP client lives in `castkit-remote`, the host
//! collaborator seams in `castkit-host`, and the orchestration in
//! `castkit-session`.

pub mod error;
pub mod job;
pub mod request;
pub mod validation;

pub use error::GenerateError;
pub use job::{AssetKind, Job, JobStatus, Outcome};
pub use request::JobRequest;
