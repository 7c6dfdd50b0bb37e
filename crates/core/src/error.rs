//! The error taxonomy for one generation attempt.
//!
//! Every failure inside the submitter, poller, or committer is mapped
//! into a [`GenerateError`] at the orchestration boundary and rendered
//! to a string for the terminal `generation-failed` notification.
//! Only [`GenerateError::EnvironmentLimitation`] is locally recoverable
//! (via the degraded image fallback); everything else is fatal to the
//! current attempt.

use crate::job::AssetKind;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The credential was missing or rejected by the rendering service.
    /// User-correctable; surfaced verbatim.
    #[error("Credential rejected by the rendering service: {0}")]
    Auth(String),

    /// Transport-level failure at submission, polling, or download.
    /// Never retried automatically.
    #[error("Network failure: {0}")]
    Network(String),

    /// The rendering service returned a non-success response.
    #[error("Rendering service error ({status}): {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// The job reported `complete` but carried no primary asset URL.
    /// A service contract violation, never treated as success.
    #[error("Video {video_id} completed without a download URL")]
    MissingAsset {
        /// Service-assigned job identifier.
        video_id: String,
    },

    /// The service reported the job as failed.
    #[error("Video {video_id} failed on the rendering service")]
    GenerationFailed {
        /// Service-assigned job identifier.
        video_id: String,
    },

    /// The poll loop gave up after its configured number of checks.
    #[error("Gave up waiting for video {video_id} after {checks} status checks")]
    Timeout {
        /// Service-assigned job identifier.
        video_id: String,
        /// Status checks performed before giving up.
        checks: u32,
    },

    /// The host context forbids motion content at the target location.
    /// Recoverable via the image fallback when one is available.
    #[error("Motion content is not allowed here: {reason}")]
    EnvironmentLimitation {
        /// Host-provided description of the limitation.
        reason: String,
    },

    /// Any other failure while mutating the host placeholder.
    #[error("Failed to commit asset to the placeholder: {0}")]
    Commit(String),

    /// Fetching an asset payload failed. The kind distinguishes the
    /// primary download from the fallback download for diagnostics.
    #[error("Failed to download the {kind} asset: {detail}")]
    Download {
        /// Which asset fetch failed.
        kind: AssetKind,
        /// Underlying failure description.
        detail: String,
    },

    /// A generation job is already in flight for this session.
    #[error("A video generation job is already in progress")]
    Busy,

    /// A caller-supplied value failed validation before submission.
    #[error("Validation failed: {0}")]
    Validation(String),
}
