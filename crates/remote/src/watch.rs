//! Fixed-cadence status polling for an in-flight render job.
//!
//! [`watch_video`] sleeps one interval, queries the job status, and
//! repeats until a terminal status is observed, a check fails, the
//! configured check budget runs out, or the [`CancellationToken`] is
//! triggered. Cancellation is honored at every suspension point: once
//! the token fires, no further status queries are issued and no
//! callback runs.

use std::time::Duration;

use castkit_core::JobStatus;
use tokio_util::sync::CancellationToken;

use crate::api::{RenderService, VideoApiError};

/// Tunable parameters for the poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status checks. Render jobs run for minutes, so a
    /// constant light-touch cadence is used rather than backoff.
    pub interval: Duration,
    /// Upper bound on status checks before giving up; `None` polls
    /// forever.
    pub max_checks: Option<u32>,
}

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Default check budget (~20 minutes at the default cadence).
pub const DEFAULT_MAX_CHECKS: u32 = 240;

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_checks: Some(DEFAULT_MAX_CHECKS),
        }
    }
}

/// A job that reached `complete` with its asset URLs resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedVideo {
    /// Service-assigned job identifier.
    pub video_id: String,
    /// Primary (motion) asset URL.
    pub primary_url: String,
    /// Static fallback asset URL, if the service provided one.
    pub fallback_url: Option<String>,
}

/// Terminal failures of the poll loop.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// A status query failed. Terminal for the attempt: a failed check
    /// is not retried, the caller must resubmit.
    #[error(transparent)]
    Api(#[from] VideoApiError),

    /// The service reported the job as failed.
    #[error("video {video_id} failed on the rendering service")]
    GenerationFailed {
        /// Service-assigned job identifier.
        video_id: String,
    },

    /// The job completed but the response carried no download URL.
    #[error("video {video_id} completed without a download URL")]
    MissingAssetUrl {
        /// Service-assigned job identifier.
        video_id: String,
    },

    /// The configured check budget ran out before a terminal status.
    #[error("gave up on video {video_id} after {checks} status checks")]
    TimedOut {
        /// Service-assigned job identifier.
        video_id: String,
        /// Checks performed before giving up.
        checks: u32,
    },

    /// The watch was cancelled before reaching a terminal status.
    /// The caller must not emit a terminal notification for it.
    #[error("status watch cancelled")]
    Cancelled,
}

/// Poll a job until it completes, fails, or is cancelled.
///
/// `on_update` is invoked with the parsed status after every check; it
/// never runs after cancellation.
pub async fn watch_video<F>(
    service: &dyn RenderService,
    credential: &str,
    video_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_update: F,
) -> Result<CompletedVideo, WatchError>
where
    F: FnMut(JobStatus) + Send,
{
    let mut checks = 0u32;

    loop {
        if let Some(max) = config.max_checks {
            if checks >= max {
                tracing::warn!(video_id, checks, "Giving up on render job");
                return Err(WatchError::TimedOut {
                    video_id: video_id.to_string(),
                    checks,
                });
            }
        }

        // Wait one interval, bailing out immediately on cancellation.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(video_id, "Status watch cancelled");
                return Err(WatchError::Cancelled);
            }
            _ = tokio::time::sleep(config.interval) => {}
        }

        checks += 1;
        let response = service.video_status(credential, video_id).await?;
        let status = response.job_status();
        on_update(status);
        tracing::debug!(video_id, status = status.as_str(), checks, "Polled video status");

        match status {
            JobStatus::Complete => {
                return match response.download.clone() {
                    Some(primary_url) => Ok(CompletedVideo {
                        video_id: video_id.to_string(),
                        primary_url,
                        fallback_url: response.fallback_url().map(str::to_string),
                    }),
                    // Terminal-complete without a download URL is a
                    // service contract violation, not a success.
                    None => Err(WatchError::MissingAssetUrl {
                        video_id: video_id.to_string(),
                    }),
                };
            }
            JobStatus::Failed => {
                return Err(WatchError::GenerationFailed {
                    video_id: video_id.to_string(),
                })
            }
            JobStatus::Queued | JobStatus::Processing => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
