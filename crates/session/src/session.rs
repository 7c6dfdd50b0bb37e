//! One generation session: the explicit owner of the single in-flight
//! job, the poll cancellation token, and the notification channel.
//!
//! Every request arriving over the UI boundary is handled here; every
//! error raised by the submitter, poller, or committer is caught and
//! rendered into exactly one terminal [`Notification`]. Nothing
//! escapes across the boundary as a panic or unhandled error. Tearing
//! the session down cancels the pending poll timer, after which no
//! further status queries are issued and no notification fires.

use std::sync::Arc;

use castkit_core::validation::validate_credential;
use castkit_core::{GenerateError, Job, JobRequest, JobStatus, Outcome};
use castkit_host::{CredentialStore, HostCanvas, Notice};
use castkit_remote::{watch_video, RenderService, VideoApiError, WatchError};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use crate::committer::{commit_asset, CommitOutcome};
use crate::config::SessionConfig;
use crate::messages::{Notification, UiRequest};

/// Buffer capacity for the notification channel.
const NOTIFICATION_CAPACITY: usize = 64;

/// A single-user generation session.
///
/// Holds at most one in-flight [`Job`]; a second submission while one
/// is running is rejected without disturbing the active job.
pub struct GenerationSession {
    service: Arc<dyn RenderService>,
    canvas: Arc<dyn HostCanvas>,
    store: Arc<dyn CredentialStore>,
    config: SessionConfig,
    notifications: broadcast::Sender<Notification>,
    /// Cancelled on teardown; observed by the poll loop.
    cancel: CancellationToken,
    /// The single job slot. The guard is held for the whole attempt,
    /// so `try_lock` failing is exactly the busy condition.
    active: Mutex<Option<Job>>,
}

impl GenerationSession {
    pub fn new(
        service: Arc<dyn RenderService>,
        canvas: Arc<dyn HostCanvas>,
        store: Arc<dyn CredentialStore>,
        config: SessionConfig,
    ) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            service,
            canvas,
            store,
            config,
            notifications,
            cancel: CancellationToken::new(),
            active: Mutex::new(None),
        }
    }

    /// Subscribe to notifications emitted by this session.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Tear the session down: cancels any pending poll timer. A watch
    /// interrupted this way emits no terminal notification.
    pub fn shutdown(&self) {
        tracing::info!("Session shutting down, cancelling pending polls");
        self.cancel.cancel();
    }

    /// Handle one request from the UI boundary.
    pub async fn handle(&self, request: UiRequest) {
        match request {
            UiRequest::GetCredential => self.send_credential().await,
            UiRequest::SaveCredential { value } => self.save_credential(&value).await,
            UiRequest::SubmitAndTrack {
                title,
                script_text,
                avatar_id,
                background,
            } => {
                let request = JobRequest::new(title, script_text, avatar_id, background);
                self.submit_and_track(request).await;
            }
        }
    }

    // ---- credential requests ----

    async fn send_credential(&self) {
        let value = match self.store.get(&self.config.credential_key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(error = %err, "Failed to read credential");
                None
            }
        };
        self.publish(Notification::Credential { value });
    }

    async fn save_credential(&self, value: &str) {
        match self.store.set(&self.config.credential_key, value).await {
            Ok(()) => self.canvas.notify(Notice::info("API credential saved")).await,
            Err(err) => {
                tracing::error!(error = %err, "Failed to save credential");
                self.canvas
                    .notify(Notice::error(format!("Failed to save credential: {err}")))
                    .await;
            }
        }
    }

    // ---- generation ----

    /// Run one full attempt: submit, poll, commit, and emit exactly one
    /// terminal notification (none if the session was torn down first).
    async fn submit_and_track(&self, request: JobRequest) {
        let mut slot = match self.active.try_lock() {
            Ok(slot) => slot,
            Err(_) => {
                tracing::warn!("Rejected submission: a job is already in progress");
                self.publish(Notification::GenerationFailed {
                    error: GenerateError::Busy.to_string(),
                });
                return;
            }
        };

        let outcome = self.run_attempt(&request, &mut slot).await;
        // The attempt is over; discard the job record.
        *slot = None;

        match outcome {
            Some(outcome) => self.publish(outcome_notification(outcome)),
            None => tracing::info!("Generation attempt cancelled, no outcome emitted"),
        }
    }

    /// Returns `None` only when the session was cancelled mid-attempt.
    async fn run_attempt(&self, request: &JobRequest, slot: &mut Option<Job>) -> Option<Outcome> {
        match self.try_generate(request, slot).await {
            Ok(CommitOutcome::Inserted) => Some(Outcome::Inserted),
            Ok(CommitOutcome::Degraded { reason }) => Some(Outcome::InsertedDegraded { reason }),
            Err(AttemptError::Cancelled) => None,
            Err(AttemptError::Error(err)) => {
                tracing::error!(error = %err, "Generation attempt failed");
                self.canvas
                    .notify(Notice::error("Failed to insert video"))
                    .await;
                Some(Outcome::Failed {
                    error: err.to_string(),
                })
            }
        }
    }

    async fn try_generate(
        &self,
        request: &JobRequest,
        slot: &mut Option<Job>,
    ) -> Result<CommitOutcome, AttemptError> {
        let credential = self
            .store
            .get(&self.config.credential_key)
            .await
            .map_err(|err| GenerateError::Auth(format!("credential store unavailable: {err}")))?
            .unwrap_or_default();
        validate_credential(&credential)?;

        // Submit. No retry: resubmitting is a user decision, since every
        // accepted render consumes account credits.
        let created = self
            .service
            .create_video(&credential, request)
            .await
            .map_err(remote_error)?;
        *slot = Some(Job::new(created.id.clone()));

        // Poll to a terminal status.
        let poll_config = self.config.poll_config();
        let completed = watch_video(
            self.service.as_ref(),
            &credential,
            &created.id,
            &poll_config,
            &self.cancel,
            |status| {
                if let Some(job) = slot.as_mut() {
                    job.status = status;
                }
                self.publish(Notification::GenerationStatus {
                    status: status.to_string(),
                });
            },
        )
        .await
        .map_err(watch_error)?;

        if let Some(job) = slot.as_mut() {
            job.status = JobStatus::Complete;
            job.primary_asset_url = Some(completed.primary_url.clone());
            job.fallback_asset_url = completed.fallback_url.clone();
        }

        // Download and commit.
        let outcome = commit_asset(
            self.canvas.as_ref(),
            self.service.as_ref(),
            &completed.primary_url,
            completed.fallback_url.as_deref(),
            &request.title,
        )
        .await?;
        Ok(outcome)
    }

    /// Publish a notification, ignoring the send error — it only means
    /// there are zero receivers.
    fn publish(&self, notification: Notification) {
        let _ = self.notifications.send(notification);
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Attempt-internal error: either a domain failure or a teardown.
#[derive(Debug)]
enum AttemptError {
    Cancelled,
    Error(GenerateError),
}

impl From<GenerateError> for AttemptError {
    fn from(err: GenerateError) -> Self {
        AttemptError::Error(err)
    }
}

/// Map a remote API failure into the domain taxonomy.
fn remote_error(err: VideoApiError) -> GenerateError {
    match err {
        VideoApiError::Unauthorized { status, body } => {
            GenerateError::Auth(format!("{status}: {body}"))
        }
        VideoApiError::Api { status, body } => GenerateError::Remote { status, body },
        VideoApiError::Request(err) => GenerateError::Network(err.to_string()),
    }
}

/// Map a poll-loop failure into the attempt result.
fn watch_error(err: WatchError) -> AttemptError {
    match err {
        WatchError::Cancelled => AttemptError::Cancelled,
        WatchError::Api(err) => remote_error(err).into(),
        WatchError::GenerationFailed { video_id } => {
            GenerateError::GenerationFailed { video_id }.into()
        }
        WatchError::MissingAssetUrl { video_id } => {
            GenerateError::MissingAsset { video_id }.into()
        }
        WatchError::TimedOut { video_id, checks } => {
            GenerateError::Timeout { video_id, checks }.into()
        }
    }
}

/// Render a terminal [`Outcome`] as its boundary notification.
fn outcome_notification(outcome: Outcome) -> Notification {
    match outcome {
        Outcome::Inserted => Notification::GenerationSucceeded,
        Outcome::InsertedDegraded { reason } => Notification::GenerationDegraded { reason },
        Outcome::Failed { error } => Notification::GenerationFailed { error },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- error mapping ----------------------------------------------------

    #[test]
    fn unauthorized_maps_to_auth() {
        let err = remote_error(VideoApiError::Unauthorized {
            status: 401,
            body: "bad key".into(),
        });
        assert_matches!(err, GenerateError::Auth(_));
    }

    #[test]
    fn api_failure_maps_to_remote() {
        let err = remote_error(VideoApiError::Api {
            status: 422,
            body: "unknown avatar".into(),
        });
        assert_matches!(err, GenerateError::Remote { status: 422, .. });
    }

    #[test]
    fn watch_cancellation_is_not_a_domain_error() {
        assert_matches!(watch_error(WatchError::Cancelled), AttemptError::Cancelled);
    }

    #[test]
    fn watch_terminal_failures_map_into_the_taxonomy() {
        assert_matches!(
            watch_error(WatchError::MissingAssetUrl { video_id: "v".into() }),
            AttemptError::Error(GenerateError::MissingAsset { .. })
        );
        assert_matches!(
            watch_error(WatchError::GenerationFailed { video_id: "v".into() }),
            AttemptError::Error(GenerateError::GenerationFailed { .. })
        );
        assert_matches!(
            watch_error(WatchError::TimedOut { video_id: "v".into(), checks: 3 }),
            AttemptError::Error(GenerateError::Timeout { checks: 3, .. })
        );
    }

    // -- outcome rendering ----------------------------------------------------

    #[test]
    fn outcomes_render_to_their_notifications() {
        assert_eq!(
            outcome_notification(Outcome::Inserted),
            Notification::GenerationSucceeded
        );
        assert_eq!(
            outcome_notification(Outcome::InsertedDegraded { reason: "r".into() }),
            Notification::GenerationDegraded { reason: "r".into() }
        );
        assert_eq!(
            outcome_notification(Outcome::Failed { error: "e".into() }),
            Notification::GenerationFailed { error: "e".into() }
        );
    }
}
