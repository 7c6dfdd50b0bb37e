//! End-to-end tests for [`GenerationSession`]: one scripted render
//! service plus the in-memory host, driven through the UI message
//! boundary. Timers are paused, so the 5s poll cadence costs nothing.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use castkit_core::request::{DEFAULT_AVATAR_ID, DEFAULT_SCRIPT_TEXT, DEFAULT_TITLE};
use castkit_core::{AssetKind, JobRequest};
use castkit_host::memory::{CommitBehavior, InMemoryCanvas, InMemoryCredentialStore};
use castkit_host::CredentialStore;
use castkit_remote::{CreateVideoResponse, RenderService, VideoApiError, VideoStatusResponse};
use castkit_session::{GenerationSession, Notification, SessionConfig, UiRequest};
use tokio::sync::broadcast;

const VIDEO_ID: &str = "vid_0001";
const MOTION_URL: &str = "https://cdn.example.com/vid_0001.mp4";
const IMAGE_URL: &str = "https://cdn.example.com/vid_0001.png";
const CREDENTIAL: &str = "sk-test-credential";

// ---------------------------------------------------------------------------
// Scripted render service
// ---------------------------------------------------------------------------

/// Render service with scripted status responses and an in-memory CDN.
/// Records every submitted request so tests can assert the wire shape.
struct ScriptedService {
    statuses: Mutex<VecDeque<VideoStatusResponse>>,
    assets: Mutex<HashMap<String, Vec<u8>>>,
    submitted: Mutex<Vec<JobRequest>>,
    status_calls: AtomicU32,
    reject_create: Option<(u16, String)>,
}

impl ScriptedService {
    fn new(statuses: Vec<VideoStatusResponse>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            assets: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            status_calls: AtomicU32::new(0),
            reject_create: None,
        }
    }

    /// Serve `data` for `url` from the fake CDN.
    fn with_asset(self, url: &str, data: &[u8]) -> Self {
        self.assets
            .lock()
            .expect("assets poisoned")
            .insert(url.to_string(), data.to_vec());
        self
    }

    /// Reject every submission with the given HTTP status.
    fn rejecting_create(mut self, status: u16, body: &str) -> Self {
        self.reject_create = Some((status, body.to_string()));
        self
    }

    fn submissions(&self) -> Vec<JobRequest> {
        self.submitted.lock().expect("submitted poisoned").clone()
    }

    fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderService for ScriptedService {
    async fn create_video(
        &self,
        _credential: &str,
        request: &JobRequest,
    ) -> Result<CreateVideoResponse, VideoApiError> {
        if let Some((status, body)) = &self.reject_create {
            return Err(match status {
                401 | 403 => VideoApiError::Unauthorized {
                    status: *status,
                    body: body.clone(),
                },
                _ => VideoApiError::Api {
                    status: *status,
                    body: body.clone(),
                },
            });
        }
        self.submitted
            .lock()
            .expect("submitted poisoned")
            .push(request.clone());
        Ok(CreateVideoResponse {
            id: VIDEO_ID.to_string(),
        })
    }

    async fn video_status(
        &self,
        _credential: &str,
        _video_id: &str,
    ) -> Result<VideoStatusResponse, VideoApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .expect("statuses poisoned")
            .pop_front()
            .unwrap_or_else(|| in_progress()))
    }

    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, VideoApiError> {
        self.assets
            .lock()
            .expect("assets poisoned")
            .get(url)
            .cloned()
            .ok_or_else(|| VideoApiError::Api {
                status: 404,
                body: format!("no such asset: {url}"),
            })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn in_progress() -> VideoStatusResponse {
    VideoStatusResponse {
        status: "in_progress".into(),
        download: None,
        thumbnail: None,
        thumbnail_url: None,
    }
}

fn complete(download: Option<&str>, thumbnail: Option<&str>) -> VideoStatusResponse {
    VideoStatusResponse {
        status: "complete".into(),
        download: download.map(str::to_string),
        thumbnail: thumbnail.map(str::to_string),
        thumbnail_url: None,
    }
}

fn failed() -> VideoStatusResponse {
    VideoStatusResponse {
        status: "failed".into(),
        download: None,
        thumbnail: None,
        thumbnail_url: None,
    }
}

struct Harness {
    session: Arc<GenerationSession>,
    service: Arc<ScriptedService>,
    canvas: Arc<InMemoryCanvas>,
    notifications: broadcast::Receiver<Notification>,
}

/// Wire a session around the given service with the credential already
/// stored.
async fn harness(service: ScriptedService) -> Harness {
    harness_with_config(service, SessionConfig::default()).await
}

async fn harness_with_config(service: ScriptedService, config: SessionConfig) -> Harness {
    let service = Arc::new(service);
    let canvas = Arc::new(InMemoryCanvas::new());
    let store = Arc::new(InMemoryCredentialStore::new());
    store
        .set(&config.credential_key, CREDENTIAL)
        .await
        .expect("seed credential");

    let session = Arc::new(GenerationSession::new(
        service.clone(),
        canvas.clone(),
        store,
        config,
    ));
    let notifications = session.subscribe();
    Harness {
        session,
        service,
        canvas,
        notifications,
    }
}

fn submit() -> UiRequest {
    UiRequest::SubmitAndTrack {
        title: "Launch teaser".into(),
        script_text: "Welcome to the launch.".into(),
        avatar_id: String::new(),
        background: String::new(),
    }
}

/// Everything published so far, in order.
fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        seen.push(notification);
    }
    seen
}

fn terminals(seen: &[Notification]) -> Vec<&Notification> {
    seen.iter().filter(|n| n.is_terminal()).collect()
}

// ---------------------------------------------------------------------------
// Success and degraded paths
// ---------------------------------------------------------------------------

/// The full happy path: submit, poll to complete, download, commit the
/// motion asset, and emit exactly one terminal notification.
#[tokio::test(start_paused = true)]
async fn motion_commit_succeeds_end_to_end() {
    let service = ScriptedService::new(vec![
        in_progress(),
        complete(Some(MOTION_URL), Some(IMAGE_URL)),
    ])
    .with_asset(MOTION_URL, b"motion-bytes")
    .with_asset(IMAGE_URL, b"image-bytes");
    let mut h = harness(service).await;

    h.session.handle(submit()).await;

    let seen = drain(&mut h.notifications);
    assert_eq!(
        seen,
        vec![
            Notification::GenerationStatus {
                status: "processing".into()
            },
            Notification::GenerationStatus {
                status: "complete".into()
            },
            Notification::GenerationSucceeded,
        ]
    );
    assert_eq!(terminals(&seen).len(), 1);

    // The placeholder carries the motion payload and holds focus.
    let focused = h.canvas.focused().expect("placeholder focused");
    let placeholder = h.canvas.placeholder(&focused).expect("placeholder exists");
    assert_eq!(placeholder.name, "Launch teaser");
    assert_eq!(
        placeholder.asset,
        Some((AssetKind::Motion, b"motion-bytes".to_vec()))
    );
    assert!(h
        .canvas
        .notices()
        .iter()
        .any(|notice| notice.message == "Video inserted"));
}

/// Blank request fields are replaced with the documented defaults
/// before the request reaches the service.
#[tokio::test(start_paused = true)]
async fn blank_fields_are_defaulted_on_the_wire() {
    let service = ScriptedService::new(vec![complete(Some(MOTION_URL), None)])
        .with_asset(MOTION_URL, b"motion-bytes");
    let mut h = harness(service).await;

    h.session
        .handle(UiRequest::SubmitAndTrack {
            title: String::new(),
            script_text: "  ".into(),
            avatar_id: String::new(),
            background: String::new(),
        })
        .await;

    let submissions = h.service.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].title, DEFAULT_TITLE);
    assert_eq!(submissions[0].script_text, DEFAULT_SCRIPT_TEXT);
    assert_eq!(submissions[0].avatar_id, DEFAULT_AVATAR_ID);

    let seen = drain(&mut h.notifications);
    assert_eq!(terminals(&seen), vec![&Notification::GenerationSucceeded]);
}

/// When the host refuses motion content, the static image is committed
/// onto the same placeholder and the attempt ends degraded.
#[tokio::test(start_paused = true)]
async fn environment_limitation_degrades_to_image() {
    let service = ScriptedService::new(vec![complete(Some(MOTION_URL), Some(IMAGE_URL))])
        .with_asset(MOTION_URL, b"motion-bytes")
        .with_asset(IMAGE_URL, b"image-bytes");
    let mut h = harness(service).await;
    h.canvas.set_motion_behavior(CommitBehavior::EnvironmentLimited(
        "Video fills are not supported on this plan".into(),
    ));

    h.session.handle(submit()).await;

    let seen = drain(&mut h.notifications);
    assert_eq!(
        terminals(&seen),
        vec![&Notification::GenerationDegraded {
            reason: "Video fills are not supported on this plan".into()
        }]
    );

    let focused = h.canvas.focused().expect("placeholder focused");
    let placeholder = h.canvas.placeholder(&focused).expect("placeholder exists");
    assert_eq!(
        placeholder.asset,
        Some((AssetKind::Image, b"image-bytes".to_vec()))
    );
}

/// A motion refusal with no fallback asset available fails the attempt
/// and removes the placeholder the attempt created.
#[tokio::test(start_paused = true)]
async fn limitation_without_fallback_fails_and_cleans_up() {
    let service = ScriptedService::new(vec![complete(Some(MOTION_URL), None)])
        .with_asset(MOTION_URL, b"motion-bytes");
    let mut h = harness(service).await;
    h.canvas.set_motion_behavior(CommitBehavior::EnvironmentLimited(
        "Video fills are not supported on this plan".into(),
    ));

    h.session.handle(submit()).await;

    let seen = drain(&mut h.notifications);
    let terminal = terminals(&seen);
    assert_eq!(terminal.len(), 1);
    assert!(matches!(
        terminal[0],
        Notification::GenerationFailed { .. }
    ));
    assert_eq!(h.canvas.placeholder_count(), 0);
    assert_eq!(h.canvas.removed_ids().len(), 1);
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

/// Without a stored credential nothing is submitted and the attempt
/// fails immediately.
#[tokio::test(start_paused = true)]
async fn missing_credential_fails_before_submission() {
    let service = Arc::new(ScriptedService::new(vec![]));
    let canvas = Arc::new(InMemoryCanvas::new());
    let store = Arc::new(InMemoryCredentialStore::new());
    let session = GenerationSession::new(
        service.clone(),
        canvas.clone(),
        store,
        SessionConfig::default(),
    );
    let mut rx = session.subscribe();

    session.handle(submit()).await;

    let seen = drain(&mut rx);
    let terminal = terminals(&seen);
    assert_eq!(terminal.len(), 1);
    assert!(matches!(
        terminal[0],
        Notification::GenerationFailed { .. }
    ));
    assert!(service.submissions().is_empty());
    assert_eq!(canvas.placeholder_count(), 0);
}

/// A rejected submission surfaces as a failed attempt without any
/// status polling.
#[tokio::test(start_paused = true)]
async fn rejected_submission_fails_without_polling() {
    let service =
        ScriptedService::new(vec![]).rejecting_create(401, "invalid API credential");
    let mut h = harness(service).await;

    h.session.handle(submit()).await;

    let seen = drain(&mut h.notifications);
    let terminal = terminals(&seen);
    assert_eq!(terminal.len(), 1);
    assert!(matches!(
        terminal[0],
        Notification::GenerationFailed { .. }
    ));
    assert_eq!(h.service.status_calls(), 0);
}

/// A job the service reports as failed ends the attempt without
/// touching the document.
#[tokio::test(start_paused = true)]
async fn render_failure_reports_failed_and_leaves_canvas_untouched() {
    let service = ScriptedService::new(vec![in_progress(), failed()]);
    let mut h = harness(service).await;

    h.session.handle(submit()).await;

    let seen = drain(&mut h.notifications);
    let terminal = terminals(&seen);
    assert_eq!(terminal.len(), 1);
    assert!(matches!(
        terminal[0],
        Notification::GenerationFailed { .. }
    ));
    assert_eq!(h.canvas.placeholder_count(), 0);
    assert_eq!(h.service.status_calls(), 2);
}

/// Terminal-complete without a download URL is a contract violation,
/// reported as a failure rather than a success.
#[tokio::test(start_paused = true)]
async fn complete_without_download_url_fails() {
    let service = ScriptedService::new(vec![complete(None, Some(IMAGE_URL))]);
    let mut h = harness(service).await;

    h.session.handle(submit()).await;

    let seen = drain(&mut h.notifications);
    let terminal = terminals(&seen);
    assert_eq!(terminal.len(), 1);
    assert!(matches!(
        terminal[0],
        Notification::GenerationFailed { .. }
    ));
    assert_eq!(h.canvas.placeholder_count(), 0);
}

/// The poll budget bounds how long a silent job is tracked.
#[tokio::test(start_paused = true)]
async fn poll_budget_exhaustion_fails_the_attempt() {
    let config = SessionConfig {
        max_poll_checks: Some(2),
        ..SessionConfig::default()
    };
    let mut h = harness_with_config(ScriptedService::new(vec![]), config).await;

    h.session.handle(submit()).await;

    let seen = drain(&mut h.notifications);
    let terminal = terminals(&seen);
    assert_eq!(terminal.len(), 1);
    assert!(matches!(
        terminal[0],
        Notification::GenerationFailed { .. }
    ));
    assert_eq!(h.service.status_calls(), 2);
}

// ---------------------------------------------------------------------------
// Concurrency and cancellation
// ---------------------------------------------------------------------------

/// A second submission while one is in flight is rejected as busy and
/// does not disturb the running attempt.
#[tokio::test(start_paused = true)]
async fn second_submission_is_rejected_while_busy() {
    let service = ScriptedService::new(vec![
        in_progress(),
        complete(Some(MOTION_URL), None),
    ])
    .with_asset(MOTION_URL, b"motion-bytes");
    let mut h = harness(service).await;

    let session = h.session.clone();
    let first = tokio::spawn(async move { session.handle(submit()).await });
    // Let the first attempt claim the job slot and park on its poll timer.
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    h.session.handle(submit()).await;
    first.await.expect("first attempt should not panic");

    let seen = drain(&mut h.notifications);
    let terminal = terminals(&seen);
    assert_eq!(terminal.len(), 2);
    // The rejection lands first: it is published before any poll fires.
    assert!(matches!(
        terminal[0],
        Notification::GenerationFailed { .. }
    ));
    assert_eq!(terminal[1], &Notification::GenerationSucceeded);
    // Only the first attempt ever reached the service.
    assert_eq!(h.service.submissions().len(), 1);
}

/// Tearing the session down mid-poll stops the watch without emitting
/// any terminal notification or touching the document.
#[tokio::test(start_paused = true)]
async fn shutdown_mid_poll_emits_no_outcome() {
    let service = ScriptedService::new(vec![]);
    let mut h = harness(service).await;

    let session = h.session.clone();
    let attempt = tokio::spawn(async move { session.handle(submit()).await });
    // The attempt submits and parks on its first poll timer.
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    h.session.shutdown();
    attempt.await.expect("attempt should not panic");

    assert!(drain(&mut h.notifications).is_empty());
    assert_eq!(h.service.status_calls(), 0);
    assert_eq!(h.canvas.placeholder_count(), 0);
}

// ---------------------------------------------------------------------------
// Credential requests
// ---------------------------------------------------------------------------

/// Credential save and read round-trip through the store, and reads
/// are idempotent.
#[tokio::test(start_paused = true)]
async fn credential_round_trip() {
    let service = Arc::new(ScriptedService::new(vec![]));
    let canvas = Arc::new(InMemoryCanvas::new());
    let store = Arc::new(InMemoryCredentialStore::new());
    let session = GenerationSession::new(
        service,
        canvas.clone(),
        store,
        SessionConfig::default(),
    );
    let mut rx = session.subscribe();

    session.handle(UiRequest::GetCredential).await;
    session
        .handle(UiRequest::SaveCredential {
            value: CREDENTIAL.into(),
        })
        .await;
    session.handle(UiRequest::GetCredential).await;
    session.handle(UiRequest::GetCredential).await;

    let seen = drain(&mut rx);
    assert_eq!(
        seen,
        vec![
            Notification::Credential { value: None },
            Notification::Credential {
                value: Some(CREDENTIAL.into())
            },
            Notification::Credential {
                value: Some(CREDENTIAL.into())
            },
        ]
    );
    assert!(canvas
        .notices()
        .iter()
        .any(|notice| notice.message == "API credential saved"));
}
