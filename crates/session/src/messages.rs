//! The typed message boundary between the orchestrator and its UI.
//!
//! Both directions are JSON-shaped, internally tagged on `type` with
//! kebab-case names. The set is closed: the UI sends [`UiRequest`]s,
//! the core emits [`Notification`]s, and every completed generation
//! attempt produces exactly one terminal notification.

use serde::{Deserialize, Serialize};

/// Requests the UI sends to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiRequest {
    /// Submit a render job and track it to a terminal outcome. Blank
    /// fields get the documented defaults.
    SubmitAndTrack {
        #[serde(default)]
        title: String,
        #[serde(default)]
        script_text: String,
        #[serde(default)]
        avatar_id: String,
        #[serde(default)]
        background: String,
    },
    /// Ask for the stored API credential.
    GetCredential,
    /// Persist a new API credential.
    SaveCredential { value: String },
}

/// Notifications the orchestrator emits toward the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    /// The stored credential (or `None` when unset), in response to
    /// [`UiRequest::GetCredential`].
    Credential { value: Option<String> },
    /// Non-terminal progress: the latest observed job status.
    GenerationStatus { status: String },
    /// The motion asset was committed.
    GenerationSucceeded,
    /// The image fallback was committed after an environment
    /// limitation.
    GenerationDegraded { reason: String },
    /// The attempt failed; `error` is a string rendering of the cause.
    GenerationFailed { error: String },
}

impl Notification {
    /// Whether this notification ends a generation attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Notification::GenerationSucceeded
                | Notification::GenerationDegraded { .. }
                | Notification::GenerationFailed { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
