//! Host-canvas collaborator boundary.
//!
//! The host document owns every placeholder; the orchestrator holds
//! only transient [`PlaceholderId`] references for the duration of one
//! commit attempt. The commit call returns a structured
//! [`CommitFailure`] so the committer can distinguish the recoverable
//! environment-limitation case from every other failure without
//! inspecting error text.

use std::fmt;

use async_trait::async_trait;
use castkit_core::AssetKind;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in host-document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The host's currently visible viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Center of the visible area, in document coordinates.
    pub center: Point,
}

// ---------------------------------------------------------------------------
// Placeholder references and notices
// ---------------------------------------------------------------------------

/// Opaque, host-assigned identifier for a placeholder container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderId(pub String);

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transient, human-readable notice surfaced by the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// Whether the host should style the notice as an error.
    pub error: bool,
    /// Display duration, if the host honors one.
    pub timeout_ms: Option<u64>,
}

impl Notice {
    /// An informational notice with the host's default duration.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
            timeout_ms: None,
        }
    }

    /// An error-styled notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: true,
            timeout_ms: None,
        }
    }

    /// Request a specific display duration.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structured result of a commit attempt.
///
/// The environment-limitation case is an explicit contract with the
/// host adapter: the adapter classifies the failure, the orchestrator
/// never matches on error strings.
#[derive(Debug, thiserror::Error)]
pub enum CommitFailure {
    /// The host context forbids this asset kind at the target location
    /// (e.g. motion content disallowed in the current document tier).
    /// Recoverable by committing the static fallback instead.
    #[error("asset kind not allowed in this context: {detail}")]
    EnvironmentLimitation {
        /// Host-provided description, suitable for a user notice.
        detail: String,
    },

    /// Any other commit failure. Not recoverable.
    #[error("commit rejected by the host: {detail}")]
    Other {
        /// Host-provided description.
        detail: String,
    },
}

/// Errors from non-commit host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The referenced placeholder no longer exists in the document.
    #[error("placeholder {0} not found")]
    PlaceholderNotFound(PlaceholderId),

    /// Any other host-side failure.
    #[error("host operation failed: {0}")]
    Operation(String),
}

// ---------------------------------------------------------------------------
// HostCanvas
// ---------------------------------------------------------------------------

/// Operations the orchestrator needs from the host document.
#[async_trait]
pub trait HostCanvas: Send + Sync {
    /// Placeholders in the current selection that are eligible to
    /// receive an asset.
    async fn selection(&self) -> Vec<PlaceholderId>;

    /// Current viewport geometry.
    async fn viewport(&self) -> Viewport;

    /// Create a placeholder with the given name, size, and position.
    async fn create_placeholder(
        &self,
        name: &str,
        width: f64,
        height: f64,
        x: f64,
        y: f64,
    ) -> Result<PlaceholderId, HostError>;

    /// Rename an existing placeholder.
    async fn rename_placeholder(&self, id: &PlaceholderId, name: &str) -> Result<(), HostError>;

    /// Commit a byte payload onto a placeholder as its visible content.
    async fn commit_asset(
        &self,
        id: &PlaceholderId,
        kind: AssetKind,
        data: &[u8],
    ) -> Result<(), CommitFailure>;

    /// Remove a placeholder from the document.
    async fn remove_placeholder(&self, id: &PlaceholderId) -> Result<(), HostError>;

    /// Select the placeholder and frame it in the viewport. Purely
    /// cosmetic; callers must not depend on it for correctness.
    async fn focus_placeholder(&self, id: &PlaceholderId) -> Result<(), HostError>;

    /// Surface a transient notice to the user.
    async fn notify(&self, notice: Notice);
}
