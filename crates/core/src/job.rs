//! Job lifecycle model: remote status, asset kinds, and the terminal
//! outcome of one generation attempt.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle status reported by the rendering service.
///
/// Only `Complete` and `Failed` are terminal; everything else keeps the
/// poll loop running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted but not yet picked up by the service.
    Queued,
    /// Being rendered.
    Processing,
    /// Rendered successfully; asset URLs should be available.
    Complete,
    /// Rendering failed on the service side.
    Failed,
}

impl JobStatus {
    /// Whether this status ends polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }

    /// Map a raw status string from the service to a [`JobStatus`].
    ///
    /// The service vocabulary for in-flight states has drifted over time
    /// (`queued`, `in_progress`, ...), so anything that is not a known
    /// terminal status is treated as still processing.
    pub fn from_remote(raw: &str) -> Self {
        match raw {
            "complete" => JobStatus::Complete,
            "failed" => JobStatus::Failed,
            "queued" => JobStatus::Queued,
            _ => JobStatus::Processing,
        }
    }

    /// Stable lowercase name, matching the wire vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AssetKind
// ---------------------------------------------------------------------------

/// The two asset renderings a completed job can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// The rich, motion-capable rendering (the primary asset).
    Motion,
    /// The static rendering used as a degraded fallback.
    Image,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Motion => "motion",
            AssetKind::Image => "image",
        })
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One remote render job, tracked from submission to its terminal
/// status and discarded once the attempt produces an [`Outcome`].
///
/// At most one `Job` exists per session at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Opaque identifier assigned by the rendering service.
    pub id: String,
    /// Last status observed by the poll loop.
    pub status: JobStatus,
    /// Primary (motion) asset URL, present once `status` is `Complete`.
    pub primary_asset_url: Option<String>,
    /// Static fallback asset URL, if the service provided one.
    pub fallback_asset_url: Option<String>,
}

impl Job {
    /// A freshly submitted job: queued, no asset URLs yet.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            primary_asset_url: None,
            fallback_asset_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal result of one full generation attempt.
///
/// Every attempt that reaches a terminal state produces exactly one
/// `Outcome`; a cancelled attempt produces none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The primary (motion) asset was committed.
    Inserted,
    /// The static fallback was committed after a recognized
    /// environment limitation blocked the motion asset.
    InsertedDegraded {
        /// Human-readable description of the limitation.
        reason: String,
    },
    /// The attempt failed; `error` is a string rendering of the cause.
    Failed {
        /// Rendered [`crate::GenerateError`].
        error: String,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
