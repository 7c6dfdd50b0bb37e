//! The orchestrator: one generation session driving submit → poll →
//! download → commit, with a typed message boundary toward the UI.
//!
//! [`session::GenerationSession`] owns the single in-flight job slot
//! and the poll cancellation token; [`committer`] performs the ordered
//! download/commit sequence with its degraded image fallback;
//! [`messages`] defines the closed set of request/notification shapes
//! exchanged with the UI.

pub mod committer;
pub mod config;
pub mod messages;
pub mod session;

pub use config::SessionConfig;
pub use messages::{Notification, UiRequest};
pub use session::GenerationSession;
