//! Collaborator seams for the host application.
//!
//! The orchestrator talks to its host through two traits: [`HostCanvas`]
//! (placeholder creation, asset commits, notices) and
//! [`CredentialStore`] (one persisted secret). Real hosts implement
//! these against their own document/storage APIs; [`memory`] provides
//! deterministic in-memory implementations used by the test suites and
//! the smoke binary.

pub mod canvas;
pub mod credentials;
pub mod memory;

pub use canvas::{CommitFailure, HostCanvas, HostError, Notice, PlaceholderId, Point, Viewport};
pub use credentials::{CredentialStore, StoreError};
