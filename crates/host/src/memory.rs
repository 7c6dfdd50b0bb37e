//! Deterministic in-memory collaborator implementations.
//!
//! [`InMemoryCanvas`] records every mutation (creation, rename, commit,
//! removal, focus, notices) and lets callers script how commits behave,
//! so the orchestration tests can assert the exact host side effects of
//! each code path. [`InMemoryCredentialStore`] is a plain map. Both are
//! also used by the headless smoke binary.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use castkit_core::AssetKind;

use crate::canvas::{CommitFailure, HostCanvas, HostError, Notice, PlaceholderId, Point, Viewport};
use crate::credentials::{CredentialStore, StoreError};

// ---------------------------------------------------------------------------
// Scripted commit behaviour
// ---------------------------------------------------------------------------

/// How the canvas responds to a commit of a given asset kind.
#[derive(Debug, Clone)]
pub enum CommitBehavior {
    /// Accept the payload.
    Accept,
    /// Refuse with [`CommitFailure::EnvironmentLimitation`].
    EnvironmentLimited(String),
    /// Refuse with [`CommitFailure::Other`].
    Reject(String),
}

// ---------------------------------------------------------------------------
// InMemoryCanvas
// ---------------------------------------------------------------------------

/// Recorded state of one in-memory placeholder.
#[derive(Debug, Clone)]
pub struct PlaceholderState {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    /// The committed payload, if any.
    pub asset: Option<(AssetKind, Vec<u8>)>,
}

#[derive(Debug)]
struct CanvasState {
    placeholders: HashMap<PlaceholderId, PlaceholderState>,
    selection: Vec<PlaceholderId>,
    viewport: Viewport,
    focused: Option<PlaceholderId>,
    notices: Vec<Notice>,
    removed: Vec<PlaceholderId>,
    motion_behavior: CommitBehavior,
    image_behavior: CommitBehavior,
}

/// In-memory [`HostCanvas`] with scripted commit behaviour.
#[derive(Debug)]
pub struct InMemoryCanvas {
    state: Mutex<CanvasState>,
}

impl Default for InMemoryCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCanvas {
    /// An empty canvas centered on the origin that accepts every commit.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CanvasState {
                placeholders: HashMap::new(),
                selection: Vec::new(),
                viewport: Viewport {
                    center: Point { x: 0.0, y: 0.0 },
                },
                focused: None,
                notices: Vec::new(),
                removed: Vec::new(),
                motion_behavior: CommitBehavior::Accept,
                image_behavior: CommitBehavior::Accept,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CanvasState> {
        self.state.lock().expect("canvas state poisoned")
    }

    /// Script how motion commits behave.
    pub fn set_motion_behavior(&self, behavior: CommitBehavior) {
        self.state().motion_behavior = behavior;
    }

    /// Script how image commits behave.
    pub fn set_image_behavior(&self, behavior: CommitBehavior) {
        self.state().image_behavior = behavior;
    }

    /// Move the viewport center.
    pub fn set_viewport_center(&self, x: f64, y: f64) {
        self.state().viewport = Viewport {
            center: Point { x, y },
        };
    }

    /// Seed an existing placeholder and put it in the current selection,
    /// as if the user had selected an eligible container before running
    /// the plugin.
    pub fn add_selected_placeholder(&self, name: &str, width: f64, height: f64) -> PlaceholderId {
        let id = PlaceholderId(uuid::Uuid::new_v4().to_string());
        let mut state = self.state();
        state.placeholders.insert(
            id.clone(),
            PlaceholderState {
                name: name.to_string(),
                width,
                height,
                x: 0.0,
                y: 0.0,
                asset: None,
            },
        );
        state.selection.push(id.clone());
        id
    }

    // ---- inspection ----

    /// Snapshot of a placeholder, if it still exists.
    pub fn placeholder(&self, id: &PlaceholderId) -> Option<PlaceholderState> {
        self.state().placeholders.get(id).cloned()
    }

    /// Number of placeholders currently in the document.
    pub fn placeholder_count(&self) -> usize {
        self.state().placeholders.len()
    }

    /// All placeholder ids removed so far, in order.
    pub fn removed_ids(&self) -> Vec<PlaceholderId> {
        self.state().removed.clone()
    }

    /// The placeholder last focused, if any.
    pub fn focused(&self) -> Option<PlaceholderId> {
        self.state().focused.clone()
    }

    /// All notices surfaced so far, in order.
    pub fn notices(&self) -> Vec<Notice> {
        self.state().notices.clone()
    }
}

#[async_trait]
impl HostCanvas for InMemoryCanvas {
    async fn selection(&self) -> Vec<PlaceholderId> {
        self.state().selection.clone()
    }

    async fn viewport(&self) -> Viewport {
        self.state().viewport
    }

    async fn create_placeholder(
        &self,
        name: &str,
        width: f64,
        height: f64,
        x: f64,
        y: f64,
    ) -> Result<PlaceholderId, HostError> {
        let id = PlaceholderId(uuid::Uuid::new_v4().to_string());
        self.state().placeholders.insert(
            id.clone(),
            PlaceholderState {
                name: name.to_string(),
                width,
                height,
                x,
                y,
                asset: None,
            },
        );
        Ok(id)
    }

    async fn rename_placeholder(&self, id: &PlaceholderId, name: &str) -> Result<(), HostError> {
        let mut state = self.state();
        let placeholder = state
            .placeholders
            .get_mut(id)
            .ok_or_else(|| HostError::PlaceholderNotFound(id.clone()))?;
        placeholder.name = name.to_string();
        Ok(())
    }

    async fn commit_asset(
        &self,
        id: &PlaceholderId,
        kind: AssetKind,
        data: &[u8],
    ) -> Result<(), CommitFailure> {
        let mut state = self.state();
        let behavior = match kind {
            AssetKind::Motion => state.motion_behavior.clone(),
            AssetKind::Image => state.image_behavior.clone(),
        };
        match behavior {
            CommitBehavior::Accept => {
                let placeholder =
                    state
                        .placeholders
                        .get_mut(id)
                        .ok_or_else(|| CommitFailure::Other {
                            detail: format!("placeholder {id} not found"),
                        })?;
                placeholder.asset = Some((kind, data.to_vec()));
                Ok(())
            }
            CommitBehavior::EnvironmentLimited(detail) => {
                Err(CommitFailure::EnvironmentLimitation { detail })
            }
            CommitBehavior::Reject(detail) => Err(CommitFailure::Other { detail }),
        }
    }

    async fn remove_placeholder(&self, id: &PlaceholderId) -> Result<(), HostError> {
        let mut state = self.state();
        state
            .placeholders
            .remove(id)
            .ok_or_else(|| HostError::PlaceholderNotFound(id.clone()))?;
        state.selection.retain(|selected| selected != id);
        if state.focused.as_ref() == Some(id) {
            state.focused = None;
        }
        state.removed.push(id.clone());
        Ok(())
    }

    async fn focus_placeholder(&self, id: &PlaceholderId) -> Result<(), HostError> {
        let mut state = self.state();
        if !state.placeholders.contains_key(id) {
            return Err(HostError::PlaceholderNotFound(id.clone()));
        }
        state.selection = vec![id.clone()];
        state.focused = Some(id.clone());
        Ok(())
    }

    async fn notify(&self, notice: Notice) {
        tracing::debug!(message = %notice.message, error = notice.error, "Host notice");
        self.state().notices.push(notice);
    }
}

// ---------------------------------------------------------------------------
// InMemoryCredentialStore
// ---------------------------------------------------------------------------

/// In-memory [`CredentialStore`] backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .secrets
            .lock()
            .expect("credential store poisoned")
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.secrets
            .lock()
            .expect("credential store poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
