//! Asset committer: download the rendered asset and commit it into a
//! host placeholder, degrading to the static image when the host
//! forbids motion content.
//!
//! Side effects are strictly ordered: nothing in the host document is
//! touched before the primary download succeeds, the placeholder is
//! resolved exactly once per attempt, a freshly created placeholder is
//! removed on every failure path after its creation, and a placeholder
//! the caller selected is never removed (only renamed).

use castkit_core::validation::validate_asset_url;
use castkit_core::{AssetKind, GenerateError};
use castkit_host::{CommitFailure, HostCanvas, Notice, PlaceholderId};
use castkit_remote::RenderService;

/// Default placeholder size (16:9) when no eligible selection exists.
pub const PLACEHOLDER_WIDTH: f64 = 400.0;
pub const PLACEHOLDER_HEIGHT: f64 = 225.0;

/// Display duration for the degraded-insert notice.
const DEGRADED_NOTICE_TIMEOUT_MS: u64 = 5_000;

/// How the asset ended up in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The motion asset was committed.
    Inserted,
    /// The static image was committed after an environment limitation.
    Degraded {
        /// Host-provided description of the limitation.
        reason: String,
    },
}

/// Download the primary asset and commit it, falling back to the static
/// image on a recognized environment limitation.
pub async fn commit_asset(
    canvas: &dyn HostCanvas,
    service: &dyn RenderService,
    primary_url: &str,
    fallback_url: Option<&str>,
    title: &str,
) -> Result<CommitOutcome, GenerateError> {
    // Step 1: primary download. Fails without touching the host.
    let motion_data = download(service, primary_url, AssetKind::Motion).await?;

    // Step 2: resolve the target placeholder, exactly once.
    let (placeholder, created) = resolve_placeholder(canvas, title).await?;

    // Step 3: try the motion commit.
    match canvas
        .commit_asset(&placeholder, AssetKind::Motion, &motion_data)
        .await
    {
        Ok(()) => {
            tracing::info!(placeholder = %placeholder, "Motion asset committed");
            finish(canvas, &placeholder, Notice::info("Video inserted")).await;
            Ok(CommitOutcome::Inserted)
        }
        Err(CommitFailure::EnvironmentLimitation { detail }) => match fallback_url {
            Some(url) => {
                tracing::warn!(
                    placeholder = %placeholder,
                    reason = %detail,
                    "Motion commit refused, falling back to image",
                );
                commit_fallback(canvas, service, &placeholder, created, url, detail).await
            }
            None => {
                tracing::warn!(
                    placeholder = %placeholder,
                    reason = %detail,
                    "Motion commit refused and no fallback asset available",
                );
                remove_if_created(canvas, &placeholder, created).await;
                Err(GenerateError::EnvironmentLimitation { reason: detail })
            }
        },
        Err(CommitFailure::Other { detail }) => {
            remove_if_created(canvas, &placeholder, created).await;
            Err(GenerateError::Commit(detail))
        }
    }
}

/// Step 4: the degraded path — fetch the image and commit it onto the
/// same placeholder.
async fn commit_fallback(
    canvas: &dyn HostCanvas,
    service: &dyn RenderService,
    placeholder: &PlaceholderId,
    created: bool,
    fallback_url: &str,
    reason: String,
) -> Result<CommitOutcome, GenerateError> {
    let image_data = match download(service, fallback_url, AssetKind::Image).await {
        Ok(data) => data,
        Err(err) => {
            remove_if_created(canvas, placeholder, created).await;
            return Err(err);
        }
    };

    if let Err(failure) = canvas
        .commit_asset(placeholder, AssetKind::Image, &image_data)
        .await
    {
        remove_if_created(canvas, placeholder, created).await;
        return Err(GenerateError::Commit(failure.to_string()));
    }

    finish(
        canvas,
        placeholder,
        Notice::info(format!("Inserted as image. {reason}"))
            .with_timeout(DEGRADED_NOTICE_TIMEOUT_MS),
    )
    .await;
    Ok(CommitOutcome::Degraded { reason })
}

/// Fetch an asset payload, mapping failures to the download error class
/// for its kind.
async fn download(
    service: &dyn RenderService,
    url: &str,
    kind: AssetKind,
) -> Result<Vec<u8>, GenerateError> {
    validate_asset_url(url).map_err(|err| GenerateError::Download {
        kind,
        detail: err.to_string(),
    })?;
    service
        .fetch_asset(url)
        .await
        .map_err(|err| GenerateError::Download {
            kind,
            detail: err.to_string(),
        })
}

/// Reuse a single selected eligible placeholder (renaming it to the
/// video title), or create a default-sized one centered in the
/// viewport. Returns the placeholder and whether it was freshly
/// created.
async fn resolve_placeholder(
    canvas: &dyn HostCanvas,
    title: &str,
) -> Result<(PlaceholderId, bool), GenerateError> {
    let selection = canvas.selection().await;
    if selection.len() == 1 {
        let id = selection[0].clone();
        canvas
            .rename_placeholder(&id, title)
            .await
            .map_err(|err| GenerateError::Commit(err.to_string()))?;
        tracing::debug!(placeholder = %id, "Reusing selected placeholder");
        return Ok((id, false));
    }

    let viewport = canvas.viewport().await;
    let id = canvas
        .create_placeholder(
            title,
            PLACEHOLDER_WIDTH,
            PLACEHOLDER_HEIGHT,
            viewport.center.x - PLACEHOLDER_WIDTH / 2.0,
            viewport.center.y - PLACEHOLDER_HEIGHT / 2.0,
        )
        .await
        .map_err(|err| GenerateError::Commit(err.to_string()))?;
    tracing::debug!(placeholder = %id, "Created new placeholder");
    Ok((id, true))
}

/// Remove a placeholder iff this attempt created it. A caller-selected
/// placeholder is owned by the caller and always left in place.
async fn remove_if_created(canvas: &dyn HostCanvas, id: &PlaceholderId, created: bool) {
    if !created {
        return;
    }
    if let Err(err) = canvas.remove_placeholder(id).await {
        tracing::warn!(placeholder = %id, error = %err, "Failed to remove placeholder");
    }
}

/// Success postcondition: frame the placeholder and surface the notice.
/// Focusing is cosmetic, so its failure is only logged.
async fn finish(canvas: &dyn HostCanvas, id: &PlaceholderId, notice: Notice) {
    if let Err(err) = canvas.focus_placeholder(id).await {
        tracing::debug!(placeholder = %id, error = %err, "Could not focus placeholder");
    }
    canvas.notify(notice).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
