//! Headless smoke runner: drives one submit-and-track attempt against
//! the real rendering service with the in-memory host, logging every
//! notification. Useful for exercising the full pipeline without a
//! host application.

use std::sync::Arc;

use anyhow::Context;
use castkit_host::memory::{InMemoryCanvas, InMemoryCredentialStore};
use castkit_host::CredentialStore;
use castkit_remote::VideoApi;
use castkit_session::{GenerationSession, Notification, SessionConfig, UiRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SessionConfig::from_env();
    let credential = std::env::var("CASTKIT_API_CREDENTIAL")
        .context("CASTKIT_API_CREDENTIAL must be set to run the smoke flow")?;

    let service = Arc::new(VideoApi::new(&config.api_base_url));
    let canvas = Arc::new(InMemoryCanvas::new());
    let store = Arc::new(InMemoryCredentialStore::new());
    store
        .set(&config.credential_key, &credential)
        .await
        .context("failed to seed the credential store")?;

    let session = Arc::new(GenerationSession::new(
        service,
        canvas.clone(),
        store,
        config,
    ));
    let mut notifications = session.subscribe();

    // Title and script come from the command line; blank values get the
    // documented defaults.
    let mut args = std::env::args().skip(1);
    let title = args.next().unwrap_or_default();
    let script_text = args.next().unwrap_or_default();

    let attempt = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .handle(UiRequest::SubmitAndTrack {
                    title,
                    script_text,
                    avatar_id: std::env::var("CASTKIT_AVATAR_ID").unwrap_or_default(),
                    background: std::env::var("CASTKIT_BACKGROUND").unwrap_or_default(),
                })
                .await;
        })
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, shutting the session down");
                session.shutdown();
                break;
            }
            notification = notifications.recv() => {
                match notification {
                    Ok(notification) => {
                        report(&notification);
                        if notification.is_terminal() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "Notification channel closed");
                        break;
                    }
                }
            }
        }
    }

    attempt.await.context("smoke attempt panicked")?;

    tracing::info!(
        placeholders = canvas.placeholder_count(),
        notices = canvas.notices().len(),
        "Smoke run finished"
    );
    Ok(())
}

fn report(notification: &Notification) {
    match notification {
        Notification::GenerationStatus { status } => {
            tracing::info!(status = %status, "Render job status");
        }
        Notification::GenerationSucceeded => tracing::info!("Video inserted"),
        Notification::GenerationDegraded { reason } => {
            tracing::warn!(reason = %reason, "Inserted as image");
        }
        Notification::GenerationFailed { error } => {
            tracing::error!(error = %error, "Generation failed");
        }
        Notification::Credential { .. } => {}
    }
}
