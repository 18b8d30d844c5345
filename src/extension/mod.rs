//! Host integration: selection events in, UI slot payloads out.
//!
//! [`CitationCountExtension::start`] registers the extension's preferences
//! and subscribes to selection changes. Every time exactly one paper is
//! selected it writes the `N/A (N/A)` placeholder to the configured slot
//! right away, then runs a lookup in the background and writes the final
//! payload when the lookup succeeds. Lookups are independent: a newer
//! selection does not cancel an older lookup, so whichever finishes last
//! owns the slot.
//!
//! [`ExtensionHandle::stop`] stops listening, waits for lookups already in
//! flight, and unregisters the preferences.

mod host;
pub mod memory;
mod presentation;

pub use host::{HostContext, PreferenceStore, SelectionBus};
pub use presentation::{Locale, Presenter, SlotPayload, UiSurface};

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tokio::task::{JoinHandle, JoinSet};

use crate::config::{Config, ExtensionConfig};
use crate::lookup::{CitationLookup, EndpointProfile};
use crate::models::PaperIdentity;

/// The citation count extension, before it is started
#[derive(Debug, Clone)]
pub struct CitationCountExtension {
    settings: ExtensionConfig,
    profile: EndpointProfile,
}

impl CitationCountExtension {
    pub fn new(settings: ExtensionConfig, profile: EndpointProfile) -> Self {
        Self { settings, profile }
    }

    /// Build from the full application configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.extension.clone(), config.endpoint.endpoint_profile())
    }

    /// Registration id used for host bookkeeping
    pub fn id(&self) -> &str {
        &self.settings.id
    }

    /// Preferences registered with the host on start
    pub fn default_preferences() -> Value {
        json!({})
    }

    /// Register with the host and start reacting to selection changes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self, context: HostContext) -> ExtensionHandle {
        context
            .preferences
            .register(&self.settings.id, &Self::default_preferences());

        let handler = Arc::new(SelectionHandler {
            lookup: CitationLookup::new(self.profile, context.fetcher.clone()),
            presenter: Presenter::new(
                self.settings.ui_slot.as_str(),
                self.settings.widget_id.as_str(),
                context.surface.clone(),
            ),
        });

        let events = context.selection.subscribe();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let listener = tokio::spawn(listen(
            events,
            shutdown_rx,
            handler,
            context.preferences.clone(),
        ));

        tracing::info!(id = %self.settings.id, "Citation count extension started");

        ExtensionHandle {
            id: self.settings.id,
            preferences: context.preferences,
            shutdown: Some(shutdown_tx),
            listener,
        }
    }
}

/// A running extension
///
/// Dropping the handle without calling [`ExtensionHandle::stop`] also ends
/// the subscription, but leaves the preferences registered.
#[derive(Debug)]
pub struct ExtensionHandle {
    id: String,
    preferences: Arc<dyn PreferenceStore>,
    shutdown: Option<oneshot::Sender<()>>,
    listener: JoinHandle<()>,
}

impl ExtensionHandle {
    /// Registration id of the running extension
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Unsubscribe, let in-flight lookups finish, then unregister preferences
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // the listener may already have exited after the bus closed
            let _ = shutdown.send(());
        }

        if let Err(e) = (&mut self.listener).await {
            tracing::error!("Selection listener ended abnormally: {}", e);
        }

        self.preferences.unregister(&self.id);
        tracing::info!(id = %self.id, "Citation count extension stopped");
    }
}

/// Per-extension state shared by all lookups
#[derive(Debug)]
struct SelectionHandler {
    lookup: CitationLookup,
    presenter: Presenter,
}

impl SelectionHandler {
    async fn show_citation_count(&self, paper: PaperIdentity, locale: Locale) {
        match self.lookup.lookup(&paper).await {
            Ok(result) => self.presenter.show_result(locale, &result),
            Err(e) if e.is_not_found() => {
                tracing::warn!(title = %paper.title, "Citation count not found.");
            }
            Err(e) => {
                tracing::error!(title = %paper.title, error = %e, "Failed to get citation count.");
            }
        }
    }
}

async fn listen(
    mut events: broadcast::Receiver<Vec<PaperIdentity>>,
    mut shutdown: oneshot::Receiver<()>,
    handler: Arc<SelectionHandler>,
    preferences: Arc<dyn PreferenceStore>,
) {
    let mut lookups = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            event = events.recv() => match event {
                Ok(selected) => {
                    // only a single selected paper gets a lookup
                    let Ok([paper]) = <[PaperIdentity; 1]>::try_from(selected) else {
                        continue;
                    };

                    let locale = preferences.locale();
                    handler.presenter.show_placeholder(locale);

                    let handler = handler.clone();
                    lookups.spawn(async move { handler.show_citation_count(paper, locale).await });
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Selection listener lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some(finished) = lookups.join_next(), if !lookups.is_empty() => {
                if let Err(e) = finished {
                    tracing::error!("Citation lookup task failed: {}", e);
                }
            }
        }
    }

    while let Some(finished) = lookups.join_next().await {
        if let Err(e) = finished {
            tracing::error!("Citation lookup task failed: {}", e);
        }
    }
}
