//! Capabilities the host hands to the extension.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::extension::presentation::{Locale, UiSurface};
use crate::lookup::Fetcher;
use crate::models::PaperIdentity;

/// Capacity of the selection channel; slow listeners skip older events
const SELECTION_CAPACITY: usize = 16;

/// Broadcasts selection changes to subscribed extensions
#[derive(Debug, Clone)]
pub struct SelectionBus {
    sender: broadcast::Sender<Vec<PaperIdentity>>,
}

impl SelectionBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SELECTION_CAPACITY);
        Self { sender }
    }

    /// Publish the current selection; returns the number of listeners
    pub fn publish(&self, selected: Vec<PaperIdentity>) -> usize {
        self.sender.send(selected).unwrap_or(0)
    }

    /// Subscribe to selection changes
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<PaperIdentity>> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SelectionBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Host preference storage
pub trait PreferenceStore: Send + Sync + std::fmt::Debug {
    /// Register an extension's preference defaults
    fn register(&self, extension_id: &str, defaults: &Value);

    /// Remove an extension's preferences
    fn unregister(&self, extension_id: &str);

    /// Current display language
    fn locale(&self) -> Locale;
}

/// Everything an extension may use: selection events, HTTP, UI slots and
/// preferences. Logging goes through `tracing`.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub selection: SelectionBus,
    pub fetcher: Arc<dyn Fetcher>,
    pub surface: Arc<dyn UiSurface>,
    pub preferences: Arc<dyn PreferenceStore>,
}
