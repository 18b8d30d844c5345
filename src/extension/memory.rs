//! In-memory host capabilities for testing and the command line.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::extension::host::PreferenceStore;
use crate::extension::presentation::{Locale, SlotPayload, UiSurface};
use crate::lookup::{Fetcher, LookupError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded slot write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotUpdate {
    pub slot: String,
    pub widget_id: String,
    pub payload: SlotPayload,
}

/// A UI surface that records every write
#[derive(Debug, Default)]
pub struct MemorySurface {
    updates: Mutex<Vec<SlotUpdate>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, oldest first
    pub fn updates(&self) -> Vec<SlotUpdate> {
        lock(&self.updates).clone()
    }

    /// Current payload of a widget, if it was ever written
    pub fn current(&self, slot: &str, widget_id: &str) -> Option<SlotPayload> {
        lock(&self.updates)
            .iter()
            .rev()
            .find(|u| u.slot == slot && u.widget_id == widget_id)
            .map(|u| u.payload.clone())
    }
}

impl UiSurface for MemorySurface {
    fn update_slot(&self, slot: &str, widget_id: &str, payload: SlotPayload) {
        lock(&self.updates).push(SlotUpdate {
            slot: slot.to_string(),
            widget_id: widget_id.to_string(),
            payload,
        });
    }
}

/// Preference store backed by a map
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    locale: Mutex<Locale>,
    registered: Mutex<HashMap<String, Value>>,
}

impl MemoryPreferences {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale: Mutex::new(locale),
            registered: Mutex::new(HashMap::new()),
        }
    }

    /// Change the display language
    pub fn set_locale(&self, locale: Locale) {
        *lock(&self.locale) = locale;
    }

    /// Whether an extension is currently registered
    pub fn is_registered(&self, extension_id: &str) -> bool {
        lock(&self.registered).contains_key(extension_id)
    }
}

impl PreferenceStore for MemoryPreferences {
    fn register(&self, extension_id: &str, defaults: &Value) {
        lock(&self.registered).insert(extension_id.to_string(), defaults.clone());
    }

    fn unregister(&self, extension_id: &str) {
        lock(&self.registered).remove(extension_id);
    }

    fn locale(&self) -> Locale {
        *lock(&self.locale)
    }
}

#[derive(Debug, Clone)]
struct MockResponse {
    outcome: Result<Value, LookupError>,
    delay: Duration,
}

/// A fetcher that returns predefined responses per URL.
///
/// Unknown URLs answer with [`LookupError::NotFound`].
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a JSON body
    pub fn respond(&self, url: impl Into<String>, body: Value) {
        self.respond_after(url, body, Duration::ZERO);
    }

    /// Answer `url` with a JSON body after a delay
    pub fn respond_after(&self, url: impl Into<String>, body: Value, delay: Duration) {
        lock(&self.responses).insert(
            url.into(),
            MockResponse {
                outcome: Ok(body),
                delay,
            },
        );
    }

    /// Fail requests to `url`
    pub fn fail(&self, url: impl Into<String>, error: LookupError) {
        lock(&self.responses).insert(
            url.into(),
            MockResponse {
                outcome: Err(error),
                delay: Duration::ZERO,
            },
        );
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    /// Whether `url` was requested at least once
    pub fn was_requested(&self, url: &str) -> bool {
        lock(&self.requests).iter().any(|u| u == url)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, LookupError> {
        lock(&self.requests).push(url.to_string());

        let response = lock(&self.responses).get(url).cloned();
        match response {
            Some(response) => {
                if !response.delay.is_zero() {
                    tokio::time::sleep(response.delay).await;
                }
                response.outcome
            }
            None => Err(LookupError::NotFound(url.to_string())),
        }
    }
}
