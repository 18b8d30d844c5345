//! Presentation adapter: turns lookup results into UI slot payloads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::models::CitationResult;

/// Display language of the panel label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locale {
    #[default]
    English,
    SimplifiedChinese,
}

impl Locale {
    /// Parse a host language tag; anything but `zh-CN` is English
    pub fn from_tag(tag: &str) -> Self {
        if tag == "zh-CN" {
            Locale::SimplifiedChinese
        } else {
            Locale::English
        }
    }

    /// The host language tag
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::English => "en-US",
            Locale::SimplifiedChinese => "zh-CN",
        }
    }

    /// Panel label for the citation count widget
    pub fn citation_label(&self) -> &'static str {
        match self {
            Locale::English => "Citation Count",
            Locale::SimplifiedChinese => "引用次数",
        }
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Locale::from_tag(&tag)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag().to_string()
    }
}

/// Content of one widget in a UI slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPayload {
    pub title: String,
    pub content: String,
}

impl SlotPayload {
    /// Payload for a lookup result
    pub fn for_result(locale: Locale, result: &CitationResult) -> Self {
        Self {
            title: locale.citation_label().to_string(),
            content: result.display_content(),
        }
    }

    /// `N/A (N/A)` payload shown while a lookup is in flight
    pub fn placeholder(locale: Locale) -> Self {
        Self::for_result(locale, &CitationResult::default())
    }

    /// Slot value as the host expects it: `{ widget_id: { title, content } }`
    pub fn to_slot_value(&self, widget_id: &str) -> Value {
        let mut slot = Map::new();
        slot.insert(
            widget_id.to_string(),
            json!({ "title": self.title, "content": self.content }),
        );
        Value::Object(slot)
    }
}

/// A UI surface the extension can write slot payloads to
pub trait UiSurface: Send + Sync + std::fmt::Debug {
    /// Replace the widget's payload in the named slot
    fn update_slot(&self, slot: &str, widget_id: &str, payload: SlotPayload);
}

/// Writes citation payloads to a fixed slot and widget id
#[derive(Debug, Clone)]
pub struct Presenter {
    slot: String,
    widget_id: String,
    surface: Arc<dyn UiSurface>,
}

impl Presenter {
    pub fn new(
        slot: impl Into<String>,
        widget_id: impl Into<String>,
        surface: Arc<dyn UiSurface>,
    ) -> Self {
        Self {
            slot: slot.into(),
            widget_id: widget_id.into(),
            surface,
        }
    }

    /// Clear whatever the previous selection left behind
    pub fn show_placeholder(&self, locale: Locale) {
        self.surface
            .update_slot(&self.slot, &self.widget_id, SlotPayload::placeholder(locale));
    }

    /// Show a finished lookup
    pub fn show_result(&self, locale: Locale, result: &CitationResult) {
        self.surface.update_slot(
            &self.slot,
            &self.widget_id,
            SlotPayload::for_result(locale, result),
        );
    }
}
