//! # Citation Count
//!
//! Looks up the citation count of the paper selected in a reference manager
//! and shows it in a details panel.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Paper identity and citation result types
//! - [`lookup`]: Query selection, endpoint profiles and response resolution
//! - [`extension`]: Host capabilities, presentation and start/stop lifecycle
//! - [`utils`]: Title normalization, similarity, HTTP client and retry
//! - [`config`]: Configuration management

pub mod config;
pub mod extension;
pub mod lookup;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use extension::{CitationCountExtension, ExtensionHandle, HostContext};
pub use lookup::{CitationLookup, EndpointProfile, LookupError, LookupQuery};
pub use models::{CitationResult, PaperIdentity};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
