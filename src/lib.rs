//! SCI Viewer - browse Standard Cleaning Instructions
//!
//! This library provides read access to a tenant's SCI documents in
//! Firestore, groups them by site, and renders them for the terminal.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod model;
pub mod render;
pub mod store;
pub mod tui;

/// Re-export commonly used types
pub use catalog::{SciCatalog, SciSource};
pub use config::AppConfig;
pub use model::{Sci, Site};
pub use render::{render_document, DocumentView, ViewMode};
pub use store::{DocumentStore, FirestoreStore, MemoryStore, StoreError};

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "sciviewer";
