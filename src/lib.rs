pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use client::{BackendClient, DocumentSource, InvoiceCache, MemorySource};
pub use config::AppConfig;
pub use error::{ReconcileError, Result};
pub use service::{compare, ComparisonService};
