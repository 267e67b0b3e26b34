//! symptom-checker: symptom-to-condition prediction service
//!
//! Submitted symptoms are encoded into a binary feature vector, scored by a
//! pre-trained classifier, and persisted (encrypted) alongside the top
//! prediction and per-symptom severities.

pub mod api;
pub mod classifier;
pub mod commands;
pub mod config;
pub mod context;
pub mod crypto;
pub mod db;
pub mod error;
pub mod features;
pub mod logging;

pub use context::AppContext;
pub use error::{Error, Result};
