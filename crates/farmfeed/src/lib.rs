//! Farmfeed - AI proxy routes for a farm community feed
//!
//! This crate provides a small daemon exposing three proxy routes
//! (summarization, farming advice, text-to-speech) that forward feed
//! content to external AI providers and normalize what comes back.

pub mod api;
pub mod config;
pub mod error;
pub mod proxy;

pub use error::FarmfeedError;
