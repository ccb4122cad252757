//! # earshot-server
//!
//! HTTP surface for the Earshot audio analysis service.
//!
//! - `POST /analyze`: multipart upload, all three stages concurrently
//! - `POST /transcribe`, `POST /emotions`, `POST /diarize`: single-stage
//!   variants
//! - `GET /health`: status and uptime
//!
//! Every failure surfaces as a 500 with a plain-text detail; no structured
//! error taxonomy is exposed to callers. Nothing is persisted; each
//! request is processed in isolation.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod server;

pub use config::Config;
pub use server::{AppState, EarshotServer};
