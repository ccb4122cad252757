//! # earshot-core
//!
//! Shared vocabulary for the Earshot audio analysis service.
//!
//! This crate provides the types every other Earshot crate depends on:
//!
//! - **Signal**: normalized mono audio at a fixed sample rate
//! - **Results**: `TranscriptionResult`, `EmotionResult`, `DiarizationResult`
//!   and the composed `AnalysisResponse`, with serde schemas matching the
//!   wire format exactly
//! - **Errors**: `AudioError`, `StageError`, `AnalysisError` via `thiserror`

#![deny(unsafe_code)]

pub mod errors;
pub mod signal;
pub mod types;

pub use errors::{AnalysisError, AudioError, StageError, StageErrorKind, StageKind};
pub use signal::{Signal, TARGET_SAMPLE_RATE};
pub use types::{
    AnalysisResponse, DiarizationResult, EmotionResult, EmotionSegment, SpeakerSegment,
    TranscriptionResult, WordTimestamp, UNKNOWN_CONFIDENCE,
};
