//! # earshot-analysis
//!
//! The concurrent analysis pipeline: three independent stage adapters over
//! opaque model capabilities, a fan-out orchestrator, and the response
//! aggregator.
//!
//! - **Capabilities** ([`model`]): `SpeechModel`, `EmotionClassifier`,
//!   `SpeakerModel` traits, the only thing this crate knows about the
//!   model back ends. Shipped implementations call HTTP sidecars
//!   ([`sidecar`]); tests use the in-memory mocks in [`testing`].
//! - **Adapters** ([`transcription`], [`emotion`], [`diarization`]): the
//!   behavior layered on top of the raw model call, such as word
//!   flattening and ordering, signal windowing and majority voting, and
//!   turn merging.
//! - **Orchestrator** ([`orchestrator`]): fans one immutable signal out to
//!   all enabled stages and returns every stage's tagged outcome.
//! - **Aggregator** ([`aggregate`]): pure composition of the three results
//!   into the response record.

#![deny(unsafe_code)]

pub mod aggregate;
pub mod diarization;
pub mod emotion;
pub mod model;
pub mod orchestrator;
pub mod sidecar;
pub mod stage;
pub mod testing;
pub mod transcription;

pub use aggregate::assemble;
pub use diarization::DiarizationStage;
pub use emotion::EmotionStage;
pub use orchestrator::{Orchestrator, StageOutcomes};
pub use stage::{AnalysisStage, StageOutput};
pub use transcription::TranscriptionStage;
