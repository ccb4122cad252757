//! # earshot-audio
//!
//! Turns an uploaded byte stream into the fixed numeric contract the
//! analysis stages consume: mono f32 samples at 16 kHz, peak-normalized
//! to 1.0.
//!
//! Pipeline:
//!
//! ```text
//! bytes → symphonia decode (any supported container/codec)
//!       → arithmetic-mean downmix to mono
//!       → rubato sinc resample to 16 kHz (exact output length)
//!       → peak normalization
//! ```
//!
//! Everything here is pure with respect to the input: no state survives a
//! call, and the same bytes always produce the same signal.

#![deny(unsafe_code)]

pub mod decode;
pub mod ingest;
pub mod resample;

pub use ingest::AudioIngestor;
