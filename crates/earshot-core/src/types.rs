//! Wire-format result types for the three analysis stages.
//!
//! Field names and nesting are the service's JSON contract; changing them
//! breaks callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Confidence used when an underlying model does not report one.
///
/// The back ends are inconsistent here (some omit word confidences, some
/// omit turn confidences), so every adapter resolves a missing value to this
/// single sentinel rather than picking a default per stage.
pub const UNKNOWN_CONFIDENCE: f32 = 1.0;

/// A single word with its position in the signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    /// The word text.
    pub text: String,
    /// Start time in seconds from signal origin.
    pub start: f64,
    /// End time in seconds, `start <= end`.
    pub end: f64,
    /// Model confidence for this word.
    pub confidence: f32,
}

/// Full transcription of a signal.
///
/// `words`, if non-empty, are non-decreasing in `start`; the transcription
/// adapter sorts them even when the model does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// The full transcribed text.
    pub text: String,
    /// Detected (or hinted) language code, e.g. "en".
    pub language: String,
    /// Word-level timestamps, ordered by start time.
    pub words: Vec<WordTimestamp>,
    /// Overall transcription confidence.
    pub confidence: f32,
}

/// Emotion classification of one analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSegment {
    /// Window start in seconds.
    pub start_time: f64,
    /// Window end in seconds.
    pub end_time: f64,
    /// Highest-scoring label from `all_emotions`.
    pub emotion: String,
    /// Score of `emotion`.
    pub confidence: f32,
    /// Label → score distribution. Non-negative; need not sum to exactly 1
    /// due to model rounding.
    pub all_emotions: BTreeMap<String, f32>,
}

/// Emotion analysis over the whole signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    /// Per-window segments in chronological order.
    pub segments: Vec<EmotionSegment>,
    /// Majority-vote label over the segments' top labels; derived, never
    /// set independently.
    pub dominant_emotion: String,
}

/// One speaker turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSegment {
    /// Opaque speaker identity from the diarization model.
    pub speaker_id: String,
    /// Turn start in seconds.
    pub start_time: f64,
    /// Turn end in seconds, strictly after `start_time`.
    pub end_time: f64,
    /// Model confidence, [`UNKNOWN_CONFIDENCE`] if unreported.
    pub confidence: f32,
}

/// Speaker diarization of a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationResult {
    /// Merged, non-overlapping turns in chronological order.
    pub segments: Vec<SpeakerSegment>,
    /// Count of distinct `speaker_id` values in `segments`.
    pub num_speakers: usize,
}

/// The combined response for a full analysis request.
///
/// The three results are independently valid; boundaries from different
/// stages may legitimately disagree. No cross-stage reconciliation is
/// performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Transcription stage output.
    pub transcription: TranscriptionResult,
    /// Emotion stage output.
    pub emotions: EmotionResult,
    /// Diarization stage output.
    pub speakers: DiarizationResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> AnalysisResponse {
        AnalysisResponse {
            transcription: TranscriptionResult {
                text: "hello there".into(),
                language: "en".into(),
                words: vec![WordTimestamp {
                    text: "hello".into(),
                    start: 0.0,
                    end: 0.4,
                    confidence: 0.9,
                }],
                confidence: 0.9,
            },
            emotions: EmotionResult {
                segments: vec![EmotionSegment {
                    start_time: 0.0,
                    end_time: 3.0,
                    emotion: "neutral".into(),
                    confidence: 0.7,
                    all_emotions: BTreeMap::from([("neutral".into(), 0.7), ("happy".into(), 0.3)]),
                }],
                dominant_emotion: "neutral".into(),
            },
            speakers: DiarizationResult {
                segments: vec![SpeakerSegment {
                    speaker_id: "SPEAKER_00".into(),
                    start_time: 0.0,
                    end_time: 1.2,
                    confidence: UNKNOWN_CONFIDENCE,
                }],
                num_speakers: 1,
            },
        }
    }

    #[test]
    fn response_json_field_names() {
        let json = serde_json::to_value(sample_response()).unwrap();
        assert!(json.get("transcription").is_some());
        assert!(json.get("emotions").is_some());
        assert!(json.get("speakers").is_some());
        assert_eq!(json["transcription"]["words"][0]["text"], "hello");
        assert_eq!(json["emotions"]["dominant_emotion"], "neutral");
        assert_eq!(json["speakers"]["num_speakers"], 1);
        assert_eq!(json["speakers"]["segments"][0]["speaker_id"], "SPEAKER_00");
    }

    #[test]
    fn response_roundtrips() {
        let resp = sample_response();
        let json = serde_json::to_string(&resp).unwrap();
        let back: AnalysisResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resp);
    }

    #[test]
    fn all_emotions_serializes_in_label_order() {
        let json = serde_json::to_string(&sample_response().emotions.segments[0]).unwrap();
        // BTreeMap keeps labels sorted, so the JSON is deterministic.
        assert!(json.find("\"happy\"").unwrap() < json.find("\"neutral\"").unwrap());
    }
}
