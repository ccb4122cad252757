//! In-memory mock model back ends for tests.
//!
//! Used by this crate's own tests and by the server crate's handler tests;
//! not wired into any production path.

use std::sync::Mutex;

use async_trait::async_trait;

use earshot_core::Signal;

use crate::model::{
    EmotionClassifier, LabelScore, ModelError, RawTranscript, RawTranscriptSegment, RawTurn,
    RawWord, SpeakerModel, SpeechModel,
};

/// Speech model that serves a canned transcript.
pub struct MockSpeechModel {
    transcript: RawTranscript,
    fail: Option<String>,
}

impl Default for MockSpeechModel {
    fn default() -> Self {
        Self {
            transcript: RawTranscript {
                text: "hello world".into(),
                language: Some("en".into()),
                segments: vec![RawTranscriptSegment {
                    words: vec![
                        RawWord {
                            text: "hello".into(),
                            start: 0.0,
                            end: 0.4,
                            confidence: Some(0.95),
                        },
                        RawWord {
                            text: "world".into(),
                            start: 0.5,
                            end: 0.9,
                            confidence: None,
                        },
                    ],
                }],
                confidence: Some(0.9),
            },
            fail: None,
        }
    }
}

impl MockSpeechModel {
    /// Model that fails every call with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.to_owned()),
            ..Self::default()
        }
    }

    /// Serve a specific transcript.
    pub fn with_transcript(mut self, transcript: RawTranscript) -> Self {
        self.transcript = transcript;
        self
    }

    /// Drop the detected language, so the caller's hint is used.
    pub fn without_language(mut self) -> Self {
        self.transcript.language = None;
        self
    }
}

#[async_trait]
impl SpeechModel for MockSpeechModel {
    async fn transcribe(
        &self,
        _signal: &Signal,
        _language: Option<&str>,
    ) -> Result<RawTranscript, ModelError> {
        match &self.fail {
            Some(message) => Err(ModelError::model(message.clone())),
            None => Ok(self.transcript.clone()),
        }
    }
}

/// Emotion classifier that serves a canned distribution and records the
/// clip lengths it was called with.
pub struct MockClassifier {
    scores: Vec<LabelScore>,
    fail: Option<String>,
    clip_lens: Mutex<Vec<usize>>,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self {
            scores: vec![
                LabelScore {
                    label: "neutral".into(),
                    score: 0.6,
                },
                LabelScore {
                    label: "happy".into(),
                    score: 0.4,
                },
            ],
            fail: None,
            clip_lens: Mutex::new(Vec::new()),
        }
    }
}

impl MockClassifier {
    /// Classifier that fails every call with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.to_owned()),
            ..Self::default()
        }
    }

    /// Serve a specific distribution for every clip.
    pub fn with_scores(mut self, scores: Vec<LabelScore>) -> Self {
        self.scores = scores;
        self
    }

    /// Clip lengths seen so far, in call order.
    pub fn clip_lens(&self) -> Vec<usize> {
        self.clip_lens.lock().expect("clip_lens lock").clone()
    }
}

#[async_trait]
impl EmotionClassifier for MockClassifier {
    async fn classify(
        &self,
        clip: &[f32],
        _sample_rate: u32,
    ) -> Result<Vec<LabelScore>, ModelError> {
        self.clip_lens.lock().expect("clip_lens lock").push(clip.len());
        match &self.fail {
            Some(message) => Err(ModelError::model(message.clone())),
            None => Ok(self.scores.clone()),
        }
    }
}

/// Speaker model that serves canned turns with a mergeable micro-gap.
pub struct MockSpeakerModel {
    turns: Vec<RawTurn>,
    fail: Option<String>,
}

impl Default for MockSpeakerModel {
    fn default() -> Self {
        Self {
            turns: vec![
                RawTurn {
                    speaker_id: "SPEAKER_00".into(),
                    start_time: 0.0,
                    end_time: 2.0,
                    confidence: None,
                },
                RawTurn {
                    speaker_id: "SPEAKER_00".into(),
                    start_time: 2.3,
                    end_time: 4.0,
                    confidence: None,
                },
                RawTurn {
                    speaker_id: "SPEAKER_01".into(),
                    start_time: 4.0,
                    end_time: 6.0,
                    confidence: Some(0.8),
                },
            ],
            fail: None,
        }
    }
}

impl MockSpeakerModel {
    /// Model that fails every call with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.to_owned()),
            ..Self::default()
        }
    }

    /// Serve specific turns.
    pub fn with_turns(mut self, turns: Vec<RawTurn>) -> Self {
        self.turns = turns;
        self
    }
}

#[async_trait]
impl SpeakerModel for MockSpeakerModel {
    async fn diarize(&self, _signal: &Signal) -> Result<Vec<RawTurn>, ModelError> {
        match &self.fail {
            Some(message) => Err(ModelError::model(message.clone())),
            None => Ok(self.turns.clone()),
        }
    }
}
