//! HTTP sidecar implementations of the model capabilities.
//!
//! Each model runs as its own service; we ship it the audio as a 16-bit
//! PCM WAV in a multipart form and read a JSON payload back. Sidecars are
//! plain HTTP servers, so concurrent invocation is safe and no per-stage
//! serialization is needed here.

use std::io::Cursor;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use earshot_core::Signal;

use crate::model::{
    EmotionClassifier, LabelScore, ModelError, RawTranscript, RawTurn, SpeakerModel, SpeechModel,
};

/// Encode mono f32 samples as a 16-bit PCM WAV blob.
fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, ModelError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| ModelError::resource(format!("wav encode init: {e}")))?;
        for &s in samples {
            writer
                .write_sample((s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
                .map_err(|e| ModelError::resource(format!("wav encode: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| ModelError::resource(format!("wav finalize: {e}")))?;
    }
    Ok(cursor.into_inner())
}

/// POST a WAV (plus optional extra text fields) to a sidecar and parse the
/// JSON response.
async fn post_wav(
    client: &reqwest::Client,
    url: &str,
    wav: Vec<u8>,
    fields: &[(&str, &str)],
) -> Result<Value, ModelError> {
    let part = reqwest::multipart::Part::bytes(wav)
        .file_name("audio.wav")
        .mime_str("audio/wav")
        .map_err(|e| ModelError::resource(format!("multipart: {e}")))?;

    let mut form = reqwest::multipart::Form::new().part("file", part);
    for &(name, value) in fields {
        form = form.text(name.to_owned(), value.to_owned());
    }

    let response = client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| ModelError::resource(format!("sidecar request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ModelError::model(format!(
            "sidecar returned {status}: {body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ModelError::model(format!("sidecar response parse: {e}")))
}

/// Speech-to-text sidecar client.
pub struct SidecarSpeechModel {
    client: reqwest::Client,
    base_url: String,
}

impl SidecarSpeechModel {
    /// Client against `{base_url}/transcribe`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SpeechModel for SidecarSpeechModel {
    async fn transcribe(
        &self,
        signal: &Signal,
        language: Option<&str>,
    ) -> Result<RawTranscript, ModelError> {
        let wav = encode_wav(signal.samples(), signal.sample_rate())?;
        debug!(bytes = wav.len(), ?language, "posting to transcription sidecar");

        let url = format!("{}/transcribe", self.base_url);
        let fields: Vec<(&str, &str)> = language.map(|l| ("language", l)).into_iter().collect();
        let value = post_wav(&self.client, &url, wav, &fields).await?;

        serde_json::from_value(value)
            .map_err(|e| ModelError::model(format!("transcript shape: {e}")))
    }
}

/// Emotion classifier sidecar client.
pub struct SidecarEmotionClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl SidecarEmotionClassifier {
    /// Client against `{base_url}/classify`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EmotionClassifier for SidecarEmotionClassifier {
    async fn classify(&self, clip: &[f32], sample_rate: u32) -> Result<Vec<LabelScore>, ModelError> {
        let wav = encode_wav(clip, sample_rate)?;
        let url = format!("{}/classify", self.base_url);
        let value = post_wav(&self.client, &url, wav, &[]).await?;

        serde_json::from_value(value)
            .map_err(|e| ModelError::model(format!("classification shape: {e}")))
    }
}

/// Diarization sidecar client.
pub struct SidecarSpeakerModel {
    client: reqwest::Client,
    base_url: String,
}

impl SidecarSpeakerModel {
    /// Client against `{base_url}/diarize`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SpeakerModel for SidecarSpeakerModel {
    async fn diarize(&self, signal: &Signal) -> Result<Vec<RawTurn>, ModelError> {
        let wav = encode_wav(signal.samples(), signal.sample_rate())?;
        let url = format!("{}/diarize", self.base_url);
        let value = post_wav(&self.client, &url, wav, &[]).await?;

        serde_json::from_value(value)
            .map_err(|e| ModelError::model(format!("turns shape: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earshot_core::StageErrorKind;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_signal() -> Signal {
        Signal::new(vec![0.5; 1_600], 16_000)
    }

    #[test]
    fn wav_header_and_length() {
        let wav = encode_wav(&[0.0; 160], 16_000).unwrap();
        assert_eq!(&wav[..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44-byte canonical header + 160 i16 samples.
        assert_eq!(wav.len(), 44 + 160 * 2);
    }

    #[tokio::test]
    async fn speech_sidecar_parses_transcript() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "good morning",
                "language": "en",
                "segments": [
                    {"words": [{"text": "good", "start": 0.0, "end": 0.3}]}
                ]
            })))
            .mount(&server)
            .await;

        let model = SidecarSpeechModel::new(server.uri());
        let raw = model.transcribe(&test_signal(), Some("en")).await.unwrap();
        assert_eq!(raw.text, "good morning");
        assert_eq!(raw.segments.len(), 1);
    }

    #[tokio::test]
    async fn sidecar_error_status_is_a_model_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let model = SidecarSpeechModel::new(server.uri());
        let err = model.transcribe(&test_signal(), None).await.unwrap_err();
        assert_eq!(err.kind, StageErrorKind::Model);
        assert!(err.message.contains("503"), "{}", err.message);
    }

    #[tokio::test]
    async fn unreachable_sidecar_is_a_resource_error() {
        // Nothing listens on this port.
        let model = SidecarSpeakerModel::new("http://127.0.0.1:9");
        let err = model.diarize(&test_signal()).await.unwrap_err();
        assert_eq!(err.kind, StageErrorKind::Resource);
    }

    #[tokio::test]
    async fn classifier_parses_label_scores() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"label": "happy", "score": 0.7},
                {"label": "sad", "score": 0.3}
            ])))
            .mount(&server)
            .await;

        let model = SidecarEmotionClassifier::new(server.uri());
        let scores = model.classify(&[0.1; 160], 16_000).await.unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].label, "happy");
    }

    #[tokio::test]
    async fn speaker_sidecar_parses_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/diarize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"speaker_id": "SPEAKER_00", "start_time": 0.0, "end_time": 2.5}
            ])))
            .mount(&server)
            .await;

        let model = SidecarSpeakerModel::new(server.uri());
        let turns = model.diarize(&test_signal()).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].speaker_id, "SPEAKER_00");
    }
}
