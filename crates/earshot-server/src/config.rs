//! Service configuration: compiled defaults overridden by `EARSHOT_*`
//! environment variables, overridden in turn by CLI flags in the binary.

use serde::{Deserialize, Serialize};

/// Configuration for the Earshot service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8000`).
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Base URL of the transcription model sidecar.
    pub transcription_url: String,
    /// Base URL of the emotion classifier sidecar.
    pub emotion_url: String,
    /// Base URL of the diarization model sidecar.
    pub diarization_url: String,
    /// Gap threshold (seconds) for merging same-speaker turns.
    pub merge_gap_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024, // 50 MB
            transcription_url: "http://127.0.0.1:9701".into(),
            emotion_url: "http://127.0.0.1:9702".into(),
            diarization_url: "http://127.0.0.1:9703".into(),
            merge_gap_secs: 0.5,
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply `EARSHOT_*` environment variable overrides.
    ///
    /// Each variable has strict parsing rules; invalid or out-of-range
    /// values are logged and ignored, keeping the existing value.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = read_env_string("EARSHOT_HOST") {
            self.host = v;
        }
        if let Some(v) = read_env_u16("EARSHOT_PORT", 1, 65535) {
            self.port = v;
        }
        if let Some(v) = read_env_usize("EARSHOT_MAX_UPLOAD_BYTES", 1024, 1_073_741_824) {
            self.max_upload_bytes = v;
        }
        if let Some(v) = read_env_string("EARSHOT_TRANSCRIPTION_URL") {
            self.transcription_url = v;
        }
        if let Some(v) = read_env_string("EARSHOT_EMOTION_URL") {
            self.emotion_url = v;
        }
        if let Some(v) = read_env_string("EARSHOT_DIARIZATION_URL") {
            self.diarization_url = v;
        }
        if let Some(v) = read_env_f64("EARSHOT_MERGE_GAP_SECS", 0.0, 10.0) {
            self.merge_gap_secs = v;
        }
    }
}

fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    val.parse::<u16>().ok().filter(|v| (min..=max).contains(v))
}

fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    val.parse::<usize>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    val.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (min..=max).contains(v))
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

fn read_env_f64(name: &str, min: f64, max: f64) -> Option<f64> {
    let val = std::env::var(name).ok()?;
    let result = parse_f64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid f64 env var, ignoring");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.merge_gap_secs, 0.5);
    }

    #[test]
    fn u16_range_parsing() {
        assert_eq!(parse_u16_range("9100", 1, 65535), Some(9100));
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("not a port", 1, 65535), None);
        assert_eq!(parse_u16_range("-1", 1, 65535), None);
    }

    #[test]
    fn usize_range_parsing() {
        assert_eq!(parse_usize_range("2048", 1024, 1_073_741_824), Some(2048));
        assert_eq!(parse_usize_range("100", 1024, 1_073_741_824), None);
        assert_eq!(parse_usize_range("", 1024, 1_073_741_824), None);
    }

    #[test]
    fn f64_range_parsing_rejects_non_finite() {
        assert_eq!(parse_f64_range("0.5", 0.0, 10.0), Some(0.5));
        assert_eq!(parse_f64_range("0", 0.0, 10.0), Some(0.0));
        assert_eq!(parse_f64_range("NaN", 0.0, 10.0), None);
        assert_eq!(parse_f64_range("inf", 0.0, 10.0), None);
        assert_eq!(parse_f64_range("11.0", 0.0, 10.0), None);
    }

    #[test]
    fn serde_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.port, config.port);
        assert_eq!(back.transcription_url, config.transcription_url);
    }
}
