//! Container decoding via symphonia.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use earshot_core::AudioError;

/// Raw decoder output, before downmix and resampling.
#[derive(Debug)]
pub struct DecodedAudio {
    /// Interleaved f32 samples (frame-major).
    pub interleaved: Vec<f32>,
    /// Source sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: usize,
}

/// Decode audio bytes into interleaved f32 samples.
///
/// Supports WAV, M4A/AAC, and other formats via symphonia. The optional
/// `content_type` is fed into the probe as an extension hint; probing works
/// without it for self-describing containers.
pub fn decode(raw: &[u8], content_type: Option<&str>) -> Result<DecodedAudio, AudioError> {
    let cursor = Cursor::new(raw.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &probe_hint(content_type),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(format!("probe failed: {e}")))?;

    let mut format = probed.format;

    // First real audio track; containers can carry data tracks too.
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no audio track found".into()))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| AudioError::Decode("source sample rate unknown".into()))?;
    let channels = codec_params.channels.map_or(1, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("codec init failed: {e}")))?;

    let mut interleaved: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(AudioError::Decode(format!("packet read: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AudioError::Decode(format!("decode: {e}")))?;

        let spec = *decoded.spec();
        let n_frames = decoded.capacity();
        let mut sample_buf = SampleBuffer::<f32>::new(n_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sample_buf.samples());
    }

    Ok(DecodedAudio {
        interleaved,
        sample_rate,
        channels,
    })
}

/// Collapse interleaved multi-channel samples to mono.
///
/// Lossy, deterministic, not configurable: each output sample is the
/// arithmetic mean of that frame's channels.
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn probe_hint(content_type: Option<&str>) -> Hint {
    let mut hint = Hint::new();
    match content_type {
        Some("audio/wav" | "audio/wave" | "audio/x-wav") => {
            let _ = hint.with_extension("wav");
        }
        Some("audio/m4a" | "audio/mp4" | "audio/x-m4a" | "audio/aac") => {
            let _ = hint.with_extension("m4a");
        }
        _ => {}
    }
    hint
}
