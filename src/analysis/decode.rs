//! Excerpt decoding to mono `f32` samples.
//!
//! Downloaded excerpts are written to a scoped temporary file which is removed
//! when the [`ExcerptFile`] guard is dropped, on success and error paths alike.

use crate::{AtelierError, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = "atelier-excerpt-";

/// Decoded audio, channels averaged down to one.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Temporary file holding one downloaded excerpt.
///
/// The file lives exactly as long as the guard.
#[derive(Debug)]
pub struct ExcerptFile {
    file: NamedTempFile,
}

impl ExcerptFile {
    /// Write `bytes` to a fresh temporary file.
    ///
    /// The file extension is guessed from the leading bytes so the decoder
    /// gets a format hint.
    pub fn write(bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(guess_extension(bytes))
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        log::trace!("Excerpt written to {}", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// File extension matching the container signature of `bytes`.
pub fn guess_extension(bytes: &[u8]) -> &'static str {
    match bytes {
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => ".wav",
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => ".m4a",
        [b'I', b'D', b'3', ..] => ".mp3",
        [0xFF, second, ..] if second & 0xE0 == 0xE0 => ".mp3",
        _ => ".bin",
    }
}

/// Decode at most `max_seconds` of the file at `path` to mono samples.
///
/// Corrupt packets are skipped. A file yielding no samples at all is an
/// [`AtelierError::Decode`].
pub fn decode_mono(path: &Path, max_seconds: f64) -> Result<DecodedAudio> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AtelierError::Decode(format!("Unrecognised audio format: {e}")))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AtelierError::Decode("No audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| AtelierError::Decode("Unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AtelierError::Decode(format!("Unsupported codec: {e}")))?;

    let max_samples = (max_seconds.max(0.0) * f64::from(sample_rate)) as usize;
    let mut samples: Vec<f32> = Vec::with_capacity(max_samples);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AtelierError::Decode(format!("Failed to read packet: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::trace!("Skipping corrupt packet: {msg}");
                continue;
            }
            Err(e) => return Err(AtelierError::Decode(format!("Failed to decode: {e}"))),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);

        samples.extend(
            buffer
                .samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
        );

        if samples.len() >= max_samples {
            samples.truncate(max_samples);
            break;
        }
    }

    if samples.is_empty() {
        return Err(AtelierError::Decode("Excerpt contains no audio".to_string()));
    }

    log::debug!(
        "Decoded {} samples at {} Hz from {}",
        samples.len(),
        sample_rate,
        path.display()
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}
