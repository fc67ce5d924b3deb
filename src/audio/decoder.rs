// Audio decoder using Symphonia
// Opens walk-up songs to prove they are playable and to learn how long they run

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::PlaybackError;

pub struct AudioDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    n_frames: Option<u64>,
}

impl AudioDecoder {
    /// Open an audio file and prepare for decoding
    pub fn open(path: &Path) -> Result<Self, PlaybackError> {
        let display = path.display().to_string();
        let decode_error = |reason: String| PlaybackError::Decode {
            path: display.clone(),
            reason,
        };

        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlaybackError::Missing(display.clone()),
            _ => decode_error(e.to_string()),
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint using the file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| decode_error(format!("unrecognized format: {}", e)))?;

        let format = probed.format;

        // Find the first audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| decode_error("no audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);
        let n_frames = track.codec_params.n_frames;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| decode_error(format!("no decoder: {}", e)))?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            n_frames,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Duration from the container header, if it has one
    pub fn header_duration(&self) -> Option<Duration> {
        self.n_frames.map(|frames| frames_to_duration(frames, self.sample_rate))
    }

    /// Header duration, or the length found by decoding the whole stream.
    pub fn duration(mut self) -> Result<Duration, PlaybackError> {
        if let Some(duration) = self.header_duration() {
            return Ok(duration);
        }

        let mut frames: u64 = 0;
        while let Some(decoded) = self.decode_next()? {
            frames += decoded as u64;
        }
        debug!(frames, sample_rate = self.sample_rate, "Measured duration by decoding");
        Ok(frames_to_duration(frames, self.sample_rate))
    }

    /// Decode the next packet of our track, returning its frame count.
    /// Returns None at end of stream.
    pub fn decode_next(&mut self) -> Result<Option<usize>, PlaybackError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(PlaybackError::Decode {
                        path: String::from("<stream>"),
                        reason: format!("failed to read packet: {}", e),
                    })
                }
            };

            // Skip packets from other tracks
            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => return Ok(Some(decoded.frames())),
                Err(SymphoniaError::DecodeError(e)) => {
                    debug!("Decode error (skipping): {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(PlaybackError::Decode {
                        path: String::from("<stream>"),
                        reason: e.to_string(),
                    })
                }
            }
        }
    }
}

fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(frames as f64 / sample_rate as f64)
}
