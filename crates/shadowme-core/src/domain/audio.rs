//! Recorded audio samples.
//!
//! Browsers deliver recordings as data URLs (`data:audio/webm;base64,...`).
//! The declared MIME type picks the container extension submitted to the
//! provider; unknown or missing declarations fall back to MP3.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Container formats accepted for voice cloning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioFormat {
    #[default]
    Mp3,
    Webm,
    Mp4,
    Aac,
}

impl AudioFormat {
    /// Detect the container from a data-URL header or bare MIME type.
    pub fn from_declared(header: &str) -> Self {
        let header = header.to_ascii_lowercase();
        if header.contains("audio/webm") {
            Self::Webm
        } else if header.contains("audio/mp4") {
            Self::Mp4
        } else if header.contains("audio/aac") {
            Self::Aac
        } else {
            Self::Mp3
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
            Self::Aac => "aac",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mp3",
            Self::Webm => "audio/webm",
            Self::Mp4 => "audio/mp4",
            Self::Aac => "audio/aac",
        }
    }
}

/// Errors decoding an embedded audio payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioDecodeError {
    #[error("Audio payload has no data-URL separator")]
    MissingSeparator,

    #[error("Audio payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Audio payload is empty")]
    Empty,
}

/// A decoded recording ready to submit for cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSample {
    pub format: AudioFormat,
    pub bytes: Vec<u8>,
}

impl AudioSample {
    /// Decode a `data:<mime>;base64,<payload>` string.
    pub fn from_data_url(data_url: &str) -> Result<Self, AudioDecodeError> {
        let (header, payload) = data_url
            .split_once(',')
            .ok_or(AudioDecodeError::MissingSeparator)?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| AudioDecodeError::InvalidBase64(e.to_string()))?;
        if bytes.is_empty() {
            return Err(AudioDecodeError::Empty);
        }

        Ok(Self {
            format: AudioFormat::from_declared(header),
            bytes,
        })
    }

    /// File name used for the multipart upload.
    pub fn file_name(&self) -> String {
        format!("recording.{}", self.format.extension())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
