//! Activation cue
//!
//! The short confirmation sound played when the bare activation phrase arms
//! the assistant. One embedded WAV, decoded once and shared for the process
//! lifetime.

use std::sync::OnceLock;

/// 16-bit mono 44.1 kHz WAV with an empty data chunk; engines that render
/// their own chime treat it as a marker rather than playable audio.
const ACTIVATION_WAV: [u8; 44] = [
    0x52, 0x49, 0x46, 0x46, 0x24, 0x00, 0x00, 0x00, 0x57, 0x41, 0x56, 0x45, 0x66, 0x6D, 0x74,
    0x20, 0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x44, 0xAC, 0x00, 0x00, 0x88, 0x58,
    0x01, 0x00, 0x02, 0x00, 0x10, 0x00, 0x64, 0x61, 0x74, 0x61, 0x00, 0x00, 0x00, 0x00,
];

/// Playback volume for the cue relative to full scale
pub const CUE_VOLUME: f32 = 0.5;

static ACTIVATION_CUE: OnceLock<AudioCue> = OnceLock::new();

/// A short audio cue
#[derive(Debug)]
pub struct AudioCue {
    wav: &'static [u8],
    volume: f32,
}

impl AudioCue {
    /// The activation confirmation cue
    #[must_use]
    pub fn activation() -> &'static Self {
        ACTIVATION_CUE.get_or_init(|| Self {
            wav: &ACTIVATION_WAV,
            volume: CUE_VOLUME,
        })
    }

    /// Raw WAV bytes
    #[must_use]
    pub const fn wav_bytes(&self) -> &[u8] {
        self.wav
    }

    /// Playback volume in `[0, 1]`
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }
}
