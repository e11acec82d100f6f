//! Speech engine ports
//!
//! Trait seams over the host's recognition and synthesis engines. Engines
//! push their callbacks into the session loop as [`EngineEvent`]s over a
//! channel; the wrappers in `capture` and `output` translate those into
//! assistant semantics.

use tokio::sync::mpsc;

use super::cue::AudioCue;
use crate::Result;

/// Identifies one `speak` call for completion reporting
pub type UtteranceId = u64;

/// Channel half handed to engines at construction
pub type EngineEventSender = mpsc::UnboundedSender<EngineEvent>;

/// Events pushed by speech engines into the session loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// From the recognition engine
    Recognizer(RecognizerEvent),

    /// From the synthesis engine
    Synthesizer(SynthesizerEvent),
}

/// Callbacks from a recognition session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// A finalized transcript
    Transcript(String),

    /// The engine reported an error
    Error(RecognizerError),

    /// The recognition session ended
    Ended,
}

/// Recognition engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerError {
    /// Nothing was heard before the engine gave up
    NoSpeech,

    /// The session was aborted by the host
    Aborted,

    /// Anything else; terminal for the session
    Other(String),
}

impl RecognizerError {
    /// Whether listening survives this error
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoSpeech | Self::Aborted)
    }
}

impl std::fmt::Display for RecognizerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSpeech => write!(f, "no-speech"),
            Self::Aborted => write!(f, "aborted"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

/// Callbacks from the synthesis engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesizerEvent {
    /// The identified utterance finished playing or failed
    Finished {
        utterance: UtteranceId,
        error: Option<String>,
    },

    /// The voice inventory changed (voices may load after startup)
    VoicesChanged,
}

/// A synthesizer voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Engine-assigned identifier
    pub id: String,

    /// Display name (e.g. "Google English Female")
    pub name: String,

    /// BCP 47 language tag (e.g. "en-IN")
    pub language: String,
}

/// Delivery settings for one utterance
#[derive(Debug, Clone)]
pub struct SpeakParams {
    /// Voice to use; engine default when `None`
    pub voice_id: Option<String>,

    /// Language hint applied when no specific voice was selected
    pub language: String,

    /// Speech rate multiplier
    pub rate: f64,

    /// Speech pitch multiplier
    pub pitch: f64,
}

/// Continuous speech-recognition engine
pub trait SpeechRecognizer: Send {
    /// Begin a continuous recognition session
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot start
    fn start(&mut self) -> Result<()>;

    /// End the session; pending results may still be delivered
    fn stop(&mut self);
}

/// Speech-synthesis engine
pub trait SpeechSynthesizer: Send {
    /// Current voice inventory, possibly empty until the engine loads it
    fn voices(&self) -> Vec<Voice>;

    /// Speak text, returning the utterance id its completion will carry
    ///
    /// # Errors
    ///
    /// Returns error if the utterance cannot be queued
    fn speak(&mut self, text: &str, params: &SpeakParams) -> Result<UtteranceId>;

    /// Cancel the in-flight utterance, if any
    fn cancel(&mut self);

    /// Play a short cue sound
    fn play_cue(&mut self, cue: &AudioCue);
}
