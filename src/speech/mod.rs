//! Speech capture and synthesis
//!
//! `engine` defines the recognizer/synthesizer ports and their event types,
//! `capture` and `output` wrap them with the assistant's semantics, and the
//! `terminal` engines make the loop runnable without a platform speech stack.

mod capture;
mod cue;
mod engine;
mod output;
mod terminal;

pub use capture::{CaptureSignal, SpeechCapture};
pub use cue::{AudioCue, CUE_VOLUME};
pub use engine::{
    EngineEvent, EngineEventSender, RecognizerError, RecognizerEvent, SpeakParams,
    SpeechRecognizer, SpeechSynthesizer, SynthesizerEvent, UtteranceId, Voice,
};
pub use output::{OutputSignal, SpeechOutput, select_preferred_voice};
pub use terminal::{LineInput, TerminalRecognizer, TerminalSynthesizer};
