//! Typed events and actions for the assistant state machine
//!
//! Engine callbacks never touch assistant state directly; they are reduced to
//! [`AssistantEvent`]s posted into [`Assistant::apply`](super::Assistant::apply),
//! which answers with the [`Action`]s the session shell must execute.

use super::router::{AssistantResponse, RoutedAnswer};

/// Input events consumed by the state machine
#[derive(Debug, Clone)]
pub enum AssistantEvent {
    /// Master toggle switched on or off
    Toggled(bool),

    /// A finalized, trimmed, non-empty utterance from speech capture
    Utterance(String),

    /// The routed answer for the question submitted under `seq`
    AnswerReady { seq: u64, answer: RoutedAnswer },

    /// Speech output finished (normal end or synthesis error)
    SpeechEnded,

    /// Speech capture failed terminally
    CaptureFailed,
}

/// Side effects requested by a transition, executed in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start speech capture
    StartCapture,

    /// Stop speech capture
    StopCapture,

    /// Play the activation confirmation cue
    PlayActivationCue,

    /// Submit a question to the router under the given sequence number
    SubmitQuestion { seq: u64, question: String },

    /// Speak the given text
    Speak(String),

    /// Cancel any in-flight speech
    CancelSpeech,

    /// Present the recorded question
    ShowQuestion(String),

    /// Present the recorded response
    ShowResponse(AssistantResponse),
}
