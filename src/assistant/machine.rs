//! Assistant state machine
//!
//! Single owner of the assistant status. Every external happening — toggle,
//! utterance, resolved answer, finished speech, capture failure — arrives as
//! one [`AssistantEvent`]; the machine mutates its state and returns the side
//! effects to run. It performs no IO itself, which keeps every transition
//! unit-testable.

use super::router::RoutedAnswer;
use super::{Action, AssistantEvent, AssistantResponse, AssistantStatus, Interpretation, interpret};

/// The reading assistant's central orchestrator state
#[derive(Debug)]
pub struct Assistant {
    status: AssistantStatus,
    enabled: bool,
    question_seq: u64,
    last_utterance: Option<String>,
    last_response: Option<AssistantResponse>,
}

impl Assistant {
    /// Create a new assistant, toggled off
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: AssistantStatus::Inactive,
            enabled: false,
            question_seq: 0,
            last_utterance: None,
            last_response: None,
        }
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> AssistantStatus {
        self.status
    }

    /// Whether the user has the assistant toggled on
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The question currently shown, if any
    #[must_use]
    pub fn last_utterance(&self) -> Option<&str> {
        self.last_utterance.as_deref()
    }

    /// The response currently shown, if any
    #[must_use]
    pub const fn last_response(&self) -> Option<&AssistantResponse> {
        self.last_response.as_ref()
    }

    /// Apply one event, returning the actions to execute in order
    pub fn apply(&mut self, event: AssistantEvent) -> Vec<Action> {
        match event {
            AssistantEvent::Toggled(true) => self.toggle_on(),
            AssistantEvent::Toggled(false) => self.toggle_off(),
            AssistantEvent::Utterance(text) => self.on_utterance(&text),
            AssistantEvent::AnswerReady { seq, answer } => self.on_answer(seq, answer),
            AssistantEvent::SpeechEnded => self.on_speech_ended(),
            AssistantEvent::CaptureFailed => self.on_capture_failed(),
        }
    }

    fn toggle_on(&mut self) -> Vec<Action> {
        if self.status != AssistantStatus::Inactive {
            tracing::debug!(status = %self.status, "toggle-on ignored");
            return Vec::new();
        }
        self.enabled = true;
        self.set_status(AssistantStatus::Listening);
        vec![Action::StartCapture]
    }

    fn toggle_off(&mut self) -> Vec<Action> {
        self.enabled = false;
        self.last_utterance = None;
        self.last_response = None;
        if self.status == AssistantStatus::Inactive {
            return Vec::new();
        }
        self.set_status(AssistantStatus::Inactive);
        vec![Action::StopCapture, Action::CancelSpeech]
    }

    fn on_utterance(&mut self, text: &str) -> Vec<Action> {
        match interpret(text, self.status) {
            Interpretation::NoAction => {
                tracing::trace!(status = %self.status, "utterance ignored");
                Vec::new()
            }
            Interpretation::Activate => {
                self.set_status(AssistantStatus::Activated);
                vec![Action::PlayActivationCue]
            }
            Interpretation::Question(question) => self.submit_question(question),
        }
    }

    /// Enter THINKING with a fresh sequence number
    ///
    /// Capture stops first, so no further utterances can arrive while the
    /// question is in flight; re-entry is structurally impossible.
    fn submit_question(&mut self, question: String) -> Vec<Action> {
        self.question_seq += 1;
        self.last_utterance = Some(question.clone());
        self.last_response = None;
        self.set_status(AssistantStatus::Thinking);
        vec![
            Action::StopCapture,
            Action::ShowQuestion(question.clone()),
            Action::SubmitQuestion {
                seq: self.question_seq,
                question,
            },
        ]
    }

    fn on_answer(&mut self, seq: u64, answer: RoutedAnswer) -> Vec<Action> {
        if self.status != AssistantStatus::Thinking || seq != self.question_seq {
            tracing::debug!(
                seq,
                current = self.question_seq,
                status = %self.status,
                "stale answer discarded"
            );
            return Vec::new();
        }
        self.last_response = Some(answer.response.clone());
        self.set_status(AssistantStatus::Speaking);
        vec![Action::ShowResponse(answer.response), Action::Speak(answer.spoken)]
    }

    fn on_speech_ended(&mut self) -> Vec<Action> {
        if self.status != AssistantStatus::Speaking {
            tracing::trace!(status = %self.status, "speech-ended ignored");
            return Vec::new();
        }
        if self.enabled {
            // Next cycle starts clean.
            self.last_utterance = None;
            self.last_response = None;
            self.set_status(AssistantStatus::Listening);
            vec![Action::StartCapture]
        } else {
            self.set_status(AssistantStatus::Inactive);
            Vec::new()
        }
    }

    fn on_capture_failed(&mut self) -> Vec<Action> {
        if !self.status.wants_capture() {
            return Vec::new();
        }
        self.set_status(AssistantStatus::Error);
        Vec::new()
    }

    fn set_status(&mut self, next: AssistantStatus) {
        if self.status != next {
            tracing::debug!(from = %self.status, to = %next, "status change");
            self.status = next;
        }
    }
}

impl Default for Assistant {
    fn default() -> Self {
        Self::new()
    }
}
