//! Speech capture
//!
//! Wraps a recognition engine behind an explicit listening-intent flag.
//! Start and stop are idempotent, transcripts are trimmed before they are
//! forwarded, transient engine errors are swallowed, and a session that dies
//! on its own is restarted for as long as the intent flag holds.

use super::engine::{RecognizerEvent, SpeechRecognizer};

/// What the session should do with a recognizer event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSignal {
    /// Forward this utterance to the interpreter
    Utterance(String),

    /// Capture died and will not recover on its own
    Failed,
}

/// Recognition wrapper with idempotent start/stop
pub struct SpeechCapture {
    engine: Option<Box<dyn SpeechRecognizer>>,
    intent: bool,
}

impl SpeechCapture {
    /// Create capture over a recognition engine
    #[must_use]
    pub fn new(engine: Box<dyn SpeechRecognizer>) -> Self {
        Self {
            engine: Some(engine),
            intent: false,
        }
    }

    /// Capture for hosts without recognition support; every call no-ops
    #[must_use]
    pub const fn unsupported() -> Self {
        Self {
            engine: None,
            intent: false,
        }
    }

    /// Whether a recognition engine is available at all
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    /// Whether capture currently intends to listen
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.intent
    }

    /// Start continuous capture, returning whether it is now listening
    ///
    /// Calling while already listening is a no-op that reports success.
    pub fn start_listening(&mut self) -> bool {
        if self.intent {
            return true;
        }
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        if let Err(e) = engine.start() {
            tracing::error!(error = %e, "failed to start speech capture");
            return false;
        }
        self.intent = true;
        tracing::debug!("speech capture started");
        true
    }

    /// Stop capture; calling while not listening is a no-op
    pub fn stop_listening(&mut self) {
        if !self.intent {
            return;
        }
        self.intent = false;
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
        tracing::debug!("speech capture stopped");
    }

    /// Translate one engine event into an assistant-facing signal
    ///
    /// Late transcripts are forwarded even after a stop; the state machine
    /// decides whether anything listens to them.
    pub fn handle_event(&mut self, event: RecognizerEvent) -> Option<CaptureSignal> {
        match event {
            RecognizerEvent::Transcript(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    tracing::trace!("empty transcript skipped");
                    None
                } else {
                    Some(CaptureSignal::Utterance(trimmed.to_string()))
                }
            }
            RecognizerEvent::Error(err) if err.is_transient() => {
                tracing::debug!(error = %err, "transient capture error");
                None
            }
            RecognizerEvent::Error(err) => {
                tracing::error!(error = %err, "capture error");
                self.intent = false;
                Some(CaptureSignal::Failed)
            }
            RecognizerEvent::Ended => self.on_session_ended(),
        }
    }

    /// Engine sessions can end on their own (platform timeouts); restart
    /// while the intent flag still holds.
    fn on_session_ended(&mut self) -> Option<CaptureSignal> {
        if !self.intent {
            tracing::debug!("recognition session ended");
            return None;
        }
        let engine = self.engine.as_mut()?;
        match engine.start() {
            Ok(()) => {
                tracing::debug!("recognition session restarted");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to restart recognition session");
                self.intent = false;
                Some(CaptureSignal::Failed)
            }
        }
    }
}
