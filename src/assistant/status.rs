//! Assistant status

/// Status of the reading assistant
///
/// Exactly one value is active at any time; the state machine is the only
/// writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantStatus {
    /// Assistant is off; nothing captured or spoken
    Inactive,
    /// Capturing speech, waiting for the activation phrase
    Listening,
    /// Activation phrase heard; the next utterance is a question
    Activated,
    /// A question is in flight; capture is stopped
    Thinking,
    /// Speaking an answer; capture is stopped
    Speaking,
    /// Terminal capture failure; recovery is toggle off then on
    Error,
}

impl AssistantStatus {
    /// Whether speech capture should be running in this status
    #[must_use]
    pub const fn wants_capture(self) -> bool {
        matches!(self, Self::Listening | Self::Activated)
    }
}

impl std::fmt::Display for AssistantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Inactive => "inactive",
            Self::Listening => "listening",
            Self::Activated => "activated",
            Self::Thinking => "thinking",
            Self::Speaking => "speaking",
            Self::Error => "error",
        };
        write!(f, "{name}")
    }
}
