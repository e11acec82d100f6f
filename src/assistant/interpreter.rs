//! Utterance interpretation
//!
//! Pure classification of finalized utterances against the current assistant
//! status. No side effects; the state machine acts on the returned decision.

use super::AssistantStatus;

/// Fixed phrase that arms the assistant while listening
pub const ACTIVATION_PHRASE: &str = "hello hello";

/// Decision for a single utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// Utterance carries nothing actionable
    NoAction,
    /// Bare activation phrase; arm the assistant for the next utterance
    Activate,
    /// An extracted question
    Question(String),
}

/// Classify one utterance
///
/// While ACTIVATED the whole utterance is the question. While LISTENING the
/// utterance must start with the activation phrase; the tail past the phrase
/// (original casing) becomes the question. A bare phrase activates; a phrase
/// followed only by punctuation is ignored. All other statuses ignore input.
#[must_use]
pub fn interpret(utterance: &str, status: AssistantStatus) -> Interpretation {
    if !status.wants_capture() {
        return Interpretation::NoAction;
    }

    let trimmed = utterance.trim();
    if status == AssistantStatus::Activated {
        return question_from(trimmed);
    }

    let normalized = normalize(trimmed);
    if !normalized.starts_with(ACTIVATION_PHRASE) {
        return Interpretation::NoAction;
    }

    // Slice the original-case text past the phrase so the question keeps its
    // capitalization. The phrase is ASCII, but guard the boundary anyway.
    let Some(tail) = trimmed.get(ACTIVATION_PHRASE.len()..) else {
        return Interpretation::NoAction;
    };

    if normalized == ACTIVATION_PHRASE {
        if tail.trim().is_empty() {
            return Interpretation::Activate;
        }
        // Phrase plus stray punctuation ("hello hello?"): not a question,
        // not an activation.
        return Interpretation::NoAction;
    }

    question_from(tail)
}

/// Trim separators and return a question, or nothing if none remains
fn question_from(text: &str) -> Interpretation {
    let question =
        text.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?'));
    let question = question.trim();
    if question.is_empty() {
        Interpretation::NoAction
    } else {
        Interpretation::Question(question.to_string())
    }
}

/// Lowercase, trim, and strip trailing punctuation
fn normalize(utterance: &str) -> String {
    utterance
        .to_lowercase()
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?'))
        .trim_start()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_outside_listening_states() {
        for status in [
            AssistantStatus::Inactive,
            AssistantStatus::Thinking,
            AssistantStatus::Speaking,
            AssistantStatus::Error,
        ] {
            assert_eq!(
                interpret("Hello Hello what is gravity", status),
                Interpretation::NoAction
            );
        }
    }

    #[test]
    fn test_phrase_with_tail_extracts_question() {
        assert_eq!(
            interpret("Hello Hello what is gravity", AssistantStatus::Listening),
            Interpretation::Question("what is gravity".to_string())
        );
    }

    #[test]
    fn test_question_keeps_original_case() {
        assert_eq!(
            interpret("hello hello Who is Ahab", AssistantStatus::Listening),
            Interpretation::Question("Who is Ahab".to_string())
        );
    }

    #[test]
    fn test_bare_phrase_activates() {
        assert_eq!(
            interpret("Hello Hello", AssistantStatus::Listening),
            Interpretation::Activate
        );
        assert_eq!(
            interpret("  HELLO HELLO  ", AssistantStatus::Listening),
            Interpretation::Activate
        );
    }

    #[test]
    fn test_missing_phrase_ignored() {
        assert_eq!(
            interpret("tell me about gravity", AssistantStatus::Listening),
            Interpretation::NoAction
        );
    }

    #[test]
    fn test_phrase_with_only_punctuation_ignored() {
        assert_eq!(
            interpret("Hello Hello?", AssistantStatus::Listening),
            Interpretation::NoAction
        );
        assert_eq!(
            interpret("Hello Hello !.", AssistantStatus::Listening),
            Interpretation::NoAction
        );
    }

    #[test]
    fn test_separator_after_phrase_dropped_from_question() {
        assert_eq!(
            interpret("Hello Hello, what is gravity?", AssistantStatus::Listening),
            Interpretation::Question("what is gravity?".to_string())
        );
    }

    #[test]
    fn test_activated_takes_input_verbatim() {
        assert_eq!(
            interpret("Why did the chapter end there?", AssistantStatus::Activated),
            Interpretation::Question("Why did the chapter end there?".to_string())
        );
    }

    #[test]
    fn test_activated_empty_input_ignored() {
        assert_eq!(
            interpret("   ", AssistantStatus::Activated),
            Interpretation::NoAction
        );
    }
}
