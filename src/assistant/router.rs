//! Question routing
//!
//! Decides whether a question is a definition lookup (web search) or a
//! grounded page question, dispatches to the answering backend, and shapes
//! the reply into display and spoken copies. Backend failures are absorbed
//! here; the state machine only ever sees a finished answer.

use std::sync::Arc;

use crate::answer::{AnswerBackend, Definition, Source};

/// Ordered definition-trigger prefixes; first match wins
const DEFINITION_TRIGGERS: [&str; 3] = [
    "define ",
    "what is the meaning of ",
    "what's the meaning of ",
];

/// Substituted when an answer strips down to nothing speakable
const EMPTY_ANSWER_FALLBACK: &str =
    "I'm sorry, I couldn't find an answer to that. Please try rephrasing.";

/// Substituted when grounded answering fails
const ANSWER_APOLOGY: &str =
    "I'm sorry, I encountered an error while trying to answer your question. Please try again.";

/// Substituted when definition search fails
const SEARCH_APOLOGY: &str =
    "I'm sorry, I encountered an error while searching the web for a definition. Please try again.";

/// A response ready for the display layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantResponse {
    /// Answer text, markup intact
    pub text: String,

    /// Citations (empty for grounded answers)
    pub sources: Vec<Source>,
}

/// A routed answer: display copy plus the speakable rendition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedAnswer {
    /// What the display layer shows
    pub response: AssistantResponse,

    /// What speech output says (markup stripped)
    pub spoken: String,
}

/// How a question will be answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Web-search definition lookup for the extracted term
    Definition(String),

    /// Page-grounded question
    Grounded,
}

/// Classify question text against the definition triggers
///
/// Case-insensitive prefix match in declaration order. The remainder, with a
/// single trailing `?` removed, is the lookup term; an empty remainder falls
/// through to grounded answering.
#[must_use]
pub fn classify(question: &str) -> QuestionKind {
    let lower = question.to_lowercase();
    for trigger in DEFINITION_TRIGGERS {
        if !lower.starts_with(trigger) {
            continue;
        }
        let term = question
            .get(trigger.len()..)
            .map(|rest| {
                let rest = rest.trim();
                rest.strip_suffix('?').unwrap_or(rest).trim_end()
            })
            .unwrap_or_default();
        if term.is_empty() {
            break;
        }
        return QuestionKind::Definition(term.to_string());
    }
    QuestionKind::Grounded
}

/// Routes questions to the answering backend
#[derive(Clone)]
pub struct QuestionRouter {
    backend: Arc<dyn AnswerBackend>,
}

impl QuestionRouter {
    /// Create a router over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn AnswerBackend>) -> Self {
        Self { backend }
    }

    /// Answer one question against the given page context
    ///
    /// Never fails: backend errors become fixed apologies with no sources.
    pub async fn route(&self, question: &str, page_text: &str) -> RoutedAnswer {
        let (text, sources) = match classify(question) {
            QuestionKind::Definition(term) => {
                tracing::debug!(term = %term, "routing definition lookup");
                match self.backend.search_definition(&term).await {
                    Ok(Definition { text, sources }) => (text, sources),
                    Err(e) => {
                        tracing::error!(error = %e, term = %term, "definition lookup failed");
                        (SEARCH_APOLOGY.to_string(), Vec::new())
                    }
                }
            }
            QuestionKind::Grounded => {
                tracing::debug!(context_chars = page_text.len(), "routing grounded question");
                match self.backend.answer_from_context(page_text, question).await {
                    Ok(text) => (text, Vec::new()),
                    Err(e) => {
                        tracing::error!(error = %e, "grounded answer failed");
                        (ANSWER_APOLOGY.to_string(), Vec::new())
                    }
                }
            }
        };

        shape_answer(text, sources)
    }
}

/// Build the display and spoken copies of an answer
fn shape_answer(text: String, sources: Vec<Source>) -> RoutedAnswer {
    let spoken = strip_markup(&text);
    if spoken.trim().is_empty() {
        return RoutedAnswer {
            response: AssistantResponse {
                text: EMPTY_ANSWER_FALLBACK.to_string(),
                sources: Vec::new(),
            },
            spoken: EMPTY_ANSWER_FALLBACK.to_string(),
        };
    }
    RoutedAnswer {
        response: AssistantResponse { text, sources },
        spoken,
    }
}

/// Strip markup emphasis characters from a spoken copy
fn strip_markup(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '#'))
        .collect()
}
