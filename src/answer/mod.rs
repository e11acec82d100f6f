//! Answering backend port
//!
//! The assistant never talks to a model API directly; it goes through
//! [`AnswerBackend`] so tests can substitute canned implementations.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::Result;

/// A citation backing a web-searched answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Human-readable title of the cited page
    pub title: String,

    /// Absolute URI of the cited page
    pub uri: String,
}

/// A definition answer with its supporting sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Definition text
    pub text: String,

    /// Citations, deduplicated, in retrieval order
    pub sources: Vec<Source>,
}

/// External question-answering service
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Answer a question grounded strictly in the given page text
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails
    async fn answer_from_context(&self, page_text: &str, question: &str) -> Result<String>;

    /// Look up the meaning of a term via web search
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails
    async fn search_definition(&self, term: &str) -> Result<Definition>;
}
