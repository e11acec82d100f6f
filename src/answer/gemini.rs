//! Gemini answering client
//!
//! Calls the generative-language REST API for grounded page Q&A and
//! web-search definition lookups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AnswerBackend, Definition, Source};
use crate::{Error, Result};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Steers grounded answers to the supplied page text and nothing else.
const READING_ASSISTANT_INSTRUCTION: &str = "You are a friendly and insightful reading assistant. \
    Your goal is to help a user understand the book they are reading. \
    Answer the user's question based *only* on the provided text from the book page. \
    Keep your answer concise and directly related to the provided context. \
    If the answer is not in the text, say \"I can't find the answer to that in the text provided.\" \
    Do not use outside knowledge.";

const GROUNDED_TEMPERATURE: f32 = 0.4;
const DEFINITION_TEMPERATURE: f32 = 0.2;

/// Title used when a grounding chunk carries a URI but no title
const UNKNOWN_SOURCE_TITLE: &str = "Unknown Source";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: vec![Part { text }],
        }
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Deserialize)]
struct WebSource {
    title: Option<String>,
    uri: Option<String>,
}

/// Answers questions via the Gemini generative-language API
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Gemini API key required for answering".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<GenerateResponse> {
        let url = format!("{API_BASE}/{}:generateContent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Gemini request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Gemini API error");
            return Err(Error::Answer(format!("Gemini API error {status}: {body}")));
        }

        let result: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Gemini response");
            e
        })?;

        Ok(result)
    }
}

#[async_trait]
impl AnswerBackend for GeminiClient {
    async fn answer_from_context(&self, page_text: &str, question: &str) -> Result<String> {
        tracing::debug!(
            context_chars = page_text.len(),
            question = %question,
            "asking grounded question"
        );

        let prompt =
            format!("CONTEXT FROM BOOK PAGE:\n---\n{page_text}\n---\nMY QUESTION: \"{question}\"");
        let request = GenerateRequest {
            system_instruction: Some(Content::text(READING_ASSISTANT_INSTRUCTION)),
            contents: vec![Content::text(&prompt)],
            generation_config: GenerationConfig {
                temperature: GROUNDED_TEMPERATURE,
            },
            tools: None,
        };

        let response = self.generate(&request).await?;
        let text = candidate_text(&response);
        tracing::info!(answer_chars = text.len(), "grounded answer complete");
        Ok(text)
    }

    async fn search_definition(&self, term: &str) -> Result<Definition> {
        tracing::debug!(term = %term, "searching definition");

        let prompt = format!(
            "What is the meaning or definition of the word \"{term}\"? Provide a concise definition."
        );
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content::text(&prompt)],
            generation_config: GenerationConfig {
                temperature: DEFINITION_TEMPERATURE,
            },
            tools: Some(vec![Tool {
                google_search: GoogleSearch {},
            }]),
        };

        let response = self.generate(&request).await?;
        let text = candidate_text(&response);
        let sources = collect_sources(&response);
        tracing::info!(
            answer_chars = text.len(),
            source_count = sources.len(),
            "definition lookup complete"
        );
        Ok(Definition { text, sources })
    }
}

/// Concatenated text parts of the first candidate
fn candidate_text(response: &GenerateResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default()
}

/// Grounding citations of the first candidate, deduplicated by URI
///
/// Chunks without an absolute URI are dropped; missing titles fall back to a
/// fixed placeholder. Order follows the API response.
fn collect_sources(response: &GenerateResponse) -> Vec<Source> {
    let mut seen = std::collections::HashSet::new();
    let mut sources = Vec::new();

    let chunks = response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|m| m.grounding_chunks.as_slice())
        .unwrap_or_default();

    for chunk in chunks {
        let Some(web) = &chunk.web else { continue };
        let Some(uri) = web.uri.as_deref() else {
            continue;
        };
        if url::Url::parse(uri).is_err() {
            tracing::debug!(uri = %uri, "dropping grounding chunk with invalid uri");
            continue;
        }
        if !seen.insert(uri.to_string()) {
            continue;
        }
        sources.push(Source {
            title: web
                .title
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE_TITLE.to_string()),
            uri: uri.to_string(),
        });
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn joins_candidate_text_parts() {
        let response = parse(
            r#"{
                "candidates": [{
                    "content": { "parts": [{ "text": "Gravity is " }, { "text": "a force." }] }
                }]
            }"#,
        );
        assert_eq!(candidate_text(&response), "Gravity is a force.");
    }

    #[test]
    fn empty_response_yields_empty_text() {
        let response = parse("{}");
        assert_eq!(candidate_text(&response), "");
        assert!(collect_sources(&response).is_empty());
    }

    #[test]
    fn collects_and_dedups_sources() {
        let response = parse(
            r##"{
                "candidates": [{
                    "content": { "parts": [{ "text": "A happy accident." }] },
                    "groundingMetadata": {
                        "groundingChunks": [
                            { "web": { "title": "Wiktionary", "uri": "https://en.wiktionary.org/wiki/serendipity" } },
                            { "web": { "uri": "https://example.com/def" } },
                            { "web": { "title": "Dup", "uri": "https://en.wiktionary.org/wiki/serendipity" } },
                            { "web": { "title": "Bad", "uri": "#" } },
                            { "web": { "title": "NoUri" } },
                            {}
                        ]
                    }
                }]
            }"##,
        );

        let sources = collect_sources(&response);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Wiktionary");
        assert_eq!(sources[0].uri, "https://en.wiktionary.org/wiki/serendipity");
        assert_eq!(sources[1].title, UNKNOWN_SOURCE_TITLE);
        assert_eq!(sources[1].uri, "https://example.com/def");
    }

    #[test]
    fn request_serializes_with_api_field_names() {
        let prompt = "MY QUESTION: \"what is gravity\"";
        let request = GenerateRequest {
            system_instruction: Some(Content::text(READING_ASSISTANT_INSTRUCTION)),
            contents: vec![Content::text(prompt)],
            generation_config: GenerationConfig {
                temperature: GROUNDED_TEMPERATURE,
            },
            tools: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("systemInstruction").is_some());
        assert!(value.get("tools").is_none());
        assert_eq!(
            value["generationConfig"]["temperature"],
            serde_json::json!(GROUNDED_TEMPERATURE)
        );
        assert_eq!(value["contents"][0]["parts"][0]["text"], prompt);
    }

    #[test]
    fn definition_request_enables_search_tool() {
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content::text("define x")],
            generation_config: GenerationConfig {
                temperature: DEFINITION_TEMPERATURE,
            },
            tools: Some(vec![Tool {
                google_search: GoogleSearch {},
            }]),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("systemInstruction").is_none());
        assert_eq!(value["tools"][0]["googleSearch"], serde_json::json!({}));
    }

    #[test]
    fn empty_api_key_rejected() {
        let err = GeminiClient::new(String::new(), "gemini-2.5-flash".to_string())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
