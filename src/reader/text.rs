//! Plain-text document engine
//!
//! Pages a UTF-8 text file by character budget, breaking at line boundaries.
//! Rendering produces a blank A4-proportioned raster; the terminal frontend
//! reads pages aloud rather than drawing them, so the raster only exercises
//! the display path.

use async_trait::async_trait;

use super::engine::{DocumentEngine, LoadedDocument, PageImage};
use crate::{Error, Result};

/// ISO 216 page proportions, height = width * 297 / 210
const A4_HEIGHT_NUM: u32 = 297;
const A4_HEIGHT_DEN: u32 = 210;

/// Document engine for plain text
pub struct PlainTextEngine {
    page_chars: usize,
}

impl PlainTextEngine {
    /// Create an engine that pages at the given character budget
    #[must_use]
    pub const fn new(page_chars: usize) -> Self {
        Self { page_chars }
    }
}

#[async_trait]
impl DocumentEngine for PlainTextEngine {
    async fn open(&self, data: &[u8]) -> Result<Box<dyn LoadedDocument>> {
        let text = String::from_utf8_lossy(data);
        let pages = paginate(&text, self.page_chars);
        tracing::debug!(pages = pages.len(), bytes = data.len(), "opened text document");
        Ok(Box::new(PlainTextDocument { pages }))
    }
}

struct PlainTextDocument {
    pages: Vec<String>,
}

impl PlainTextDocument {
    fn page(&self, page: u32) -> Result<&String> {
        if page == 0 {
            return Err(Error::Document("page numbers start at 1".to_string()));
        }
        self.pages
            .get(page as usize - 1)
            .ok_or_else(|| Error::Document(format!("page {page} out of range")))
    }
}

#[async_trait]
impl LoadedDocument for PlainTextDocument {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    async fn page_text(&self, page: u32) -> Result<String> {
        self.page(page).cloned()
    }

    async fn render_page(&self, page: u32, width: u32) -> Result<PageImage> {
        self.page(page)?;
        let height = page_height(width);
        let pixels = vec![0xFF; (width as usize) * (height as usize) * 4];
        Ok(PageImage {
            width,
            height,
            pixels,
        })
    }
}

/// A4 height for a viewport width, saturating instead of overflowing
fn page_height(width: u32) -> u32 {
    let height = u64::from(width) * u64::from(A4_HEIGHT_NUM) / u64::from(A4_HEIGHT_DEN);
    u32::try_from(height).unwrap_or(u32::MAX)
}

/// Split text into pages of at most `budget` characters at line boundaries
///
/// A single line longer than the budget becomes its own page rather than
/// being split mid-line. An empty document still has one (empty) page.
fn paginate(text: &str, budget: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    for line in text.lines() {
        let line_chars = line.chars().count();
        if !current.is_empty() && current_chars + line_chars + 1 > budget {
            pages.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_chars += 1;
        }
        current.push_str(line);
        current_chars += line_chars;
    }
    if !current.is_empty() {
        pages.push(current);
    }
    if pages.is_empty() {
        pages.push(String::new());
    }
    pages
}
