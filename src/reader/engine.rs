//! Document engine ports
//!
//! Trait seams over the document-rendering library. A loaded document hands
//! back page text for grounding and rasterized pages for display; both are
//! async because real engines decode lazily.

use async_trait::async_trait;

use crate::Result;

/// A rendered page raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels, sized to preserve the page aspect ratio
    pub height: u32,

    /// RGBA8 pixel data, row-major
    pub pixels: Vec<u8>,
}

/// Opens documents from raw bytes
#[async_trait]
pub trait DocumentEngine: Send + Sync {
    /// Open a document
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a readable document
    async fn open(&self, data: &[u8]) -> Result<Box<dyn LoadedDocument>>;
}

/// An open document
#[async_trait]
pub trait LoadedDocument: Send + Sync {
    /// Number of pages
    fn page_count(&self) -> u32;

    /// Extract the readable text of a page (1-based)
    ///
    /// # Errors
    ///
    /// Returns error if the page is out of range or extraction fails
    async fn page_text(&self, page: u32) -> Result<String>;

    /// Render a page (1-based) at the given pixel width
    ///
    /// # Errors
    ///
    /// Returns error if the page is out of range or rasterization fails
    async fn render_page(&self, page: u32, width: u32) -> Result<PageImage>;
}
