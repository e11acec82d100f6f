//! Page context for grounded answers
//!
//! Caches the extracted text of the page the reader is on so question
//! routing reads whatever page is current at submission time without
//! re-extracting per question.

/// Extracted text of the current page
#[derive(Debug, Default)]
pub struct PageContextTracker {
    page: Option<u32>,
    text: String,
}

impl PageContextTracker {
    /// Empty tracker, no page cached
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page: None,
            text: String::new(),
        }
    }

    /// Replace the cached context after a page change
    pub fn update(&mut self, page: u32, text: String) {
        tracing::debug!(page, chars = text.len(), "page context refreshed");
        self.page = Some(page);
        self.text = text;
    }

    /// Drop the cache (document closed or extraction failed)
    pub fn clear(&mut self) {
        self.page = None;
        self.text.clear();
    }

    /// Page the cache belongs to, if any
    #[must_use]
    pub const fn page(&self) -> Option<u32> {
        self.page
    }

    /// Context for the answering backend; empty when nothing is cached
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the cache covers the given page
    #[must_use]
    pub fn covers(&self, page: u32) -> bool {
        self.page == Some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_replaces_cache() {
        let mut tracker = PageContextTracker::new();
        assert_eq!(tracker.page(), None);
        assert_eq!(tracker.text(), "");

        tracker.update(3, "chapter three".to_string());
        assert!(tracker.covers(3));
        assert!(!tracker.covers(4));
        assert_eq!(tracker.text(), "chapter three");

        tracker.update(4, "chapter four".to_string());
        assert!(tracker.covers(4));
        assert_eq!(tracker.text(), "chapter four");
    }

    #[test]
    fn test_clear_empties_cache() {
        let mut tracker = PageContextTracker::new();
        tracker.update(1, "opening".to_string());
        tracker.clear();
        assert_eq!(tracker.page(), None);
        assert_eq!(tracker.text(), "");
    }
}
