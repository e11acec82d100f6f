//! Document reading
//!
//! Engine ports for opening and rasterizing documents, the plain-text engine
//! used by the terminal frontend, generation-stamped render scheduling, and
//! the page-context cache the assistant answers from.

mod context;
mod engine;
mod render;
mod text;

pub use context::PageContextTracker;
pub use engine::{DocumentEngine, LoadedDocument, PageImage};
pub use render::{RenderPipeline, RenderTicket};
pub use text::PlainTextEngine;
