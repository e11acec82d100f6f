//! Render scheduling
//!
//! Navigation can outrun rendering. Every page change or viewport resize
//! advances a generation counter, each render carries the generation it was
//! started under, and a finished render is committed only while its
//! generation is still current. A superseded render is normal control flow,
//! not a failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out render tickets and invalidates them wholesale
#[derive(Debug, Default, Clone)]
pub struct RenderPipeline {
    generation: Arc<AtomicU64>,
}

impl RenderPipeline {
    /// Create a pipeline at generation zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate all outstanding tickets and open a new generation
    pub fn advance(&self) -> RenderTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(generation, "render generation advanced");
        RenderTicket {
            generation,
            latest: Arc::clone(&self.generation),
        }
    }

    /// A ticket for the current generation, invalidating nothing
    #[must_use]
    pub fn current(&self) -> RenderTicket {
        RenderTicket {
            generation: self.generation.load(Ordering::SeqCst),
            latest: Arc::clone(&self.generation),
        }
    }
}

/// One render request's claim on the display
#[derive(Debug, Clone)]
pub struct RenderTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RenderTicket {
    /// Whether the display still wants this render's output
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    /// The generation this ticket was issued under
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}
