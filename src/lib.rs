//! Lectern - Voice-assisted document reader
//!
//! This library provides the core functionality for Lectern:
//! - Voice interaction (activation phrase, question capture, spoken answers)
//! - Document library with persistent reading positions
//! - Page rendering and text extraction behind engine ports
//! - Question answering grounded in the current page via Gemini
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Frontend                         │
//! │    page commands  │  typed lines  │  display         │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Reading Session                      │
//! │  State machine │ Capture │ Output │ Render │ Context │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Collaborators                        │
//! │  Library (SQLite)  │  Document engine  │  Gemini     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod answer;
pub mod assistant;
pub mod config;
pub mod error;
pub mod library;
pub mod reader;
pub mod session;
pub mod speech;

pub use config::Config;
pub use error::{Error, Result};
pub use library::{DbConn, DbPool};
pub use session::{ReadingSession, SessionCommand, SessionView};
