//! Assistant core
//!
//! Status, utterance interpretation, question routing, and the state machine
//! orchestrating them. Speech engines live in `speech`; this module is pure
//! state and classification plus the async router.

mod event;
mod interpreter;
mod machine;
mod router;
mod status;

pub use event::{Action, AssistantEvent};
pub use interpreter::{ACTIVATION_PHRASE, Interpretation, interpret};
pub use machine::Assistant;
pub use router::{AssistantResponse, QuestionKind, QuestionRouter, RoutedAnswer, classify};
pub use status::AssistantStatus;
