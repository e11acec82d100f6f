//! Reading session
//!
//! Owns one open document and the assistant wired around it: speech capture
//! and output, the state machine, page context, render scheduling, and
//! position persistence. Everything is reactive; engine callbacks, frontend
//! commands, and finished background work all land in one select loop, so
//! the state machine has a single caller.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::Result;
use crate::assistant::{
    Action, Assistant, AssistantEvent, AssistantResponse, AssistantStatus, QuestionRouter,
    RoutedAnswer,
};
use crate::library::{Document, DocumentRepo};
use crate::reader::{
    DocumentEngine, LoadedDocument, PageContextTracker, PageImage, RenderPipeline, RenderTicket,
};
use crate::speech::{CaptureSignal, EngineEvent, OutputSignal, SpeechCapture, SpeechOutput};

/// Upper bound on accepted viewport widths
const MAX_VIEWPORT_WIDTH: u32 = 4096;

/// Commands from the frontend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Toggle the assistant on or off
    ToggleAssistant(bool),

    /// Advance one page
    NextPage,

    /// Go back one page
    PrevPage,

    /// Jump to a 1-based page
    GoToPage(u32),

    /// Change the render viewport width
    SetViewportWidth(u32),

    /// Report session state
    Status,

    /// End the session
    Quit,
}

/// Presentation seam the session drives
pub trait SessionView: Send {
    /// Assistant status changed
    fn show_status(&mut self, status: AssistantStatus);

    /// A question was accepted and is being answered
    fn show_question(&mut self, question: &str);

    /// An answer arrived
    fn show_response(&mut self, response: &AssistantResponse);

    /// A page is ready for display
    fn show_page(&mut self, page: u32, total: u32, text: &str, image: &PageImage);

    /// Free-form notice
    fn show_notice(&mut self, message: &str);
}

/// Completions of background work spawned by the session
enum TaskOutcome {
    /// The router resolved a question
    Answered { seq: u64, answer: RoutedAnswer },

    /// Page change: text extraction and render both finished
    PagePrepared {
        ticket: RenderTicket,
        page: u32,
        text: Result<String>,
        image: Result<PageImage>,
    },

    /// Viewport change: render only
    Redrawn {
        ticket: RenderTicket,
        page: u32,
        image: Result<PageImage>,
    },
}

/// One open document with the assistant wired around it
pub struct ReadingSession {
    machine: Assistant,
    capture: SpeechCapture,
    output: SpeechOutput,
    router: QuestionRouter,
    context: PageContextTracker,
    pipeline: RenderPipeline,
    repo: DocumentRepo,
    document: Arc<dyn LoadedDocument>,
    document_id: i64,
    title: String,
    total_pages: u32,
    current_page: u32,
    viewport_width: u32,
    view: Box<dyn SessionView>,
    engine_events: mpsc::UnboundedReceiver<EngineEvent>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    outcomes: mpsc::UnboundedReceiver<TaskOutcome>,
    outcome_tx: mpsc::UnboundedSender<TaskOutcome>,
    shown_status: AssistantStatus,
}

impl ReadingSession {
    /// Open a library document and wire the assistant around it
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be opened
    #[allow(clippy::too_many_arguments)]
    pub async fn open(
        record: Document,
        engine: &dyn DocumentEngine,
        repo: DocumentRepo,
        router: QuestionRouter,
        capture: SpeechCapture,
        output: SpeechOutput,
        view: Box<dyn SessionView>,
        engine_events: mpsc::UnboundedReceiver<EngineEvent>,
        commands: mpsc::UnboundedReceiver<SessionCommand>,
        viewport_width: u32,
    ) -> Result<Self> {
        let document: Arc<dyn LoadedDocument> = Arc::from(engine.open(&record.data).await?);
        let total_pages = document.page_count().max(1);
        let current_page = record.current_page.clamp(1, total_pages);
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();

        tracing::info!(
            id = record.id,
            title = %record.title,
            pages = total_pages,
            page = current_page,
            "document opened"
        );

        Ok(Self {
            machine: Assistant::new(),
            capture,
            output,
            router,
            context: PageContextTracker::new(),
            pipeline: RenderPipeline::new(),
            repo,
            document,
            document_id: record.id,
            title: record.title,
            total_pages,
            current_page,
            viewport_width: viewport_width.clamp(1, MAX_VIEWPORT_WIDTH),
            view,
            engine_events,
            commands,
            outcomes,
            outcome_tx,
            shown_status: AssistantStatus::Inactive,
        })
    }

    /// Drive the session until the frontend quits
    ///
    /// # Errors
    ///
    /// Returns error if the reading position cannot be saved on exit
    pub async fn run(mut self) -> Result<()> {
        self.prepare_page();

        loop {
            tokio::select! {
                Some(event) = self.engine_events.recv() => self.on_engine_event(event),
                Some(outcome) = self.outcomes.recv() => self.on_task_outcome(outcome),
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Quit) | None => break,
                    Some(command) => self.on_command(command),
                },
            }
        }

        self.capture.stop_listening();
        self.output.cancel();
        self.repo.set_current_page(self.document_id, self.current_page)?;
        tracing::info!(page = self.current_page, "session ended");
        Ok(())
    }

    fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::ToggleAssistant(true) => {
                if self.capture.is_supported() {
                    self.dispatch(AssistantEvent::Toggled(true));
                } else {
                    self.view
                        .show_notice("voice input is not available; the assistant stays off");
                }
            }
            SessionCommand::ToggleAssistant(false) => self.dispatch(AssistantEvent::Toggled(false)),
            SessionCommand::NextPage => self.go_to_page(self.current_page.saturating_add(1)),
            SessionCommand::PrevPage => self.go_to_page(self.current_page.saturating_sub(1)),
            SessionCommand::GoToPage(page) => self.go_to_page(page),
            SessionCommand::SetViewportWidth(width) => self.resize(width),
            SessionCommand::Status => self.report_status(),
            SessionCommand::Quit => {}
        }
    }

    fn on_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Recognizer(event) => match self.capture.handle_event(event) {
                Some(CaptureSignal::Utterance(text)) => {
                    self.dispatch(AssistantEvent::Utterance(text));
                }
                Some(CaptureSignal::Failed) => self.dispatch(AssistantEvent::CaptureFailed),
                None => {}
            },
            EngineEvent::Synthesizer(event) => {
                if self.output.handle_event(event) == Some(OutputSignal::Ended) {
                    self.dispatch(AssistantEvent::SpeechEnded);
                }
            }
        }
    }

    fn on_task_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Answered { seq, answer } => {
                self.dispatch(AssistantEvent::AnswerReady { seq, answer });
            }
            TaskOutcome::PagePrepared {
                ticket,
                page,
                text,
                image,
            } => {
                // A resize can supersede the ticket while its page is still
                // the one on screen; grounding context follows the page, not
                // the render generation.
                if page == self.current_page {
                    match text {
                        Ok(text) => self.context.update(page, text),
                        Err(e) => {
                            tracing::error!(error = %e, page, "failed to extract page text");
                            self.context.clear();
                        }
                    }
                }
                if !ticket.is_current() {
                    tracing::trace!(
                        page,
                        generation = ticket.generation(),
                        "superseded page prepare discarded"
                    );
                    return;
                }
                self.commit_image(page, image);
            }
            TaskOutcome::Redrawn {
                ticket,
                page,
                image,
            } => {
                if !ticket.is_current() {
                    tracing::trace!(
                        page,
                        generation = ticket.generation(),
                        "superseded render discarded"
                    );
                    return;
                }
                self.commit_image(page, image);
            }
        }
    }

    /// Feed one event through the state machine and execute its actions
    fn dispatch(&mut self, event: AssistantEvent) {
        for action in self.machine.apply(event) {
            self.perform(action);
        }
        if self.machine.status() != self.shown_status {
            self.shown_status = self.machine.status();
            self.view.show_status(self.shown_status);
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::StartCapture => {
                if !self.capture.start_listening() {
                    self.dispatch(AssistantEvent::CaptureFailed);
                }
            }
            Action::StopCapture => self.capture.stop_listening(),
            Action::PlayActivationCue => self.output.play_activation_cue(),
            Action::SubmitQuestion { seq, question } => self.submit_question(seq, question),
            Action::Speak(text) => {
                if !self.output.speak(&text) {
                    // Nothing queued, so no ended signal will arrive on its own.
                    self.dispatch(AssistantEvent::SpeechEnded);
                }
            }
            Action::CancelSpeech => self.output.cancel(),
            Action::ShowQuestion(question) => self.view.show_question(&question),
            Action::ShowResponse(response) => self.view.show_response(&response),
        }
    }

    /// Resolve a question off the loop; the answer comes back as an event
    ///
    /// Page context is read at submission time, so a question asked right
    /// after a page turn is answered against the page now current.
    fn submit_question(&mut self, seq: u64, question: String) {
        let router = self.router.clone();
        let page_text = self.context.text().to_string();
        let outcomes = self.outcome_tx.clone();
        tokio::spawn(async move {
            let answer = router.route(&question, &page_text).await;
            let _ = outcomes.send(TaskOutcome::Answered { seq, answer });
        });
    }

    fn go_to_page(&mut self, page: u32) {
        let target = page.clamp(1, self.total_pages);
        if target == self.current_page {
            return;
        }
        self.current_page = target;
        if let Err(e) = self.repo.set_current_page(self.document_id, target) {
            tracing::error!(error = %e, page = target, "failed to save reading position");
        }
        self.prepare_page();
    }

    /// Kick off text extraction and rendering for the current page
    fn prepare_page(&mut self) {
        let ticket = self.pipeline.advance();
        let page = self.current_page;
        let width = self.viewport_width;
        let document = Arc::clone(&self.document);
        let outcomes = self.outcome_tx.clone();
        tokio::spawn(async move {
            let text = document.page_text(page).await;
            let image = document.render_page(page, width).await;
            let _ = outcomes.send(TaskOutcome::PagePrepared {
                ticket,
                page,
                text,
                image,
            });
        });
    }

    fn resize(&mut self, width: u32) {
        let width = width.min(MAX_VIEWPORT_WIDTH);
        if width == 0 || width == self.viewport_width {
            return;
        }
        self.viewport_width = width;
        let ticket = self.pipeline.advance();
        let page = self.current_page;
        let document = Arc::clone(&self.document);
        let outcomes = self.outcome_tx.clone();
        tokio::spawn(async move {
            let image = document.render_page(page, width).await;
            let _ = outcomes.send(TaskOutcome::Redrawn {
                ticket,
                page,
                image,
            });
        });
    }

    fn commit_image(&mut self, page: u32, image: Result<PageImage>) {
        match image {
            Ok(image) => {
                self.view
                    .show_page(page, self.total_pages, self.context.text(), &image);
            }
            Err(e) => {
                tracing::error!(error = %e, page, "failed to render page");
                self.view
                    .show_notice(&format!("page {page} could not be rendered"));
            }
        }
    }

    fn report_status(&mut self) {
        let voice = if self.capture.is_supported() {
            "ready"
        } else {
            "unavailable"
        };
        let message = format!(
            "{}: page {}/{}, assistant {}, voice input {}",
            self.title,
            self.current_page,
            self.total_pages,
            self.machine.status(),
            voice
        );
        self.view.show_notice(&message);
    }
}
