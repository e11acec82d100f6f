//! Shared test utilities
//!
//! Stub speech engines, a canned answering backend, a gated document engine
//! for render-ordering tests, and a recording view, all observable through
//! shared logs so integration tests can assert on session behavior.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use lectern::answer::{AnswerBackend, Definition, Source};
use lectern::assistant::{AssistantResponse, AssistantStatus, QuestionRouter};
use lectern::config::VoiceConfig;
use lectern::library::{self, DocumentRepo};
use lectern::reader::{DocumentEngine, LoadedDocument, PageImage};
use lectern::session::{ReadingSession, SessionCommand, SessionView};
use lectern::speech::{
    AudioCue, EngineEvent, RecognizerEvent, SpeakParams, SpeechCapture, SpeechOutput,
    SpeechRecognizer, SpeechSynthesizer, SynthesizerEvent, UtteranceId, Voice,
};
use lectern::{Error, Result};

/// Poll until `cond` holds, panicking after two seconds
pub async fn wait_until<F: Fn() -> bool>(what: &str, cond: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Everything the session told the view, in arrival order
#[derive(Debug, Default)]
pub struct ViewLog {
    pub statuses: Vec<AssistantStatus>,
    pub questions: Vec<String>,
    pub responses: Vec<AssistantResponse>,
    /// (page, image width) per committed render
    pub pages: Vec<(u32, u32)>,
    pub notices: Vec<String>,
}

impl ViewLog {
    pub fn last_status(&self) -> Option<AssistantStatus> {
        self.statuses.last().copied()
    }

    pub fn committed_pages(&self) -> Vec<u32> {
        self.pages.iter().map(|(page, _)| *page).collect()
    }
}

/// View that records everything it is shown
pub struct RecordingView {
    log: Arc<Mutex<ViewLog>>,
}

impl RecordingView {
    pub fn new() -> (Self, Arc<Mutex<ViewLog>>) {
        let log = Arc::new(Mutex::new(ViewLog::default()));
        (Self { log: Arc::clone(&log) }, log)
    }
}

impl SessionView for RecordingView {
    fn show_status(&mut self, status: AssistantStatus) {
        self.log.lock().unwrap().statuses.push(status);
    }

    fn show_question(&mut self, question: &str) {
        self.log.lock().unwrap().questions.push(question.to_string());
    }

    fn show_response(&mut self, response: &AssistantResponse) {
        self.log.lock().unwrap().responses.push(response.clone());
    }

    fn show_page(&mut self, page: u32, _total: u32, _text: &str, image: &PageImage) {
        self.log.lock().unwrap().pages.push((page, image.width));
    }

    fn show_notice(&mut self, message: &str) {
        self.log.lock().unwrap().notices.push(message.to_string());
    }
}

/// Start/stop counters for the stub recognizer
#[derive(Debug, Default)]
pub struct RecognizerLog {
    pub starts: usize,
    pub stops: usize,
}

/// Recognizer that only tracks session lifecycle
///
/// Tests deliver transcripts straight into the session's engine-event
/// channel, the way a platform callback would.
pub struct StubRecognizer {
    log: Arc<Mutex<RecognizerLog>>,
}

impl StubRecognizer {
    pub fn new() -> (Self, Arc<Mutex<RecognizerLog>>) {
        let log = Arc::new(Mutex::new(RecognizerLog::default()));
        (Self { log: Arc::clone(&log) }, log)
    }
}

impl SpeechRecognizer for StubRecognizer {
    fn start(&mut self) -> Result<()> {
        self.log.lock().unwrap().starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().stops += 1;
    }
}

/// What the stub synthesizer was asked to do
#[derive(Debug, Default)]
pub struct SynthesizerLog {
    pub spoken: Vec<String>,
    pub cancels: usize,
    pub cues: usize,
}

/// Synthesizer that records requests and never finishes on its own
///
/// Tests decide when an utterance ends by injecting the matching
/// [`SynthesizerEvent::Finished`] event, which keeps completion ordering
/// under the test's control. Utterance ids count up from 1.
pub struct StubSynthesizer {
    next_id: UtteranceId,
    log: Arc<Mutex<SynthesizerLog>>,
}

impl StubSynthesizer {
    pub fn new() -> (Self, Arc<Mutex<SynthesizerLog>>) {
        let log = Arc::new(Mutex::new(SynthesizerLog::default()));
        (
            Self {
                next_id: 0,
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl SpeechSynthesizer for StubSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            id: "stub-voice".to_string(),
            name: "Stub English Female".to_string(),
            language: "en-IN".to_string(),
        }]
    }

    fn speak(&mut self, text: &str, _params: &SpeakParams) -> Result<UtteranceId> {
        self.next_id += 1;
        self.log.lock().unwrap().spoken.push(text.to_string());
        Ok(self.next_id)
    }

    fn cancel(&mut self) {
        self.log.lock().unwrap().cancels += 1;
    }

    fn play_cue(&mut self, _cue: &AudioCue) {
        self.log.lock().unwrap().cues += 1;
    }
}

/// Calls the canned backend received, in order
#[derive(Debug, Default)]
pub struct BackendLog {
    /// (page context, question) per grounded call
    pub grounded: Vec<(String, String)>,
    /// term per definition call
    pub definitions: Vec<String>,
}

/// Backend returning fixed answers while recording what it was asked
pub struct CannedBackend {
    grounded_text: String,
    definition: Definition,
    log: Arc<Mutex<BackendLog>>,
}

impl CannedBackend {
    pub fn new(grounded_text: &str) -> (Arc<Self>, Arc<Mutex<BackendLog>>) {
        let log = Arc::new(Mutex::new(BackendLog::default()));
        let backend = Arc::new(Self {
            grounded_text: grounded_text.to_string(),
            definition: Definition {
                text: "A fortunate accident.".to_string(),
                sources: vec![Source {
                    title: "Wiktionary".to_string(),
                    uri: "https://en.wiktionary.org/wiki/serendipity".to_string(),
                }],
            },
            log: Arc::clone(&log),
        });
        (backend, log)
    }
}

#[async_trait]
impl AnswerBackend for CannedBackend {
    async fn answer_from_context(&self, page_text: &str, question: &str) -> Result<String> {
        self.log
            .lock()
            .unwrap()
            .grounded
            .push((page_text.to_string(), question.to_string()));
        Ok(self.grounded_text.clone())
    }

    async fn search_definition(&self, term: &str) -> Result<Definition> {
        self.log.lock().unwrap().definitions.push(term.to_string());
        Ok(self.definition.clone())
    }
}

/// Engine producing [`GatedDocument`]s; opens exactly once
pub struct GatedEngine {
    pages: u32,
    gates: Mutex<Option<HashMap<u32, Vec<oneshot::Receiver<()>>>>>,
}

impl GatedEngine {
    /// Engine for a document of `pages` pages with the given render gates
    ///
    /// Each `(page, receiver)` entry holds back one render of that page
    /// until the paired sender fires or is dropped.
    pub fn new(pages: u32, gates: Vec<(u32, oneshot::Receiver<()>)>) -> Self {
        let mut map: HashMap<u32, Vec<oneshot::Receiver<()>>> = HashMap::new();
        for (page, gate) in gates {
            map.entry(page).or_default().push(gate);
        }
        Self {
            pages,
            gates: Mutex::new(Some(map)),
        }
    }
}

#[async_trait]
impl DocumentEngine for GatedEngine {
    async fn open(&self, _data: &[u8]) -> Result<Box<dyn LoadedDocument>> {
        let gates = self
            .gates
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Error::Document("gated engine opens once".to_string()))?;
        Ok(Box::new(GatedDocument {
            pages: self.pages,
            gates: Mutex::new(gates),
        }))
    }
}

/// Document whose renders block until the test releases them
///
/// Pages without a registered gate render immediately. Page text is
/// `"text of page N"`; renders report the requested width with square
/// proportions.
pub struct GatedDocument {
    pages: u32,
    gates: Mutex<HashMap<u32, Vec<oneshot::Receiver<()>>>>,
}

#[async_trait]
impl LoadedDocument for GatedDocument {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn page_text(&self, page: u32) -> Result<String> {
        if page == 0 || page > self.pages {
            return Err(Error::Document(format!("page {page} out of range")));
        }
        Ok(format!("text of page {page}"))
    }

    async fn render_page(&self, page: u32, width: u32) -> Result<PageImage> {
        if page == 0 || page > self.pages {
            return Err(Error::Document(format!("page {page} out of range")));
        }
        let gate = self.gates.lock().unwrap().get_mut(&page).and_then(|g| g.pop());
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(PageImage {
            width,
            height: width,
            pixels: vec![0xFF; (width as usize) * (width as usize) * 4],
        })
    }
}

/// Channel ends and logs the test keeps after spawning a session
pub struct SessionHarness {
    pub commands: mpsc::UnboundedSender<SessionCommand>,
    pub engine_events: mpsc::UnboundedSender<EngineEvent>,
    pub view: Arc<Mutex<ViewLog>>,
    pub repo: DocumentRepo,
    pub document_id: i64,
    pub synth: Arc<Mutex<SynthesizerLog>>,
    pub recognizer: Arc<Mutex<RecognizerLog>>,
    pub handle: tokio::task::JoinHandle<Result<()>>,
}

impl SessionHarness {
    /// Deliver one finalized transcript, as the recognizer would
    pub fn utter(&self, text: &str) {
        self.engine_events
            .send(EngineEvent::Recognizer(RecognizerEvent::Transcript(
                text.to_string(),
            )))
            .unwrap();
    }

    /// Report the given utterance as finished playing
    pub fn finish_speech(&self, utterance: UtteranceId) {
        self.engine_events
            .send(EngineEvent::Synthesizer(SynthesizerEvent::Finished {
                utterance,
                error: None,
            }))
            .unwrap();
    }

    pub fn send(&self, command: SessionCommand) {
        self.commands.send(command).unwrap();
    }

    /// Quit and wait for the session to persist and exit
    pub async fn quit(self) {
        self.commands.send(SessionCommand::Quit).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

/// Spawn a session over an in-memory library with voice available
pub async fn spawn_session(
    engine: &dyn DocumentEngine,
    backend: Arc<dyn AnswerBackend>,
) -> SessionHarness {
    spawn_session_opts(engine, backend, true).await
}

/// Spawn a session, optionally without speech-recognition support
pub async fn spawn_session_opts(
    engine: &dyn DocumentEngine,
    backend: Arc<dyn AnswerBackend>,
    voice_supported: bool,
) -> SessionHarness {
    let pool = library::init_memory().expect("failed to init test library");
    let repo = DocumentRepo::new(pool);
    let record = repo
        .add("Test Document", b"irrelevant bytes", 3)
        .expect("failed to seed document");
    let document_id = record.id;

    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let (recognizer, recognizer_log) = StubRecognizer::new();
    let capture = if voice_supported {
        SpeechCapture::new(Box::new(recognizer))
    } else {
        SpeechCapture::unsupported()
    };
    let (synthesizer, synth_log) = StubSynthesizer::new();
    let output = SpeechOutput::new(Box::new(synthesizer), VoiceConfig::default());
    let (view, view_log) = RecordingView::new();
    let router = QuestionRouter::new(backend);

    let session = ReadingSession::open(
        record,
        engine,
        repo.clone(),
        router,
        capture,
        output,
        Box::new(view),
        engine_rx,
        command_rx,
        640,
    )
    .await
    .expect("failed to open session");

    SessionHarness {
        commands: command_tx,
        engine_events: engine_tx,
        view: view_log,
        repo,
        document_id,
        synth: synth_log,
        recognizer: recognizer_log,
        handle: tokio::spawn(session.run()),
    }
}
