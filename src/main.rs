use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tracing_subscriber::EnvFilter;

use lectern::answer::GeminiClient;
use lectern::assistant::{AssistantResponse, AssistantStatus, QuestionRouter};
use lectern::config::Config;
use lectern::library::{self, DocumentRepo};
use lectern::reader::{DocumentEngine, PageImage, PlainTextEngine};
use lectern::session::{ReadingSession, SessionCommand, SessionView};
use lectern::speech::{
    LineInput, SpeechCapture, SpeechOutput, TerminalRecognizer, TerminalSynthesizer,
};

/// Lectern - Voice-assisted document reader
#[derive(Parser)]
#[command(name = "lectern", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Override the data directory
    #[arg(long, env = "LECTERN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Disable voice features (keyboard-only reading)
    #[arg(long, env = "LECTERN_DISABLE_VOICE")]
    no_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Import a document into the library
    Import {
        /// Path to the document file
        path: PathBuf,

        /// Title shown in the library (defaults to the file name)
        #[arg(short, long)]
        title: Option<String>,
    },
    /// List the library, most recently read first
    List,
    /// Remove a document from the library
    Remove {
        /// Document id (see `lectern list`)
        id: i64,
    },
    /// Read a document with the voice assistant
    Read {
        /// Document id (see `lectern list`)
        id: i64,

        /// Open at this page instead of the saved position
        #[arg(short, long)]
        page: Option<u32>,

        /// Viewport width in pixels for page rendering
        #[arg(long)]
        width: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,lectern=info",
        1 => "info,lectern=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_with_options(cli.no_voice)?;
    if let Some(dir) = cli.data_dir {
        std::fs::create_dir_all(&dir)?;
        config.data_dir = dir;
    }
    tracing::debug!(data_dir = %config.data_dir.display(), model = %config.model, "loaded configuration");

    match cli.command.unwrap_or(Command::List) {
        Command::Import { path, title } => cmd_import(&config, &path, title).await,
        Command::List => cmd_list(&config),
        Command::Remove { id } => cmd_remove(&config, id),
        Command::Read { id, page, width } => cmd_read(config, id, page, width).await,
    }
}

/// Import a document into the library
async fn cmd_import(config: &Config, path: &Path, title: Option<String>) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;
    let title = title.unwrap_or_else(|| {
        path.file_stem()
            .map_or_else(|| "Untitled".to_string(), |s| s.to_string_lossy().into_owned())
    });

    // Open once to count pages before anything lands in the library.
    let engine = PlainTextEngine::new(config.reader.page_chars);
    let document = engine.open(&data).await?;

    let pool = library::init(config.library_path())?;
    let repo = DocumentRepo::new(pool);
    let record = repo.add(&title, &data, document.page_count())?;

    println!(
        "Imported \"{}\" as document {} ({} pages)",
        record.title, record.id, record.total_pages
    );
    Ok(())
}

/// List the library
fn cmd_list(config: &Config) -> anyhow::Result<()> {
    let pool = library::init(config.library_path())?;
    let repo = DocumentRepo::new(pool);
    let documents = repo.list()?;

    if documents.is_empty() {
        println!("Library is empty. Import something with `lectern import <file>`.");
        return Ok(());
    }

    for doc in documents {
        println!(
            "{:>15}  {}  (page {}/{}, updated {})",
            doc.id,
            doc.title,
            doc.current_page,
            doc.total_pages,
            doc.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Remove a document from the library
fn cmd_remove(config: &Config, id: i64) -> anyhow::Result<()> {
    let pool = library::init(config.library_path())?;
    let repo = DocumentRepo::new(pool);
    repo.remove(id)?;
    println!("Removed document {id}");
    Ok(())
}

/// Read a document with the assistant wired to the terminal
async fn cmd_read(
    config: Config,
    id: i64,
    page: Option<u32>,
    width: Option<u32>,
) -> anyhow::Result<()> {
    let pool = library::init(config.library_path())?;
    let repo = DocumentRepo::new(pool);
    let mut record = repo.get(id)?;
    if let Some(page) = page {
        // The session clamps this into range on open.
        record.current_page = page;
    }
    let title = record.title.clone();

    let backend = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.model.clone(),
    )?);
    let router = QuestionRouter::new(backend);

    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let (recognizer, line_input) = TerminalRecognizer::new(engine_tx.clone());
    let capture = if config.voice.enabled {
        SpeechCapture::new(Box::new(recognizer))
    } else {
        SpeechCapture::unsupported()
    };
    let output = SpeechOutput::new(
        Box::new(TerminalSynthesizer::new(engine_tx.clone())),
        config.voice.clone(),
    );

    spawn_stdin_loop(command_tx.clone(), line_input);

    let interrupt = command_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = interrupt.send(SessionCommand::Quit);
        }
    });

    let engine = PlainTextEngine::new(config.reader.page_chars);
    let session = ReadingSession::open(
        record,
        &engine,
        repo,
        router,
        capture,
        output,
        Box::new(TerminalView),
        engine_rx,
        command_rx,
        width.unwrap_or(config.reader.viewport_width),
    )
    .await?;

    println!("Reading \"{title}\".");
    println!("Commands: :on :off :next :prev :page N :width PX :status :quit");
    if config.voice.enabled {
        println!("After :on, type what you would say, e.g. \"hello hello what is gravity\".");
    }

    session.run().await?;
    Ok(())
}

/// Forward stdin lines: ":" lines become commands, the rest become utterances
fn spawn_stdin_loop(commands: mpsc::UnboundedSender<SessionCommand>, utterances: LineInput) {
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = LinesStream::new(stdin.lines());

        while let Some(Ok(line)) = lines.next().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix(':') {
                match parse_command(rest) {
                    Some(command) => {
                        let quit = command == SessionCommand::Quit;
                        if commands.send(command).is_err() || quit {
                            break;
                        }
                    }
                    None => println!(
                        "unknown command :{rest} (try :on :off :next :prev :page N :width PX :status :quit)"
                    ),
                }
            } else {
                utterances.push(line);
            }
        }
    });
}

/// Parse one ":" command line, colon already stripped
fn parse_command(rest: &str) -> Option<SessionCommand> {
    let mut parts = rest.split_whitespace();
    match parts.next()? {
        "on" => Some(SessionCommand::ToggleAssistant(true)),
        "off" => Some(SessionCommand::ToggleAssistant(false)),
        "next" | "n" => Some(SessionCommand::NextPage),
        "prev" | "p" => Some(SessionCommand::PrevPage),
        "page" => parts.next()?.parse().ok().map(SessionCommand::GoToPage),
        "width" => parts.next()?.parse().ok().map(SessionCommand::SetViewportWidth),
        "status" => Some(SessionCommand::Status),
        "quit" | "q" => Some(SessionCommand::Quit),
        _ => None,
    }
}

/// Prints session output to the terminal
struct TerminalView;

impl SessionView for TerminalView {
    fn show_status(&mut self, status: AssistantStatus) {
        println!("· assistant {status}");
    }

    fn show_question(&mut self, question: &str) {
        println!("❓ {question}");
    }

    fn show_response(&mut self, response: &AssistantResponse) {
        println!("💬 {}", response.text);
        for source in &response.sources {
            println!("   - {} <{}>", source.title, source.uri);
        }
    }

    fn show_page(&mut self, page: u32, total: u32, text: &str, image: &PageImage) {
        println!("-- page {page}/{total} ({}x{}) --", image.width, image.height);
        println!("{text}");
    }

    fn show_notice(&mut self, message: &str) {
        println!("· {message}");
    }
}
