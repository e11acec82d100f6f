//! Terminal speech engines
//!
//! Development stand-ins for a platform speech stack: the recognizer is fed
//! typed lines and the synthesizer prints what it would say while simulating
//! playback timing. Together they let the full assistant loop run over
//! stdin/stdout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;

use super::cue::AudioCue;
use super::engine::{
    EngineEvent, EngineEventSender, RecognizerEvent, SpeakParams, SpeechRecognizer,
    SpeechSynthesizer, SynthesizerEvent, UtteranceId, Voice,
};
use crate::Result;

/// Simulated playback budget per spoken word
const MS_PER_WORD: u64 = 250;

/// Upper bound on simulated playback, long answers should not stall the loop
const MAX_UTTERANCE_MS: u64 = 4000;

/// Recognizer fed by typed lines
///
/// Lines pushed while a session is active are forwarded as finalized
/// transcripts; otherwise they are dropped, like a microphone that is off.
pub struct TerminalRecognizer {
    active: Arc<AtomicBool>,
}

impl TerminalRecognizer {
    /// Create the recognizer and the handle lines are pushed through
    #[must_use]
    pub fn new(events: EngineEventSender) -> (Self, LineInput) {
        let active = Arc::new(AtomicBool::new(false));
        let recognizer = Self {
            active: Arc::clone(&active),
        };
        (recognizer, LineInput { active, events })
    }
}

impl SpeechRecognizer for TerminalRecognizer {
    fn start(&mut self) -> Result<()> {
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Feeds typed lines into the recognizer
///
/// The session check happens at push time, so a line typed before capture
/// starts never surfaces once it does.
#[derive(Clone)]
pub struct LineInput {
    active: Arc<AtomicBool>,
    events: EngineEventSender,
}

impl LineInput {
    /// Forward one typed line if a recognition session is active
    pub fn push(&self, line: String) {
        if self.active.load(Ordering::SeqCst) {
            let event = EngineEvent::Recognizer(RecognizerEvent::Transcript(line));
            let _ = self.events.send(event);
        } else {
            tracing::trace!("line dropped, recognizer inactive");
        }
    }
}

/// Synthesizer that prints utterances and simulates their duration
pub struct TerminalSynthesizer {
    events: EngineEventSender,
    next_id: UtteranceId,
    cancel: Option<oneshot::Sender<()>>,
}

impl TerminalSynthesizer {
    /// Create the synthesizer and announce the voice inventory
    ///
    /// The announcement is deferred to a task, mirroring platforms where
    /// voices load after startup.
    #[must_use]
    pub fn new(events: EngineEventSender) -> Self {
        let announce = events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = announce.send(EngineEvent::Synthesizer(SynthesizerEvent::VoicesChanged));
        });
        Self {
            events,
            next_id: 0,
            cancel: None,
        }
    }
}

impl SpeechSynthesizer for TerminalSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            id: "terminal-reader".to_string(),
            name: "Terminal Reader Female".to_string(),
            language: "en-IN".to_string(),
        }]
    }

    fn speak(&mut self, text: &str, params: &SpeakParams) -> Result<UtteranceId> {
        self.next_id += 1;
        let id = self.next_id;
        let voice = params
            .voice_id
            .clone()
            .unwrap_or_else(|| format!("default:{}", params.language));
        println!("🔊 [{voice}] {text}");

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.cancel = Some(cancel_tx);
        let events = self.events.clone();
        let duration = simulated_duration(text, params.rate);
        tokio::spawn(async move {
            let error = tokio::select! {
                () = tokio::time::sleep(duration) => None,
                _ = cancel_rx => Some("interrupted".to_string()),
            };
            let _ = events.send(EngineEvent::Synthesizer(SynthesizerEvent::Finished {
                utterance: id,
                error,
            }));
        });
        Ok(id)
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    fn play_cue(&mut self, cue: &AudioCue) {
        tracing::debug!(bytes = cue.wav_bytes().len(), volume = cue.volume(), "activation cue");
        println!("♪ (listening)");
    }
}

/// Rough playback duration for a line of text
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn simulated_duration(text: &str, rate: f64) -> Duration {
    let words = text.split_whitespace().count().max(1) as u64;
    let ms = (words * MS_PER_WORD).min(MAX_UTTERANCE_MS);
    let scaled = (ms as f64 / rate.max(0.1)) as u64;
    Duration::from_millis(scaled.max(50))
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn test_duration_scales_with_words_and_rate() {
        let short = simulated_duration("hello", 1.0);
        let long = simulated_duration("one two three four five six", 1.0);
        assert!(long > short);

        let fast = simulated_duration("one two three four five six", 2.0);
        assert!(fast < long);
    }

    #[test]
    fn test_duration_is_capped() {
        let text = "word ".repeat(500);
        assert!(simulated_duration(&text, 1.0) <= Duration::from_millis(MAX_UTTERANCE_MS));
    }

    #[test]
    fn test_recognizer_forwards_only_while_active() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (mut recognizer, input) = TerminalRecognizer::new(event_tx);

        // Typed before capture starts: must never surface, even later.
        input.push("dropped".to_string());
        recognizer.start().unwrap();
        input.push("heard".to_string());

        assert_eq!(
            event_rx.try_recv().unwrap(),
            EngineEvent::Recognizer(RecognizerEvent::Transcript("heard".to_string()))
        );

        recognizer.stop();
        input.push("also dropped".to_string());
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_synthesizer_reports_cancel_as_error() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut synthesizer = TerminalSynthesizer::new(event_tx);

        let id = synthesizer
            .speak("a reasonably long answer to interrupt", &SpeakParams {
                voice_id: None,
                language: "en-IN".to_string(),
                rate: 1.0,
                pitch: 1.0,
            })
            .unwrap();
        synthesizer.cancel();

        loop {
            match event_rx.recv().await.unwrap() {
                EngineEvent::Synthesizer(SynthesizerEvent::Finished { utterance, error }) => {
                    assert_eq!(utterance, id);
                    assert!(error.is_some());
                    break;
                }
                EngineEvent::Synthesizer(SynthesizerEvent::VoicesChanged)
                | EngineEvent::Recognizer(_) => {}
            }
        }
    }
}
