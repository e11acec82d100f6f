//! Speech output
//!
//! Wraps the synthesis engine: selects a preferred voice from the inventory,
//! speaks with newest-wins replacement, and reports exactly one ended signal
//! per spoken utterance back to the session.

use super::cue::AudioCue;
use super::engine::{SpeakParams, SpeechSynthesizer, SynthesizerEvent, UtteranceId, Voice};
use crate::config::VoiceConfig;

/// Signal the session feeds the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSignal {
    /// The current utterance finished, normally or with a synthesis error
    Ended,
}

/// Synthesis wrapper owning voice choice and utterance lifecycle
pub struct SpeechOutput {
    engine: Box<dyn SpeechSynthesizer>,
    settings: VoiceConfig,
    preferred: Option<Voice>,
    current: Option<UtteranceId>,
}

impl SpeechOutput {
    /// Create output over a synthesis engine
    #[must_use]
    pub fn new(engine: Box<dyn SpeechSynthesizer>, settings: VoiceConfig) -> Self {
        let mut output = Self {
            engine,
            settings,
            preferred: None,
            current: None,
        };
        output.select_voice();
        output
    }

    /// Speak text, replacing any utterance already playing
    ///
    /// Returns whether an utterance is now in flight; when `false` nothing
    /// was queued and no ended signal will follow.
    pub fn speak(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if self.current.take().is_some() {
            tracing::debug!("replacing in-flight utterance");
            self.engine.cancel();
        }
        let params = SpeakParams {
            voice_id: self.preferred.as_ref().map(|voice| voice.id.clone()),
            language: self.settings.language.clone(),
            rate: self.settings.rate,
            pitch: self.settings.pitch,
        };
        match self.engine.speak(text, &params) {
            Ok(id) => {
                self.current = Some(id);
                tracing::debug!(utterance = id, chars = text.len(), "speaking");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to queue utterance");
                false
            }
        }
    }

    /// Cancel the in-flight utterance, if any
    ///
    /// The engine still reports the cancelled utterance as finished; that
    /// report is delivered once like any other end.
    pub fn cancel(&mut self) {
        if self.current.is_some() {
            tracing::debug!("cancelling speech");
            self.engine.cancel();
        }
    }

    /// Whether an utterance is currently in flight
    #[must_use]
    pub const fn is_speaking(&self) -> bool {
        self.current.is_some()
    }

    /// The voice utterances are delivered with, engine default when `None`
    #[must_use]
    pub const fn preferred_voice(&self) -> Option<&Voice> {
        self.preferred.as_ref()
    }

    /// Play the activation confirmation cue
    pub fn play_activation_cue(&mut self) {
        self.engine.play_cue(AudioCue::activation());
    }

    /// Translate one synthesizer event into an assistant-facing signal
    pub fn handle_event(&mut self, event: SynthesizerEvent) -> Option<OutputSignal> {
        match event {
            SynthesizerEvent::Finished { utterance, error } => {
                if self.current != Some(utterance) {
                    tracing::trace!(utterance, "superseded utterance finished");
                    return None;
                }
                self.current = None;
                if let Some(message) = error {
                    tracing::warn!(utterance, error = %message, "synthesis ended with error");
                } else {
                    tracing::debug!(utterance, "synthesis ended");
                }
                Some(OutputSignal::Ended)
            }
            SynthesizerEvent::VoicesChanged => {
                self.select_voice();
                None
            }
        }
    }

    /// Rank the current inventory and cache the winner
    ///
    /// Voices can load after startup, so this reruns on every inventory
    /// change without touching an utterance in flight.
    fn select_voice(&mut self) {
        let voices = self.engine.voices();
        let choice = select_preferred_voice(&voices, &self.settings.language);
        if choice != self.preferred {
            match &choice {
                Some(voice) => {
                    tracing::info!(voice = %voice.name, language = %voice.language, "selected voice");
                }
                None => tracing::debug!("no preferred voice available, using engine default"),
            }
        }
        self.preferred = choice;
    }
}

/// Pick the best available voice for reading aloud
///
/// Tries, in order: a regional-English Google female voice, any
/// regional-English female voice, an English Google female voice, the
/// well-known Zira/Susan English voices, any English female voice, then any
/// voice in the regional language. Falls back to the engine default.
#[must_use]
pub fn select_preferred_voice(voices: &[Voice], language: &str) -> Option<Voice> {
    let regional = |voice: &&Voice| voice.language.eq_ignore_ascii_case(language);
    let english = |voice: &&Voice| voice.language.to_lowercase().starts_with("en");
    let named = |voice: &&Voice, needle: &str| voice.name.to_lowercase().contains(needle);

    voices
        .iter()
        .find(|v| regional(v) && named(v, "google") && named(v, "female"))
        .or_else(|| voices.iter().find(|v| regional(v) && named(v, "female")))
        .or_else(|| voices.iter().find(|v| english(v) && named(v, "google") && named(v, "female")))
        .or_else(|| voices.iter().find(|v| english(v) && (named(v, "zira") || named(v, "susan"))))
        .or_else(|| voices.iter().find(|v| english(v) && named(v, "female")))
        .or_else(|| voices.iter().find(|v| regional(v)))
        .cloned()
}
