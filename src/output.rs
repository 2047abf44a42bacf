//! The speech output adapter.
//!
//! [`SpeechOutput`] turns plain text into speech on an injected
//! [`SpeechHost`], keeps at most one utterance active, and exposes whether
//! anything is currently being spoken.
//!
//! Host callbacks arrive on a channel and are applied on the owner's thread
//! when [`SpeechOutput::pump`] (or [`SpeechOutput::wait_until_idle`]) runs,
//! so state changes never race each other.
//!
//! # Examples
//!
//! ```rust
//! use listen_rs::hosts::recording::RecordingHost;
//! use listen_rs::{SpeechConfig, SpeechOutput};
//!
//! let host = RecordingHost::new();
//! let mut output = SpeechOutput::new(Some(host.clone()), SpeechConfig::default());
//!
//! output.speak("Hello");
//! let id = host.last_dispatched().expect("utterance dispatched");
//! host.start(id);
//! assert!(output.pump());
//! host.finish(id);
//! assert!(!output.pump());
//! ```

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::config::SpeechConfig;
use crate::utterance::{HostEvent, Utterance, UtteranceEvent, UtteranceId};
use crate::voice::{select_voice, Voice, VoicePreference};
use crate::{ListenerId, SpeechHost};

pub struct SpeechOutput<H: SpeechHost> {
    host: Option<H>,
    config: SpeechConfig,
    voices: Vec<Voice>,
    events_tx: Sender<HostEvent>,
    events_rx: Receiver<HostEvent>,
    listener: Option<ListenerId>,
    current: Option<UtteranceId>,
    next_id: u64,
    speaking: bool,
}

impl<H: SpeechHost> SpeechOutput<H> {
    /// Create an adapter over `host`.
    ///
    /// `None` means the platform has no speech synthesis: the adapter logs
    /// that once and every later call does nothing.
    pub fn new(host: Option<H>, config: SpeechConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let mut output = Self {
            host,
            config,
            voices: Vec::new(),
            events_tx,
            events_rx,
            listener: None,
            current: None,
            next_id: 0,
            speaking: false,
        };

        match output.host.as_mut() {
            Some(host) => {
                output.listener = Some(host.subscribe_voices(output.events_tx.clone()));
                output.voices = host.voices();
                log::debug!(
                    "Speech output ready with {} voices",
                    output.voices.len()
                );
            }
            None => log::warn!("Speech synthesis is not available; speech output disabled"),
        }

        output
    }

    /// Adapter for a platform without speech synthesis.
    pub fn unavailable(config: SpeechConfig) -> Self {
        Self::new(None, config)
    }

    pub fn is_available(&self) -> bool {
        self.host.is_some()
    }

    /// Whether an utterance is currently audible, as of the last applied event.
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// The latest voice catalog snapshot.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    /// Speak `text` with the configured voice preference.
    pub fn speak(&mut self, text: &str) {
        self.speak_as(text, self.config.preference);
    }

    /// Speak `text`, preferring a voice of the given kind.
    ///
    /// Whatever was being said is cancelled first; there is no queue.
    pub fn speak_as(&mut self, text: &str, preference: VoicePreference) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        host.cancel();
        if let Some(previous) = self.current.take() {
            log::debug!("Utterance {} superseded", previous.0);
        }

        let catalog = host.voices();
        let voice = select_voice(
            &catalog,
            &self.config.lang,
            preference,
            self.config.hints_for(preference),
        )
        .cloned();

        match &voice {
            Some(v) => log::debug!("Selected voice '{}' ({})", v.name, v.lang),
            None => log::debug!(
                "No {} voice among {} voices, using host default",
                self.config.lang,
                catalog.len()
            ),
        }

        let utterance = Utterance {
            text: text.to_string(),
            rate: self.config.rate,
            pitch: self.config.pitch,
            lang: self.config.lang.clone(),
            voice,
        };

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        self.current = Some(id);
        host.speak(id, utterance, self.events_tx.clone());
    }

    /// Stop speaking now.
    ///
    /// The speaking flag clears immediately; the host may take a moment to
    /// fall silent.
    pub fn stop(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        if self.current.take().is_some() {
            host.cancel();
        }
        self.speaking = false;
    }

    /// Apply every pending host event. Returns the speaking state afterwards.
    pub fn pump(&mut self) -> bool {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
        self.speaking
    }

    /// Block until the active utterance finishes or `timeout` elapses.
    ///
    /// Returns `true` when idle at return.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();

        while self.current.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events_rx.recv_timeout(remaining) {
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) => return false,
                // The adapter holds a sender itself, so this cannot happen.
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.current.is_none()
    }

    fn apply(&mut self, event: HostEvent) {
        match event {
            HostEvent::VoicesChanged => {
                if let Some(host) = self.host.as_ref() {
                    self.voices = host.voices();
                    log::debug!("Voice catalog changed: {} voices", self.voices.len());
                }
            }
            HostEvent::Utterance { id, event } => {
                if self.current != Some(id) {
                    log::trace!("Ignoring {event:?} for superseded utterance {}", id.0);
                    return;
                }
                match event {
                    UtteranceEvent::Started => self.speaking = true,
                    UtteranceEvent::Ended => {
                        self.speaking = false;
                        self.current = None;
                    }
                    UtteranceEvent::Failed(e) => {
                        log::error!("Speech synthesis error: {e}");
                        self.speaking = false;
                        self.current = None;
                    }
                }
            }
        }
    }
}

impl<H: SpeechHost> Drop for SpeechOutput<H> {
    fn drop(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        if self.current.take().is_some() {
            host.cancel();
        }
        if let Some(listener) = self.listener.take() {
            host.unsubscribe_voices(listener);
        }
    }
}
