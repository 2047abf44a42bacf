//! # listen-rs
//!
//! A Rust library for reading text aloud through a host speech synthesizer,
//! with deterministic voice selection and an observable speaking state.
//!
//! ## Features
//!
//! - **Speech output adapter**: `speak`, `stop` and `is_speaking` over any [`SpeechHost`]
//! - **Voice selection**: gendered name hints, then locale match, then the host default
//! - **Pluggable hosts**: espeak-ng out of the box, plus a recording host for tests
//! - **Fail-soft**: a missing synthesizer turns every operation into a no-op
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! listen-rs = { version = "2026.10", features = ["espeak"] }
//! ```
//!
//! ```ignore
//! use listen_rs::{hosts::espeak::EspeakHost, SpeechConfig, SpeechOutput};
//!
//! let mut output = SpeechOutput::new(EspeakHost::detect(), SpeechConfig::default());
//! output.speak("Hello, world!");
//! output.wait_until_idle(std::time::Duration::from_secs(10));
//! ```

pub mod config;
pub mod error;
pub mod hosts;
pub mod mode;
pub mod output;
pub mod toggle;
pub mod utterance;
pub mod voice;

use std::sync::mpsc::Sender;

pub use config::{SpeechConfig, SpeechConfigBuilder};
pub use error::SpeechError;
pub use mode::{ModeProvider, RuthlessMode};
pub use output::SpeechOutput;
pub use toggle::{ListenButton, ToggleVisual};
pub use utterance::{HostEvent, Utterance, UtteranceEvent, UtteranceId};
pub use voice::{Voice, VoicePreference};

/// Channel end a host uses to report catalog changes and utterance progress.
pub type EventSender = Sender<HostEvent>;

/// Handle identifying one catalog-changed subscription on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Common interface for speech synthesis hosts.
///
/// A host is the platform capability that actually produces audio. The
/// [`SpeechOutput`] adapter never reaches for a global synthesizer; it only
/// talks to the host it was given, so any implementation (including a test
/// double) can stand in.
///
/// Hosts report progress asynchronously: every event goes through the
/// [`EventSender`] handed over at dispatch or subscription time.
pub trait SpeechHost {
    /// Current voice catalog. May be empty until the host has populated it.
    fn voices(&self) -> Vec<Voice>;

    /// Dispatch an utterance.
    ///
    /// The host must report `Started`, then exactly one of `Ended` or
    /// `Failed`, tagged with `id`, through `events`.
    fn speak(&mut self, id: UtteranceId, utterance: Utterance, events: EventSender);

    /// Cancel whatever the host is currently saying. Harmless when idle.
    fn cancel(&mut self);

    /// Register for [`HostEvent::VoicesChanged`] notifications.
    fn subscribe_voices(&mut self, events: EventSender) -> ListenerId;

    /// Release a subscription made with [`SpeechHost::subscribe_voices`].
    fn unsubscribe_voices(&mut self, listener: ListenerId);
}
