//! espeak-ng speech host.
//!
//! This module drives the `espeak-ng` command-line synthesizer. Each
//! utterance runs as one `espeak-ng` process that plays through the default
//! audio device; cancelling kills that process.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed on your system:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>
//!
//! When it is missing, [`EspeakHost::detect`] returns `None` and a
//! [`SpeechOutput`](crate::SpeechOutput) built from it stays silent.
//!
//! # Voice Catalog
//!
//! Voices come from `espeak-ng --voices`:
//!
//! ```text
//! Pty Language       Age/Gender VoiceName          File                 Other Languages
//!  2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
//! ```
//!
//! The `Language` column becomes [`Voice::lang`](crate::Voice::lang) (region
//! upper-cased, so `en-us` reads `en-US`), `VoiceName` becomes the name and
//! `File` the uri passed back to `-v`.
//!
//! # Rate and Pitch
//!
//! | Utterance field | espeak-ng flag | 1.0 maps to | Range |
//! |---|---|---|---|
//! | `rate` | `-s` (words per minute) | 175 | 80–450 |
//! | `pitch` | `-p` | 50 | 0–99 |
//!
//! # Examples
//!
//! ```rust,no_run
//! use listen_rs::hosts::espeak::{EspeakConfig, EspeakHost};
//! use listen_rs::{SpeechConfig, SpeechOutput};
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! // Bundled espeak-ng instead of the one on PATH
//! let host = EspeakHost::detect_with(EspeakConfig {
//!     bin_path: Some(PathBuf::from("/app/resources/espeak-ng/espeak-ng")),
//!     data_path: Some(PathBuf::from("/app/resources")),
//! });
//!
//! let mut output = SpeechOutput::new(host, SpeechConfig::default());
//! output.speak("Hello from espeak!");
//! output.wait_until_idle(Duration::from_secs(30));
//! ```

pub mod host;
pub mod voices;

pub use host::{EspeakConfig, EspeakHost};
