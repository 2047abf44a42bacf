//! Speech synthesis hosts.
//!
//! This module contains implementations of [`SpeechHost`](crate::SpeechHost).
//!
//! # Available Hosts
//!
//! - `recording` - scriptable in-memory host for tests (always available)
//!
//! Enable platform hosts via Cargo features:
//! - `espeak` - the espeak-ng command-line synthesizer (on by default)

#[cfg(feature = "espeak")]
pub mod espeak;
pub mod recording;
