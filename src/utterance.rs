use crate::error::SpeechError;
use crate::voice::Voice;

/// Identifies one dispatched utterance within its adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

/// A single text-to-speech request handed to a host.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Text to speak. May be empty; hosts decide what that sounds like.
    pub text: String,
    /// Speech rate multiplier, 1.0 is the host's normal rate.
    pub rate: f32,
    /// Pitch multiplier, 1.0 is the host's normal pitch.
    pub pitch: f32,
    /// Language tag the text is in (e.g. `"en-US"`).
    pub lang: String,
    /// Chosen voice. `None` leaves the choice to the host.
    pub voice: Option<Voice>,
}

/// Progress of one utterance, as reported by the host.
#[derive(Debug)]
pub enum UtteranceEvent {
    Started,
    Ended,
    Failed(SpeechError),
}

#[derive(Debug)]
pub enum HostEvent {
    /// The host's voice catalog changed and should be queried again.
    VoicesChanged,
    Utterance {
        id: UtteranceId,
        event: UtteranceEvent,
    },
}

impl HostEvent {
    pub fn started(id: UtteranceId) -> Self {
        HostEvent::Utterance {
            id,
            event: UtteranceEvent::Started,
        }
    }

    pub fn ended(id: UtteranceId) -> Self {
        HostEvent::Utterance {
            id,
            event: UtteranceEvent::Ended,
        }
    }

    pub fn failed(id: UtteranceId, error: SpeechError) -> Self {
        HostEvent::Utterance {
            id,
            event: UtteranceEvent::Failed(error),
        }
    }
}
