//! A scriptable in-memory host.
//!
//! `RecordingHost` records every call the adapter makes and lets the caller
//! play the host's part: change the catalog, then start, finish or fail a
//! dispatched utterance. Clones share state, so a test keeps one clone and
//! hands the other to the adapter.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SpeechError;
use crate::utterance::{HostEvent, Utterance, UtteranceEvent, UtteranceId};
use crate::voice::Voice;
use crate::{EventSender, ListenerId, SpeechHost};

/// One call made on a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Voices,
    Speak { id: UtteranceId, utterance: Utterance },
    Cancel,
    Subscribe(ListenerId),
    Unsubscribe(ListenerId),
}

#[derive(Default)]
struct RecordingState {
    calls: Vec<HostCall>,
    voices: Vec<Voice>,
    listeners: Vec<(ListenerId, EventSender)>,
    dispatched: Vec<(UtteranceId, EventSender)>,
    next_listener: u64,
}

#[derive(Clone, Default)]
pub struct RecordingHost {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let host = Self::new();
        host.state.borrow_mut().voices = voices;
        host
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.borrow().calls.clone()
    }

    pub fn last_dispatched(&self) -> Option<UtteranceId> {
        self.state.borrow().dispatched.last().map(|(id, _)| *id)
    }

    pub fn last_utterance(&self) -> Option<Utterance> {
        self.state
            .borrow()
            .calls
            .iter()
            .rev()
            .find_map(|call| match call {
                HostCall::Speak { utterance, .. } => Some(utterance.clone()),
                _ => None,
            })
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Replace the catalog and notify every subscriber.
    pub fn set_voices(&self, voices: Vec<Voice>) {
        let mut state = self.state.borrow_mut();
        state.voices = voices;
        for (_, listener) in &state.listeners {
            let _ = listener.send(HostEvent::VoicesChanged);
        }
    }

    pub fn start(&self, id: UtteranceId) {
        self.emit(id, UtteranceEvent::Started);
    }

    pub fn finish(&self, id: UtteranceId) {
        self.emit(id, UtteranceEvent::Ended);
    }

    pub fn fail(&self, id: UtteranceId, error: SpeechError) {
        self.emit(id, UtteranceEvent::Failed(error));
    }

    /// Report `event` for a dispatched utterance. Unknown ids are ignored.
    pub fn emit(&self, id: UtteranceId, event: UtteranceEvent) {
        let state = self.state.borrow();
        if let Some((_, events)) = state.dispatched.iter().find(|(d, _)| *d == id) {
            // The adapter may already be gone.
            let _ = events.send(HostEvent::Utterance { id, event });
        }
    }
}

impl SpeechHost for RecordingHost {
    fn voices(&self) -> Vec<Voice> {
        let mut state = self.state.borrow_mut();
        state.calls.push(HostCall::Voices);
        state.voices.clone()
    }

    fn speak(&mut self, id: UtteranceId, utterance: Utterance, events: EventSender) {
        let mut state = self.state.borrow_mut();
        state.calls.push(HostCall::Speak { id, utterance });
        state.dispatched.push((id, events));
    }

    fn cancel(&mut self) {
        self.state.borrow_mut().calls.push(HostCall::Cancel);
    }

    fn subscribe_voices(&mut self, events: EventSender) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.push((id, events));
        state.calls.push(HostCall::Subscribe(id));
        id
    }

    fn unsubscribe_voices(&mut self, listener: ListenerId) {
        let mut state = self.state.borrow_mut();
        state.listeners.retain(|(id, _)| *id != listener);
        state.calls.push(HostCall::Unsubscribe(listener));
    }
}
