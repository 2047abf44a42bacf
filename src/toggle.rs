use crate::output::SpeechOutput;
use crate::SpeechHost;

/// The two mutually exclusive looks of a listen button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleVisual {
    Listen,
    Stop,
}

impl ToggleVisual {
    pub fn label(self) -> &'static str {
        match self {
            ToggleVisual::Listen => "Listen",
            ToggleVisual::Stop => "Stop",
        }
    }
}

/// A listen/stop button that reads fixed text aloud.
#[derive(Debug, Clone)]
pub struct ListenButton {
    text: String,
}

impl ListenButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Stop if speaking, otherwise start reading the text.
    pub fn press<H: SpeechHost>(&self, output: &mut SpeechOutput<H>) {
        if output.is_speaking() {
            output.stop();
        } else {
            output.speak(&self.text);
        }
    }

    pub fn visual<H: SpeechHost>(&self, output: &SpeechOutput<H>) -> ToggleVisual {
        if output.is_speaking() {
            ToggleVisual::Stop
        } else {
            ToggleVisual::Listen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListenButton, ToggleVisual};
    use crate::config::SpeechConfig;
    use crate::hosts::recording::{HostCall, RecordingHost};
    use crate::output::SpeechOutput;

    #[test]
    fn press_alternates_between_speak_and_stop() {
        let host = RecordingHost::new();
        let mut output = SpeechOutput::new(Some(host.clone()), SpeechConfig::default());
        let button = ListenButton::new("Ruthless clarity, read aloud.");
        assert_eq!(button.visual(&output), ToggleVisual::Listen);

        button.press(&mut output);
        let id = host.last_dispatched().expect("press should speak");
        assert_eq!(
            host.last_utterance().map(|u| u.text),
            Some(button.text().to_string())
        );

        host.start(id);
        output.pump();
        assert_eq!(button.visual(&output), ToggleVisual::Stop);
        assert_eq!(button.visual(&output).label(), "Stop");

        button.press(&mut output);
        assert_eq!(button.visual(&output), ToggleVisual::Listen);
        assert_eq!(host.calls().last(), Some(&HostCall::Cancel));
    }

    #[test]
    fn press_without_synthesizer_stays_listen() {
        let mut output = SpeechOutput::<RecordingHost>::unavailable(SpeechConfig::default());
        let button = ListenButton::new("hello");
        button.press(&mut output);
        assert_eq!(button.visual(&output), ToggleVisual::Listen);
        assert_eq!(button.visual(&output).label(), "Listen");
    }
}
