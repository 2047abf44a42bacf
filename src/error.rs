#[derive(thiserror::Error, Debug)]
pub enum SpeechError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("Utterance interrupted before it finished")]
    Interrupted,
    #[error("Invalid speech config: {0}")]
    Config(String),
    #[error("Failed to read voice list: {0}")]
    VoiceList(String),
}

impl From<serde_json::Error> for SpeechError {
    fn from(e: serde_json::Error) -> Self {
        SpeechError::Config(e.to_string())
    }
}
