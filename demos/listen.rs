use std::path::PathBuf;
use std::time::{Duration, Instant};

use listen_rs::{
    hosts::espeak::EspeakHost, ListenButton, ModeProvider, SpeechConfig, SpeechOutput,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Optional: path to a JSON speech config as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => SpeechConfig::from_json_file(&PathBuf::from(path))?,
        None => SpeechConfig::default(),
    };

    let mut output = SpeechOutput::new(EspeakHost::detect(), config);
    if !output.is_available() {
        println!("No speech synthesizer found; nothing will be spoken.");
    }
    println!("Available voices: {}", output.voices().len());

    let mode = ModeProvider::new(false);
    let ruthless = mode.handle();
    ruthless.toggle();

    let text = if ruthless.is_enabled() {
        "Ruthless mode is on. Here is the short version: ship it."
    } else {
        "Hello! This is a listen button reading the page aloud."
    };
    let button = ListenButton::new(text);

    println!("[{}] pressed", button.visual(&output).label());
    let start = Instant::now();
    button.press(&mut output);

    if output.wait_until_idle(Duration::from_secs(60)) {
        println!("Finished speaking in {:.2?}", start.elapsed());
    } else {
        println!("[{}] pressed after timeout", button.visual(&output).label());
        button.press(&mut output);
    }

    Ok(())
}
