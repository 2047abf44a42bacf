use std::process::Stdio;

use super::host::EspeakConfig;
use crate::error::SpeechError;
use crate::voice::Voice;

/// Run `espeak-ng --voices` and parse the catalog.
pub fn list_voices(espeak: &EspeakConfig) -> Result<Vec<Voice>, SpeechError> {
    let output = espeak
        .command()
        .arg("--voices")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SpeechError::EspeakNotFound
            } else {
                SpeechError::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SpeechError::VoiceList(format!(
            "espeak-ng exited with code {:?}: {stderr}",
            output.status.code()
        )));
    }

    parse_voice_list(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// Rows with fewer than five columns are skipped.
pub fn parse_voice_list(table: &str) -> Result<Vec<Voice>, SpeechError> {
    let mut lines = table.lines().filter(|l| !l.trim().is_empty());

    match lines.next() {
        Some(header) if header.trim_start().starts_with("Pty") => {}
        Some(other) => {
            return Err(SpeechError::VoiceList(format!(
                "unexpected header line: {other:?}"
            )))
        }
        None => return Ok(Vec::new()),
    }

    let mut voices = Vec::new();
    for line in lines {
        // Pty, Language, Age/Gender, VoiceName, File, [Other Languages]
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            log::warn!("Skipping malformed espeak-ng voice row: {line:?}");
            continue;
        }
        voices.push(Voice::new(fields[3], bcp47_tag(fields[1]), fields[4]));
    }

    log::debug!("Parsed {} espeak-ng voices", voices.len());
    Ok(voices)
}

/// `en-us` -> `en-US`. Only a two-letter region subtag is upper-cased.
fn bcp47_tag(lang: &str) -> String {
    let mut parts = lang.split('-');
    let mut tag = parts.next().unwrap_or_default().to_ascii_lowercase();
    for (i, part) in parts.enumerate() {
        tag.push('-');
        if i == 0 && part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
            tag.push_str(&part.to_ascii_uppercase());
        } else {
            tag.push_str(part);
        }
    }
    tag
}
