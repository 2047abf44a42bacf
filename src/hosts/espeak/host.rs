use std::borrow::Cow;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::voices::list_voices;
use crate::error::SpeechError;
use crate::utterance::{HostEvent, Utterance, UtteranceId};
use crate::voice::Voice;
use crate::{EventSender, ListenerId, SpeechHost};

/// espeak-ng speaking rate (words per minute) at rate 1.0.
pub const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// espeak-ng pitch level at pitch 1.0.
pub const BASE_PITCH: f32 = 50.0;

const WATCH_INTERVAL: Duration = Duration::from_millis(20);

/// Where to find espeak-ng.
#[derive(Debug, Clone, Default)]
pub struct EspeakConfig {
    /// espeak-ng binary. `None` uses `espeak-ng` from PATH.
    pub bin_path: Option<PathBuf>,
    /// Directory containing `espeak-ng-data`. `None` uses the built-in default.
    pub data_path: Option<PathBuf>,
}

impl EspeakConfig {
    pub(crate) fn command(&self) -> Command {
        let bin = self
            .bin_path
            .as_deref()
            .unwrap_or_else(|| Path::new("espeak-ng"));
        let mut cmd = Command::new(bin);
        if let Some(data) = &self.data_path {
            cmd.env("ESPEAK_DATA_PATH", data);
        }
        cmd
    }
}

struct ActiveUtterance {
    id: UtteranceId,
    child: Arc<Mutex<Child>>,
    cancelled: Arc<AtomicBool>,
}

/// Speech host backed by the espeak-ng command-line synthesizer.
pub struct EspeakHost {
    espeak: EspeakConfig,
    voices: Vec<Voice>,
    listeners: Vec<(ListenerId, EventSender)>,
    next_listener: u64,
    active: Option<ActiveUtterance>,
}

impl EspeakHost {
    /// Probe for `espeak-ng` on PATH.
    pub fn detect() -> Option<Self> {
        Self::detect_with(EspeakConfig::default())
    }

    /// Probe for espeak-ng at the configured location.
    ///
    /// Returns `None` when the binary cannot be run. A failing voice listing
    /// leaves the catalog empty instead.
    pub fn detect_with(espeak: EspeakConfig) -> Option<Self> {
        match espeak.command().arg("--version").stdin(Stdio::null()).output() {
            Ok(out) if out.status.success() => {
                log::info!(
                    "Using {}",
                    String::from_utf8_lossy(&out.stdout).lines().next().unwrap_or("espeak-ng")
                );
            }
            Ok(out) => {
                log::debug!("espeak-ng --version exited with code {:?}", out.status.code());
                return None;
            }
            Err(e) => {
                log::debug!("espeak-ng unavailable: {e}");
                return None;
            }
        }

        let voices = list_voices(&espeak).unwrap_or_else(|e| {
            log::warn!("Could not list espeak-ng voices: {e}");
            Vec::new()
        });

        Some(Self {
            espeak,
            voices,
            listeners: Vec::new(),
            next_listener: 0,
            active: None,
        })
    }

    /// Re-read the voice catalog, notifying subscribers if it changed.
    ///
    /// Returns whether the catalog changed.
    pub fn refresh_voices(&mut self) -> Result<bool, SpeechError> {
        let voices = list_voices(&self.espeak)?;
        if voices == self.voices {
            return Ok(false);
        }

        log::info!("espeak-ng voice catalog now has {} voices", voices.len());
        self.voices = voices;
        self.listeners
            .retain(|(_, listener)| listener.send(HostEvent::VoicesChanged).is_ok());
        Ok(true)
    }

    fn spawn(&self, utterance: &Utterance) -> Result<Child, SpeechError> {
        let wpm = words_per_minute(utterance.rate).to_string();
        let pitch = pitch_level(utterance.pitch).to_string();
        let voice = voice_arg(utterance);

        self.espeak
            .command()
            .args(["-s", &wpm, "-p", &pitch, "-v", &voice, "--stdin"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpeechError::EspeakNotFound
                } else {
                    SpeechError::Io(e)
                }
            })
    }
}

impl Drop for EspeakHost {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl SpeechHost for EspeakHost {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, id: UtteranceId, utterance: Utterance, events: EventSender) {
        self.cancel();

        let mut child = match self.spawn(&utterance) {
            Ok(child) => child,
            Err(e) => {
                let _ = events.send(HostEvent::failed(id, e));
                return;
            }
        };
        log::debug!("espeak-ng speaking utterance {} ({} chars)", id.0, utterance.text.len());
        let _ = events.send(HostEvent::started(id));

        // espeak-ng consumes stdin as it plays, so the text is fed from the
        // watcher thread; speak returns without waiting on the pipe.
        let stdin = child.stdin.take();
        let stderr = child.stderr.take();
        let payload = canonicalize_stdin_payload(&utterance.text).into_owned();
        let child = Arc::new(Mutex::new(child));
        let cancelled = Arc::new(AtomicBool::new(false));

        let watcher = {
            let child = Arc::clone(&child);
            let cancelled = Arc::clone(&cancelled);
            let events = events.clone();
            thread::Builder::new()
                .name(format!("espeak-utterance-{}", id.0))
                .spawn(move || {
                    let stderr = drain_stderr(id, stderr);
                    feed_stdin(stdin, &payload, &cancelled);
                    watch(id, &child, &cancelled, stderr, &events)
                })
        };

        if let Err(e) = watcher {
            let mut child = lock(&child);
            let _ = child.kill();
            let _ = child.wait();
            let _ = events.send(HostEvent::failed(id, SpeechError::Io(e)));
            return;
        }

        self.active = Some(ActiveUtterance {
            id,
            child,
            cancelled,
        });
    }

    fn cancel(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        active.cancelled.store(true, Ordering::SeqCst);
        let mut child = lock(&active.child);
        match child.kill() {
            Ok(()) => log::debug!("Cancelled utterance {}", active.id.0),
            // Already exited.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {}
            Err(e) => log::warn!("Failed to stop espeak-ng: {e}"),
        }
    }

    fn subscribe_voices(&mut self, events: EventSender) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, events));
        id
    }

    fn unsubscribe_voices(&mut self, listener: ListenerId) {
        self.listeners.retain(|(id, _)| *id != listener);
    }
}

fn lock(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write the text and close the pipe. A kill from `cancel` ends a blocked write.
fn feed_stdin(stdin: Option<ChildStdin>, payload: &str, cancelled: &AtomicBool) {
    let Some(mut stdin) = stdin else {
        return;
    };
    if let Err(e) = stdin.write_all(payload.as_bytes()) {
        if !cancelled.load(Ordering::SeqCst) {
            log::warn!("Failed to send text to espeak-ng: {e}");
        }
    }
}

/// Read stderr to the end on its own thread so a chatty espeak-ng never
/// stalls on a full pipe.
fn drain_stderr(id: UtteranceId, stderr: Option<ChildStderr>) -> Option<JoinHandle<String>> {
    let mut pipe = stderr?;
    thread::Builder::new()
        .name(format!("espeak-stderr-{}", id.0))
        .spawn(move || {
            let mut output = String::new();
            let _ = pipe.read_to_string(&mut output);
            output
        })
        .map_err(|e| log::warn!("Could not read espeak-ng stderr: {e}"))
        .ok()
}

/// Poll the process until it exits, then report how the utterance ended.
fn watch(
    id: UtteranceId,
    child: &Mutex<Child>,
    cancelled: &AtomicBool,
    stderr: Option<JoinHandle<String>>,
    events: &EventSender,
) {
    let status = loop {
        let polled = lock(child).try_wait();
        match polled {
            Ok(Some(status)) => break Ok(status),
            Ok(None) => thread::sleep(WATCH_INTERVAL),
            Err(e) => break Err(e),
        }
    };

    let event = if cancelled.load(Ordering::SeqCst) {
        HostEvent::failed(id, SpeechError::Interrupted)
    } else {
        match status {
            Ok(status) if status.success() => HostEvent::ended(id),
            Ok(status) => {
                let stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
                HostEvent::failed(id, exit_error(status, &stderr))
            }
            Err(e) => HostEvent::failed(id, SpeechError::Io(e)),
        }
    };

    // The adapter may already be gone.
    let _ = events.send(event);
}

fn exit_error(status: ExitStatus, stderr: &str) -> SpeechError {
    SpeechError::SynthesisFailed(format!(
        "espeak-ng exited with code {:?}: {}",
        status.code(),
        stderr.trim()
    ))
}

/// Map a rate multiplier to espeak-ng words per minute.
///
/// Non-finite multipliers fall back to the normal rate.
pub fn words_per_minute(rate: f32) -> u32 {
    let rate = if rate.is_finite() { rate } else { 1.0 };
    (BASE_WORDS_PER_MINUTE * rate).round().clamp(80.0, 450.0) as u32
}

/// Map a pitch multiplier to the espeak-ng 0-99 pitch scale.
///
/// Non-finite multipliers fall back to the normal pitch.
pub fn pitch_level(pitch: f32) -> u32 {
    let pitch = if pitch.is_finite() { pitch } else { 1.0 };
    (BASE_PITCH * pitch).round().clamp(0.0, 99.0) as u32
}

fn voice_arg(utterance: &Utterance) -> String {
    match &utterance.voice {
        Some(voice) => voice.uri.clone(),
        None => utterance.lang.to_ascii_lowercase(),
    }
}

fn canonicalize_stdin_payload(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::{canonicalize_stdin_payload, pitch_level, voice_arg, words_per_minute};
    use crate::utterance::Utterance;
    use crate::voice::Voice;

    fn utterance(voice: Option<Voice>) -> Utterance {
        Utterance {
            text: "hello".into(),
            rate: 1.0,
            pitch: 1.0,
            lang: "en-US".into(),
            voice,
        }
    }

    #[test]
    fn normal_rate_and_pitch_map_to_espeak_defaults() {
        assert_eq!(words_per_minute(1.0), 175);
        assert_eq!(pitch_level(1.0), 50);
    }

    #[test]
    fn rate_and_pitch_are_clamped() {
        assert_eq!(words_per_minute(0.1), 80);
        assert_eq!(words_per_minute(10.0), 450);
        assert_eq!(pitch_level(0.0), 0);
        assert_eq!(pitch_level(3.0), 99);
    }

    #[test]
    fn non_finite_rate_and_pitch_use_espeak_defaults() {
        assert_eq!(words_per_minute(f32::NAN), 175);
        assert_eq!(words_per_minute(f32::INFINITY), 175);
        assert_eq!(pitch_level(f32::NAN), 50);
        assert_eq!(pitch_level(f32::NEG_INFINITY), 50);
    }

    #[test]
    fn voice_uri_wins_over_language() {
        let voice = Voice::new("English_(America)", "en-US", "gmw/en-US");
        assert_eq!(voice_arg(&utterance(Some(voice))), "gmw/en-US");
        assert_eq!(voice_arg(&utterance(None)), "en-us");
    }

    #[test]
    fn appends_trailing_newline_for_stdin() {
        assert_eq!(canonicalize_stdin_payload("America"), "America\n");
        assert_eq!(canonicalize_stdin_payload("America\n"), "America\n");
        assert_eq!(canonicalize_stdin_payload(""), "\n");
    }

    /// Drives a shell script standing in for espeak-ng through the whole
    /// process lifecycle. Kept in one test so no other test forks while the
    /// script is being written.
    #[cfg(unix)]
    #[test]
    fn fake_espeak_process_lifecycle() {
        use std::os::unix::fs::PermissionsExt;
        use std::sync::mpsc;
        use std::time::Duration;

        use super::{EspeakConfig, EspeakHost};
        use crate::config::SpeechConfig;
        use crate::error::SpeechError;
        use crate::output::SpeechOutput;
        use crate::utterance::{HostEvent, UtteranceEvent, UtteranceId};
        use crate::SpeechHost;

        let dir = std::env::temp_dir().join(format!("listen-rs-fake-espeak-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let script = dir.join("espeak-ng");
        let body = format!(
            r#"#!/bin/sh
DIR="{dir}"
case "$1" in
  --version) echo "eSpeak NG text-to-speech: 1.51"; exit 0 ;;
  --voices*)
    echo "Pty Language       Age/Gender VoiceName          File                 Other Languages"
    echo " 2  en-gb           --/M      English_(Great_Britain) gmw/en               (en 2)"
    echo " 2  en-us           --/M      English_(America)  gmw/en-US            (en 3)"
    exit 0 ;;
esac
MODE="$(cat "$DIR/mode")"
echo "$@" > "$DIR/args"
[ "$MODE" = lazy ] && sleep 1
cat > "$DIR/stdin"
case "$MODE" in
  fail) echo "no audio device" >&2; exit 3 ;;
  slow) exec sleep 5 ;;
  chatty) head -c 200000 /dev/zero >&2 ;;
esac
exit 0
"#,
            dir = dir.display()
        );
        std::fs::write(&script, body).expect("write script");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
        let set_mode = |mode: &str| std::fs::write(dir.join("mode"), mode).expect("write mode");

        let espeak = EspeakConfig {
            bin_path: Some(script),
            data_path: None,
        };
        let mut host = EspeakHost::detect_with(espeak).expect("fake espeak detected");
        let voices = host.voices();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].lang, "en-US");
        assert_eq!(voices[1].uri, "gmw/en-US");

        let timeout = Duration::from_secs(5);
        let next = |rx: &mpsc::Receiver<HostEvent>| match rx.recv_timeout(timeout) {
            Ok(HostEvent::Utterance { event, .. }) => event,
            other => panic!("expected utterance event, got {other:?}"),
        };

        // Success
        set_mode("ok");
        let (tx, rx) = mpsc::channel();
        host.speak(UtteranceId(1), utterance(Some(voices[1].clone())), tx);
        assert!(matches!(next(&rx), UtteranceEvent::Started));
        assert!(matches!(next(&rx), UtteranceEvent::Ended));
        let args = std::fs::read_to_string(dir.join("args")).expect("args recorded");
        assert_eq!(args.trim(), "-s 175 -p 50 -v gmw/en-US --stdin");
        let stdin = std::fs::read_to_string(dir.join("stdin")).expect("stdin recorded");
        assert_eq!(stdin, "hello\n");

        // Non-zero exit
        set_mode("fail");
        let (tx, rx) = mpsc::channel();
        host.speak(UtteranceId(2), utterance(None), tx);
        assert!(matches!(next(&rx), UtteranceEvent::Started));
        match next(&rx) {
            UtteranceEvent::Failed(SpeechError::SynthesisFailed(msg)) => {
                assert!(msg.contains("no audio device"), "{msg}")
            }
            other => panic!("expected synthesis failure, got {other:?}"),
        }

        // Cancel mid-utterance
        set_mode("slow");
        let (tx, rx) = mpsc::channel();
        host.speak(UtteranceId(3), utterance(None), tx);
        assert!(matches!(next(&rx), UtteranceEvent::Started));
        host.cancel();
        assert!(matches!(
            next(&rx),
            UtteranceEvent::Failed(SpeechError::Interrupted)
        ));

        // Text larger than the pipe buffer, read late: speak must not block
        set_mode("lazy");
        let long_text = "word ".repeat(40_000);
        let (tx, rx) = mpsc::channel();
        let mut long = utterance(None);
        long.text = long_text.clone();
        let dispatched_at = std::time::Instant::now();
        host.speak(UtteranceId(4), long, tx);
        assert!(
            dispatched_at.elapsed() < Duration::from_millis(500),
            "speak blocked for {:?}",
            dispatched_at.elapsed()
        );
        assert!(matches!(next(&rx), UtteranceEvent::Started));
        assert!(matches!(next(&rx), UtteranceEvent::Ended));
        let stdin = std::fs::read_to_string(dir.join("stdin")).expect("stdin recorded");
        assert_eq!(stdin.len(), long_text.len() + 1);

        // Lots of stderr output must not stall the process
        set_mode("chatty");
        let (tx, rx) = mpsc::channel();
        host.speak(UtteranceId(5), utterance(None), tx);
        assert!(matches!(next(&rx), UtteranceEvent::Started));
        assert!(matches!(next(&rx), UtteranceEvent::Ended));

        // Through the adapter
        set_mode("ok");
        let mut output = SpeechOutput::new(Some(host), SpeechConfig::default());
        output.speak("adapter");
        assert!(output.wait_until_idle(timeout));
        assert!(!output.is_speaking());
        let stdin = std::fs::read_to_string(dir.join("stdin")).expect("stdin recorded");
        assert_eq!(stdin, "adapter\n");

        drop(output);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
