//! Production implementations of the platform capabilities.
//!
//! Everything here is best-effort over spawned system tools: probe once for
//! a usable binary, spawn it fire-and-forget, log and swallow failures.
//! Absence of a tool degrades the capability to a no-op - never an error the
//! user sees.

use crate::alerts::{AudioSink, Haptics, Speaker};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// First candidate binary that answers `--version`, if any.
fn probe<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|bin| {
        Command::new(bin)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    })
}

/// Speech synthesis through a system TTS tool. A new utterance kills any
/// still-running one, so at most one is audible at a time.
pub struct CommandSpeaker {
    engine: Option<&'static str>,
    current: Option<Child>,
}

impl CommandSpeaker {
    pub fn detect() -> Self {
        let engine = probe(&["espeak-ng", "espeak", "spd-say", "say"]);
        match engine {
            Some(bin) => debug!("speech synthesis via {bin}"),
            None => debug!("no speech synthesis tool found, alerts degrade to silence"),
        }
        Self {
            engine,
            current: None,
        }
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str, lang: &str) {
        let Some(bin) = self.engine else { return };
        if let Some(mut previous) = self.current.take() {
            let _ = previous.kill();
            let _ = previous.wait();
        }
        let mut cmd = Command::new(bin);
        match bin {
            "espeak-ng" | "espeak" => {
                cmd.arg("-v").arg(lang).arg(text);
            }
            "spd-say" => {
                cmd.arg("-l").arg(lang).arg(text);
            }
            // `say` picks the voice from system settings.
            _ => {
                cmd.arg(text);
            }
        }
        match cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => self.current = Some(child),
            Err(e) => warn!("speech synthesis failed: {e}"),
        }
    }
}

/// Plays recorded alerts. The payload arrives as a base64 `data:audio/webm`
/// URI; it is decoded to a scratch file and handed to a system player.
pub struct DataUriPlayer {
    scratch: PathBuf,
    player: Option<&'static str>,
}

impl DataUriPlayer {
    pub fn detect(scratch_dir: impl Into<PathBuf>) -> Self {
        let player = probe(&["mpv", "ffplay", "cvlc", "afplay"]);
        match player {
            Some(bin) => debug!("recorded alerts via {bin}"),
            None => debug!("no audio player found, recorded alerts degrade to silence"),
        }
        Self {
            scratch: scratch_dir.into(),
            player,
        }
    }

    fn decode(data_uri: &str) -> Option<Vec<u8>> {
        let payload = data_uri.split_once(";base64,").map(|(_, b)| b)?;
        BASE64.decode(payload).ok()
    }
}

impl AudioSink for DataUriPlayer {
    fn play(&mut self, data_uri: &str) {
        let Some(bin) = self.player else { return };
        let Some(bytes) = Self::decode(data_uri) else {
            warn!("recorded alert is not a base64 data URI, skipping");
            return;
        };
        let path = self.scratch.join("alert.webm");
        if let Err(e) = std::fs::write(&path, bytes) {
            warn!("could not stage recorded alert: {e}");
            return;
        }
        let mut cmd = Command::new(bin);
        match bin {
            "mpv" => {
                cmd.arg("--no-video").arg("--really-quiet").arg(&path);
            }
            "ffplay" => {
                cmd.args(["-nodisp", "-autoexit", "-loglevel", "quiet"]).arg(&path);
            }
            "cvlc" => {
                cmd.arg("--play-and-exit").arg(&path);
            }
            _ => {
                cmd.arg(&path);
            }
        }
        if let Err(e) = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            warn!("recorded alert playback failed: {e}");
        }
    }
}

/// The closest a terminal gets to a vibration motor: the bell. Terminals
/// without one simply ignore it.
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn pulse(&mut self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

/// System share facility. On the desktop that means the clipboard.
pub trait ShareTarget {
    /// Hand text off; `true` when it plausibly arrived somewhere.
    fn share(&mut self, text: &str) -> bool;
}

pub struct Clipboard {
    tool: Option<&'static str>,
}

impl Clipboard {
    pub fn detect() -> Self {
        Self {
            tool: probe(&["wl-copy", "xclip", "xsel", "pbcopy"]),
        }
    }
}

impl ShareTarget for Clipboard {
    fn share(&mut self, text: &str) -> bool {
        let Some(bin) = self.tool else {
            return false;
        };
        let mut cmd = Command::new(bin);
        match bin {
            "xclip" => {
                cmd.args(["-selection", "clipboard"]);
            }
            "xsel" => {
                cmd.arg("-ib");
            }
            _ => {}
        }
        let spawned = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("clipboard handoff failed: {e}");
                return false;
            }
        };
        if let Some(stdin) = child.stdin.as_mut() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                warn!("clipboard handoff failed: {e}");
                return false;
            }
        }
        drop(child.stdin.take());
        matches!(child.wait(), Ok(status) if status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data_uris() {
        let uri = format!("data:audio/webm;base64,{}", BASE64.encode(b"hello"));
        assert_eq!(DataUriPlayer::decode(&uri), Some(b"hello".to_vec()));
        assert_eq!(DataUriPlayer::decode("data:audio/webm,plain"), None);
        assert_eq!(DataUriPlayer::decode("data:audio/webm;base64,!!!"), None);
    }
}
