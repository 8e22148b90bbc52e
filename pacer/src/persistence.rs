//! Per-key persistent store.
//!
//! Every mutable slot of the session lives under its own key, written
//! synchronously as a small JSON file the moment it changes, so a restart
//! resumes exactly where the previous process stopped - including a running
//! countdown. Wall-clock time spent not running as a process is deliberately
//! not replayed.

use crate::session::{SessionState, Theme};
use anyhow::Result;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod keys {
    pub const LANG: &str = "lang";
    pub const THEME: &str = "theme";
    pub const PRIMARY: &str = "color_primary";
    pub const ACCENT: &str = "color_accent";
    pub const PHASES: &str = "phases";
    pub const PHASE_INDEX: &str = "phase_index";
    pub const REMAINING: &str = "remaining";
    pub const RUNNING: &str = "running";
    pub const ALERTS_TEXT: &str = "alerts_text";
    pub const RECORDINGS: &str = "recordings";
    pub const USE_RECORDING: &str = "use_recording";
}

pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open the store in the platform data directory.
    pub fn open() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "pacer", "pacer")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::at(proj_dirs.data_dir())
    }

    /// Open the store at an explicit directory (tests, mostly).
    pub fn at(dir: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read a slot. Missing or unreadable slots yield `None` - the caller
    /// falls back to its default rather than failing startup.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = fs::read_to_string(self.key_path(key)).ok()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("discarding corrupt slot {key}: {e}");
                None
            }
        }
    }

    /// Write a slot synchronously.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::write(self.key_path(key), serde_json::to_string(value)?)?;
        Ok(())
    }
}

/// Rehydrate the session from the store, slot by slot. Each missing slot
/// takes its default from the stored language's pack, then the
/// initialization merge fills any alert keys a pack update introduced.
pub fn load_session(store: &Store) -> SessionState {
    let lang: String = store.get(keys::LANG).unwrap_or_else(|| "ca".into());
    let pack = crate::langs::pack(&lang);

    let mut session = SessionState::default();
    session.lang = lang;
    session.theme = store.get(keys::THEME).unwrap_or(Theme::Light);
    if let Some(primary) = store.get(keys::PRIMARY) {
        session.primary = primary;
    }
    if let Some(accent) = store.get(keys::ACCENT) {
        session.accent = accent;
    }
    session.phases = store.get(keys::PHASES).unwrap_or_else(|| pack.default_cycle());
    session.idx = store.get(keys::PHASE_INDEX).unwrap_or(0);
    session.alerts_text = store
        .get(keys::ALERTS_TEXT)
        .unwrap_or_else(|| pack.default_alerts());
    session.recordings = store.get(keys::RECORDINGS).unwrap_or_default();
    session.use_recording = store.get(keys::USE_RECORDING).unwrap_or(true);
    session.remaining = store
        .get(keys::REMAINING)
        .unwrap_or_else(|| session.total_secs());
    session.running = store.get(keys::RUNNING).unwrap_or(false);
    session.apply_lang_defaults();
    session
}

/// Persist every slot; used after import and on shutdown.
pub fn save_session(store: &Store, session: &SessionState) -> Result<()> {
    store.set(keys::LANG, &session.lang)?;
    store.set(keys::THEME, &session.theme)?;
    store.set(keys::PRIMARY, &session.primary)?;
    store.set(keys::ACCENT, &session.accent)?;
    store.set(keys::PHASES, &session.phases)?;
    store.set(keys::PHASE_INDEX, &session.idx)?;
    store.set(keys::REMAINING, &session.remaining)?;
    store.set(keys::RUNNING, &session.running)?;
    store.set(keys::ALERTS_TEXT, &session.alerts_text)?;
    store.set(keys::RECORDINGS, &session.recordings)?;
    store.set(keys::USE_RECORDING, &session.use_recording)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_yields_catalan_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path()).unwrap();
        let session = load_session(&store);
        assert_eq!(session.lang, "ca");
        assert_eq!(session.phases.len(), 2);
        assert_eq!(session.remaining, 300);
        assert!(!session.running);
    }

    #[test]
    fn session_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path()).unwrap();

        let mut session = load_session(&store);
        session.set_lang("en");
        session.start();
        for _ in 0..10 {
            session.tick();
        }
        save_session(&store, &session).unwrap();

        let reloaded = load_session(&Store::at(dir.path()).unwrap());
        assert_eq!(reloaded, session);
        assert!(reloaded.running);
        assert_eq!(reloaded.remaining, 290);
    }

    #[test]
    fn corrupt_slot_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path()).unwrap();
        std::fs::write(dir.path().join("phase_index.json"), "{broken").unwrap();
        let session = load_session(&store);
        assert_eq!(session.idx, 0);
    }

    #[test]
    fn missing_remaining_defaults_to_stored_phase_duration() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path()).unwrap();
        let phases = vec![crate::session::Phase::new("Solo", 2, "#123456")];
        store.set(keys::PHASES, &phases).unwrap();
        let session = load_session(&store);
        assert_eq!(session.remaining, 120);
    }
}
