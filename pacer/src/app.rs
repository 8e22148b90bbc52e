//! Application state and intent handling.
//!
//! Every user intent - keystroke or IPC command - funnels through here:
//! mutate the session, dispatch the alerts the mutation fired, persist the
//! slots it touched. Failures outside the session (audio, clipboard, disk)
//! degrade to a logged warning or a one-shot notice; they never stop the
//! countdown.

use crate::alerts::{AlertDispatcher, AlertEvent};
use crate::config::DisplayConfig;
use crate::document::{ConfigDocument, DocumentError, DEFAULT_EXPORT_FILE};
use crate::langs::{self, LangPack};
use crate::persistence::{self, keys, Store};
use crate::platform::ShareTarget;
use crate::session::{self, SessionState, Theme};
use pacer_ipc::{Command, Response, TimerStatus};
use std::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    EditingTitle(usize),
    EditingMinutes(usize),
    EditingColor(usize),
    SelectingAlert,
    EditingAlert(AlertEvent),
    ImportPath,
    ExportPath,
    ShowHelp,
}

pub struct Notice {
    pub text: String,
    pub at: Instant,
}

pub struct App {
    pub session: SessionState,
    pub store: Store,
    pub display: DisplayConfig,
    pub dispatcher: AlertDispatcher,
    pub share_target: Box<dyn ShareTarget + Send>,
    pub mode: Mode,
    pub input_buffer: String,
    pub selected_phase: usize,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        session: SessionState,
        store: Store,
        display: DisplayConfig,
        dispatcher: AlertDispatcher,
        share_target: Box<dyn ShareTarget + Send>,
    ) -> Self {
        Self {
            session,
            store,
            display,
            dispatcher,
            share_target,
            mode: Mode::Normal,
            input_buffer: String::new(),
            selected_phase: 0,
            notice: None,
            should_quit: false,
        }
    }

    pub fn pack(&self) -> &'static LangPack {
        langs::pack(&self.session.lang)
    }

    fn dispatch(&mut self, event: AlertEvent) {
        self.dispatcher.dispatch(event, &self.session);
    }

    fn persist(&self, slot_keys: &[&str]) {
        for key in slot_keys {
            let result = match *key {
                keys::LANG => self.store.set(key, &self.session.lang),
                keys::THEME => self.store.set(key, &self.session.theme),
                keys::PRIMARY => self.store.set(key, &self.session.primary),
                keys::ACCENT => self.store.set(key, &self.session.accent),
                keys::PHASES => self.store.set(key, &self.session.phases),
                keys::PHASE_INDEX => self.store.set(key, &self.session.idx),
                keys::REMAINING => self.store.set(key, &self.session.remaining),
                keys::RUNNING => self.store.set(key, &self.session.running),
                keys::ALERTS_TEXT => self.store.set(key, &self.session.alerts_text),
                keys::RECORDINGS => self.store.set(key, &self.session.recordings),
                keys::USE_RECORDING => self.store.set(key, &self.session.use_recording),
                other => {
                    warn!("unknown persistence slot {other}");
                    Ok(())
                }
            };
            if let Err(e) = result {
                warn!("could not persist {key}: {e}");
            }
        }
    }

    fn persist_timer(&self) {
        self.persist(&[keys::PHASE_INDEX, keys::REMAINING, keys::RUNNING]);
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            at: Instant::now(),
        });
    }

    /// Drop the notice once it has been on screen a few seconds.
    pub fn expire_notice(&mut self) {
        if let Some(notice) = &self.notice {
            if notice.at.elapsed().as_secs() >= 4 {
                self.notice = None;
            }
        }
    }

    // ── Countdown intents ────────────────────────────────────────────

    pub fn start(&mut self) {
        if let Some(event) = self.session.start() {
            self.dispatch(event);
            self.persist(&[keys::RUNNING]);
        }
    }

    pub fn pause(&mut self) {
        if let Some(event) = self.session.pause() {
            self.dispatch(event);
            self.persist(&[keys::RUNNING]);
        }
    }

    pub fn toggle_timer(&mut self) {
        if self.session.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// One second of wall-clock time while running.
    pub fn tick(&mut self) {
        if let Some(event) = self.session.tick() {
            self.dispatch(event);
            self.send_phase_notification();
            self.persist_timer();
        } else if self.session.running {
            self.persist(&[keys::REMAINING]);
        }
    }

    pub fn reset(&mut self) {
        let event = self.session.reset();
        self.dispatch(event);
        self.persist_timer();
    }

    pub fn add_ten(&mut self) {
        let event = self.session.add_ten();
        self.dispatch(event);
        self.persist(&[keys::REMAINING]);
    }

    pub fn switch_phase(&mut self) {
        let event = self.session.switch_phase();
        self.dispatch(event);
        self.persist_timer();
    }

    pub fn skip_to_next(&mut self) {
        for event in self.session.skip_to_next() {
            self.dispatch(event);
        }
        self.persist_timer();
    }

    fn send_phase_notification(&self) {
        let body = self
            .session
            .current_phase()
            .map(|phase| phase.title.clone())
            .unwrap_or_default();
        let summary = self
            .session
            .alerts_text
            .get(AlertEvent::TimerEnd.key())
            .filter(|text| !text.is_empty())
            .cloned()
            .unwrap_or_else(|| self.pack().ui.app_title.to_string());
        if let Err(e) = notify_rust::Notification::new()
            .summary(&summary)
            .body(&body)
            .appname("pacer")
            .show()
        {
            warn!("Failed to send notification: {e}");
        }
    }

    // ── Phase list intents ───────────────────────────────────────────

    pub fn add_phase(&mut self) {
        let title = self.pack().ui.name.to_string();
        self.session.add_phase(title);
        self.selected_phase = self.session.phases.len() - 1;
        self.persist(&[keys::PHASES]);
    }

    pub fn remove_selected_phase(&mut self) {
        if self.session.remove_phase(self.selected_phase) {
            if self.selected_phase >= self.session.phases.len() {
                self.selected_phase = self.session.phases.len() - 1;
            }
            self.persist(&[keys::PHASES, keys::PHASE_INDEX]);
        }
    }

    pub fn move_selected_phase(&mut self, dir: isize) {
        if self.session.move_phase(self.selected_phase, dir) {
            self.selected_phase = self.selected_phase.wrapping_add_signed(dir);
            self.persist(&[keys::PHASES, keys::PHASE_INDEX]);
        }
    }

    pub fn select_up(&mut self) {
        self.selected_phase = self.selected_phase.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if !self.session.phases.is_empty() {
            self.selected_phase = (self.selected_phase + 1).min(self.session.phases.len() - 1);
        }
    }

    // ── Preference intents ───────────────────────────────────────────

    pub fn cycle_lang(&mut self) {
        let current = langs::CODES
            .iter()
            .position(|&code| code == self.session.lang)
            .unwrap_or(0);
        let next = langs::CODES[(current + 1) % langs::CODES.len()];
        self.set_lang(next);
    }

    pub fn set_lang(&mut self, code: &str) {
        self.session.set_lang(code);
        self.persist(&[keys::LANG, keys::PHASES, keys::ALERTS_TEXT]);
    }

    pub fn toggle_theme(&mut self) {
        self.session.theme = match self.session.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        let label = match self.session.theme {
            Theme::Light => self.pack().ui.light,
            Theme::Dark => self.pack().ui.dark,
        };
        self.notify(label);
        self.persist(&[keys::THEME]);
    }

    pub fn toggle_use_recording(&mut self) {
        self.session.use_recording = !self.session.use_recording;
        self.persist(&[keys::USE_RECORDING]);
    }

    // ── Document intents ─────────────────────────────────────────────

    pub fn export(&mut self, path: &str) {
        let path = if path.is_empty() {
            DEFAULT_EXPORT_FILE
        } else {
            path
        };
        match ConfigDocument::from_session(&self.session).save(path) {
            Ok(()) => {
                let label = self.pack().ui.export_cfg;
                self.notify(format!("{label} → {path}"));
            }
            Err(e) => self.notify(e.to_string()),
        }
    }

    pub fn import(&mut self, path: &str) {
        match self.import_document(path) {
            Ok(()) => {
                let label = self.pack().ui.import_cfg;
                self.notify(format!("✓ {label}"));
            }
            Err(e) => self.notify(e.to_string()),
        }
    }

    fn import_document(&mut self, path: &str) -> Result<(), DocumentError> {
        let doc = ConfigDocument::load(path)?;
        doc.apply(&mut self.session);
        if self.selected_phase >= self.session.phases.len() {
            self.selected_phase = 0;
        }
        if let Err(e) = persistence::save_session(&self.store, &self.session) {
            warn!("could not persist imported configuration: {e}");
        }
        Ok(())
    }

    pub fn share(&mut self) {
        let text = match ConfigDocument::from_session(&self.session).share_text() {
            Ok(text) => text,
            Err(e) => {
                self.notify(e.to_string());
                return;
            }
        };
        let label = self.pack().ui.share_cfg;
        if self.share_target.share(&text) {
            self.notify(format!("✓ {label}"));
        } else {
            self.notify(format!("✗ {label}"));
        }
    }

    // ── Text input (overlay modes) ───────────────────────────────────

    pub fn handle_char(&mut self, c: char) {
        if c == '\n' {
            self.commit_input();
            return;
        }
        match self.mode {
            Mode::EditingMinutes(_) => {
                if c.is_ascii_digit() {
                    self.input_buffer.push(c);
                }
            }
            Mode::EditingTitle(_)
            | Mode::EditingColor(_)
            | Mode::EditingAlert(_)
            | Mode::ImportPath
            | Mode::ExportPath => self.input_buffer.push(c),
            _ => {}
        }
    }

    pub fn handle_backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn cancel_input(&mut self) {
        self.input_buffer.clear();
        self.mode = Mode::Normal;
    }

    fn commit_input(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match mode {
            Mode::EditingTitle(i) => {
                self.session.update_phase(i, |phase| phase.title = input);
                self.persist(&[keys::PHASES]);
            }
            Mode::EditingMinutes(i) => {
                if let Ok(minutes) = input.parse::<u32>() {
                    let minutes = minutes.min(session::MAX_PHASE_MIN);
                    self.session.update_phase(i, |phase| phase.minutes = minutes);
                    self.persist(&[keys::PHASES]);
                }
            }
            Mode::EditingColor(i) => {
                self.session.update_phase(i, |phase| phase.color = input);
                self.persist(&[keys::PHASES]);
            }
            Mode::EditingAlert(event) => {
                self.session
                    .alerts_text
                    .insert(event.key().to_string(), input);
                self.persist(&[keys::ALERTS_TEXT]);
            }
            Mode::ImportPath => self.import(&input),
            Mode::ExportPath => self.export(&input),
            _ => {}
        }
    }

    // ── IPC ──────────────────────────────────────────────────────────

    pub fn handle_command(&mut self, command: Command) -> Response {
        match command {
            Command::Start => {
                self.start();
                Response::Ok
            }
            Command::Pause => {
                self.pause();
                Response::Ok
            }
            Command::Reset => {
                self.reset();
                Response::Ok
            }
            Command::AddTen => {
                self.add_ten();
                Response::Ok
            }
            Command::SkipToNext => {
                self.skip_to_next();
                Response::Ok
            }
            Command::SwitchPhase => {
                self.switch_phase();
                Response::Ok
            }
            Command::Status => Response::Status(self.status()),
            Command::SetLang { lang } => {
                self.set_lang(&lang);
                Response::Ok
            }
            Command::Export { path } => {
                self.export(&path);
                Response::Ok
            }
            Command::Import { path } => match self.import_document(&path) {
                Ok(()) => Response::Ok,
                Err(e) => Response::Error(e.to_string()),
            },
            Command::Share => {
                self.share();
                Response::Ok
            }
        }
    }

    pub fn status(&self) -> TimerStatus {
        TimerStatus {
            running: self.session.running,
            phase_index: self.session.idx,
            phase_title: self
                .session
                .current_phase()
                .map(|phase| phase.title.clone())
                .unwrap_or_default(),
            remaining: self.session.remaining,
            total: self.session.total_secs(),
            lang: self.session.lang.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AudioSink, Haptics, Speaker};
    use std::sync::{Arc, Mutex};

    struct NullSpeaker;
    impl Speaker for NullSpeaker {
        fn speak(&mut self, _text: &str, _lang: &str) {}
    }
    struct NullSink;
    impl AudioSink for NullSink {
        fn play(&mut self, _data_uri: &str) {}
    }
    struct NullHaptics;
    impl Haptics for NullHaptics {
        fn pulse(&mut self) {}
    }
    #[derive(Clone, Default)]
    struct FakeShare(Arc<Mutex<Vec<String>>>);
    impl ShareTarget for FakeShare {
        fn share(&mut self, text: &str) -> bool {
            self.0.lock().unwrap().push(text.to_string());
            true
        }
    }

    fn test_app(dir: &std::path::Path) -> App {
        App::new(
            SessionState::default(),
            Store::at(dir).unwrap(),
            DisplayConfig::default(),
            AlertDispatcher::new(
                Box::new(NullSpeaker),
                Box::new(NullSink),
                Box::new(NullHaptics),
            ),
            Box::new(FakeShare::default()),
        )
    }

    #[test]
    fn timer_intents_persist_their_slots() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.start();
        app.tick();
        app.pause();

        let reloaded = persistence::load_session(&app.store);
        assert!(!reloaded.running);
        assert_eq!(reloaded.remaining, 299);
    }

    #[test]
    fn ipc_status_reflects_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.session.remaining = 120;

        match app.handle_command(Command::Status) {
            Response::Status(status) => {
                assert!(!status.running);
                assert_eq!(status.remaining, 120);
                assert_eq!(status.total, 300);
                assert_eq!(status.phase_index, 0);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn export_then_import_round_trips_through_ipc() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.set_lang("fr");
        app.session.use_recording = false;

        let path = dir.path().join("config.json");
        let path = path.to_string_lossy().to_string();
        assert!(matches!(
            app.handle_command(Command::Export { path: path.clone() }),
            Response::Ok
        ));

        let before = app.session.clone();
        assert!(matches!(
            app.handle_command(Command::Import { path }),
            Response::Ok
        ));
        // The document carries no runtime countdown, so everything it does
        // carry must land back identically.
        assert_eq!(app.session, before);
    }

    #[test]
    fn import_failure_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        let before = app.session.clone();

        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"phases": 3}"#).unwrap();
        app.import(&path.to_string_lossy());

        assert_eq!(app.session, before);
        assert!(app.notice.is_some());
    }

    #[test]
    fn minutes_input_accepts_digits_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.mode = Mode::EditingMinutes(0);
        for c in "1a2".chars() {
            app.handle_char(c);
        }
        app.handle_char('\n');
        assert_eq!(app.session.phases[0].minutes, 12);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn minutes_input_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.mode = Mode::EditingMinutes(0);
        for c in "9999".chars() {
            app.handle_char(c);
        }
        app.handle_char('\n');
        assert_eq!(app.session.phases[0].minutes, session::MAX_PHASE_MIN);
    }

    #[test]
    fn ipc_import_keeps_selection_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.add_phase();
        assert_eq!(app.selected_phase, 2);

        let path = dir.path().join("one-phase.json");
        std::fs::write(
            &path,
            r##"{"phases":[{"id":"a","title":"A","minutes":1,"color":"#fff000"}]}"##,
        )
        .unwrap();
        assert!(matches!(
            app.handle_command(Command::Import {
                path: path.to_string_lossy().to_string()
            }),
            Response::Ok
        ));

        assert_eq!(app.session.phases.len(), 1);
        assert_eq!(app.selected_phase, 0);
    }

    #[test]
    fn share_hands_off_the_document_text() {
        let dir = tempfile::tempdir().unwrap();
        let shared = FakeShare::default();
        let mut app = test_app(dir.path());
        app.share_target = Box::new(shared.clone());

        app.share();
        let sent = shared.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("\"version\":2"));
    }
}
