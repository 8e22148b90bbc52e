//! Alert events and best-effort alert delivery.
//!
//! Every state transition that should be announced maps to one event out of a
//! closed set. Delivery is a side effect with no result: a haptic pulse, then
//! either the user's recording for that event or synthesized speech of the
//! event's text. Device failures are swallowed - an alert is never worth
//! interrupting the countdown for.

use crate::session::SessionState;
use serde::{Deserialize, Serialize};

/// The closed set of announceable events.
///
/// The serialized names double as the keys of the alert-text and recording
/// maps in persisted state and in the configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertEvent {
    #[serde(rename = "START")]
    Start,
    #[serde(rename = "PAUSE")]
    Pause,
    #[serde(rename = "RESET")]
    Reset,
    #[serde(rename = "ADD10")]
    AddTen,
    #[serde(rename = "SKIP_NEXT_PREP")]
    SkipToNext,
    #[serde(rename = "PHASE_CHANGE")]
    PhaseChange,
    #[serde(rename = "TIMER_END")]
    TimerEnd,
}

impl AlertEvent {
    pub const ALL: [AlertEvent; 7] = [
        AlertEvent::Start,
        AlertEvent::Pause,
        AlertEvent::Reset,
        AlertEvent::AddTen,
        AlertEvent::SkipToNext,
        AlertEvent::PhaseChange,
        AlertEvent::TimerEnd,
    ];

    /// Map key used in the alert registry and the configuration document.
    pub fn key(self) -> &'static str {
        match self {
            AlertEvent::Start => "START",
            AlertEvent::Pause => "PAUSE",
            AlertEvent::Reset => "RESET",
            AlertEvent::AddTen => "ADD10",
            AlertEvent::SkipToNext => "SKIP_NEXT_PREP",
            AlertEvent::PhaseChange => "PHASE_CHANGE",
            AlertEvent::TimerEnd => "TIMER_END",
        }
    }
}

/// Text-to-speech capability. A new utterance supersedes any in-flight one.
pub trait Speaker {
    fn speak(&mut self, text: &str, lang: &str);
}

/// Playback of a recorded alert stored as a base64 `data:` URI.
pub trait AudioSink {
    fn play(&mut self, data_uri: &str);
}

/// Short physical pulse. No-op where the platform has nothing to offer.
pub trait Haptics {
    fn pulse(&mut self);
}

/// Decides, per event, which single output to produce.
pub struct AlertDispatcher {
    speaker: Box<dyn Speaker + Send>,
    sink: Box<dyn AudioSink + Send>,
    haptics: Box<dyn Haptics + Send>,
}

impl AlertDispatcher {
    pub fn new(
        speaker: Box<dyn Speaker + Send>,
        sink: Box<dyn AudioSink + Send>,
        haptics: Box<dyn Haptics + Send>,
    ) -> Self {
        Self {
            speaker,
            sink,
            haptics,
        }
    }

    /// Deliver one alert: pulse, then recording if enabled and present,
    /// otherwise speech if the event has non-empty text, otherwise nothing.
    pub fn dispatch(&mut self, event: AlertEvent, session: &SessionState) {
        self.haptics.pulse();

        if session.use_recording {
            if let Some(uri) = session.recordings.get(event.key()) {
                if !uri.is_empty() {
                    self.sink.play(uri);
                    return;
                }
            }
        }

        if let Some(text) = session.alerts_text.get(event.key()) {
            if !text.is_empty() {
                self.speaker.speak(text, speech_lang(&session.lang));
            }
        }
    }
}

/// Voice language for synthesis: the interface language when it is one of
/// ours, English otherwise.
pub fn speech_lang(lang: &str) -> &'static str {
    match lang {
        "ca" => "ca",
        "es" => "es",
        "fr" => "fr",
        _ => "en",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
        fn push(&self, entry: String) {
            self.0.lock().unwrap().push(entry);
        }
    }

    struct FakeSpeaker(Log);
    impl Speaker for FakeSpeaker {
        fn speak(&mut self, text: &str, lang: &str) {
            self.0.push(format!("speak:{lang}:{text}"));
        }
    }

    struct FakeSink(Log);
    impl AudioSink for FakeSink {
        fn play(&mut self, data_uri: &str) {
            self.0.push(format!("play:{data_uri}"));
        }
    }

    struct FakeHaptics(Log);
    impl Haptics for FakeHaptics {
        fn pulse(&mut self) {
            self.0.push("pulse".into());
        }
    }

    fn dispatcher(log: &Log) -> AlertDispatcher {
        AlertDispatcher::new(
            Box::new(FakeSpeaker(log.clone())),
            Box::new(FakeSink(log.clone())),
            Box::new(FakeHaptics(log.clone())),
        )
    }

    #[test]
    fn recording_takes_priority_over_speech() {
        let log = Log::default();
        let mut session = SessionState::default();
        session.use_recording = true;
        session
            .recordings
            .insert("START".into(), "data:audio/webm;base64,AAAA".into());

        dispatcher(&log).dispatch(AlertEvent::Start, &session);
        assert_eq!(
            log.entries(),
            vec!["pulse".to_string(), "play:data:audio/webm;base64,AAAA".to_string()]
        );
    }

    #[test]
    fn speech_when_recording_disabled() {
        let log = Log::default();
        let mut session = SessionState::default();
        session.use_recording = false;
        session
            .recordings
            .insert("START".into(), "data:audio/webm;base64,AAAA".into());
        session.alerts_text.insert("START".into(), "go".into());
        session.lang = "es".into();

        dispatcher(&log).dispatch(AlertEvent::Start, &session);
        assert_eq!(log.entries(), vec!["pulse".to_string(), "speak:es:go".to_string()]);
    }

    #[test]
    fn empty_text_and_no_recording_is_pulse_only() {
        let log = Log::default();
        let mut session = SessionState::default();
        session.alerts_text.insert("PAUSE".into(), String::new());
        session.recordings.clear();

        dispatcher(&log).dispatch(AlertEvent::Pause, &session);
        assert_eq!(log.entries(), vec!["pulse".to_string()]);
    }

    #[test]
    fn unknown_lang_falls_back_to_english_voice() {
        assert_eq!(speech_lang("de"), "en");
        assert_eq!(speech_lang("fr"), "fr");
    }
}
