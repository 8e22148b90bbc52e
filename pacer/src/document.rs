//! The configuration document: the versioned bundle a session exports,
//! imports and shares.
//!
//! Import is a non-destructive partial merge. Every top-level field is
//! optional; a present field overwrites the live state, an absent field
//! leaves it alone. A present field with the wrong shape fails the parse of
//! the whole document, so a malformed document never half-applies.

use crate::session::{Phase, SessionState, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const SCHEMA_VERSION: u32 = 2;

/// Default file name for exports, matching the original tool.
pub const DEFAULT_EXPORT_FILE: &str = "session-pacing-config.json";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("could not read configuration file: {0}")]
    Read(#[from] std::io::Error),

    #[error("not a valid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<Phase>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idx: Option<usize>,
    #[serde(rename = "alertsText", skip_serializing_if = "Option::is_none")]
    pub alerts_text: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recordings: Option<BTreeMap<String, String>>,
    #[serde(rename = "useRecording", skip_serializing_if = "Option::is_none")]
    pub use_recording: Option<bool>,
}

impl ConfigDocument {
    /// Full snapshot of a session, ready to export or share.
    pub fn from_session(session: &SessionState) -> Self {
        Self {
            version: Some(SCHEMA_VERSION),
            lang: Some(session.lang.clone()),
            theme: Some(session.theme),
            primary: Some(session.primary.clone()),
            accent: Some(session.accent.clone()),
            phases: Some(session.phases.clone()),
            idx: Some(session.idx),
            alerts_text: Some(session.alerts_text.clone()),
            recordings: Some(session.recordings.clone()),
            use_recording: Some(session.use_recording),
        }
    }

    pub fn from_str(raw: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        Self::from_str(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Single-line form handed to the share target.
    pub fn share_text(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Merge into live state: fields present here win, absent fields stay.
    ///
    /// The imported index is clamped into the imported phase list (or the
    /// existing one when the document carries no phases). A carried language
    /// re-applies that language's defaults afterwards, exactly like an
    /// interactive language switch.
    pub fn apply(&self, session: &mut SessionState) {
        if let Some(lang) = &self.lang {
            session.lang = lang.clone();
        }
        if let Some(theme) = self.theme {
            session.theme = theme;
        }
        if let Some(primary) = &self.primary {
            session.primary = primary.clone();
        }
        if let Some(accent) = &self.accent {
            session.accent = accent.clone();
        }
        if let Some(phases) = &self.phases {
            session.phases = phases.clone();
        }
        if let Some(idx) = self.idx {
            let len = self
                .phases
                .as_ref()
                .map(Vec::len)
                .unwrap_or(session.phases.len());
            session.idx = idx.min(len.saturating_sub(1));
        }
        if let Some(alerts_text) = &self.alerts_text {
            session.alerts_text = alerts_text.clone();
        }
        if let Some(recordings) = &self.recordings {
            session.recordings = recordings.clone();
        }
        if let Some(use_recording) = self.use_recording {
            session.use_recording = use_recording;
        }
        if self.lang.is_some() {
            session.apply_lang_defaults();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_only_import_changes_only_the_language() {
        let mut session = SessionState::default();
        session.running = true;
        session.remaining = 123;
        let mut expected = session.clone();

        ConfigDocument::from_str(r#"{"lang":"en"}"#)
            .unwrap()
            .apply(&mut session);

        expected.lang = "en".into();
        assert_eq!(session, expected);
    }

    #[test]
    fn round_trip_is_identity() {
        let mut session = SessionState::default();
        session.theme = Theme::Dark;
        session.idx = 1;
        session.remaining = 42;
        session
            .recordings
            .insert("TIMER_END".into(), "data:audio/webm;base64,AAAA".into());

        let doc = ConfigDocument::from_session(&session);
        let parsed = ConfigDocument::from_str(&doc.share_text().unwrap()).unwrap();

        let mut restored = session.clone();
        parsed.apply(&mut restored);
        assert_eq!(restored, session);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(ConfigDocument::from_str("not json").is_err());
        // Wrong shape on one field fails the whole document.
        assert!(ConfigDocument::from_str(r#"{"phases":"oops"}"#).is_err());
        assert!(ConfigDocument::from_str(r#"{"theme":"sepia"}"#).is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let doc = ConfigDocument::from_str(r#"{"lang":"fr","somethingElse":7}"#).unwrap();
        assert_eq!(doc.lang.as_deref(), Some("fr"));
    }

    #[test]
    fn imported_index_is_clamped_to_imported_phases() {
        let mut session = SessionState::default();
        let doc = ConfigDocument::from_str(
            r##"{"phases":[{"id":"a","title":"A","minutes":1,"color":"#fff000"}],"idx":5}"##,
        )
        .unwrap();
        doc.apply(&mut session);
        assert_eq!(session.idx, 0);
        assert_eq!(session.phases.len(), 1);
    }

    #[test]
    fn index_without_phases_clamps_to_existing_list() {
        let mut session = SessionState::default(); // two phases
        ConfigDocument::from_str(r#"{"idx":9}"#)
            .unwrap()
            .apply(&mut session);
        assert_eq!(session.idx, 1);
    }

    #[test]
    fn imported_lang_fills_missing_alert_keys() {
        let mut session = SessionState::default();
        let doc = ConfigDocument::from_str(
            r#"{"lang":"en","alertsText":{"START":"custom start"}}"#,
        )
        .unwrap();
        doc.apply(&mut session);
        assert_eq!(session.alerts_text.get("START").unwrap(), "custom start");
        assert_eq!(session.alerts_text.get("PAUSE").unwrap(), "Timer paused");
    }
}
