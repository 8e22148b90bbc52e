//! Session state: the phase list, the countdown, the alert registry and the
//! interface preferences, all in one aggregate.
//!
//! The countdown is a plain state machine - no internal thread. The caller
//! owns the one-second cadence and calls [`SessionState::tick`] while
//! `running` is true. Operations return the [`AlertEvent`]s they fired so the
//! caller can hand them to the dispatcher and persist what changed.

use crate::alerts::AlertEvent;
use crate::langs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PREP_MIN: u32 = 5;
pub const DEFAULT_ACTIVE_MIN: u32 = 60;

/// Upper bound for a phase duration entered by hand.
pub const MAX_PHASE_MIN: u32 = 600;

/// One named, colored step of the cycle. Identity is `id`, stable across
/// reorder and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub title: String,
    pub minutes: u32,
    pub color: String,
}

impl Phase {
    pub fn new(title: impl Into<String>, minutes: u32, color: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            minutes,
            color: color.into(),
        }
    }

    /// Full duration in seconds. Zero configured minutes counts as one, so a
    /// phase can never cycle instantly.
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.minutes.max(1)) * 60
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Everything one running instance owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub lang: String,
    pub theme: Theme,
    pub primary: String,
    pub accent: String,
    pub phases: Vec<Phase>,
    /// Index of the current phase. Out-of-range values are defended at the
    /// read boundary, never panicked on.
    pub idx: usize,
    /// Seconds left in the current interval.
    pub remaining: u64,
    pub running: bool,
    /// Alert text per event key. Every key is populated after the init merge.
    pub alerts_text: BTreeMap<String, String>,
    /// Recorded alert per event key, as a base64 `data:audio/webm` URI.
    pub recordings: BTreeMap<String, String>,
    pub use_recording: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        let pack = langs::pack("ca");
        let phases = pack.default_cycle();
        let remaining = phases[0].duration_secs();
        Self {
            lang: "ca".into(),
            theme: Theme::Light,
            primary: "#0f172a".into(),
            accent: "#10b981".into(),
            phases,
            idx: 0,
            remaining,
            running: false,
            alerts_text: pack.default_alerts(),
            recordings: BTreeMap::new(),
            use_recording: true,
        }
    }
}

impl SessionState {
    // ── Queries ──────────────────────────────────────────────────────

    /// Current phase, falling back to the first phase when `idx` is stale.
    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.get(self.idx).or_else(|| self.phases.first())
    }

    /// Full duration of the current interval; one minute when there is no
    /// usable phase.
    pub fn total_secs(&self) -> u64 {
        self.current_phase().map(Phase::duration_secs).unwrap_or(60)
    }

    /// 0.0 .. 1.0 fraction of the current interval already elapsed.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs().max(1) as f64;
        (1.0 - self.remaining as f64 / total).clamp(0.0, 1.0)
    }

    // ── Countdown ────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<AlertEvent> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(AlertEvent::Start)
    }

    pub fn pause(&mut self) -> Option<AlertEvent> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(AlertEvent::Pause)
    }

    /// One wall-clock second elapsed. Counts down while running; at zero the
    /// interval completes and the cycle advances to the next phase's full
    /// duration.
    pub fn tick(&mut self) -> Option<AlertEvent> {
        if !self.running {
            return None;
        }
        let next = self.remaining.saturating_sub(1);
        if next == 0 {
            self.advance();
            Some(AlertEvent::TimerEnd)
        } else {
            self.remaining = next;
            None
        }
    }

    /// Restore the current phase's full duration and stop. Fires regardless
    /// of whether the countdown was running.
    pub fn reset(&mut self) -> AlertEvent {
        self.running = false;
        self.remaining = self.total_secs();
        AlertEvent::Reset
    }

    /// Ten more minutes in the current interval. No upper bound.
    pub fn add_ten(&mut self) -> AlertEvent {
        self.remaining += 600;
        AlertEvent::AddTen
    }

    /// Manual advance to the next phase; leaves `running` alone.
    pub fn switch_phase(&mut self) -> AlertEvent {
        self.advance();
        AlertEvent::PhaseChange
    }

    /// Stop, then advance. Composed of the stop and the manual advance, so
    /// both the phase-change and the skip alerts fire, in that order.
    pub fn skip_to_next(&mut self) -> [AlertEvent; 2] {
        self.running = false;
        self.advance();
        [AlertEvent::PhaseChange, AlertEvent::SkipToNext]
    }

    fn advance(&mut self) {
        self.idx = if self.phases.is_empty() {
            0
        } else {
            (self.idx + 1) % self.phases.len()
        };
        self.remaining = self.total_secs();
    }

    // ── Phase list ───────────────────────────────────────────────────

    pub fn update_phase(&mut self, i: usize, edit: impl FnOnce(&mut Phase)) {
        if let Some(phase) = self.phases.get_mut(i) {
            edit(phase);
        }
    }

    pub fn add_phase(&mut self, title: impl Into<String>) {
        self.phases.push(Phase::new(title, 10, "#64748b"));
    }

    /// Remove a phase. Refused while only one remains; the countdown is left
    /// alone except for clamping a now-stale index back to zero.
    pub fn remove_phase(&mut self, i: usize) -> bool {
        if self.phases.len() <= 1 || i >= self.phases.len() {
            return false;
        }
        self.phases.remove(i);
        if self.idx >= self.phases.len() {
            self.idx = 0;
        }
        true
    }

    /// Swap a phase with its neighbor. The current index follows the swap so
    /// the running countdown stays attached to the same phase.
    pub fn move_phase(&mut self, i: usize, dir: isize) -> bool {
        let Some(j) = i.checked_add_signed(dir) else {
            return false;
        };
        if i >= self.phases.len() || j >= self.phases.len() {
            return false;
        }
        self.phases.swap(i, j);
        if self.idx == i {
            self.idx = j;
        } else if self.idx == j {
            self.idx = i;
        }
        true
    }

    // ── Language ─────────────────────────────────────────────────────

    /// Switch the interface language and re-apply its defaults: the phase
    /// list only when empty, alert texts only under keys the user never set.
    pub fn set_lang(&mut self, code: impl Into<String>) {
        self.lang = code.into();
        self.apply_lang_defaults();
    }

    /// The initialization merge. Idempotent; also run at startup and after an
    /// import that carried a language.
    pub fn apply_lang_defaults(&mut self) {
        let pack = langs::pack(&self.lang);
        if self.phases.is_empty() {
            self.phases = pack.default_cycle();
        }
        for (key, text) in pack.default_alerts() {
            self.alerts_text.entry(key).or_insert(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_phase_session() -> SessionState {
        let mut s = SessionState::default();
        s.phases = vec![
            Phase {
                id: "prep".into(),
                title: "Prep".into(),
                minutes: 5,
                color: "#f59e0b".into(),
            },
            Phase {
                id: "active".into(),
                title: "Active".into(),
                minutes: 60,
                color: "#10b981".into(),
            },
        ];
        s.idx = 0;
        s.remaining = 300;
        s
    }

    #[test]
    fn prep_completes_after_exactly_its_duration() {
        let mut s = two_phase_session();
        s.running = true;
        let mut completions = vec![];
        for tick in 1..=300u32 {
            if let Some(event) = s.tick() {
                completions.push((tick, event));
            }
        }
        assert_eq!(completions, vec![(300, AlertEvent::TimerEnd)]);
        assert_eq!(s.idx, 1);
        assert_eq!(s.remaining, 3600);
        assert!(s.running);
    }

    #[test]
    fn tick_does_nothing_while_idle() {
        let mut s = two_phase_session();
        assert_eq!(s.tick(), None);
        assert_eq!(s.remaining, 300);
    }

    #[test]
    fn reset_restores_full_duration_and_stops() {
        let mut s = two_phase_session();
        s.running = true;
        s.remaining = 17;
        assert_eq!(s.reset(), AlertEvent::Reset);
        assert_eq!(s.remaining, 300);
        assert!(!s.running);

        // Fires from idle too.
        assert_eq!(s.reset(), AlertEvent::Reset);
    }

    #[test]
    fn add_ten_only_touches_remaining() {
        let mut s = two_phase_session();
        s.running = true;
        assert_eq!(s.add_ten(), AlertEvent::AddTen);
        assert_eq!(s.remaining, 900);
        assert_eq!(s.idx, 0);
        assert!(s.running);
    }

    #[test]
    fn skip_stops_advances_and_fires_both_alerts() {
        let mut s = two_phase_session();
        s.running = true;
        let events = s.skip_to_next();
        assert_eq!(events, [AlertEvent::PhaseChange, AlertEvent::SkipToNext]);
        assert!(!s.running);
        assert_eq!(s.idx, 1);
        assert_eq!(s.remaining, 3600);
    }

    #[test]
    fn switch_phase_keeps_running_flag() {
        let mut s = two_phase_session();
        s.running = true;
        assert_eq!(s.switch_phase(), AlertEvent::PhaseChange);
        assert!(s.running);
        assert_eq!(s.idx, 1);
    }

    #[test]
    fn zero_minute_phase_counts_as_one_minute() {
        let mut s = two_phase_session();
        s.phases[1].minutes = 0;
        s.running = true;
        s.remaining = 1;
        assert_eq!(s.tick(), Some(AlertEvent::TimerEnd));
        assert_eq!(s.remaining, 60);
    }

    #[test]
    fn stale_index_falls_back_to_first_phase() {
        let mut s = two_phase_session();
        s.idx = 9;
        assert_eq!(s.current_phase().unwrap().id, "prep");
        assert_eq!(s.total_secs(), 300);
    }

    #[test]
    fn empty_list_never_divides_by_zero() {
        let mut s = two_phase_session();
        s.phases.clear();
        s.remaining = 0;
        assert_eq!(s.total_secs(), 60);
        assert!(s.progress() >= 0.0);
        s.running = true;
        s.tick();
        assert_eq!(s.idx, 0);
        assert_eq!(s.remaining, 60);
    }

    #[test]
    fn last_phase_cannot_be_removed() {
        let mut s = two_phase_session();
        assert!(s.remove_phase(0));
        assert_eq!(s.phases.len(), 1);
        assert!(!s.remove_phase(0));
        assert_eq!(s.phases.len(), 1);
    }

    #[test]
    fn removing_later_phase_leaves_countdown_alone() {
        let mut s = two_phase_session();
        s.running = true;
        s.remaining = 120;
        assert!(s.remove_phase(1));
        assert_eq!(s.idx, 0);
        assert_eq!(s.remaining, 120);
        assert!(s.running);
    }

    #[test]
    fn removing_last_slot_clamps_index_to_zero() {
        let mut s = two_phase_session();
        s.idx = 1;
        assert!(s.remove_phase(1));
        assert_eq!(s.idx, 0);
    }

    #[test]
    fn move_keeps_current_phase_current() {
        let mut s = two_phase_session();
        s.idx = 0;
        assert!(s.move_phase(0, 1));
        assert_eq!(s.idx, 1);
        assert_eq!(s.current_phase().unwrap().id, "prep");
        assert!(!s.move_phase(1, 1)); // off the end
    }

    #[test]
    fn lang_switch_preserves_user_edited_alert_text() {
        let mut s = SessionState::default();
        s.alerts_text
            .insert("START".into(), "my own words".into());
        s.alerts_text.remove("PAUSE");
        s.set_lang("en");
        assert_eq!(s.alerts_text.get("START").unwrap(), "my own words");
        assert_eq!(s.alerts_text.get("PAUSE").unwrap(), "Timer paused");
    }

    #[test]
    fn lang_switch_keeps_existing_phases() {
        let mut s = two_phase_session();
        let before = s.phases.clone();
        s.set_lang("fr");
        assert_eq!(s.phases, before);

        s.phases.clear();
        s.set_lang("fr");
        assert_eq!(s.phases[0].title, "Préparation");
    }

    proptest! {
        /// Ticking each phase for exactly its duration walks the indices
        /// 0,1,..,N-1,0,.. in order, never skipping or repeating.
        #[test]
        fn cycle_visits_phases_in_order(
            minutes in proptest::collection::vec(0u32..4, 1..6),
            start_idx in 0usize..6,
            laps in 1usize..3,
        ) {
            let mut s = SessionState::default();
            s.phases = minutes
                .iter()
                .enumerate()
                .map(|(i, &m)| Phase {
                    id: format!("p{i}"),
                    title: format!("Phase {i}"),
                    minutes: m,
                    color: "#64748b".into(),
                })
                .collect();
            let n = s.phases.len();
            s.idx = start_idx % n;
            s.remaining = s.total_secs();
            s.running = true;

            let mut visited = vec![];
            for _ in 0..n * laps {
                let duration = s.total_secs();
                for t in 0..duration {
                    let fired = s.tick().is_some();
                    prop_assert_eq!(fired, t == duration - 1);
                }
                visited.push(s.idx);
            }

            let mut expected = vec![];
            let mut at = start_idx % n;
            for _ in 0..n * laps {
                at = (at + 1) % n;
                expected.push(at);
            }
            prop_assert_eq!(visited, expected);
        }
    }
}
