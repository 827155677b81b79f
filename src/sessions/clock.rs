use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

/// Pure countdown state for one relaxation session. Elapsed time is
/// tracked against a monotonic anchor while running so wall-clock
/// adjustments cannot corrupt the remaining time. Serialized one-way
/// into snapshot events; never read back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClock {
    pub phase: SessionPhase,
    pub plan_id: Option<String>,
    pub target_ms: u64,
    pub active_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
    /// Time accumulated from earlier running windows; combines with
    /// `running_anchor` to compute the true active duration.
    #[serde(skip)]
    active_ms_baseline: u64,
    #[serde(skip)]
    running_anchor: Option<Instant>,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            plan_id: None,
            target_ms: 0,
            active_ms: 0,
            started_at: None,
            active_ms_baseline: 0,
            running_anchor: None,
        }
    }
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_active_ms(&self) -> u64 {
        if let (SessionPhase::Running, Some(anchor)) = (self.phase, self.running_anchor) {
            self.active_ms_baseline
                .saturating_add(anchor.elapsed().as_millis() as u64)
        } else {
            self.active_ms
        }
    }

    pub fn remaining_ms(&self) -> i64 {
        match self.phase {
            SessionPhase::Idle => 0,
            SessionPhase::Running | SessionPhase::Paused => {
                let remaining = self.target_ms as i64 - self.current_active_ms() as i64;
                cmp::max(remaining, 0)
            }
        }
    }

    pub fn sync_active_from_anchor(&mut self) {
        if let (SessionPhase::Running, Some(anchor)) = (self.phase, self.running_anchor) {
            self.active_ms = self
                .active_ms_baseline
                .saturating_add(anchor.elapsed().as_millis() as u64);
        }
    }

    pub fn start(
        &mut self,
        plan_id: String,
        target_ms: u64,
        start_at: DateTime<Utc>,
        now: Instant,
    ) {
        *self = Self {
            phase: SessionPhase::Running,
            plan_id: Some(plan_id),
            target_ms,
            active_ms: 0,
            started_at: Some(start_at),
            active_ms_baseline: 0,
            running_anchor: Some(now),
        };
    }

    /// Freeze the countdown. No-op unless running.
    pub fn pause(&mut self) {
        if self.phase != SessionPhase::Running {
            return;
        }
        self.sync_active_from_anchor();
        self.phase = SessionPhase::Paused;
        self.running_anchor = None;
        self.active_ms_baseline = self.active_ms;
    }

    /// Continue a paused countdown. No-op unless paused.
    pub fn resume(&mut self, now: Instant) {
        if self.phase != SessionPhase::Paused {
            return;
        }
        self.phase = SessionPhase::Running;
        self.running_anchor = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn started(target_ms: u64) -> SessionClock {
        let mut clock = SessionClock::new();
        clock.start("plan".into(), target_ms, Utc::now(), Instant::now());
        clock
    }

    #[test]
    fn idle_clock_has_nothing_remaining() {
        let clock = SessionClock::new();
        assert_eq!(clock.phase, SessionPhase::Idle);
        assert_eq!(clock.remaining_ms(), 0);
    }

    #[test]
    fn start_arms_the_countdown() {
        let clock = started(600_000);
        assert_eq!(clock.phase, SessionPhase::Running);
        assert!(clock.remaining_ms() <= 600_000);
        assert!(clock.remaining_ms() > 590_000);
    }

    #[test]
    fn pause_freezes_active_time() {
        let mut clock = started(600_000);
        clock.pause();
        assert_eq!(clock.phase, SessionPhase::Paused);
        let frozen = clock.current_active_ms();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.current_active_ms(), frozen);
    }

    #[test]
    fn resume_accumulates_on_top_of_paused_time() {
        let mut clock = started(600_000);
        std::thread::sleep(Duration::from_millis(10));
        clock.pause();
        let at_pause = clock.current_active_ms();

        clock.resume(Instant::now());
        std::thread::sleep(Duration::from_millis(10));
        clock.sync_active_from_anchor();
        assert!(clock.current_active_ms() >= at_pause + 10);
    }

    #[test]
    fn pause_and_resume_ignore_wrong_phases() {
        let mut clock = SessionClock::new();
        clock.pause();
        assert_eq!(clock.phase, SessionPhase::Idle);
        clock.resume(Instant::now());
        assert_eq!(clock.phase, SessionPhase::Idle);

        let mut running = started(1_000);
        running.resume(Instant::now());
        assert_eq!(running.phase, SessionPhase::Running);
    }

    #[test]
    fn remaining_never_goes_negative() {
        let mut clock = started(1);
        std::thread::sleep(Duration::from_millis(5));
        clock.sync_active_from_anchor();
        assert_eq!(clock.remaining_ms(), 0);
    }

    #[test]
    fn serializes_without_the_anchor_fields() {
        let clock = started(600_000);
        let json = serde_json::to_value(&clock).expect("serialize clock");
        assert_eq!(json["phase"], "running");
        assert_eq!(json["targetMs"], 600_000);
        assert!(json.get("runningAnchor").is_none());
        assert!(json.get("activeMsBaseline").is_none());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut clock = started(600_000);
        clock.reset();
        assert_eq!(clock.phase, SessionPhase::Idle);
        assert!(clock.plan_id.is_none());
    }
}
