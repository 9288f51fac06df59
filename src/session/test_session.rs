use std::time::{Duration, Instant};

/// Where the page should go after an exit is confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Catalog,
}

/// Per-attempt lifecycle and countdown.
///
/// States are {NotStarted, Running} x {exit confirm shown}. Nothing is
/// terminal: `reset` and `confirm_exit_with` return to NotStarted with the full
/// duration so an attempt can be redone indefinitely.
#[derive(Clone, Debug)]
pub struct TestSession {
    duration_secs: u32,
    started: bool,
    time_left_secs: u32,
    show_exit_confirm: bool,
    /// Anchor of the armed countdown; `None` whenever the session is not running.
    countdown_anchor: Option<Instant>,
}

impl TestSession {
    pub fn new(duration_minutes: u32) -> Self {
        let duration_secs = duration_minutes.saturating_mul(60);
        Self {
            duration_secs,
            started: false,
            time_left_secs: duration_secs,
            show_exit_confirm: false,
            countdown_anchor: None,
        }
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn time_left_secs(&self) -> u32 {
        self.time_left_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_left_secs))
    }

    pub fn show_exit_confirm(&self) -> bool {
        self.show_exit_confirm
    }

    pub fn is_expired(&self) -> bool {
        self.started && self.time_left_secs == 0
    }

    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    pub fn begin_at(&mut self, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;
        self.countdown_anchor = Some(now);
        tracing::debug!(duration_secs = self.duration_secs, "session started");
    }

    /// One countdown step. Floors at zero and never changes state.
    pub fn tick(&mut self) {
        if !self.started {
            return;
        }
        self.time_left_secs = self.time_left_secs.saturating_sub(1);
        if self.time_left_secs == 0 {
            self.countdown_anchor = None;
        }
    }

    /// Apply every whole second elapsed since the countdown was last advanced.
    /// Returns the number of ticks applied.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(anchor) = self.countdown_anchor else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(anchor).as_secs();
        let ticks = u32::try_from(elapsed).unwrap_or(u32::MAX);
        let applied = ticks.min(self.time_left_secs);
        for _ in 0..applied {
            self.tick();
        }
        if let Some(anchor) = self.countdown_anchor.as_mut() {
            *anchor += Duration::from_secs(u64::from(ticks));
        }
        applied
    }

    pub fn request_exit(&mut self) {
        self.show_exit_confirm = true;
    }

    pub fn cancel_exit(&mut self) {
        self.show_exit_confirm = false;
    }

    /// Back to NotStarted with the full duration; used by redo.
    pub fn reset(&mut self) {
        self.started = false;
        self.time_left_secs = self.duration_secs;
        self.show_exit_confirm = false;
        self.countdown_anchor = None;
    }

    /// Reset, run the caller's cleanup (discard answers, recordings) and go
    /// back to the catalog.
    pub fn confirm_exit_with(&mut self, cleanup: impl FnOnce()) -> Navigation {
        self.reset();
        cleanup();
        tracing::debug!("session exited");
        Navigation::Catalog
    }

    pub fn elapsed_ratio(&self) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        1.0 - f64::from(self.time_left_secs) / f64::from(self.duration_secs)
    }

    /// `MM:SS` of the remaining time.
    pub fn format_clock(&self) -> String {
        format_clock(self.time_left_secs)
    }
}

pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle_with_full_time() {
        let session = TestSession::new(30);
        assert!(!session.started());
        assert_eq!(session.time_left_secs(), 1800);
        assert!(!session.show_exit_confirm());
    }

    #[test]
    fn ticks_only_while_running() {
        let mut session = TestSession::new(1);
        session.tick();
        assert_eq!(session.time_left_secs(), 60);
        session.begin();
        session.tick();
        assert_eq!(session.time_left_secs(), 59);
    }

    #[test]
    fn ticking_never_goes_negative() {
        for d in [0u32, 1, 59, 60, 61, 500] {
            let mut session = TestSession::new(1);
            session.begin();
            for _ in 0..d {
                session.tick();
            }
            assert_eq!(session.time_left_secs(), 60u32.saturating_sub(d));
        }
        let mut session = TestSession::new(1);
        session.begin();
        for _ in 0..120 {
            session.tick();
        }
        assert!(session.is_expired());
        assert!(session.started(), "reaching zero does not end the session");
    }

    #[test]
    fn begin_twice_is_noop() {
        let mut session = TestSession::new(2);
        let t0 = Instant::now();
        session.begin_at(t0);
        session.poll(t0 + Duration::from_secs(5));
        session.begin_at(t0 + Duration::from_secs(6));
        assert_eq!(session.time_left_secs(), 115);
    }

    #[test]
    fn poll_converts_wall_time_to_ticks() {
        let mut session = TestSession::new(1);
        let t0 = Instant::now();
        session.begin_at(t0);
        assert_eq!(session.poll(t0 + Duration::from_millis(900)), 0);
        assert_eq!(session.poll(t0 + Duration::from_millis(2100)), 2);
        assert_eq!(session.time_left_secs(), 58);
        // Remainder carries over to the next poll.
        assert_eq!(session.poll(t0 + Duration::from_millis(3000)), 1);
        assert_eq!(session.time_left_secs(), 57);
        session.poll(t0 + Duration::from_secs(600));
        assert_eq!(session.time_left_secs(), 0);
        assert_eq!(session.remaining(), Duration::ZERO);
        assert!(session.is_expired());
    }

    #[test]
    fn poll_is_inert_when_not_running() {
        let mut session = TestSession::new(1);
        assert_eq!(session.poll(Instant::now() + Duration::from_secs(10)), 0);
        assert_eq!(session.time_left_secs(), 60);
    }

    #[test]
    fn exit_prompt_does_not_stop_clock() {
        let mut session = TestSession::new(1);
        session.begin();
        session.request_exit();
        assert!(session.show_exit_confirm());
        session.tick();
        assert_eq!(session.time_left_secs(), 59);
        session.cancel_exit();
        assert!(!session.show_exit_confirm());
        assert!(session.started());
    }

    #[test]
    fn confirm_exit_restores_everything_and_runs_cleanup() {
        let mut session = TestSession::new(1);
        session.begin();
        for _ in 0..30 {
            session.tick();
        }
        session.request_exit();

        let mut cleaned = false;
        let nav = session.confirm_exit_with(|| cleaned = true);
        assert_eq!(nav, Navigation::Catalog);
        assert!(cleaned);
        assert!(!session.started());
        assert_eq!(session.time_left_secs(), 60);
        assert!(!session.show_exit_confirm());

        // Disarmed: time passing does nothing.
        assert_eq!(session.poll(Instant::now() + Duration::from_secs(30)), 0);
    }

    #[test]
    fn confirm_exit_from_idle_is_harmless() {
        let mut session = TestSession::new(14);
        session.confirm_exit_with(|| {});
        assert_eq!(session.time_left_secs(), 14 * 60);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(3600), "60:00");
    }
}
