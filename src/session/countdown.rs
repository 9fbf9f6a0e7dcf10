use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::domain::types::{ClockPhase, FinalizeMode};
use crate::session::{FinalizeOutcome, Session};

/// Remaining-time state for one session. Seconds only; decremented by the
/// tick task, frozen while a finalization attempt is in flight. The expiry
/// transition is a one-shot: however many catch-up ticks arrive at zero,
/// exactly one of them observes the edge.
#[derive(Debug)]
pub struct Countdown {
    total_seconds: u32,
    remaining: AtomicU32,
    expiry_emitted: AtomicBool,
    frozen: AtomicBool,
}

impl Countdown {
    pub(crate) fn started(total_seconds: u32) -> Self {
        Self {
            total_seconds,
            remaining: AtomicU32::new(total_seconds),
            expiry_emitted: AtomicBool::new(false),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining_seconds()
    }

    pub fn phase(&self) -> ClockPhase {
        if self.remaining_seconds() == 0 {
            ClockPhase::Expired
        } else {
            ClockPhase::Running
        }
    }

    /// Advance one second. Returns true exactly once: on the tick that
    /// takes the clock to zero (or first observes it there).
    pub(crate) fn tick(&self) -> bool {
        if self.frozen.load(Ordering::Acquire) {
            return false;
        }

        let _ = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| value.checked_sub(1));

        if self.remaining.load(Ordering::Acquire) == 0 {
            return !self.expiry_emitted.swap(true, Ordering::AcqRel);
        }
        false
    }

    pub(crate) fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub(crate) fn resume(&self) {
        self.frozen.store(false, Ordering::Release);
    }
}

/// Background timer for one session, in the same shape as the other
/// long-running engine tasks: a fixed interval raced against a shutdown
/// watch. Exits once the session stops ticking for any reason.
pub(crate) async fn run_clock(session: Arc<Session>, mut shutdown: watch::Receiver<bool>) {
    let period = Duration::from_secs(1);
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                if session.clock().tick() {
                    match session.finalize(FinalizeMode::AutoDeadline).await {
                        Ok(FinalizeOutcome::Completed(result)) => {
                            tracing::info!(
                                session_id = %session.id(),
                                correct_answers = result.correct_answers,
                                "Deadline reached, execution recorded"
                            );
                        }
                        Ok(FinalizeOutcome::Superseded) => {}
                        Err(err) => {
                            tracing::error!(
                                session_id = %session.id(),
                                error = %err,
                                "Deadline finalization failed"
                            );
                        }
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_down_and_emits_expiry_once() {
        let clock = Countdown::started(3);
        assert!(!clock.tick());
        assert!(!clock.tick());
        assert_eq!(clock.remaining_seconds(), 1);

        assert!(clock.tick());
        assert_eq!(clock.phase(), ClockPhase::Expired);

        // Catch-up burst after a stall: no second edge.
        assert!(!clock.tick());
        assert!(!clock.tick());
        assert_eq!(clock.remaining_seconds(), 0);
    }

    #[test]
    fn frozen_clock_ignores_ticks() {
        let clock = Countdown::started(2);
        clock.freeze();
        assert!(!clock.tick());
        assert!(!clock.tick());
        assert!(!clock.tick());
        assert_eq!(clock.remaining_seconds(), 2);

        clock.resume();
        assert!(!clock.tick());
        assert!(clock.tick());
    }

    #[test]
    fn elapsed_tracks_consumed_time() {
        let clock = Countdown::started(10);
        clock.tick();
        clock.tick();
        clock.tick();
        assert_eq!(clock.elapsed_seconds(), 3);
        assert_eq!(clock.remaining_seconds(), 7);
    }
}
