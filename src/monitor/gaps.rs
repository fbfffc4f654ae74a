//! Synthetic gap injection
//!
//! Demo-only fault injection that pauses updates for a short hold after a
//! random delay, to exercise the no-updates alert path. The choice of gaps
//! lives behind [`GapStrategy`] so it can be switched off with [`NoGaps`]
//! without touching the monitor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::Instant;

/// When the next gap starts and how long it lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapPlan {
    /// Time from now until the pause starts
    pub delay: Duration,
    /// How long the pause is held
    pub hold: Duration,
}

/// Decides when synthetic gaps happen
pub trait GapStrategy: Send {
    /// Plan the next gap, or `None` for no more gaps
    fn next_gap(&mut self) -> Option<GapPlan>;
}

/// Never injects a gap
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGaps;

impl GapStrategy for NoGaps {
    fn next_gap(&mut self) -> Option<GapPlan> {
        None
    }
}

/// Gaps after a uniformly random delay, each held for a fixed time
#[derive(Debug, Clone)]
pub struct RandomGaps<R = StdRng> {
    min_delay: Duration,
    max_delay: Duration,
    hold: Duration,
    rng: R,
}

impl RandomGaps<StdRng> {
    /// Delay uniform in `[min_delay, max_delay)`, seeded from the OS
    pub fn new(min_delay: Duration, max_delay: Duration, hold: Duration) -> Self {
        Self::with_rng(min_delay, max_delay, hold, StdRng::from_entropy())
    }

    /// Same as [`RandomGaps::new`] with a fixed seed
    pub fn seeded(min_delay: Duration, max_delay: Duration, hold: Duration, seed: u64) -> Self {
        Self::with_rng(min_delay, max_delay, hold, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomGaps<R> {
    pub fn with_rng(min_delay: Duration, max_delay: Duration, hold: Duration, rng: R) -> Self {
        Self {
            min_delay,
            max_delay,
            hold,
            rng,
        }
    }
}

impl Default for RandomGaps<StdRng> {
    /// 5 to 15s between gaps, 3s hold
    fn default() -> Self {
        Self::new(
            Duration::from_secs(5),
            Duration::from_secs(15),
            Duration::from_secs(3),
        )
    }
}

impl<R: Rng + Send> GapStrategy for RandomGaps<R> {
    fn next_gap(&mut self) -> Option<GapPlan> {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        let delay_ms = if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        };

        Some(GapPlan {
            delay: Duration::from_millis(delay_ms),
            hold: self.hold,
        })
    }
}

/// Edge reported when the gap timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapTransition {
    /// The pause began
    Started,
    /// The pause ended and the next gap is scheduled
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GapState {
    /// The strategy has no more gaps
    Idle,
    Waiting { until: Instant, hold: Duration },
    Holding { until: Instant },
}

/// Two-state timer: wait for the planned delay, then hold the pause
pub struct GapTimer {
    strategy: Box<dyn GapStrategy>,
    state: GapState,
}

impl GapTimer {
    /// Create a timer and schedule the first gap from `now`
    pub fn new(strategy: Box<dyn GapStrategy>, now: Instant) -> Self {
        let mut timer = Self {
            strategy,
            state: GapState::Idle,
        };
        timer.schedule(now);
        timer
    }

    /// A timer that never fires
    pub fn disabled() -> Self {
        Self {
            strategy: Box::new(NoGaps),
            state: GapState::Idle,
        }
    }

    /// When the timer next needs attention
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            GapState::Idle => None,
            GapState::Waiting { until, .. } | GapState::Holding { until } => Some(until),
        }
    }

    /// Whether a gap is currently being held
    pub fn is_holding(&self) -> bool {
        matches!(self.state, GapState::Holding { .. })
    }

    /// Advance the state machine if its deadline has passed
    pub fn fire(&mut self, now: Instant) -> Option<GapTransition> {
        match self.state {
            GapState::Waiting { until, hold } if now >= until => {
                self.state = GapState::Holding { until: now + hold };
                tracing::info!(hold_ms = hold.as_millis() as u64, "Synthetic gap started");
                Some(GapTransition::Started)
            }
            GapState::Holding { until } if now >= until => {
                self.schedule(now);
                tracing::info!("Synthetic gap ended");
                Some(GapTransition::Ended)
            }
            _ => None,
        }
    }

    fn schedule(&mut self, now: Instant) {
        self.state = match self.strategy.next_gap() {
            Some(plan) => {
                tracing::debug!(delay_ms = plan.delay.as_millis() as u64, "Next synthetic gap scheduled");
                GapState::Waiting {
                    until: now + plan.delay,
                    hold: plan.hold,
                }
            }
            None => GapState::Idle,
        };
    }
}

impl std::fmt::Debug for GapTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GapTimer").field("state", &self.state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Duration, Duration);

    impl GapStrategy for Fixed {
        fn next_gap(&mut self) -> Option<GapPlan> {
            Some(GapPlan {
                delay: self.0,
                hold: self.1,
            })
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_random_delay_in_range() {
        let mut gaps = RandomGaps::seeded(secs(5), secs(15), secs(3), 17);
        for _ in 0..200 {
            let plan = gaps.next_gap().unwrap();
            assert!(plan.delay >= secs(5));
            assert!(plan.delay < secs(15));
            assert_eq!(plan.hold, secs(3));
        }
    }

    #[test]
    fn test_degenerate_range_uses_min() {
        let mut gaps = RandomGaps::seeded(secs(4), secs(4), secs(1), 0);
        assert_eq!(gaps.next_gap().unwrap().delay, secs(4));
    }

    #[test]
    fn test_timer_cycle() {
        let t0 = Instant::now();
        let mut timer = GapTimer::new(Box::new(Fixed(secs(5), secs(3))), t0);

        assert_eq!(timer.deadline(), Some(t0 + secs(5)));
        assert_eq!(timer.fire(t0 + secs(4)), None);

        assert_eq!(timer.fire(t0 + secs(5)), Some(GapTransition::Started));
        assert!(timer.is_holding());
        assert_eq!(timer.deadline(), Some(t0 + secs(8)));

        assert_eq!(timer.fire(t0 + secs(7)), None);
        assert_eq!(timer.fire(t0 + secs(8)), Some(GapTransition::Ended));
        assert!(!timer.is_holding());
        assert_eq!(timer.deadline(), Some(t0 + secs(13)));
    }

    #[test]
    fn test_no_gaps_never_fires() {
        let t0 = Instant::now();
        let mut timer = GapTimer::new(Box::new(NoGaps), t0);
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.fire(t0 + secs(3600)), None);

        let mut timer = GapTimer::disabled();
        assert_eq!(timer.fire(t0 + secs(3600)), None);
    }
}
