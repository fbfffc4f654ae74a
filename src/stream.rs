//! Stream Processor
//!
//! Secondary panel that keeps a short time window of incoming values,
//! reports their moving average, and logs an alert every time the average
//! leaves its bounds. Unlike the rate panel, bound alerts are not
//! de-duplicated: each breach is a new entry.

use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

use crate::monitor::{Alert, AlertBook, AlertKind};

/// Stream processor settings
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// How long a value stays in the averaging window
    pub window: Duration,
    /// Averages below this raise a low-bound alert
    pub lower_bound: f64,
    /// Averages above this raise a high-bound alert
    pub upper_bound: f64,
    pub max_alerts: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(1000),
            lower_bound: 0.0,
            upper_bound: 10_000.0,
            max_alerts: 5,
        }
    }
}

/// Values received within a trailing time window
#[derive(Debug, Clone)]
pub struct MessageWindow {
    entries: VecDeque<(f64, Instant)>,
    window: Duration,
}

impl MessageWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: VecDeque::new(),
            window,
        }
    }

    /// Drop values older than the window, then add `value`
    pub fn enqueue(&mut self, value: f64, now: Instant) {
        while let Some(&(_, at)) = self.entries.front() {
            if now.saturating_duration_since(at) <= self.window {
                break;
            }
            self.entries.pop_front();
        }
        self.entries.push_back((value, now));
    }

    /// Mean of the values in the window, or zero when empty
    pub fn average(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.entries.iter().map(|(v, _)| v).sum::<f64>() / self.entries.len() as f64
    }

    /// Values in arrival order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(v, _)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Moving-average monitor with bound alerts
#[derive(Debug, Clone)]
pub struct StreamProcessor {
    config: StreamConfig,
    window: MessageWindow,
    alerts: AlertBook,
    average: f64,
}

impl StreamProcessor {
    pub fn new(config: StreamConfig) -> Self {
        let window = MessageWindow::new(config.window);
        let alerts = AlertBook::new(config.max_alerts);
        Self {
            config,
            window,
            alerts,
            average: 0.0,
        }
    }

    /// Take in one value; returns the new average and any alert raised
    pub fn process(&mut self, value: f64, now: Instant) -> (f64, Option<Alert>) {
        self.window.enqueue(value, now);
        self.average = self.window.average();

        let kind = if self.average < self.config.lower_bound {
            Some(AlertKind::BelowBound)
        } else if self.average > self.config.upper_bound {
            Some(AlertKind::AboveBound)
        } else {
            None
        };

        let alert = kind.map(|kind| {
            tracing::debug!(%kind, average = self.average, "Stream average out of bounds");
            self.alerts.push(kind, format!("Value: {:.2}", self.average))
        });

        (self.average, alert)
    }

    /// Feed a uniformly random value in `[0, max_value)`
    pub fn process_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        max_value: f64,
        now: Instant,
    ) -> (f64, Option<Alert>) {
        let value = if max_value > 0.0 {
            rng.gen_range(0.0..max_value)
        } else {
            0.0
        };
        self.process(value, now)
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn window(&self) -> &MessageWindow {
        &self.window
    }

    /// Bound alerts, newest first
    pub fn alerts(&self) -> &[Alert] {
        self.alerts.alerts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_window_evicts_old_values() {
        let t0 = Instant::now();
        let mut window = MessageWindow::new(ms(1000));

        window.enqueue(10.0, t0);
        window.enqueue(20.0, t0 + ms(500));
        window.enqueue(30.0, t0 + ms(1000));
        assert_eq!(window.len(), 3);

        // 10.0 is now 1001ms old
        window.enqueue(40.0, t0 + ms(1001));
        assert_eq!(window.values().collect::<Vec<_>>(), vec![20.0, 30.0, 40.0]);
        assert!((window.average() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_average() {
        assert_eq!(MessageWindow::new(ms(1000)).average(), 0.0);
    }

    #[test]
    fn test_above_bound_alerts_accumulate() {
        let t0 = Instant::now();
        let mut processor = StreamProcessor::new(StreamConfig::default());

        let (avg, alert) = processor.process(5_000.0, t0);
        assert_eq!(avg, 5_000.0);
        assert!(alert.is_none());

        let (_, alert) = processor.process(20_000.0, t0 + ms(100));
        let alert = alert.unwrap();
        assert_eq!(alert.kind, AlertKind::AboveBound);
        assert_eq!(alert.message, "Value: 12500.00");

        processor.process(20_000.0, t0 + ms(200));
        assert_eq!(processor.alerts().len(), 2);
    }

    #[test]
    fn test_below_bound() {
        let config = StreamConfig {
            lower_bound: 100.0,
            ..StreamConfig::default()
        };
        let mut processor = StreamProcessor::new(config);
        let (_, alert) = processor.process(50.0, Instant::now());
        assert_eq!(alert.unwrap().kind, AlertKind::BelowBound);
    }

    #[test]
    fn test_alert_cap() {
        let t0 = Instant::now();
        let mut processor = StreamProcessor::new(StreamConfig::default());
        for i in 0..50 {
            processor.process(50_000.0, t0 + ms(i * 100));
        }
        assert_eq!(processor.alerts().len(), 5);
    }

    #[test]
    fn test_random_values_in_range() {
        let t0 = Instant::now();
        let mut rng = StdRng::seed_from_u64(5);
        let mut processor = StreamProcessor::new(StreamConfig::default());
        for i in 0..20 {
            processor.process_random(&mut rng, 15_000.0, t0 + ms(i * 100));
        }
        assert!(processor.window().values().all(|v| (0.0..15_000.0).contains(&v)));
    }
}
