//! Dashboard driver
//!
//! One task owns every piece of mutable dashboard state and drives it from a
//! single `select!` loop: the frame tick, the monitor tick, the gap timer,
//! the stream tick and the command inbox. The render loop's counter is
//! flushed immediately before each monitor tick, so aggregation and alert
//! evaluation always run in phase.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, sleep_until, Instant, MissedTickBehavior};

use super::error::{DashboardError, DashboardResult};
use super::state::{DashboardSnapshot, PauseState};
use crate::config::Config;
use crate::dataset::DatasetCycler;
use crate::events::{Command, DashboardEvent, PauseSource, UpdateEmitter};
use crate::grid::{GridSink, GridState, VisibleRangeTracker};
use crate::monitor::{
    AlertAction, GapStrategy, GapTimer, GapTransition, NoGaps, RandomGaps, RateMonitor,
};
use crate::render::{FrameOutcome, RenderLoop, Suppression};
use crate::stream::StreamProcessor;

/// Capacity of the outbound event channel
const EVENT_CAPACITY: usize = 256;

struct StreamRuntime {
    processor: StreamProcessor,
    rng: StdRng,
    max_value: f64,
    interval: Duration,
}

/// The dashboard engine, before it is spawned
pub struct Dashboard<G: GridSink> {
    config: Config,
    grid: G,
    emitter: UpdateEmitter,
    render: RenderLoop,
    monitor: RateMonitor,
    tracker: VisibleRangeTracker,
    grid_state: GridState,
    pause: PauseState,
    gaps: GapTimer,
    stream: Option<StreamRuntime>,
    events: broadcast::Sender<DashboardEvent>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
}

impl<G: GridSink> Dashboard<G> {
    /// Build a dashboard driving `grid`
    pub fn new(config: Config, grid: G) -> DashboardResult<Self> {
        config.validate()?;

        let now = Instant::now();
        let seed = config.data.seed;

        let cycler = match seed {
            Some(seed) => DatasetCycler::with_seed(
                config.data.dataset_count,
                config.data.rows_per_dataset,
                seed,
            ),
            None => DatasetCycler::synthetic(
                config.data.dataset_count,
                config.data.rows_per_dataset,
            ),
        };

        let monitor_config = config.monitor.monitor_config();
        let render = RenderLoop::new(
            config.render.render_config(monitor_config.interval),
            cycler,
            now,
        );

        let emitter = UpdateEmitter::new();
        let mut monitor = RateMonitor::new(monitor_config, now);
        monitor.attach(&emitter);

        let gaps = GapTimer::new(gap_strategy(&config), now);

        let stream = config.stream.enabled.then(|| StreamRuntime {
            processor: StreamProcessor::new(config.stream.stream_config()),
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(2)),
                None => StdRng::from_entropy(),
            },
            max_value: config.stream.max_value,
            interval: Duration::from_millis(config.stream.interval_ms),
        });

        let tracker = VisibleRangeTracker::new(config.render.visible_range());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (snapshot_tx, _) = watch::channel(DashboardSnapshot::default());

        Ok(Self {
            config,
            grid,
            emitter,
            render,
            monitor,
            tracker,
            grid_state: GridState::default(),
            pause: PauseState::default(),
            gaps,
            stream,
            events,
            snapshot_tx,
        })
    }

    /// Replace the gap strategy, rescheduling from now
    pub fn with_gap_strategy(mut self, strategy: Box<dyn GapStrategy>) -> Self {
        self.gaps = GapTimer::new(strategy, Instant::now());
        self
    }

    /// Receive events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// The emitter carrying update counts from the render loop
    pub fn emitter(&self) -> &UpdateEmitter {
        &self.emitter
    }

    /// The grid being driven
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Start the driver task
    pub fn spawn(self) -> DashboardHandle<G> {
        let (commands, inbox) = mpsc::unbounded_channel();
        let events = self.events.clone();
        let snapshot = self.snapshot_tx.subscribe();
        let task = tokio::spawn(self.run(inbox));

        DashboardHandle {
            commands,
            events,
            snapshot,
            task,
        }
    }

    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) -> G {
        let start = Instant::now();
        let monitor_period = self.monitor.config().interval;

        let mut frame_ticker = interval(self.config.render.tick_interval());
        frame_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut monitor_ticker = interval_at(start + monitor_period, monitor_period);
        monitor_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let stream_period = self
            .stream
            .as_ref()
            .map(|s| s.interval)
            .unwrap_or(monitor_period);
        let mut stream_ticker = interval_at(start + stream_period, stream_period);
        stream_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.monitor.reset(start);
        self.render.prime(&mut self.grid);
        self.publish_snapshot();

        tracing::info!(
            frame_interval_ms = self.config.render.frame_interval_ms,
            monitor_interval_ms = self.config.monitor.interval_ms,
            gaps = self.config.gaps.enabled,
            stream = self.stream.is_some(),
            "Dashboard started"
        );

        loop {
            let gap_deadline = self.gaps.deadline();

            tokio::select! {
                now = frame_ticker.tick() => {
                    self.on_frame_tick(now);
                }
                now = monitor_ticker.tick() => {
                    self.on_monitor_tick(now);
                }
                now = stream_ticker.tick(), if self.stream.is_some() => {
                    self.on_stream_tick(now);
                }
                _ = sleep_until(gap_deadline.unwrap_or(start)), if gap_deadline.is_some() => {
                    self.on_gap_deadline(Instant::now());
                }
                command = inbox.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
            }
        }

        self.monitor.detach();
        self.publish_snapshot();

        let stats = self.render.stats();
        tracing::info!(
            frames = stats.frames_rendered,
            rows_applied = stats.rows_applied,
            "Dashboard stopped"
        );

        self.grid
    }

    /// Run one scheduling tick of the render loop
    pub fn on_frame_tick(&mut self, now: Instant) -> FrameOutcome {
        let suppression = Suppression {
            paused: self.pause.is_paused(),
            grid: self.grid_state,
        };
        self.render
            .tick(now, suppression, self.tracker.range(), &mut self.grid)
    }

    /// Flush the frame counter, then evaluate rate and alerts
    pub fn on_monitor_tick(&mut self, now: Instant) {
        let flushed = self.render.flush(now, &self.emitter);

        if let Some(tick) = self.monitor.tick(now) {
            tracing::info!(
                rate = tick.sample.rate.round(),
                flushed,
                paused = tick.sample.paused,
                latency_ms = self.render.average_latency().as_secs_f64() * 1000.0,
                "Rate sample"
            );

            self.publish(DashboardEvent::RateSample(tick.sample));
            match tick.action {
                AlertAction::Raised(alert) => self.publish(DashboardEvent::AlertRaised { alert }),
                AlertAction::Cleared(kind) => self.publish(DashboardEvent::AlertCleared { kind }),
                AlertAction::Unchanged => {}
            }
        }

        self.publish_snapshot();
    }

    /// Advance the gap timer and apply any pause edge
    pub fn on_gap_deadline(&mut self, now: Instant) {
        match self.gaps.fire(now) {
            Some(GapTransition::Started) => self.set_paused(PauseSource::Gap, true),
            Some(GapTransition::Ended) => self.set_paused(PauseSource::Gap, false),
            None => {}
        }
    }

    /// Feed the stream panel one synthetic value
    pub fn on_stream_tick(&mut self, now: Instant) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };

        let (average, alert) = stream
            .processor
            .process_random(&mut stream.rng, stream.max_value, now);

        self.publish(DashboardEvent::StreamAverage { average });
        if let Some(alert) = alert {
            self.publish(DashboardEvent::AlertRaised { alert });
        }
    }

    /// Apply a command from the widget or controls
    pub fn handle_command(&mut self, command: Command) {
        tracing::debug!(?command, "Dashboard command");

        match command {
            Command::TogglePause => {
                let paused = !self.pause.user;
                self.set_paused(PauseSource::User, paused);
            }
            Command::SetPaused { paused } => self.set_paused(PauseSource::User, paused),
            Command::ViewportChanged { first, last } => {
                self.tracker.on_viewport_changed(first, last);
            }
            Command::FilterOpened => self.grid_state.filter_open = true,
            Command::FilterClosed => self.grid_state.filter_open = false,
            Command::CellEditStarted => self.grid_state.cell_editing = true,
            Command::CellEditStopped => self.grid_state.cell_editing = false,
            Command::Shutdown => {}
        }
    }

    fn set_paused(&mut self, source: PauseSource, paused: bool) {
        if !self.pause.set(source, paused) {
            return;
        }

        let effective = self.pause.is_paused();
        self.monitor.set_paused(effective);
        tracing::info!(paused = effective, ?source, "Updates {}", if effective { "paused" } else { "resumed" });

        self.publish(DashboardEvent::PauseChanged {
            paused: effective,
            source,
        });
        self.publish_snapshot();
    }

    /// Current state of every panel
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            current_rate: self.monitor.current_rate(),
            paused: self.pause.is_paused(),
            pause: self.pause,
            samples: self.monitor.samples().iter().cloned().collect(),
            alerts: self.monitor.alerts().to_vec(),
            stream_average: self.stream.as_ref().map(|s| s.processor.average()),
            stream_alerts: self
                .stream
                .as_ref()
                .map(|s| s.processor.alerts().to_vec())
                .unwrap_or_default(),
            average_latency_ms: self.render.average_latency().as_secs_f64() * 1000.0,
            render: self.render.stats(),
            visible: self.tracker.range(),
        }
    }

    fn publish(&self, event: DashboardEvent) {
        tracing::trace!(event = event.name(), "Publishing dashboard event");
        // No receivers is fine: nobody is watching the panel
        let _ = self.events.send(event);
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

fn gap_strategy(config: &Config) -> Box<dyn GapStrategy> {
    if !config.gaps.enabled {
        return Box::new(NoGaps);
    }

    let min = Duration::from_millis(config.gaps.min_delay_ms);
    let max = Duration::from_millis(config.gaps.max_delay_ms);
    let hold = Duration::from_millis(config.gaps.hold_ms);

    match config.data.seed {
        Some(seed) => Box::new(RandomGaps::seeded(min, max, hold, seed.wrapping_add(1))),
        None => Box::new(RandomGaps::new(min, max, hold)),
    }
}

/// Handle to a running dashboard
pub struct DashboardHandle<G> {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<DashboardEvent>,
    snapshot: watch::Receiver<DashboardSnapshot>,
    task: JoinHandle<G>,
}

impl<G> DashboardHandle<G> {
    /// Send a command to the driver
    pub fn send(&self, command: Command) -> DashboardResult<()> {
        self.commands
            .send(command)
            .map_err(|_| DashboardError::ChannelClosed)
    }

    /// Receive events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch channel that updates whenever a snapshot is published
    pub fn watch(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the driver and hand back the grid
    pub async fn shutdown(self) -> DashboardResult<G> {
        // Already stopped if the send fails; the join below reports why
        let _ = self.commands.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| DashboardError::TaskFailed(e.to_string()))
    }
}
