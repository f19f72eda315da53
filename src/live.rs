//! The live update loop.
//!
//! One task owns the [`Session`] and is the only writer of its state. It
//! samples the clock on a fixed cadence while a birth instant is set,
//! publishes each [`Snapshot`] on a `watch` channel, and runs the
//! celebration message timer. Everything happens on the task that drives
//! the loop, so no locking is involved.
//!
//! ```text
//! Clock --> Session::tick --> watch::Sender<Snapshot> --> presentation
//!             ^
//!   commands (start / reset / stop)
//! ```

use std::time::Duration;

use chrono::{DateTime, TimeZone};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::session::{Session, Snapshot};

/// How long the celebration message stays up.
pub const CELEBRATION_MESSAGE_LIFETIME: Duration = Duration::from_secs(10);

/// Sampling cadence used when none is configured.
pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

enum Command<Tz: TimeZone> {
    Start(DateTime<Tz>),
    Reset,
    Stop,
}

enum Event<Tz: TimeZone> {
    Command(Option<Command<Tz>>),
    Tick,
    ClearMessage,
}

/// Control side of a running loop.
pub struct LiveHandle<Tz: TimeZone> {
    commands: mpsc::UnboundedSender<Command<Tz>>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl<Tz: TimeZone> LiveHandle<Tz> {
    /// Replace the birth instant. Derived state restarts from scratch.
    pub fn start(&self, birth: DateTime<Tz>) {
        let _ = self.commands.send(Command::Start(birth));
    }

    /// Return to idle and stop sampling.
    pub fn reset(&self) {
        let _ = self.commands.send(Command::Reset);
    }

    /// Ask the loop to exit. Safe to call any number of times.
    pub fn stop(&self) {
        let _ = self.commands.send(Command::Stop);
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for its task to finish.
    pub async fn join(self) {
        self.stop();
        let _ = self.task.await;
    }
}

/// Spawn the loop on the current runtime. It starts idle.
pub fn spawn<C>(clock: C, tick_every: Duration) -> LiveHandle<C::Tz>
where
    C: Clock + Send + 'static,
    C::Tz: Send + 'static,
    <C::Tz as TimeZone>::Offset: Send,
{
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (publisher, snapshots) = watch::channel(Snapshot::Idle);

    let live = LiveLoop {
        clock,
        session: Session::new(),
        tick_every,
        publisher,
        clear_at: None,
    };
    let task = tokio::spawn(live.run(command_rx));

    LiveHandle {
        commands,
        snapshots,
        task,
    }
}

struct LiveLoop<C: Clock> {
    clock: C,
    session: Session<C::Tz>,
    tick_every: Duration,
    publisher: watch::Sender<Snapshot>,
    clear_at: Option<Instant>,
}

impl<C: Clock> LiveLoop<C> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command<C::Tz>>) {
        let mut interval = time::interval(self.tick_every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(tick_ms = self.tick_every.as_millis() as u64, "live loop ready");

        loop {
            let running = self.session.is_running();
            let clear_at = self.clear_at;
            let clear = async move {
                match clear_at {
                    Some(at) => time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            let event = tokio::select! {
                cmd = commands.recv() => Event::Command(cmd),
                _ = interval.tick(), if running => Event::Tick,
                _ = clear => Event::ClearMessage,
            };

            match event {
                Event::Command(Some(Command::Start(birth))) => {
                    info!("birth instant set, sampling");
                    self.clear_at = None;
                    self.session.start(birth);
                    self.tick();
                    interval.reset();
                }
                Event::Command(Some(Command::Reset)) => {
                    info!("session reset, sampling stopped");
                    self.clear_at = None;
                    self.session.reset();
                    self.publisher.send_replace(Snapshot::Idle);
                }
                Event::Command(Some(Command::Stop)) | Event::Command(None) => break,
                Event::Tick => self.tick(),
                Event::ClearMessage => {
                    debug!("celebration message expired");
                    self.clear_at = None;
                    self.session.clear_message();
                    self.publisher.send_modify(|snapshot| {
                        if let Snapshot::Running(frame) = snapshot {
                            frame.message = None;
                        }
                    });
                }
            }
        }

        info!("live loop stopped");
    }

    fn tick(&mut self) {
        let now = self.clock.now();
        let snapshot = self.session.tick(&now);

        if snapshot.frame().is_some_and(|f| f.celebrate) {
            info!("birthday reached, celebrating");
            self.clear_at = Some(Instant::now() + CELEBRATION_MESSAGE_LIFETIME);
        }

        self.publisher.send_replace(snapshot);
    }
}
