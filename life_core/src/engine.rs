// engine.rs - Cooperative timer loop around a `Simulation`
//
// A single task owns the simulation. Queued intents and the step timer are
// served one at a time, so a step never overlaps with a user intent.

use std::future;
use std::thread;

use log::{info, warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};

use crate::error::{EngineError, GridError};
use crate::simulation::{Intent, Schedule, Simulation, Snapshot};

struct Command {
    intent: Intent,
    reply: Option<oneshot::Sender<Result<(), GridError>>>,
}

pub struct Engine {
    simulation: Simulation,
    commands: mpsc::UnboundedReceiver<Command>,
    deadline: Option<Instant>,
}

/// Cloneable front door to a running `Engine`.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl Engine {
    pub fn new(mut simulation: Simulation) -> (Engine, EngineHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(simulation.snapshot());
        simulation.subscribe(move |snapshot| {
            snapshot_tx.send_replace(snapshot.clone());
        });

        let engine = Engine {
            simulation,
            commands: command_rx,
            deadline: None,
        };
        let handle = EngineHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (engine, handle)
    }

    /// Extra listener, run after the snapshot seen by handles has been updated.
    pub fn on_publish<F>(&mut self, listener: F)
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.simulation.subscribe(listener);
    }

    /// Serves intents and timer firings until every handle is dropped.
    pub async fn run(mut self) {
        info!("Simulation engine started");
        loop {
            let deadline = self.deadline;
            let timer = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => future::pending().await,
                }
            };

            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command { intent, reply }) => {
                        let result = self.simulation.dispatch(intent);
                        let result = self.apply(result);
                        if let Err(e) = &result {
                            warn!("Rejected {intent:?}: {e}");
                        }
                        if let Some(reply) = reply {
                            // The caller may have stopped waiting.
                            let _ = reply.send(result);
                        }
                    }
                    None => break,
                },
                _ = timer => {
                    self.deadline = None;
                    let result = self.simulation.tick();
                    if let Err(e) = self.apply(result) {
                        warn!("Scheduled step failed: {e}");
                    }
                }
            }
        }
        info!("Simulation engine stopped");
    }

    fn apply(&mut self, result: Result<Schedule, GridError>) -> Result<(), GridError> {
        match result? {
            Schedule::Keep => {}
            Schedule::Arm(delay) => self.deadline = Some(Instant::now() + delay),
            Schedule::Cancel => self.deadline = None,
        }
        Ok(())
    }
}

impl EngineHandle {
    /// Queues an intent without waiting; rejections are only logged.
    pub fn send(&self, intent: Intent) -> Result<(), EngineError> {
        self.commands
            .send(Command { intent, reply: None })
            .map_err(|_| EngineError::Closed)
    }

    /// Queues an intent and waits for the engine to apply or reject it.
    pub async fn dispatch(&self, intent: Intent) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command { intent, reply: Some(reply_tx) })
            .map_err(|_| EngineError::Closed)?;
        reply_rx.await.map_err(|_| EngineError::Closed)??;
        Ok(())
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.snapshots.borrow().running
    }

    /// Change notifications; the receiver is marked changed on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// Runs the engine on its own thread with a single-threaded runtime.
/// `notify` is called after every publish.
pub fn spawn_engine_thread<F>(
    simulation: Simulation,
    notify: F,
) -> std::io::Result<(EngineHandle, thread::JoinHandle<()>)>
where
    F: Fn() + Send + 'static,
{
    let (mut engine, handle) = Engine::new(simulation);
    engine.on_publish(move |_| notify());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let join = thread::Builder::new()
        .name("life-engine".into())
        .spawn(move || runtime.block_on(engine.run()))?;
    Ok((handle, join))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LifeConfig;
    use crate::grid::Grid;
    use crate::patterns::BLINKER;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn blinker_engine() -> (Grid, EngineHandle) {
        let config = LifeConfig {
            rows: 5,
            cols: 5,
            seed: Some(5),
            ..LifeConfig::default()
        };
        let mut sim = Simulation::new(&config).unwrap();
        sim.dispatch(Intent::LoadPattern(&BLINKER)).unwrap();
        let start = sim.grid().clone();

        let (engine, handle) = Engine::new(sim);
        tokio::spawn(engine.run());
        (start, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn start_then_immediate_stop_commits_exactly_one_step() {
        let (start, handle) = blinker_engine();

        handle.dispatch(Intent::Start).await.unwrap();
        handle.dispatch(Intent::Stop).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let snap = handle.snapshot();
        assert_eq!(snap.grid, start.step());
        assert_eq!(snap.generation, 1);
        assert!(!snap.running);
    }

    #[tokio::test(start_paused = true)]
    async fn steps_every_delay_while_running() {
        let (start, handle) = blinker_engine();

        handle.dispatch(Intent::Start).await.unwrap();
        // Cycles at t=0, 300 and 600.
        tokio::time::sleep(Duration::from_millis(650)).await;

        let snap = handle.snapshot();
        assert_eq!(snap.generation, 3);
        assert_eq!(snap.grid, start.step());
        assert!(snap.running);

        handle.dispatch(Intent::Stop).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(handle.snapshot().generation, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_intent_does_not_disturb_the_run() {
        let (_, handle) = blinker_engine();

        handle.dispatch(Intent::Start).await.unwrap();
        let err = handle.dispatch(Intent::ToggleCell { row: 5, col: 5 }).await;
        assert!(matches!(err, Err(EngineError::Rejected(GridError::OutOfBounds { .. }))));

        tokio::time::sleep(Duration::from_millis(350)).await;
        let snap = handle.snapshot();
        assert!(snap.running);
        assert_eq!(snap.generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_does_not_double_the_cadence() {
        let (_, handle) = blinker_engine();

        handle.dispatch(Intent::Start).await.unwrap();
        handle.dispatch(Intent::Stop).await.unwrap();
        handle.dispatch(Intent::Start).await.unwrap();
        assert_eq!(handle.snapshot().generation, 2);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(handle.snapshot().generation, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_are_notified_on_change() {
        let (_, handle) = blinker_engine();
        let mut changes = handle.subscribe();

        handle.send(Intent::ToggleCell { row: 0, col: 0 }).unwrap();
        changes.changed().await.unwrap();
        assert!(changes.borrow_and_update().grid.is_alive(0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn publish_listener_sees_the_new_snapshot() {
        let sim = Simulation::new(&LifeConfig { rows: 5, cols: 5, ..LifeConfig::default() }).unwrap();
        let (mut engine, handle) = Engine::new(sim);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let reader = handle.clone();
        engine.on_publish(move |_| log.lock().unwrap().push(reader.snapshot().grid.is_alive(0, 0)));
        tokio::spawn(engine.run());

        handle.dispatch(Intent::ToggleCell { row: 0, col: 0 }).await.unwrap();
        handle.dispatch(Intent::ToggleCell { row: 0, col: 0 }).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_scheduled_step_stops_the_loop() {
        let config = LifeConfig { rows: 5, cols: 5, ..LifeConfig::default() };
        let mut sim = Simulation::new(&config).unwrap();
        sim.dispatch(Intent::LoadPattern(&BLINKER)).unwrap();
        let mut calls = 0;
        sim.set_stepper(move |grid| {
            calls += 1;
            if calls == 1 {
                Ok(grid.step())
            } else {
                Err(GridError::InvalidDimensions { rows: 0, cols: 0 })
            }
        });
        let (engine, handle) = Engine::new(sim);
        tokio::spawn(engine.run());

        handle.dispatch(Intent::Start).await.unwrap();
        assert!(handle.is_running());

        tokio::time::sleep(Duration::from_millis(350)).await;
        let snap = handle.snapshot();
        assert!(!snap.running);
        assert_eq!(snap.generation, 1);

        // No further timer fires once the failed step has disarmed it.
        let changes = handle.subscribe();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn dropped_engine_reports_closed() {
        let sim = Simulation::new(&LifeConfig::default()).unwrap();
        let (engine, handle) = Engine::new(sim);
        drop(engine);

        assert_eq!(handle.send(Intent::Clear), Err(EngineError::Closed));
        assert_eq!(handle.dispatch(Intent::Clear).await, Err(EngineError::Closed));
    }
}
