//!
//! Drives a [`Simulator`] from a worker thread, under one of three policies: single-step,
//! run-to-completion and interactive. Only one policy runs at a time.
//!
//! The worker locks the simulator for exactly one step at a time, so [`Controller::snapshot`]
//! can be called while it runs. Pausing and cancelling are cooperative: they're checked
//! between steps, never in the middle of one.
//!

use crate::simulator::{SimError, Simulator, Snapshot};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often a waiting worker checks whether it was cancelled
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub type ErrorHook = Box<dyn Fn(&SimError) + Send + Sync>;

/// A shared flag asking the worker to stop
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Blocks a run-to-completion worker while paused
#[derive(Debug, Default)]
struct PauseGate {
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl PauseGate {
    fn pause(&self) {
        *self.paused.lock() = true;
    }

    fn resume(&self) {
        *self.paused.lock() = false;
        self.resumed.notify_all();
    }

    /// Wakes any waiter so it can notice a cancellation
    fn wake(&self) {
        let _guard = self.paused.lock();
        self.resumed.notify_all();
    }

    fn is_paused(&self) -> bool {
        *self.paused.lock()
    }

    /// Waits until resumed or cancelled
    fn wait(&self, token: &CancellationToken) {
        let mut paused = self.paused.lock();
        while *paused && !token.is_cancelled() {
            self.resumed.wait_for(&mut paused, POLL_INTERVAL);
        }
    }
}

struct Shared {
    simulator: Arc<Mutex<Simulator>>,
    active: AtomicBool,
    cancel: CancellationToken,
    gate: PauseGate,
    errors: Mutex<Vec<SimError>>,
    on_error: Option<ErrorHook>,
}

impl Shared {
    fn report(&self, err: SimError) {
        tracing::error!(line = err.line(), error = %err, "simulation error reported");
        if let Some(hook) = &self.on_error {
            hook(&err);
        }
        self.errors.lock().push(err);
    }
}

pub struct Controller {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Controller {
    pub fn new(simulator: Simulator) -> Self {
        Self::build(simulator, None)
    }

    /// Also calls `hook` for every error, as soon as it's reported
    pub fn with_error_hook<F>(simulator: Simulator, hook: F) -> Self
    where
        F: Fn(&SimError) + Send + Sync + 'static,
    {
        Self::build(simulator, Some(Box::new(hook)))
    }

    fn build(simulator: Simulator, on_error: Option<ErrorHook>) -> Self {
        Self {
            shared: Arc::new(Shared {
                simulator: Arc::new(Mutex::new(simulator)),
                active: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                gate: PauseGate::default(),
                errors: Mutex::new(Vec::new()),
                on_error,
            }),
            worker: Mutex::new(None),
        }
    }

    /// The controlled simulator. Holding its lock stalls the worker.
    pub fn simulator(&self) -> &Arc<Mutex<Simulator>> {
        &self.shared.simulator
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.simulator.lock().snapshot()
    }

    /// Whether a policy is running
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.gate.is_paused()
    }

    /// Runs exactly one step. A simulator that's still running afterwards is left paused.
    /// Returns `false` if a policy was already active.
    pub fn start_single_step(&self) -> bool {
        self.start("single-step", |shared| {
            let mut sim = shared.simulator.lock();
            match sim.step() {
                Ok(_) => sim.pause(),
                Err(err) => {
                    drop(sim);
                    shared.report(err);
                }
            }
        })
    }

    /// Steps until the simulator halts, faults or the controller is cancelled. While paused,
    /// the worker waits without stepping. Returns `false` if a policy was already active.
    pub fn start_run(&self) -> bool {
        self.start("run", run_to_completion)
    }

    /// Executes every line `input` produces against the live simulator, reporting errors
    /// without stopping, until `input` runs out or the controller is cancelled.
    /// Returns `false` if a policy was already active.
    ///
    /// `input` is read from its own thread, which may stay blocked on it after a cancellation.
    pub fn start_interactive<I>(&self, input: I) -> bool
    where
        I: Iterator<Item = String> + Send + 'static,
    {
        self.start("interactive", move |shared| interactive(shared, input))
    }

    fn start<F>(&self, policy: &'static str, work: F) -> bool
    where
        F: FnOnce(&Shared) + Send + 'static,
    {
        let started = self
            .shared
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire);
        if started.is_err() {
            tracing::debug!(policy, "a policy is already active, ignoring start");
            return false;
        }
        self.shared.cancel.reset();
        // Every policy starts unpaused
        self.shared.gate.resume();

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("EzASM Simulator".into())
            .spawn(move || {
                tracing::info!(policy, "controller started");
                work(&shared);
                shared.active.store(false, Ordering::Release);
                tracing::info!(policy, "controller stopped");
            });

        match spawned {
            Ok(handle) => {
                // The previous worker, if any, already finished
                *self.worker.lock() = Some(handle);
                true
            }
            Err(err) => {
                self.shared.active.store(false, Ordering::Release);
                self.shared.report(SimError::Io(err));
                false
            }
        }
    }

    pub fn pause(&self) {
        tracing::info!("pausing");
        self.shared.gate.pause();
    }

    pub fn resume(&self) {
        tracing::info!("resuming");
        self.shared.gate.resume();
    }

    /// Asks the worker to stop. It will within [`POLL_INTERVAL`], or once its current step ends.
    pub fn cancel(&self) {
        tracing::info!("cancelling");
        self.shared.cancel.cancel();
        self.shared.gate.wake();
    }

    /// Blocks until no policy is active
    pub fn await_termination(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("the simulator thread panicked");
                self.shared.active.store(false, Ordering::Release);
            }
        }
        while self.is_active() {
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Every error reported since the last call, oldest first
    pub fn take_errors(&self) -> Vec<SimError> {
        std::mem::take(&mut *self.shared.errors.lock())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.cancel();
        self.await_termination();
    }
}

fn run_to_completion(shared: &Shared) {
    loop {
        if shared.cancel.is_cancelled() {
            shared.simulator.lock().pause();
            break;
        }

        if shared.gate.is_paused() {
            shared.simulator.lock().pause();
            shared.gate.wait(&shared.cancel);
            continue;
        }

        let mut sim = shared.simulator.lock();
        sim.resume();
        match sim.step() {
            Ok(state) if state.is_terminal() => break,
            Ok(_) => {}
            Err(err) => {
                drop(sim);
                shared.report(err);
                break;
            }
        }
    }
}

fn interactive<I>(shared: &Shared, input: I)
where
    I: Iterator<Item = String> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<String>(0);
    let feeder = thread::Builder::new()
        .name("EzASM Input".into())
        .spawn(move || {
            for line in input {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(err) = feeder {
        shared.report(SimError::Io(err));
        return;
    }

    while !shared.cancel.is_cancelled() {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                let res = shared.simulator.lock().execute_line(&line);
                if let Err(err) = res {
                    shared.report(err);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::State;

    fn controller(source: &str) -> Controller {
        let mut sim = Simulator::default();
        sim.load_source(source).unwrap();
        Controller::new(sim)
    }

    fn wait_until(mut cond: impl FnMut() -> bool) {
        let start = std::time::Instant::now();
        while !cond() {
            assert!(start.elapsed() < Duration::from_secs(5));
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn gate_wait_returns_on_cancel() {
        let gate = PauseGate::default();
        let token = CancellationToken::new();
        gate.pause();
        token.cancel();
        gate.wait(&token);
        assert!(gate.is_paused());
    }

    #[test]
    fn single_step_pauses() {
        let controller = controller("li $t0 1\nli $t0 2");
        assert!(controller.start_single_step());
        controller.await_termination();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.register("t0"), Some(1));
        assert_eq!(snapshot.state, State::Paused);
        assert!(!controller.is_active());
    }

    #[test]
    fn run_reports_faults() {
        let controller = controller("li $t0 1\ndiv $t0 $t0 0\nli $t0 3");
        assert!(controller.start_run());
        controller.await_termination();

        assert_eq!(controller.snapshot().state, State::Faulted);
        let errors = controller.take_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line(), Some(2));
        assert!(controller.take_errors().is_empty());
    }

    #[test]
    fn interactive_reports_and_continues() {
        let controller = controller("");
        let input = ["li $t0 2", "bogus", "add $t0 $t0 $t0", "li $t1 0x"]
            .into_iter()
            .map(String::from);
        assert!(controller.start_interactive(input));
        controller.await_termination();

        assert_eq!(controller.snapshot().register("t0"), Some(4));
        assert_eq!(controller.take_errors().len(), 2);
    }

    #[test]
    fn starting_after_a_paused_cancel_runs() {
        let controller = controller("loop: inc $t0\nj loop");
        assert!(controller.start_run());
        wait_until(|| controller.snapshot().register("t0").unwrap() > 0);
        controller.pause();
        wait_until(|| controller.snapshot().state == State::Paused);
        controller.cancel();
        controller.await_termination();

        controller.simulator().lock().load_source("li $t2 5").unwrap();
        assert!(controller.start_run());
        controller.await_termination();
        assert!(!controller.is_paused());
        assert_eq!(controller.snapshot().register("t2"), Some(5));
        assert_eq!(controller.snapshot().state, State::Halted);
    }

    #[test]
    fn error_hook_sees_every_error() {
        let seen = Arc::new(Mutex::new(0));
        let mut sim = Simulator::default();
        sim.load_source("pop $t0").unwrap();

        let counter = Arc::clone(&seen);
        let controller = Controller::with_error_hook(sim, move |_| *counter.lock() += 1);
        controller.start_run();
        controller.await_termination();
        assert_eq!(*seen.lock(), 1);
    }
}
