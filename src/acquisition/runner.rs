// Runs the imaging operation off the interaction loop and hands the result back to it
use super::config::AcquisitionPaths;
use super::operations::create_image;
use super::session::Session;
use crate::adb::{BridgeResult, ShellOutput};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagingState {
    Idle,
    Running,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunnerError {
    #[error("Imaging request #{request_id} is still running; wait for it to finish.")]
    AlreadyRunning { request_id: u64 },
}

/// The single result of one imaging request.
#[derive(Debug)]
pub struct ImagingOutcome {
    pub request_id: u64,
    pub result: BridgeResult<ShellOutput>,
    pub elapsed: Duration,
}

impl ImagingOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(out) if !out.looks_failed())
    }
}

struct ImagingTask {
    request_id: u64,
    started: Instant,
    handle: JoinHandle<BridgeResult<ShellOutput>>,
}

/// Owns at most one in-flight imaging worker.
///
/// `start` launches the worker on the blocking pool; `next_completion` resolves exactly once
/// per started request. Dropping a pending `next_completion` future leaves the task in place,
/// so it can be raced against user events in `tokio::select!`.
pub struct ImagingRunner {
    paths: AcquisitionPaths,
    state: ImagingState,
    in_flight: Option<ImagingTask>,
    next_id: u64,
}

impl ImagingRunner {
    pub fn new(paths: AcquisitionPaths) -> Self {
        Self {
            paths,
            state: ImagingState::Idle,
            in_flight: None,
            next_id: 1,
        }
    }

    pub fn state(&self) -> ImagingState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// 0 until a request has returned, then 100. The copy itself reports nothing in between.
    pub fn progress(&self) -> u8 {
        match self.state {
            ImagingState::Completed => 100,
            ImagingState::Idle | ImagingState::Running => 0,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, session: &Session) -> Result<u64, RunnerError> {
        if let Some(task) = &self.in_flight {
            log::warn!(
                "Imaging trigger ignored, request #{} running for {}s",
                task.request_id,
                task.started.elapsed().as_secs()
            );
            return Err(RunnerError::AlreadyRunning {
                request_id: task.request_id,
            });
        }

        let request_id = self.next_id;
        self.next_id += 1;

        let session = session.clone();
        let paths = self.paths.clone();
        let handle = tokio::task::spawn_blocking(move || create_image(&session, &paths));

        log::debug!("Imaging request #{request_id} started");
        self.in_flight = Some(ImagingTask {
            request_id,
            started: Instant::now(),
            handle,
        });
        self.state = ImagingState::Running;
        Ok(request_id)
    }

    /// Wait for the in-flight request. Never resolves while idle.
    pub async fn next_completion(&mut self) -> ImagingOutcome {
        let Some(task) = self.in_flight.as_mut() else {
            return std::future::pending().await;
        };

        let joined = (&mut task.handle).await;
        let result = joined.unwrap_or_else(|e| Err(e.into()));
        let elapsed = task.started.elapsed();
        let request_id = task.request_id;

        self.in_flight = None;
        self.state = ImagingState::Completed;
        log::debug!(
            "Imaging request #{request_id} finished after {}s",
            elapsed.as_secs()
        );
        ImagingOutcome {
            request_id,
            result,
            elapsed,
        }
    }

    /// Stop tracking the in-flight request. The blocking worker itself cannot be interrupted
    /// and runs to completion in the background.
    pub fn abandon(&mut self) -> Option<u64> {
        let task = self.in_flight.take()?;
        log::warn!(
            "Abandoning imaging request #{} after {}s",
            task.request_id,
            task.started.elapsed().as_secs()
        );
        self.state = ImagingState::Idle;
        Some(task.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::session::SharedBridge;
    use crate::adb::Device;
    use crate::adb::fake::FakeBridge;
    use std::sync::Arc;

    fn watch() -> Device {
        Device::new("192.168.1.20:5555", "device")
    }

    fn session_with(fake: FakeBridge) -> (Arc<FakeBridge>, Session) {
        let fake = Arc::new(fake);
        let bridge: SharedBridge = fake.clone();
        (fake, Session::open(bridge, watch(), "192.168.1.20:5555"))
    }

    fn dd_reply(fake: FakeBridge) -> FakeBridge {
        fake.reply(
            &AcquisitionPaths::default().imaging_command(),
            "16+0 records in\n16+0 records out\n8192 bytes (8.0 K) copied, 0.01 s, 800 K/s\n",
        )
    }

    #[tokio::test]
    async fn one_completion_per_trigger() {
        let (fake, session) = session_with(dd_reply(FakeBridge::default()));
        let mut runner = ImagingRunner::new(AcquisitionPaths::default());
        assert_eq!(runner.state(), ImagingState::Idle);
        assert_eq!(runner.progress(), 0);

        let id = runner.start(&session).unwrap();
        assert_eq!(runner.state(), ImagingState::Running);
        assert_eq!(runner.progress(), 0);

        let outcome = runner.next_completion().await;
        assert_eq!(outcome.request_id, id);
        assert!(outcome.succeeded());
        assert_eq!(runner.state(), ImagingState::Completed);
        assert_eq!(runner.progress(), 100);
        assert_eq!(fake.shell_commands().len(), 1);

        // Nothing further is delivered for the same trigger.
        let again = tokio::time::timeout(Duration::from_millis(50), runner.next_completion()).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn slow_command_completes_after_it_returns() {
        let fake = FakeBridge {
            shell_delay: Some(Duration::from_millis(200)),
            ..dd_reply(FakeBridge::default())
        };
        let (_fake, session) = session_with(fake);
        let mut runner = ImagingRunner::new(AcquisitionPaths::default());
        runner.start(&session).unwrap();

        // Not done yet: a short wait times out and leaves the request tracked.
        let early = tokio::time::timeout(Duration::from_millis(20), runner.next_completion()).await;
        assert!(early.is_err());
        assert!(runner.is_running());

        let outcome = runner.next_completion().await;
        assert!(outcome.elapsed >= Duration::from_millis(200));
        assert!(outcome.succeeded());
    }

    #[tokio::test]
    async fn second_trigger_while_running_is_rejected() {
        let fake = FakeBridge {
            shell_delay: Some(Duration::from_millis(100)),
            ..dd_reply(FakeBridge::default())
        };
        let (fake, session) = session_with(fake);
        let mut runner = ImagingRunner::new(AcquisitionPaths::default());

        let first = runner.start(&session).unwrap();
        assert_eq!(
            runner.start(&session),
            Err(RunnerError::AlreadyRunning { request_id: first })
        );
        runner.next_completion().await;

        let second = runner.start(&session).unwrap();
        assert_eq!(second, first + 1);
        runner.next_completion().await;
        assert_eq!(fake.shell_commands().len(), 2);
    }

    #[tokio::test]
    async fn shell_failure_is_carried_in_outcome() {
        // No scripted reply: the fake answers like a shell without `su`.
        let (_fake, session) = session_with(FakeBridge::default());
        let mut runner = ImagingRunner::new(AcquisitionPaths::default());
        runner.start(&session).unwrap();

        let outcome = runner.next_completion().await;
        assert!(!outcome.succeeded());
        assert!(outcome.result.unwrap().looks_failed());
        assert_eq!(runner.state(), ImagingState::Completed);
    }

    #[tokio::test]
    async fn abandon_clears_slot() {
        let fake = FakeBridge {
            shell_delay: Some(Duration::from_millis(50)),
            ..dd_reply(FakeBridge::default())
        };
        let (_fake, session) = session_with(fake);
        let mut runner = ImagingRunner::new(AcquisitionPaths::default());
        let id = runner.start(&session).unwrap();
        assert_eq!(runner.abandon(), Some(id));
        assert!(!runner.is_running());
        assert_eq!(runner.state(), ImagingState::Idle);
        assert_eq!(runner.abandon(), None);
    }
}
