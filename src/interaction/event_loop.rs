// The single-threaded dispatcher: user events in, display text out
use super::form::HELP_TEXT;
use super::output::OutputSink;
use super::types::UiEvent;
use crate::acquisition::{
    self, AcquisitionPaths, ImagingOutcome, ImagingRunner, Session, SharedBridge,
};
use crate::adb::{BridgeError, BridgeResult};
use tokio::sync::mpsc;

pub const NOT_CONNECTED: &str = "No device connected. Connect a device first.";
pub const IMAGING_STARTED: &str = "Creating forensic image. This may take some time...";
pub const TRANSFER_DONE: &str = "Forensic image transferred successfully to your PC.";
pub const TRANSFER_BLOCKED: &str =
    "Forensic image is still being created. Transfer it once imaging completes.";

/// Run a blocking bridge call on the blocking pool and wait for it. The loop does not take
/// other events meanwhile, same as if it had made the call itself.
async fn blocking<T, F>(work: F) -> BridgeResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(BridgeError::from)
}

/// Owns every piece of display-affecting state; nothing else mutates it.
pub struct InteractionLoop<O: OutputSink> {
    bridge: SharedBridge,
    paths: AcquisitionPaths,
    session: Option<Session>,
    runner: ImagingRunner,
    output: O,
}

impl<O: OutputSink> InteractionLoop<O> {
    pub fn new(bridge: SharedBridge, paths: AcquisitionPaths, output: O) -> Self {
        Self {
            bridge,
            runner: ImagingRunner::new(paths.clone()),
            paths,
            session: None,
            output,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn runner(&self) -> &ImagingRunner {
        &self.runner
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Process events until exit or the sender side closes, then tear down the session.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) -> O {
        loop {
            tokio::select! {
                outcome = self.runner.next_completion(), if self.runner.is_running() => {
                    self.on_imaging_done(outcome);
                }
                event = events.recv() => match event {
                    None | Some(UiEvent::Exit) => break,
                    Some(event) => self.dispatch(event).await,
                },
            }
        }
        self.shutdown();
        self.output
    }

    pub async fn dispatch(&mut self, event: UiEvent) {
        log::debug!("Event: {:?}", event);
        match event {
            UiEvent::Connect { address, port } => self.on_connect(address, port).await,
            UiEvent::ReadInfo => self.on_read_info().await,
            UiEvent::CreateImage => self.on_create_image(),
            UiEvent::TransferImage => self.on_transfer().await,
            UiEvent::Help => self.output.print(HELP_TEXT),
            UiEvent::Unknown(input) => self.output.print(&format!(
                "Unknown command '{input}'. Type 'help' for the list of commands."
            )),
            UiEvent::Exit => {}
        }
    }

    async fn on_connect(&mut self, address: String, port: String) {
        let bridge = self.bridge.clone();
        let outcome = match blocking(move || acquisition::connect(&bridge, &address, &port)).await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.output.print(&format!("Connect failed: {e}"));
                return;
            }
        };

        for line in outcome.messages() {
            self.output.print(&line);
        }

        let attempted = !matches!(
            outcome,
            acquisition::ConnectOutcome::InvalidAddress | acquisition::ConnectOutcome::InvalidPort
        );
        if attempted {
            // A new target was asked for: the old handle no longer applies either way.
            if let Some(previous) = self.session.take() {
                previous.close();
            }
            self.session = outcome.into_session();
        }
    }

    fn active_session(&mut self) -> Option<Session> {
        let session = self.session.clone();
        if session.is_none() {
            self.output.print(NOT_CONNECTED);
        }
        session
    }

    async fn on_read_info(&mut self) {
        let Some(session) = self.active_session() else {
            return;
        };
        match blocking(move || acquisition::read_properties(&session)).await {
            Ok(props) => self.output.print(&props.render()),
            Err(e) => self.output.print(&format!("Reading device info failed: {e}")),
        }
    }

    fn on_create_image(&mut self) {
        let Some(session) = self.active_session() else {
            return;
        };
        match self.runner.start(&session) {
            Ok(_) => {
                self.output.progress(self.runner.progress());
                self.output.print(IMAGING_STARTED);
            }
            Err(e) => self.output.print(&e.to_string()),
        }
    }

    pub fn on_imaging_done(&mut self, outcome: ImagingOutcome) {
        self.output.progress(self.runner.progress());
        let secs = outcome.elapsed.as_secs();
        let succeeded = outcome.succeeded();
        match outcome.result {
            Ok(out) if succeeded => {
                let summary = out.tail(2);
                if !summary.is_empty() {
                    self.output.print(&summary);
                }
                self.output.print(&format!(
                    "Forensic image created on the device at {} ({}s).",
                    self.paths.remote_image, secs
                ));
            }
            Ok(out) => {
                log::warn!("Imaging request #{} reported failure", outcome.request_id);
                self.output
                    .print(&format!("Forensic image creation failed after {secs}s:"));
                // Diagnostics from `su`/`dd` can sit anywhere in the output, not only at the end.
                self.output.print(out.trimmed());
            }
            Err(e) => {
                log::warn!("Imaging request #{} errored: {e}", outcome.request_id);
                self.output
                    .print(&format!("Forensic image creation failed: {e}"));
            }
        }
    }

    async fn on_transfer(&mut self) {
        let Some(session) = self.active_session() else {
            return;
        };
        if self.runner.is_running() {
            self.output.print(TRANSFER_BLOCKED);
            return;
        }
        let paths = self.paths.clone();
        let result = blocking(move || acquisition::transfer_image(&session, &paths))
            .await
            .and_then(|inner| inner);
        match result {
            Ok(report) => {
                self.output.print(TRANSFER_DONE);
                self.output.print(&format!(
                    "Saved {} bytes to {}",
                    report.bytes,
                    report.local_path.display()
                ));
            }
            Err(e) => self.output.print(&format!("Transfer failed: {e}")),
        }
    }

    fn shutdown(&mut self) {
        if let Some(request_id) = self.runner.abandon() {
            self.output.print(&format!(
                "Exiting while imaging request #{request_id} is still running on the device."
            ));
        }
        if let Some(session) = self.session.take() {
            session.close();
        }
        log::info!("Interaction loop stopped");
    }
}
