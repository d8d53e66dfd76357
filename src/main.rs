use env_logger::Env;
use std::sync::Arc;
use xevo::acquisition::{AcquisitionPaths, SharedBridge};
use xevo::adb::{AdbBackend, Bridge};
use xevo::args::Args;
use xevo::interaction::{
    ConsoleOutput, HELP_TEXT, InteractionLoop, create_event_channel, spawn_stdin_reader,
};

fn init_logging(debug_mode: bool) {
    let default_filter = if debug_mode { "info,xevo=debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
}

fn main() {
    let Some(args) = Args::parse() else {
        return;
    };
    init_logging(args.debug_mode);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {e}");
            return;
        }
    };

    runtime.block_on(run(args));
    // An abandoned imaging worker is still blocked in the device shell; don't wait for it.
    runtime.shutdown_background();
}

async fn run(args: Args) {
    let backend = AdbBackend::new(args.backend);
    log::info!("Using {} backend", backend.name());
    let bridge: SharedBridge = Arc::new(backend);

    let starter = bridge.clone();
    match tokio::task::spawn_blocking(move || starter.start_server()).await {
        Ok(Ok(())) => log::debug!("ADB server is up"),
        Ok(Err(e)) if e.is_daemon_unreachable() => {
            log::warn!("ADB server is not reachable, connecting will find no device: {e}")
        }
        Ok(Err(e)) => log::warn!("Could not start the ADB server: {e}"),
        Err(e) => log::warn!("ADB server start task failed: {e}"),
    }

    let (tx, rx) = create_event_channel();
    // Detached: it ends on its own at end of input or once the loop drops the receiver.
    let _reader = spawn_stdin_reader(tx);

    println!(
        "Xevo v{} - Android smartwatch forensic acquisition (c) {} Vigor Solutions",
        env!("XEVO_VERSION_DISPLAY"),
        env!("XEVO_BUILD_YEAR")
    );
    println!("{HELP_TEXT}");

    let event_loop = InteractionLoop::new(
        bridge,
        AcquisitionPaths::default(),
        ConsoleOutput::stdout(),
    );
    event_loop.run(rx).await;
}
