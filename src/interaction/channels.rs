// Communication channel between the input side and the interaction loop
use super::types::UiEvent;
use tokio::sync::mpsc;

pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Helper function to create the user event channel
pub fn create_event_channel() -> (mpsc::Sender<UiEvent>, mpsc::Receiver<UiEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}
