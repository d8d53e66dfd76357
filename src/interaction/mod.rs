// Interaction module - the console front end.
// Input lines become events on a bounded channel; one loop owns the session, the imaging
// runner and all output.

pub mod channels;
pub mod event_loop;
pub mod form;
pub mod output;
pub mod types;

pub use channels::{EVENT_CHANNEL_CAPACITY, create_event_channel};
pub use event_loop::InteractionLoop;
pub use form::{DEFAULT_PORT, HELP_TEXT, parse_line, spawn_stdin_reader};
pub use output::{ConsoleOutput, OutputSink};
pub use types::UiEvent;
