// Terminal stand-in for the acquisition form: one command per line
use super::types::UiEvent;
use std::io::BufRead;
use tokio::sync::mpsc;

/// Pre-filled value of the port field.
pub const DEFAULT_PORT: &str = "5037";

pub const HELP_TEXT: &str = "\
Commands:
  connect <ip address> [port]   Connect to the watch (port defaults to 5037)
  info                          Read device brand, model, Android version and IMEI
  image                         Create the forensic image on the device
  transfer                      Pull the image into the current directory
  help                          Show this list
  exit                          Quit";

/// Turn one input line into an event. Blank lines produce nothing.
pub fn parse_line(line: &str) -> Option<UiEvent> {
    let trimmed = line.trim();
    let mut words = trimmed.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();

    let event = match command.as_str() {
        "connect" | "c" | "1" => {
            let address = words.next().unwrap_or_default();
            let port = words.next();
            // Accept `ip:port` in the address field when no separate port is given.
            let (address, port) = match (address.rsplit_once(':'), port) {
                (Some((host, inline_port)), None) => (host, inline_port),
                _ => (address, port.unwrap_or(DEFAULT_PORT)),
            };
            UiEvent::Connect {
                address: address.to_string(),
                port: port.to_string(),
            }
        }
        "info" | "i" | "2" => UiEvent::ReadInfo,
        "image" | "3" => UiEvent::CreateImage,
        "transfer" | "t" | "4" => UiEvent::TransferImage,
        "exit" | "quit" | "q" | "5" => UiEvent::Exit,
        "help" | "h" | "?" => UiEvent::Help,
        _ => UiEvent::Unknown(trimmed.to_string()),
    };
    Some(event)
}

/// Forward parsed lines until `exit`, end of input, or the loop going away.
/// End of input counts as closing the window.
pub fn forward_lines<R: BufRead>(reader: R, tx: &mpsc::Sender<UiEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Reading input failed: {e}");
                break;
            }
        };
        let Some(event) = parse_line(&line) else {
            continue;
        };
        let is_exit = event == UiEvent::Exit;
        if tx.blocking_send(event).is_err() || is_exit {
            return;
        }
    }
    let _ = tx.blocking_send(UiEvent::Exit);
}

/// Read stdin on a dedicated thread; blocking reads there never stall the loop or shutdown.
pub fn spawn_stdin_reader(tx: mpsc::Sender<UiEvent>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || forward_lines(std::io::stdin().lock(), &tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::channels::create_event_channel;
    use std::io::Cursor;

    #[test]
    fn connect_with_address_and_port() {
        assert_eq!(
            parse_line("connect 192.168.1.20 5555"),
            Some(UiEvent::Connect {
                address: "192.168.1.20".into(),
                port: "5555".into()
            })
        );
    }

    #[test]
    fn connect_uses_prefilled_port() {
        assert_eq!(
            parse_line("  CONNECT 10.0.0.7 "),
            Some(UiEvent::Connect {
                address: "10.0.0.7".into(),
                port: "5037".into()
            })
        );
    }

    #[test]
    fn connect_splits_inline_port() {
        assert_eq!(
            parse_line("c 10.0.0.7:5555"),
            Some(UiEvent::Connect {
                address: "10.0.0.7".into(),
                port: "5555".into()
            })
        );
    }

    #[test]
    fn connect_without_address_leaves_field_empty() {
        // Validation, not parsing, rejects it.
        assert_eq!(
            parse_line("connect"),
            Some(UiEvent::Connect {
                address: String::new(),
                port: "5037".into()
            })
        );
    }

    #[test]
    fn menu_numbers_and_words() {
        assert_eq!(parse_line("info"), Some(UiEvent::ReadInfo));
        assert_eq!(parse_line("3"), Some(UiEvent::CreateImage));
        assert_eq!(parse_line("transfer"), Some(UiEvent::TransferImage));
        assert_eq!(parse_line("quit"), Some(UiEvent::Exit));
        assert_eq!(parse_line("?"), Some(UiEvent::Help));
        assert_eq!(parse_line("format c:"), Some(UiEvent::Unknown("format c:".into())));
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn forward_stops_at_exit() {
        let (tx, mut rx) = create_event_channel();
        forward_lines(Cursor::new("info\n\nexit\nimage\n"), &tx);
        assert_eq!(rx.try_recv().unwrap(), UiEvent::ReadInfo);
        assert_eq!(rx.try_recv().unwrap(), UiEvent::Exit);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn end_of_input_means_exit() {
        let (tx, mut rx) = create_event_channel();
        forward_lines(Cursor::new("transfer"), &tx);
        assert_eq!(rx.try_recv().unwrap(), UiEvent::TransferImage);
        assert_eq!(rx.try_recv().unwrap(), UiEvent::Exit);
    }
}
