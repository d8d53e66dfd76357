use std::io::Write;

/// Where the loop writes user-facing text and the progress indicator.
pub trait OutputSink {
    fn print(&mut self, text: &str);
    fn progress(&mut self, percent: u8);
}

/// Plain terminal output; log records go to stderr separately.
pub struct ConsoleOutput<W: Write> {
    writer: W,
}

impl ConsoleOutput<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{line}").and_then(|_| self.writer.flush()) {
            log::warn!("Could not write to output: {e}");
        }
    }
}

impl<W: Write> OutputSink for ConsoleOutput<W> {
    fn print(&mut self, text: &str) {
        self.write_line(text);
    }

    fn progress(&mut self, percent: u8) {
        let percent = percent.min(100);
        let filled = usize::from(percent / 5);
        let bar = format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled));
        self.write_line(&format!("Progress: {bar} {percent}%"));
    }
}
