//! Progress reporting
//!
//! The orchestrator and driver emit [`Event`]s synchronously to a [`Reporter`].
//! [`ConsoleReporter`] renders them as human-readable lines; [`EventLog`]
//! records them for inspection.

use crate::types::Event;
use std::io::Write;

/// Consumer of run events
pub trait Reporter {
    /// Handle one event
    fn report(&mut self, event: &Event);
}

/// Records every event in order
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    /// Events received so far
    pub events: Vec<Event>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for EventLog {
    fn report(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

/// Renders events as console text
///
/// "Trying" and percentage lines are drawn in place: each rewrite starts with a
/// carriage return and is padded with spaces to the width of the line it
/// replaces. The next permanent line overwrites the in-place line the same way
/// before ending with a newline.
pub struct ConsoleReporter<W: Write> {
    out: W,
    // Width of the in-place line currently on screen, if any
    inline_width: Option<usize>,
}

impl ConsoleReporter<std::io::Stdout> {
    /// Reporter writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Reporter writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            inline_width: None,
        }
    }

    /// Consume the reporter and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn inline(&mut self, text: &str) {
        let padding = self.padding_for(text);
        // Write errors are ignored; progress text is best-effort
        let _ = write!(self.out, "\r{text}{padding}");
        let _ = self.out.flush();
        self.inline_width = Some(text.chars().count());
    }

    fn line(&mut self, text: &str) {
        let result = if self.inline_width.is_some() {
            let padding = self.padding_for(text);
            writeln!(self.out, "\r{text}{padding}")
        } else {
            writeln!(self.out, "{text}")
        };
        let _ = result.and_then(|()| self.out.flush());
        self.inline_width = None;
    }

    fn padding_for(&self, text: &str) -> String {
        let previous = self.inline_width.unwrap_or(0);
        " ".repeat(previous.saturating_sub(text.chars().count()))
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, event: &Event) {
        match event {
            Event::ListLoading { name } => self.line(&format!("Loading '{name}'")),
            Event::Trying { link } => self.inline(&format!("Trying: {link}... ")),
            Event::Progress { position, percent } => {
                self.inline(&format!("{position} Downloading: {percent}%"))
            }
            Event::Complete { position, filename } => {
                self.line(&format!("{position} Complete: {filename}"))
            }
            Event::Skipped {
                position,
                filename,
                link,
            } => self.line(&format!("{position} Skipping: {filename} ({link})")),
            Event::AttemptFailed {
                reason,
                attempt,
                max_attempts,
                will_retry,
                ..
            } => {
                let next = if *will_retry { " Retrying..." } else { "" };
                self.line(&format!(
                    "Failed: {reason}.{next} (Attempt {attempt}/{max_attempts})"
                ))
            }
            Event::Failed { link } => self.line(&format!("Failed to download {link}.")),
            Event::ListFinished { name } => self.line(&format!("Finished '{name}'")),
        }
    }
}
