//! Terminal stand-ins for the run controller's collaborators.

use std::{io::Write, thread, time::Duration};

use robo_trail_core::{NarrationCue, Narrator, Pacer};

/// Prints narration cues as speech lines.
#[derive(Debug)]
pub(crate) struct ConsoleNarrator<W> {
    writer: W,
    enabled: bool,
}

impl<W: Write> ConsoleNarrator<W> {
    pub(crate) fn new(writer: W, enabled: bool) -> Self {
        Self { writer, enabled }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Narrator for ConsoleNarrator<W> {
    fn narrate(&mut self, cue: &NarrationCue) {
        if !self.enabled {
            return;
        }
        if let Err(error) = writeln!(self.writer, "RoboPop: {}", cue.script()) {
            tracing::warn!(%error, "failed to write narration");
        }
    }
}

/// Sleeps the current thread between continuous steps.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}
