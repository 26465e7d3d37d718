// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event log and final summary.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Category shown in front of each summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Backup,
    ModifyFile,
    Branch,
    Tag,
    Push,
    SkipPush,
}

impl EventKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Backup => "BACKUP",
            Self::ModifyFile => "MODIFY FILE",
            Self::Branch => "BRANCH",
            Self::Tag => "TAG",
            Self::Push => "PUSH",
            Self::SkipPush => "SKIP PUSH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub message: String,
}

impl Event {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Append-only list of events, owned by one worker or by the run.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn push(&mut self, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event::new(kind, message));
    }

    /// Merge a worker's events at a join point.
    pub fn merge(&mut self, other: Self) {
        self.events.extend(other.events);
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

/// What a successful run prints.
#[derive(Debug, Clone)]
pub struct Summary {
    pub events: Vec<Event>,
    /// Working directory, when kept.
    pub workdir: Option<PathBuf>,
    pub elapsed: Duration,
    pub simulated: bool,
}

const RULE: &str = "=================================";

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        if self.simulated {
            writeln!(f, "SUCCESS (simulation, nothing was pushed)")?;
        } else {
            writeln!(f, "SUCCESS")?;
        }
        writeln!(f, "{RULE}")?;
        if let Some(dir) = &self.workdir {
            writeln!(f, "Working directory kept at {}", dir.display())?;
        }
        writeln!(f, "Time running: {}", format_elapsed(self.elapsed))?;
        writeln!(f, "Events:")?;
        if self.events.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (i, event) in self.events.iter().enumerate() {
            writeln!(f, "{}. [{}] {}", i + 1, event.kind.label(), event.message)?;
        }
        Ok(())
    }
}

/// `H:MM:SS`
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
