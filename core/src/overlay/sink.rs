//! Console output for dev tools messages
//!
//! Violations always reach the console, whether or not the UI is enabled.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Severity of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Error,
    Warn,
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleLevel::Error => write!(f, "error"),
            ConsoleLevel::Warn => write!(f, "warn"),
        }
    }
}

/// Destination for console messages.
pub trait ConsoleSink {
    fn emit(&mut self, level: ConsoleLevel, message: &str);
}

/// Routes messages through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ConsoleSink for TracingSink {
    fn emit(&mut self, level: ConsoleLevel, message: &str) {
        match level {
            ConsoleLevel::Error => tracing::error!(target: "devlens::console", "{message}"),
            ConsoleLevel::Warn => tracing::warn!(target: "devlens::console", "{message}"),
        }
    }
}

/// One captured console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub level: ConsoleLevel,
    pub message: String,
}

/// Keeps messages in memory.
///
/// Clones share the same buffer, so a host can hold one handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Rc<RefCell<Vec<ConsoleEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ConsoleEntry> {
        self.entries.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    /// True if any captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.borrow().iter().any(|e| e.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl ConsoleSink for MemorySink {
    fn emit(&mut self, level: ConsoleLevel, message: &str) {
        self.entries.borrow_mut().push(ConsoleEntry {
            level,
            message: message.to_string(),
        });
    }
}
