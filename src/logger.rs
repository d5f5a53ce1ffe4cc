//! Diagnostic sink for messages produced while rewriting stylesheets.

use std::cell::RefCell;

/// Receives informational and warning messages.
pub trait Logger {
  /// Record an informational message.
  fn info(&self, message: &str);
  /// Record a recoverable problem.
  fn warn(&self, message: &str);
}

/// Forwards messages to `tracing` under the `css_useref` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
  fn info(&self, message: &str) {
    tracing::info!(target: "css_useref", "{message}");
  }

  fn warn(&self, message: &str) {
    tracing::warn!(target: "css_useref", "{message}");
  }
}

/// Severity attached to a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  /// Emitted through [`Logger::info`].
  Info,
  /// Emitted through [`Logger::warn`].
  Warn,
}

/// Keeps every message in memory, in emission order.
#[derive(Debug, Default)]
pub struct CapturingLogger {
  messages: RefCell<Vec<(LogLevel, String)>>,
}

impl CapturingLogger {
  /// Snapshot of the captured messages.
  pub fn messages(&self) -> Vec<(LogLevel, String)> {
    self.messages.borrow().clone()
  }

  /// Captured messages at the given level.
  pub fn at_level(&self, level: LogLevel) -> Vec<String> {
    self
      .messages
      .borrow()
      .iter()
      .filter(|(captured, _)| *captured == level)
      .map(|(_, message)| message.clone())
      .collect()
  }
}

impl Logger for CapturingLogger {
  fn info(&self, message: &str) {
    self
      .messages
      .borrow_mut()
      .push((LogLevel::Info, message.to_string()));
  }

  fn warn(&self, message: &str) {
    self
      .messages
      .borrow_mut()
      .push((LogLevel::Warn, message.to_string()));
  }
}

impl<L: Logger + ?Sized> Logger for &L {
  fn info(&self, message: &str) {
    (**self).info(message);
  }

  fn warn(&self, message: &str) {
    (**self).warn(message);
  }
}
