//! Reporter trait for dependency injection
//!
//! Core operations report progress and notices through this trait instead of
//! printing, so the CLI decides how (and whether) they are shown.

/// Sink for user-facing progress and status messages.
pub trait Reporter: Send + Sync {
    /// A new phase has started (e.g. "Downloading").
    fn section(&self, title: &str);

    /// Download progress for `file`. `current == total` marks completion.
    fn downloading(&self, file: &str, current: u64, total: Option<u64>);

    /// Something the user should know about but that needs no action.
    fn notice(&self, msg: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, file: &str, current: u64, total: Option<u64>) {
        (**self).downloading(file, current, total);
    }
    fn notice(&self, msg: &str) {
        (**self).notice(msg);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., verification, testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn notice(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}

/// Records messages by level so tests can assert on them.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    pub(crate) messages: std::sync::Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl RecordingReporter {
    fn push(&self, level: &'static str, msg: &str) {
        self.messages.lock().unwrap().push((level, msg.to_string()));
    }

    pub(crate) fn has(&self, level: &str, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn section(&self, title: &str) {
        self.push("section", title);
    }
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn notice(&self, msg: &str) {
        self.push("notice", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn success(&self, msg: &str) {
        self.push("success", msg);
    }
    fn warning(&self, msg: &str) {
        self.push("warning", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
}
