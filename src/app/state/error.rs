use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

/// A surfaced failure, shown until the user acknowledges it with Esc.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorState {
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub severity: ErrorSeverity,
    pub suggestions: Vec<String>,
}

impl ErrorState {
    #[must_use]
    pub fn new(message: impl Into<String>, severity: ErrorSeverity) -> Self {
        Self {
            message: message.into(),
            timestamp: Local::now(),
            severity,
            suggestions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}
