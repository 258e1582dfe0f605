//! ProbeQL error types

use crate::{SourceLocation, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the rule cannot be compiled
    Error,
    /// Warning - potential issue but compilation can continue
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Source location
    pub location: Option<SourceLocation>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the span (converts to location using provided source)
    pub fn with_span(mut self, span: Span, source: &str) -> Self {
        self.location = Some(SourceLocation::from_span(span, source));
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Main ProbeQL error type
///
/// Two disjoint classes: compile-time errors (`Lex`, `Parse`, `Semantic`)
/// are fatal to loading the one rule that raised them; evaluation-time
/// anomalies (`Evaluation`) never surface through the match verdict and
/// exist only for logging.
#[derive(Debug, Clone, Error)]
pub enum QlError {
    /// Lexical error (unterminated string, unrecognized character)
    #[error("{message}")]
    Lex {
        message: String,
        location: Option<SourceLocation>,
    },

    /// Parse error (unexpected token, malformed construct)
    #[error("{message}")]
    Parse {
        message: String,
        expression: String,
        location: Option<SourceLocation>,
    },

    /// Semantic error (unknown field, undefined function, arity or
    /// argument-kind mismatch, incomparable operand kinds)
    #[error("{message}")]
    Semantic {
        message: String,
        location: Option<SourceLocation>,
    },

    /// Evaluation-time anomaly, recorded but never fatal to the verdict
    #[error("{message}")]
    Evaluation { message: String },
}

impl QlError {
    /// Create a lexical error
    pub fn lex(message: impl Into<String>) -> Self {
        Self::Lex {
            message: message.into(),
            location: None,
        }
    }

    /// Create a lexical error with location
    pub fn lex_at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Lex {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            expression: expression.into(),
            location: None,
        }
    }

    /// Create a parse error with location
    pub fn parse_at(
        message: impl Into<String>,
        expression: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            expression: expression.into(),
            location: Some(location),
        }
    }

    /// Create a semantic error
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic {
            message: message.into(),
            location: None,
        }
    }

    /// Create a semantic error with location
    pub fn semantic_at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Semantic {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create an evaluation anomaly
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// True for errors that reject a rule before it sees any event
    pub fn is_compile_error(&self) -> bool {
        !matches!(self, Self::Evaluation { .. })
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Lex { location, .. } => location.as_ref(),
            Self::Parse { location, .. } => location.as_ref(),
            Self::Semantic { location, .. } => location.as_ref(),
            Self::Evaluation { .. } => None,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());
        if let Some(loc) = self.location() {
            diag = diag.with_location(loc.clone());
        }
        diag
    }
}
